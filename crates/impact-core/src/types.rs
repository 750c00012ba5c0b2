//! Core data types for macro-release impact analysis.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Ticker of the reference asset
//! - [`DailyClose`] - One trading session's closing price
//! - [`EventType`] - Closed set of tracked release categories
//! - [`ReleaseRow`] - Raw scraped release-history row
//! - [`EconomicEvent`] - One summarized indicator release
//! - [`EnrichedEvent`] - An event aligned to trading days with returns attached

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ImpactError;
use crate::magnitude::parse_magnitude;

/// Ticker of the reference asset whose returns are attributed to releases.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// One trading session's closing price.
///
/// The row of a price series: all intraday detail is discarded upstream, one
/// entry per session in a single reference timezone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DailyClose {
    /// Session date.
    pub date: NaiveDate,
    /// Closing price for the session.
    pub close: f64,
}

impl DailyClose {
    /// Creates a new close row.
    #[must_use]
    pub const fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Category of a tracked macroeconomic release.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Headline consumer price index, year over year.
    Cpi,
    /// Nonfarm payrolls.
    Jobs,
    /// Unemployment rate.
    Unemployment,
    /// Fed rate decision.
    Fed,
}

impl EventType {
    /// All tracked categories, in canonical order.
    pub const ALL: [Self; 4] = [Self::Cpi, Self::Jobs, Self::Unemployment, Self::Fed];

    /// Returns the lowercase name used in output rows and tables.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cpi => "cpi",
            Self::Jobs => "jobs",
            Self::Unemployment => "unemployment",
            Self::Fed => "fed",
        }
    }

    /// Returns true if this category restates the prior period's value.
    ///
    /// Only payrolls carry a revision; the other categories republish prior
    /// values unchanged.
    #[must_use]
    pub const fn has_revisions(&self) -> bool {
        matches!(self, Self::Jobs)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpi" => Ok(Self::Cpi),
            "jobs" => Ok(Self::Jobs),
            "unemployment" => Ok(Self::Unemployment),
            "fed" => Ok(Self::Fed),
            other => Err(ImpactError::Parse(format!("Unknown event type: {other}"))),
        }
    }
}

/// One raw row scraped from a release-history table.
///
/// Rows arrive newest first, matching the source table order. All fields are
/// source text; numeric interpretation happens downstream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseRow {
    /// Release date text, possibly carrying a trailing reference annotation
    /// such as `"Aug 12, 2025  (Jul)"`.
    pub release_date: String,
    /// The period the value describes, e.g. `"Jul"`.
    pub reference_period: String,
    /// Reported value, e.g. `"2.7%"` or `"73K"`.
    pub actual: String,
    /// Forecast value. The published consensus is the same figure; see
    /// [`ReleaseRow::consensus`].
    pub forecast: String,
    /// Prior-period value as republished (possibly revised) in this row.
    pub previous: String,
}

impl ReleaseRow {
    /// Creates a new row with the required fields.
    #[must_use]
    pub fn new(
        release_date: impl Into<String>,
        reference_period: impl Into<String>,
        actual: impl Into<String>,
        forecast: impl Into<String>,
        previous: impl Into<String>,
    ) -> Self {
        Self {
            release_date: release_date.into(),
            reference_period: reference_period.into(),
            actual: actual.into(),
            forecast: forecast.into(),
            previous: previous.into(),
        }
    }

    /// Consensus value for this release.
    ///
    /// The source publishes consensus as an alias of the forecast, so a
    /// single field is stored and exposed under both names.
    #[must_use]
    pub fn consensus(&self) -> &str {
        &self.forecast
    }

    /// Returns true if the row carries a reported value.
    ///
    /// Upcoming releases appear in history tables with an empty or `N/A`
    /// actual cell.
    #[must_use]
    pub fn has_actual(&self) -> bool {
        !self.actual.is_empty() && !self.actual.eq_ignore_ascii_case("n/a")
    }
}

/// One summarized macroeconomic-indicator release.
///
/// Constructed by the summarization layer, consumed by the return
/// attribution engine. Never mutated in place: enrichment derives an
/// [`EnrichedEvent`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomicEvent {
    /// Release category.
    pub event_type: EventType,
    /// Release date as source text; parsed during return attribution.
    pub release_date: String,
    /// The period the value describes.
    pub reference_period: Option<String>,
    /// Reported headline value.
    pub headline_value: Option<String>,
    /// Forecast (consensus) value.
    pub forecast_value: Option<String>,
    /// Headline minus forecast, formatted with its unit, e.g. `"+0.2pp"`.
    pub surprise: Option<String>,
    /// Headline change versus the prior period.
    pub change_from_previous: Option<String>,
    /// Restated prior-period value, for categories that revise.
    pub revision_value: Option<String>,
    /// Delta between the original and restated prior value, e.g. `"-133K"`.
    pub revision_change: Option<String>,
    /// Human-readable commentary for the release.
    pub commentary: Option<String>,
}

impl EconomicEvent {
    /// Creates a new event with the required fields.
    #[must_use]
    pub fn new(event_type: EventType, release_date: impl Into<String>) -> Self {
        Self {
            event_type,
            release_date: release_date.into(),
            reference_period: None,
            headline_value: None,
            forecast_value: None,
            surprise: None,
            change_from_previous: None,
            revision_value: None,
            revision_change: None,
            commentary: None,
        }
    }

    /// Sets the reference period.
    #[must_use]
    pub fn with_reference_period(mut self, period: impl Into<String>) -> Self {
        self.reference_period = Some(period.into());
        self
    }

    /// Sets the headline and forecast values.
    #[must_use]
    pub fn with_values(
        mut self,
        headline: impl Into<String>,
        forecast: impl Into<String>,
    ) -> Self {
        self.headline_value = Some(headline.into());
        self.forecast_value = Some(forecast.into());
        self
    }

    /// Sets the formatted surprise.
    #[must_use]
    pub fn with_surprise(mut self, surprise: impl Into<String>) -> Self {
        self.surprise = Some(surprise.into());
        self
    }

    /// Sets the revision fields.
    #[must_use]
    pub fn with_revision(
        mut self,
        revised_value: impl Into<String>,
        revision_change: impl Into<String>,
    ) -> Self {
        self.revision_value = Some(revised_value.into());
        self.revision_change = Some(revision_change.into());
        self
    }
}

/// An [`EconomicEvent`] aligned to trading days with returns attached.
///
/// Only events that resolved to a trading day are enriched; `trading_day`
/// always names a session present in the price series the event was enriched
/// against. The next-day fields are independently absent at the edge of the
/// known history.
#[derive(Clone, Debug, PartialEq)]
pub struct EnrichedEvent {
    /// The underlying event.
    pub event: EconomicEvent,
    /// Parsed release date.
    pub release_date: NaiveDate,
    /// First trading day on or after the release date (t0).
    pub trading_day: NaiveDate,
    /// Trading day immediately following t0 (t1), if within known history.
    pub next_trading_day: Option<NaiveDate>,
    /// Close-to-close return from the prior session to t0.
    pub same_day_return: Option<f64>,
    /// Close-to-close return from t0 to t1.
    pub next_day_return: Option<f64>,
}

impl EnrichedEvent {
    /// Release category of the underlying event.
    #[must_use]
    pub fn event_type(&self) -> EventType {
        self.event.event_type
    }

    /// Parsed surprise magnitude, if the surprise string is numeric.
    #[must_use]
    pub fn surprise_magnitude(&self) -> Option<f64> {
        parse_magnitude(self.event.surprise.as_deref()?)
    }

    /// Parsed revision-change magnitude, if present and numeric.
    #[must_use]
    pub fn revision_magnitude(&self) -> Option<f64> {
        parse_magnitude(self.event.revision_change.as_deref()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_uppercases() {
        assert_eq!(Symbol::new("ivv").as_str(), "IVV");
        assert_eq!(Symbol::from("spy").to_string(), "SPY");
    }

    #[test]
    fn test_event_type_round_trip() {
        for ty in EventType::ALL {
            assert_eq!(ty.as_str().parse::<EventType>().unwrap(), ty);
        }
        assert!("gdp".parse::<EventType>().is_err());
    }

    #[test]
    fn test_only_jobs_has_revisions() {
        assert!(EventType::Jobs.has_revisions());
        assert!(!EventType::Cpi.has_revisions());
        assert!(!EventType::Unemployment.has_revisions());
        assert!(!EventType::Fed.has_revisions());
    }

    #[test]
    fn test_release_row_consensus_aliases_forecast() {
        let row = ReleaseRow::new("Aug 1, 2025 (Jul)", "Jul", "73K", "110K", "14K");
        assert_eq!(row.consensus(), row.forecast);
    }

    #[test]
    fn test_release_row_has_actual() {
        assert!(ReleaseRow::new("", "", "2.7%", "", "").has_actual());
        assert!(!ReleaseRow::new("", "", "", "", "").has_actual());
        assert!(!ReleaseRow::new("", "", "N/A", "", "").has_actual());
    }

    #[test]
    fn test_enriched_magnitudes() {
        let event = EconomicEvent::new(EventType::Jobs, "2025-08-01")
            .with_surprise("-37K")
            .with_revision("14K", "N/A");
        let enriched = EnrichedEvent {
            event,
            release_date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            trading_day: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            next_trading_day: None,
            same_day_return: None,
            next_day_return: None,
        };
        assert_eq!(enriched.surprise_magnitude(), Some(-37.0));
        assert_eq!(enriched.revision_magnitude(), None);
    }

    #[test]
    fn test_event_builder() {
        let event = EconomicEvent::new(EventType::Jobs, "Aug 1, 2025")
            .with_reference_period("Jul")
            .with_values("73K", "110K")
            .with_surprise("-37K")
            .with_revision("14K", "-133K");
        assert_eq!(event.surprise.as_deref(), Some("-37K"));
        assert_eq!(event.revision_change.as_deref(), Some("-133K"));
    }
}
