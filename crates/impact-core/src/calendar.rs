//! Trading-day resolution against a single asset's price history.
//!
//! A [`PriceSeries`] holds one asset's daily closes, sorted and unique by
//! date. The set of dates carrying a close *is* the trading calendar:
//! weekends and holidays are simply absent, so resolving a release date to a
//! trading day is a lookup, not a holiday-rule computation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

use crate::types::DailyClose;

/// Date-only formats seen in release tables and price files.
const DATE_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%Y-%m-%d", "%m/%d/%Y"];

/// Datetime formats seen in exported price files.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// One asset's daily close history, sorted ascending and unique by date.
///
/// Built once per run from collaborator-supplied rows; immutable thereafter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceSeries {
    days: Vec<DailyClose>,
}

impl PriceSeries {
    /// Builds a series from close rows.
    ///
    /// Rows with a non-finite close are dropped, the remainder is sorted by
    /// date, and duplicate dates are collapsed to their first occurrence,
    /// with a warning when anything was discarded.
    #[must_use]
    pub fn from_closes(rows: Vec<DailyClose>) -> Self {
        let mut days = rows;
        let before = days.len();
        days.retain(|r| r.close.is_finite());
        let non_finite = before - days.len();
        if non_finite > 0 {
            warn!("Dropped {} rows with non-numeric closes", non_finite);
        }

        days.sort_by_key(|r| r.date);
        let before = days.len();
        days.dedup_by_key(|r| r.date);
        if days.len() < before {
            warn!("Removed {} duplicate price dates", before - days.len());
        }

        Self { days }
    }

    /// Number of trading days in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns true if the series holds no trading days.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Earliest trading day in the series.
    #[must_use]
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|r| r.date)
    }

    /// Latest trading day in the series.
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|r| r.date)
    }

    /// Returns an iterator over the close rows in date order.
    pub fn iter(&self) -> impl Iterator<Item = &DailyClose> {
        self.days.iter()
    }

    /// Returns true if `date` is a known trading day.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.binary_search_by_key(&date, |r| r.date).is_ok()
    }

    /// Closing price on `date`, if it is a known trading day.
    #[must_use]
    pub fn close(&self, date: NaiveDate) -> Option<f64> {
        self.days
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|i| self.days[i].close)
    }

    /// Resolves `date` to the first trading day on or after it.
    ///
    /// Returns `date` itself when it is a known trading day, the first later
    /// known day when it falls in a gap (weekend, holiday), and `None` when
    /// it lies beyond the last known trading day, meaning the event cannot
    /// be priced yet.
    #[must_use]
    pub fn next_trading_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        let idx = self.days.partition_point(|r| r.date < date);
        self.days.get(idx).map(|r| r.date)
    }

    /// Last known trading day strictly before `date`.
    #[must_use]
    pub fn prev_trading_day(&self, date: NaiveDate) -> Option<NaiveDate> {
        let idx = self.days.partition_point(|r| r.date < date);
        idx.checked_sub(1).map(|i| self.days[i].date)
    }

    /// Index of the first session on or after `date`, for return lookups.
    pub(crate) fn session_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.days.partition_point(|r| r.date < date);
        (idx < self.days.len()).then_some(idx)
    }

    /// Close rows in date order.
    pub(crate) fn sessions(&self) -> &[DailyClose] {
        &self.days
    }
}

impl FromIterator<DailyClose> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = DailyClose>>(iter: I) -> Self {
        Self::from_closes(iter.into_iter().collect())
    }
}

/// Parses a release-date string into a calendar date.
///
/// A trailing parenthetical reference annotation (`"Aug 12, 2025  (Jul)"`)
/// is stripped before parsing. Date-only, naive-datetime, offset-datetime
/// and RFC 3339 inputs are all accepted; any time-of-day is discarded.
/// Returns `None` when no format matches.
#[must_use]
pub fn parse_release_date(text: &str) -> Option<NaiveDate> {
    let cleaned = strip_annotation(text);
    if cleaned.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(cleaned, fmt) {
            return Some(d);
        }
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_str(cleaned, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.date_naive());
    }

    None
}

/// Strips a trailing parenthetical annotation and surrounding whitespace.
fn strip_annotation(text: &str) -> &str {
    match text.find('(') {
        Some(i) => text[..i].trim(),
        None => text.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series() -> PriceSeries {
        // Tue Jan 2 .. Fri Jan 5, then Mon Jan 8 (weekend gap).
        PriceSeries::from_closes(vec![
            DailyClose::new(date(2024, 1, 2), 100.0),
            DailyClose::new(date(2024, 1, 3), 101.0),
            DailyClose::new(date(2024, 1, 4), 99.0),
            DailyClose::new(date(2024, 1, 5), 102.0),
            DailyClose::new(date(2024, 1, 8), 103.0),
        ])
    }

    #[test]
    fn test_member_date_resolves_to_itself() {
        let s = series();
        for day in s.iter() {
            assert_eq!(s.next_trading_day(day.date), Some(day.date));
        }
    }

    #[test]
    fn test_gap_resolves_to_next_member() {
        let s = series();
        // Saturday and Sunday both resolve to Monday.
        assert_eq!(s.next_trading_day(date(2024, 1, 6)), Some(date(2024, 1, 8)));
        assert_eq!(s.next_trading_day(date(2024, 1, 7)), Some(date(2024, 1, 8)));
    }

    #[test]
    fn test_beyond_history_is_absent() {
        let s = series();
        assert_eq!(s.next_trading_day(date(2024, 1, 9)), None);
        assert_eq!(s.next_trading_day(date(2025, 1, 1)), None);
    }

    #[test]
    fn test_before_history_resolves_to_first() {
        let s = series();
        assert_eq!(
            s.next_trading_day(date(2023, 12, 25)),
            Some(date(2024, 1, 2))
        );
    }

    #[test]
    fn test_prev_trading_day() {
        let s = series();
        assert_eq!(s.prev_trading_day(date(2024, 1, 3)), Some(date(2024, 1, 2)));
        assert_eq!(s.prev_trading_day(date(2024, 1, 8)), Some(date(2024, 1, 5)));
        assert_eq!(s.prev_trading_day(date(2024, 1, 2)), None);
    }

    #[test]
    fn test_construction_sorts_and_dedups() {
        let s = PriceSeries::from_closes(vec![
            DailyClose::new(date(2024, 1, 3), 101.0),
            DailyClose::new(date(2024, 1, 2), 100.0),
            DailyClose::new(date(2024, 1, 3), 999.0),
            DailyClose::new(date(2024, 1, 4), f64::NAN),
        ]);
        assert_eq!(s.len(), 2);
        assert_eq!(s.first_date(), Some(date(2024, 1, 2)));
        assert_eq!(s.close(date(2024, 1, 3)), Some(101.0));
    }

    #[test]
    fn test_empty_series() {
        let s = PriceSeries::default();
        assert!(s.is_empty());
        assert_eq!(s.next_trading_day(date(2024, 1, 2)), None);
        assert_eq!(s.last_date(), None);
    }

    #[test]
    fn test_parse_release_date_formats() {
        let expected = Some(date(2025, 8, 12));
        assert_eq!(parse_release_date("Aug 12, 2025"), expected);
        assert_eq!(parse_release_date("Aug 12, 2025  (Jul)"), expected);
        assert_eq!(parse_release_date("August 12, 2025"), expected);
        assert_eq!(parse_release_date("2025-08-12"), expected);
        assert_eq!(parse_release_date("08/12/2025"), expected);
        assert_eq!(parse_release_date("2025-08-12 08:30:00"), expected);
        assert_eq!(parse_release_date("2025-08-12 08:30:00-04:00"), expected);
    }

    #[test]
    fn test_parse_release_date_rejects_junk() {
        assert_eq!(parse_release_date(""), None);
        assert_eq!(parse_release_date("(Jul)"), None);
        assert_eq!(parse_release_date("TBD"), None);
    }
}
