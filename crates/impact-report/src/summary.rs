//! Pairwise release summarization.
//!
//! Each summary compares one release against the prior one: the surprise is
//! computed against the published forecast, the change against the prior
//! period's actual, and for payrolls the revision against the prior period's
//! originally reported value. Numeric results are carried as formatted
//! strings in the unit of the category (`pp`, `K`, `%`) alongside a
//! human-readable commentary line.

use impact_core::{EconomicEvent, EventType, ReleaseRow};
use tracing::debug;

/// One summarized release, ready to become an [`EconomicEvent`].
///
/// String fields use `"N/A"` for values that could not be derived, matching
/// the textual output boundary; the conversion to [`EconomicEvent`] turns
/// those markers into absent fields.
#[derive(Clone, Debug, PartialEq)]
pub struct IndicatorSummary {
    /// Release category.
    pub event_type: EventType,
    /// Release date text of the latest row.
    pub release_date: String,
    /// The period the latest value describes.
    pub reference_period: String,
    /// Reported headline value.
    pub headline: String,
    /// Prior-period actual value.
    pub previous: String,
    /// Forecast (consensus) value.
    pub forecast: String,
    /// Headline minus forecast, formatted with its unit.
    pub surprise: String,
    /// Headline change versus the prior period.
    pub change_from_previous: String,
    /// Restated prior-period value, for categories that revise.
    pub revision_value: String,
    /// Delta between original and restated prior value.
    pub revision_change: String,
    /// Human-readable commentary.
    pub commentary: String,
}

impl IndicatorSummary {
    /// Converts the summary into an [`EconomicEvent`], mapping `"N/A"` and
    /// blank markers to absent fields.
    #[must_use]
    pub fn into_event(self) -> EconomicEvent {
        let mut event = EconomicEvent::new(self.event_type, self.release_date);
        event.reference_period = present(self.reference_period);
        event.headline_value = present(self.headline);
        event.forecast_value = present(self.forecast);
        event.surprise = present(self.surprise);
        event.change_from_previous = present(self.change_from_previous);
        event.revision_value = present(self.revision_value);
        event.revision_change = present(self.revision_change);
        event.commentary = present(self.commentary);
        event
    }
}

fn present(value: String) -> Option<String> {
    if value.is_empty() || value.eq_ignore_ascii_case("n/a") {
        None
    } else {
        Some(value)
    }
}

/// Convert `"2.7%"` to `2.7`; blank or non-numeric to `None`.
fn parse_percent(value: &str) -> Option<f64> {
    let cleaned = value.replace('%', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Convert `"73K"` to `73`; blank or non-numeric to `None`.
fn parse_thousands(value: &str) -> Option<i64> {
    let cleaned = value
        .to_uppercase()
        .replace('K', "")
        .replace(',', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().map(|v| v as i64)
}

fn na() -> String {
    "N/A".to_string()
}

/// Summarizes the latest CPI release against the prior one.
///
/// Lower-than-expected CPI reads as a positive surprise for markets.
#[must_use]
pub fn summarize_cpi(latest: &ReleaseRow, previous: &ReleaseRow) -> IndicatorSummary {
    let actual = parse_percent(&latest.actual);
    let consensus = parse_percent(latest.consensus());
    let previous_actual = parse_percent(&previous.actual);

    let surprise = actual.zip(consensus).map(|(a, c)| a - c);
    let change = actual.zip(previous_actual).map(|(a, p)| a - p);

    let direction = match actual.zip(previous_actual) {
        Some((a, p)) if a > p => "Headline CPI rose",
        Some((a, p)) if a < p => "Headline CPI declined",
        Some(_) => "Headline CPI remained flat",
        None => "Headline CPI update unavailable",
    };

    let surprise_comment = match surprise {
        Some(s) if s < 0.0 => {
            format!(" This was a positive surprise for markets ({s:+.1}pp vs forecast).")
        }
        Some(s) if s > 0.0 => {
            format!(" This was a negative surprise for markets ({s:+.1}pp vs forecast).")
        }
        Some(_) => " CPI was exactly in line with expectations.".to_string(),
        None => String::new(),
    };

    let commentary = format!(
        "{direction} to {} (vs {} last month).{surprise_comment}",
        or_na(&latest.actual),
        or_na(&previous.actual)
    );

    IndicatorSummary {
        event_type: EventType::Cpi,
        release_date: latest.release_date.clone(),
        reference_period: latest.reference_period.clone(),
        headline: latest.actual.clone(),
        previous: previous.actual.clone(),
        forecast: latest.forecast.clone(),
        surprise: surprise.map_or_else(na, |s| format!("{s:+.1}pp")),
        change_from_previous: change.map_or_else(na, |c| format!("{c:+.1}pp")),
        revision_value: na(),
        revision_change: na(),
        commentary,
    }
}

/// Summarizes the latest payrolls release against the prior one.
///
/// The revision compares the prior value republished in the latest row with
/// the prior period's originally reported actual.
#[must_use]
pub fn summarize_jobs(latest: &ReleaseRow, previous: &ReleaseRow) -> IndicatorSummary {
    let actual = parse_thousands(&latest.actual);
    let consensus = parse_thousands(latest.consensus());
    let prev_actual = parse_thousands(&previous.actual);
    let revised = parse_thousands(&latest.previous);

    let surprise = actual.zip(consensus).map(|(a, c)| a - c);
    let revision_change = revised.zip(prev_actual).map(|(r, p)| r - p);

    let revision_comment = match revision_change {
        Some(r) if r < -100 => format!(
            "{} was sharply revised down by {}K.",
            previous.reference_period,
            r.abs()
        ),
        Some(r) if r < 0 => format!(
            "{} was revised down by {}K.",
            previous.reference_period,
            r.abs()
        ),
        Some(r) if r > 0 => {
            format!("{} was revised up by {r}K.", previous.reference_period)
        }
        Some(_) => format!("{} was unchanged.", previous.reference_period),
        None => String::new(),
    };

    let mut commentary = format!(
        "{} jobs report showed {} vs {} expected.",
        latest.reference_period,
        or_na(&latest.actual),
        or_na(latest.consensus())
    );
    match surprise {
        Some(s) if s < -50 => commentary.push_str(" Significant downside surprise."),
        Some(s) if s < 0 => commentary.push_str(" Slight downside miss."),
        Some(s) if s > 50 => commentary.push_str(" Big upside surprise."),
        Some(s) if s > 0 => commentary.push_str(" Slight upside beat."),
        _ => {}
    }
    if !revision_comment.is_empty() {
        commentary.push(' ');
        commentary.push_str(&revision_comment);
    }

    IndicatorSummary {
        event_type: EventType::Jobs,
        release_date: latest.release_date.clone(),
        reference_period: latest.reference_period.clone(),
        headline: latest.actual.clone(),
        previous: previous.actual.clone(),
        forecast: latest.forecast.clone(),
        surprise: surprise.map_or_else(na, |s| format!("{s}K")),
        change_from_previous: String::new(),
        revision_value: latest.previous.clone(),
        revision_change: revision_change.map_or_else(na, |r| format!("{r}K")),
        commentary,
    }
}

/// Summarizes the latest unemployment-rate release against the prior one.
///
/// Lower-than-forecast unemployment reads as risk-on.
#[must_use]
pub fn summarize_unemployment(latest: &ReleaseRow, previous: &ReleaseRow) -> IndicatorSummary {
    let actual = parse_percent(&latest.actual);
    let forecast = parse_percent(&latest.forecast);
    let prev_actual = parse_percent(&previous.actual);

    let change = actual.zip(prev_actual).map(|(a, p)| a - p);
    let surprise = actual.zip(forecast).map(|(a, f)| a - f);

    let direction = match actual.zip(prev_actual) {
        Some((a, p)) if a > p => "Unemployment ticked up",
        Some((a, p)) if a < p => "Unemployment ticked down",
        Some(_) => "Unemployment was unchanged",
        None => "Unemployment update unavailable",
    };

    let surprise_phrase = surprise.map(|s| {
        if s < 0.0 {
            format!("positive surprise ({s:+.1}pp vs forecast)")
        } else if s > 0.0 {
            format!("negative surprise ({s:+.1}pp vs forecast)")
        } else {
            "in line with expectations".to_string()
        }
    });

    let mut commentary = format!(
        "{direction} to {} (vs {} last month).",
        or_na(&latest.actual),
        or_na(&previous.actual)
    );
    if let Some(phrase) = &surprise_phrase {
        commentary.push_str(&format!(
            " Market expected {}, {phrase}.",
            or_na(&latest.forecast)
        ));
    }

    IndicatorSummary {
        event_type: EventType::Unemployment,
        release_date: latest.release_date.clone(),
        reference_period: latest.reference_period.clone(),
        headline: latest.actual.clone(),
        previous: previous.actual.clone(),
        forecast: latest.forecast.clone(),
        surprise: surprise.map_or_else(na, |s| format!("{s:+.1}%")),
        change_from_previous: change.map_or_else(na, |c| format!("{c:+.1}%")),
        revision_value: na(),
        revision_change: na(),
        commentary,
    }
}

/// Summarizes the latest Fed rate decision against the prior one.
///
/// The prior policy rate prefers the previous decision's actual and falls
/// back to the `previous` column republished in the latest row.
#[must_use]
pub fn summarize_fed(latest: &ReleaseRow, previous: &ReleaseRow) -> IndicatorSummary {
    let actual = parse_percent(&latest.actual);
    let forecast = parse_percent(&latest.forecast);
    let prev_actual = parse_percent(&previous.actual).or_else(|| parse_percent(&latest.previous));

    let change = actual.zip(prev_actual).map(|(a, p)| a - p);
    let surprise = actual.zip(forecast).map(|(a, f)| a - f);

    let direction = match actual.zip(prev_actual) {
        Some((a, p)) if a > p => "The Federal Reserve raised rates",
        Some((a, p)) if a < p => "The Federal Reserve cut rates",
        Some(_) => "The Federal Reserve held rates steady",
        None => "Fed decision update unavailable",
    };

    let surprise_phrase = surprise.map(|s| {
        if s < 0.0 {
            format!("dovish surprise ({s:+.2}pp vs forecast)")
        } else if s > 0.0 {
            format!("hawkish surprise ({s:+.2}pp vs forecast)")
        } else {
            "in line with expectations".to_string()
        }
    });

    let previous_rate_text = prev_actual.map_or_else(
        || {
            if latest.previous.is_empty() {
                na()
            } else {
                latest.previous.clone()
            }
        },
        |p| format!("{p:.2}%"),
    );

    let mut commentary = format!(
        "{direction} to {} (vs {previous_rate_text} previously).",
        or_na(&latest.actual)
    );
    if forecast.is_some() {
        if let Some(phrase) = &surprise_phrase {
            commentary.push_str(&format!(
                " Market expected {}, {phrase}.",
                or_na(&latest.forecast)
            ));
        }
    }

    IndicatorSummary {
        event_type: EventType::Fed,
        release_date: latest.release_date.clone(),
        reference_period: latest.reference_period.clone(),
        headline: latest.actual.clone(),
        previous: previous_rate_text,
        forecast: latest.forecast.clone(),
        surprise: surprise.map_or_else(na, |s| format!("{s:+.2}%")),
        change_from_previous: change.map_or_else(na, |c| format!("{c:+.2}%")),
        revision_value: na(),
        revision_change: na(),
        commentary,
    }
}

fn or_na(value: &str) -> &str {
    if value.is_empty() { "N/A" } else { value }
}

/// Summarizes one (latest, previous) release pair for a category.
#[must_use]
pub fn summarize(
    event_type: EventType,
    latest: &ReleaseRow,
    previous: &ReleaseRow,
) -> IndicatorSummary {
    match event_type {
        EventType::Cpi => summarize_cpi(latest, previous),
        EventType::Jobs => summarize_jobs(latest, previous),
        EventType::Unemployment => summarize_unemployment(latest, previous),
        EventType::Fed => summarize_fed(latest, previous),
    }
}

/// Builds summaries over `(current, previous)` windows of a release history.
///
/// Rows are expected newest first, matching source table order; rows without
/// a reported actual value are ignored. With fewer than two usable rows the
/// output is empty.
#[must_use]
pub fn pairwise_summaries(event_type: EventType, rows: &[ReleaseRow]) -> Vec<IndicatorSummary> {
    let usable: Vec<&ReleaseRow> = rows.iter().filter(|r| r.has_actual()).collect();
    if usable.len() < 2 {
        debug!(%event_type, "Not enough rows to summarize");
        return Vec::new();
    }

    usable
        .windows(2)
        .map(|pair| summarize(event_type, pair[0], pair[1]))
        .collect()
}
