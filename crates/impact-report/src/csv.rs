//! Typed-row CSV boundary.
//!
//! Readers skip individual bad rows with a diagnostic and continue; a
//! missing required column is a structural contract violation and fails the
//! whole batch with [`ImpactError::MissingColumn`].

use std::io;

use impact_core::{
    BucketStats, DailyClose, EconomicEvent, EnrichedEvent, EventType, ImpactError, ReleaseRow,
    Result, RevisionBucket, SignBucketRow, parse_release_date,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Serialized close row.
#[derive(Debug, Serialize, Deserialize)]
struct CloseRecord {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Close")]
    close: String,
}

/// Reads a daily close series from CSV.
///
/// The input must carry `date` and `close` columns (capitalized variants
/// accepted); their absence is fatal for the batch. Rows whose date or close
/// does not parse are skipped with a warning.
pub fn read_closes(reader: impl io::Read) -> Result<Vec<DailyClose>> {
    let mut csv_reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .from_reader(reader);

    require_columns(&mut csv_reader, &["date", "close"])?;

    let mut closes = Vec::new();
    let mut skipped = 0usize;

    for (row_num, result) in csv_reader.deserialize::<CloseRecord>().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping close row {}: {}", row_num + 1, e);
                skipped += 1;
                continue;
            }
        };

        let Some(date) = parse_release_date(&record.date) else {
            warn!(
                "Skipping close row {} with unparseable date '{}'",
                row_num + 1,
                record.date
            );
            skipped += 1;
            continue;
        };
        let Ok(close) = record.close.parse::<f64>() else {
            warn!(
                "Skipping close row {} with non-numeric close '{}'",
                row_num + 1,
                record.close
            );
            skipped += 1;
            continue;
        };

        closes.push(DailyClose::new(date, close));
    }

    if skipped > 0 {
        warn!("Skipped {} invalid close rows", skipped);
    }

    Ok(closes)
}

/// Writes a daily close series as CSV.
pub fn write_closes(writer: impl io::Write, closes: &[DailyClose]) -> Result<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    for row in closes {
        csv_writer
            .serialize(CloseRecord {
                date: row.date.to_string(),
                close: row.close.to_string(),
            })
            .map_err(|e| ImpactError::Other(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| ImpactError::Other(e.to_string()))?;
    Ok(())
}

/// Serialized event row, as consumed and produced by this boundary.
#[derive(Debug, Serialize, Deserialize)]
struct EventRecord {
    release_date: String,
    event_type: String,
    #[serde(default)]
    reference_period: Option<String>,
    #[serde(default)]
    headline_value: Option<String>,
    #[serde(default)]
    forecast_value: Option<String>,
    #[serde(default)]
    surprise: Option<String>,
    #[serde(default)]
    change_from_previous: Option<String>,
    #[serde(default)]
    revision_value: Option<String>,
    #[serde(default)]
    revision_change: Option<String>,
    #[serde(default)]
    commentary: Option<String>,
}

/// Reads summarized events from CSV.
///
/// `release_date` and `event_type` columns are required; their absence is
/// fatal. Rows with an unknown event type are skipped with a warning.
pub fn read_events(reader: impl io::Read) -> Result<Vec<EconomicEvent>> {
    let mut csv_reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .from_reader(reader);

    require_columns(&mut csv_reader, &["release_date", "event_type"])?;

    let mut events = Vec::new();
    let mut skipped = 0usize;

    for (row_num, result) in csv_reader.deserialize::<EventRecord>().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping event row {}: {}", row_num + 1, e);
                skipped += 1;
                continue;
            }
        };

        let Ok(event_type) = record.event_type.parse::<EventType>() else {
            warn!(
                "Skipping event row {} with unknown event type '{}'",
                row_num + 1,
                record.event_type
            );
            skipped += 1;
            continue;
        };

        events.push(EconomicEvent {
            event_type,
            release_date: record.release_date,
            reference_period: record.reference_period,
            headline_value: record.headline_value,
            forecast_value: record.forecast_value,
            surprise: record.surprise,
            change_from_previous: record.change_from_previous,
            revision_value: record.revision_value,
            revision_change: record.revision_change,
            commentary: record.commentary,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} invalid event rows", skipped);
    }

    Ok(events)
}

/// Writes summarized events as CSV.
pub fn write_events(writer: impl io::Write, events: &[EconomicEvent]) -> Result<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    for event in events {
        csv_writer
            .serialize(EventRecord {
                release_date: event.release_date.clone(),
                event_type: event.event_type.to_string(),
                reference_period: event.reference_period.clone(),
                headline_value: event.headline_value.clone(),
                forecast_value: event.forecast_value.clone(),
                surprise: event.surprise.clone(),
                change_from_previous: event.change_from_previous.clone(),
                revision_value: event.revision_value.clone(),
                revision_change: event.revision_change.clone(),
                commentary: event.commentary.clone(),
            })
            .map_err(|e| ImpactError::Other(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| ImpactError::Other(e.to_string()))?;
    Ok(())
}

/// Serialized enriched event row.
#[derive(Debug, Serialize)]
struct EnrichedRecord {
    release_date: String,
    event_type: String,
    reference_period: Option<String>,
    headline_value: Option<String>,
    forecast_value: Option<String>,
    surprise: Option<String>,
    revision_change: Option<String>,
    trading_day: String,
    next_trading_day: Option<String>,
    same_day_return: Option<f64>,
    next_day_return: Option<f64>,
    commentary: Option<String>,
}

/// Writes enriched events (one row per survived event) as CSV.
pub fn write_enriched(writer: impl io::Write, events: &[EnrichedEvent]) -> Result<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    for e in events {
        csv_writer
            .serialize(EnrichedRecord {
                release_date: e.release_date.to_string(),
                event_type: e.event_type().to_string(),
                reference_period: e.event.reference_period.clone(),
                headline_value: e.event.headline_value.clone(),
                forecast_value: e.event.forecast_value.clone(),
                surprise: e.event.surprise.clone(),
                revision_change: e.event.revision_change.clone(),
                trading_day: e.trading_day.to_string(),
                next_trading_day: e.next_trading_day.map(|d| d.to_string()),
                same_day_return: e.same_day_return,
                next_day_return: e.next_day_return,
                commentary: e.event.commentary.clone(),
            })
            .map_err(|e| ImpactError::Other(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| ImpactError::Other(e.to_string()))?;
    Ok(())
}

/// Serialized sign-bucket table row.
#[derive(Debug, Serialize)]
struct SignTableRecord {
    event_type: String,
    n_pos: usize,
    mean_same_pos: Option<f64>,
    mean_next_pos: Option<f64>,
    n_neg: usize,
    mean_same_neg: Option<f64>,
    mean_next_neg: Option<f64>,
    diff_same_pos_minus_neg: Option<f64>,
    diff_next_pos_minus_neg: Option<f64>,
}

/// Writes the sign-bucketed surprise table as CSV.
pub fn write_sign_table(
    writer: impl io::Write,
    table: &BTreeMap<EventType, SignBucketRow>,
) -> Result<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    for (event_type, row) in table {
        csv_writer
            .serialize(SignTableRecord {
                event_type: event_type.to_string(),
                n_pos: row.n_pos,
                mean_same_pos: row.mean_same_pos,
                mean_next_pos: row.mean_next_pos,
                n_neg: row.n_neg,
                mean_same_neg: row.mean_same_neg,
                mean_next_neg: row.mean_next_neg,
                diff_same_pos_minus_neg: row.diff_same_pos_minus_neg,
                diff_next_pos_minus_neg: row.diff_next_pos_minus_neg,
            })
            .map_err(|e| ImpactError::Other(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| ImpactError::Other(e.to_string()))?;
    Ok(())
}

/// Serialized bucket-statistics table row.
#[derive(Debug, Serialize)]
struct BucketStatsRecord {
    bucket: String,
    n: usize,
    mean_same: Option<f64>,
    mean_next: Option<f64>,
    median_same: Option<f64>,
    median_next: Option<f64>,
    pct_pos_same: Option<f64>,
    pct_pos_next: Option<f64>,
}

fn write_bucket_stats<'a, K: ToString>(
    writer: impl io::Write,
    rows: impl Iterator<Item = (K, &'a BucketStats)>,
) -> Result<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    for (bucket, stats) in rows {
        csv_writer
            .serialize(BucketStatsRecord {
                bucket: bucket.to_string(),
                n: stats.n,
                mean_same: stats.mean_same,
                mean_next: stats.mean_next,
                median_same: stats.median_same,
                median_next: stats.median_next,
                pct_pos_same: stats.pct_pos_same,
                pct_pos_next: stats.pct_pos_next,
            })
            .map_err(|e| ImpactError::Other(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| ImpactError::Other(e.to_string()))?;
    Ok(())
}

/// Writes a revision-bucket table as CSV.
pub fn write_revision_table(
    writer: impl io::Write,
    table: &BTreeMap<RevisionBucket, BucketStats>,
) -> Result<()> {
    write_bucket_stats(writer, table.iter().map(|(k, v)| (*k, v)))
}

/// Writes the overall per-category summary table as CSV.
pub fn write_summary_table(
    writer: impl io::Write,
    table: &BTreeMap<EventType, BucketStats>,
) -> Result<()> {
    write_bucket_stats(writer, table.iter().map(|(k, v)| (*k, v)))
}

/// Serialized raw release row, for persisting scraped histories.
#[derive(Debug, Serialize, Deserialize)]
struct ReleaseRecord {
    release_date: String,
    #[serde(default)]
    reference_period: String,
    actual: String,
    #[serde(default)]
    forecast: String,
    #[serde(default)]
    previous: String,
}

/// Reads scraped release rows from CSV.
///
/// `release_date` and `actual` columns are required; their absence is fatal.
pub fn read_releases(reader: impl io::Read) -> Result<Vec<ReleaseRow>> {
    let mut csv_reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .from_reader(reader);

    require_columns(&mut csv_reader, &["release_date", "actual"])?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for (row_num, result) in csv_reader.deserialize::<ReleaseRecord>().enumerate() {
        match result {
            Ok(r) => rows.push(ReleaseRow::new(
                r.release_date,
                r.reference_period,
                r.actual,
                r.forecast,
                r.previous,
            )),
            Err(e) => {
                warn!("Skipping release row {}: {}", row_num + 1, e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!("Skipped {} invalid release rows", skipped);
    }

    Ok(rows)
}

/// Writes scraped release rows as CSV.
pub fn write_releases(writer: impl io::Write, rows: &[ReleaseRow]) -> Result<()> {
    let mut csv_writer = ::csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(ReleaseRecord {
                release_date: row.release_date.clone(),
                reference_period: row.reference_period.clone(),
                actual: row.actual.clone(),
                forecast: row.forecast.clone(),
                previous: row.previous.clone(),
            })
            .map_err(|e| ImpactError::Other(e.to_string()))?;
    }
    csv_writer
        .flush()
        .map_err(|e| ImpactError::Other(e.to_string()))?;
    Ok(())
}

/// Fails with [`ImpactError::MissingColumn`] unless every required column is
/// present (case-insensitively) in the header row.
fn require_columns<R: io::Read>(
    reader: &mut ::csv::Reader<R>,
    required: &[&str],
) -> Result<()> {
    let headers = reader
        .headers()
        .map_err(|e| ImpactError::Parse(e.to_string()))?;

    for column in required {
        let found = headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case(column));
        if !found {
            return Err(ImpactError::MissingColumn((*column).to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use impact_core::{PriceSeries, attach_returns};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_read_closes_round_trip() {
        let input = "date,close\n2024-01-02,480.5\n2024-01-03,482.1\n";
        let closes = read_closes(input.as_bytes()).unwrap();
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].date, date(2024, 1, 2));

        let mut out = Vec::new();
        write_closes(&mut out, &closes).unwrap();
        let again = read_closes(out.as_slice()).unwrap();
        assert_eq!(again, closes);
    }

    #[test]
    fn test_read_closes_accepts_capitalized_headers() {
        let input = "Date,Close\n2024-01-02,480.5\n";
        let closes = read_closes(input.as_bytes()).unwrap();
        assert_eq!(closes.len(), 1);
    }

    #[test]
    fn test_read_closes_missing_column_is_fatal() {
        let input = "date,open\n2024-01-02,480.5\n";
        let result = read_closes(input.as_bytes());
        assert!(matches!(result, Err(ImpactError::MissingColumn(c)) if c == "close"));
    }

    #[test]
    fn test_read_closes_skips_bad_rows() {
        let input = "date,close\nnot-a-date,480.5\n2024-01-03,abc\n2024-01-04,479.8\n";
        let closes = read_closes(input.as_bytes()).unwrap();
        assert_eq!(closes.len(), 1);
        assert_eq!(closes[0].date, date(2024, 1, 4));
    }

    #[test]
    fn test_events_round_trip() {
        let events = vec![
            impact_core::EconomicEvent::new(EventType::Cpi, "2024-01-03")
                .with_reference_period("Dec")
                .with_values("2.7%", "2.8%")
                .with_surprise("-0.1pp"),
            impact_core::EconomicEvent::new(EventType::Jobs, "2024-01-05")
                .with_surprise("-37K")
                .with_revision("14K", "-133K"),
        ];

        let mut out = Vec::new();
        write_events(&mut out, &events).unwrap();
        let again = read_events(out.as_slice()).unwrap();
        assert_eq!(again, events);
    }

    #[test]
    fn test_read_events_missing_event_type_is_fatal() {
        let input = "release_date,surprise\n2024-01-03,-0.1pp\n";
        let result = read_events(input.as_bytes());
        assert!(matches!(result, Err(ImpactError::MissingColumn(c)) if c == "event_type"));
    }

    #[test]
    fn test_read_events_skips_unknown_category() {
        let input = "release_date,event_type\n2024-01-03,cpi\n2024-01-04,gdp\n";
        let events = read_events(input.as_bytes()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, EventType::Cpi);
    }

    #[test]
    fn test_write_enriched_headers_and_blanks() {
        let prices = PriceSeries::from_closes(vec![
            DailyClose::new(date(2024, 1, 2), 100.0),
            DailyClose::new(date(2024, 1, 3), 101.0),
        ]);
        let events =
            [impact_core::EconomicEvent::new(EventType::Cpi, "2024-01-02").with_surprise("-0.1pp")];
        let attached = attach_returns(&events, &prices);

        let mut out = Vec::new();
        write_enriched(&mut out, &attached.events).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "release_date,event_type,reference_period,headline_value,forecast_value,surprise,\
             revision_change,trading_day,next_trading_day,same_day_return,next_day_return,\
             commentary"
        );
        // First session: same-day return is blank, not zero.
        let row = lines.next().unwrap();
        assert!(row.starts_with("2024-01-02,cpi,,,,-0.1pp,,2024-01-02,2024-01-03,,0.01"));
    }

    #[test]
    fn test_release_rows_round_trip() {
        let rows = vec![ReleaseRow::new(
            "Aug 1, 2025  (Jul)",
            "Jul",
            "73K",
            "110K",
            "14K",
        )];
        let mut out = Vec::new();
        write_releases(&mut out, &rows).unwrap();
        let again = read_releases(out.as_slice()).unwrap();
        assert_eq!(again, rows);
    }

    #[test]
    fn test_write_summary_table() {
        let mut table = BTreeMap::new();
        table.insert(
            EventType::Cpi,
            BucketStats {
                n: 3,
                mean_same: Some(0.01),
                ..Default::default()
            },
        );
        let mut out = Vec::new();
        write_summary_table(&mut out, &table).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(
            "bucket,n,mean_same,mean_next,median_same,median_next,pct_pos_same,pct_pos_next"
        ));
        assert!(text.contains("cpi,3,0.01,,,,,"));
    }
}
