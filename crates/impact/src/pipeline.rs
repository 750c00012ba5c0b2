//! The batch event-study pipeline.
//!
//! Loads nothing itself: given summarized events and a close series, builds
//! the price calendar, attaches returns, and reduces the enriched batch to
//! the aggregate tables. Single-threaded and synchronous once the data is in
//! memory; the async wrapper only orchestrates source fetches.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::info;

use impact_core::{
    BucketStats, DailyClose, EconomicEvent, EnrichedEvent, EventObservation, EventType,
    PriceSeries, Result, RevisionBucket, SignBucketRow, Symbol, attach_returns, observations,
    overall_summary, revision_bucket_table, surprise_sign_table, top_n_by_abs,
};
use impact_report::pairwise_summaries;

use crate::registry::SourceRegistry;

/// Number of rows in the top-revisions ranking.
pub const TOP_REVISIONS: usize = 10;

/// One row of the top-revisions ranking: the event's formatted fields plus
/// its winsorized returns.
#[derive(Clone, Debug, PartialEq)]
pub struct TopRevision {
    /// Parsed release date.
    pub release_date: NaiveDate,
    /// The period the release describes.
    pub reference_period: Option<String>,
    /// Formatted revision delta, e.g. `"-133K"`.
    pub revision_change: Option<String>,
    /// Formatted surprise.
    pub surprise: Option<String>,
    /// Winsorized same-day return.
    pub same_day_return: Option<f64>,
    /// Winsorized next-day return.
    pub next_day_return: Option<f64>,
    /// Release commentary.
    pub commentary: Option<String>,
}

/// Everything one batch run produces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventStudyReport {
    /// Enriched per-event rows, sorted by release date then category.
    pub enriched: Vec<EnrichedEvent>,
    /// Events dropped for an unparseable release date.
    pub skipped_unparseable: usize,
    /// Events dropped for falling beyond the known price history.
    pub skipped_unpriced: usize,
    /// Winsorized numeric observations backing the tables.
    pub observations: Vec<EventObservation>,
    /// Sign-bucketed surprise table per category.
    pub surprise_sign: BTreeMap<EventType, SignBucketRow>,
    /// Revision-size buckets for the payrolls category.
    pub jobs_revision_buckets: BTreeMap<RevisionBucket, BucketStats>,
    /// Overall per-category summary over winsorized returns.
    pub overall: BTreeMap<EventType, BucketStats>,
    /// Largest absolute payrolls revisions with their returns.
    pub top_revisions: Vec<TopRevision>,
}

/// Runs the full event study over summarized events and a close series.
///
/// The five outputs of the aggregation stage are computed over the same
/// winsorized observation set, so the report is internally consistent and,
/// because attribution sorts its output, identical for any permutation of
/// the input events.
#[must_use]
pub fn event_study(events: &[EconomicEvent], closes: Vec<DailyClose>) -> EventStudyReport {
    let prices = PriceSeries::from_closes(closes);
    let attached = attach_returns(events, &prices);
    let obs = observations(&attached.events);

    info!(
        events = events.len(),
        enriched = attached.events.len(),
        sessions = prices.len(),
        "Running event study"
    );

    let surprise_sign = surprise_sign_table(&obs);
    let jobs_revision_buckets = revision_bucket_table(&obs, EventType::Jobs);
    let overall = overall_summary(&obs);
    let top_revisions = rank_top_revisions(&attached.events, &obs);

    EventStudyReport {
        enriched: attached.events,
        skipped_unparseable: attached.skipped_unparseable,
        skipped_unpriced: attached.skipped_unpriced,
        observations: obs,
        surprise_sign,
        jobs_revision_buckets,
        overall,
        top_revisions,
    }
}

/// Ranks payrolls events by absolute revision size.
///
/// Enriched events and their observations are index-aligned, so the two can
/// be zipped to pair each event's formatted fields with its winsorized
/// returns.
fn rank_top_revisions(
    enriched: &[EnrichedEvent],
    obs: &[EventObservation],
) -> Vec<TopRevision> {
    let candidates: Vec<(&EnrichedEvent, &EventObservation)> = enriched
        .iter()
        .zip(obs.iter())
        .filter(|(_, o)| {
            o.event_type == EventType::Jobs
                && o.revision_change.is_some()
                && o.same_day_return.is_some()
                && o.next_day_return.is_some()
        })
        .collect();

    top_n_by_abs(&candidates, TOP_REVISIONS, |(_, o)| o.revision_change)
        .into_iter()
        .map(|(e, o)| TopRevision {
            release_date: e.release_date,
            reference_period: e.event.reference_period.clone(),
            revision_change: e.event.revision_change.clone(),
            surprise: e.event.surprise.clone(),
            same_day_return: o.same_day_return,
            next_day_return: o.next_day_return,
            commentary: e.event.commentary.clone(),
        })
        .collect()
}

/// Fetches release histories and prices through a registry, summarizes each
/// category pairwise, and runs the event study.
pub async fn fetch_and_study(
    registry: &SourceRegistry,
    symbol: &Symbol,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<EventStudyReport> {
    let mut events = Vec::new();
    for event_type in EventType::ALL {
        let rows = registry.fetch_releases(event_type).await?;
        events.extend(
            pairwise_summaries(event_type, &rows)
                .into_iter()
                .map(impact_report::IndicatorSummary::into_event),
        );
    }

    let closes = registry.fetch_closes(symbol, start, end).await?;
    Ok(event_study(&events, closes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn closes() -> Vec<DailyClose> {
        // Two trading weeks, Mon-Fri, no price on the weekend.
        let mut out = Vec::new();
        let prices = [
            (1, 100.0),
            (2, 101.0),
            (3, 99.0),
            (4, 102.0),
            (5, 103.0),
            (8, 101.0),
            (9, 104.0),
            (10, 103.0),
            (11, 105.0),
            (12, 104.0),
        ];
        for (day, close) in prices {
            out.push(DailyClose::new(date(2024, 1, day), close));
        }
        out
    }

    fn jobs_event(release_date: &str, surprise: &str, revision: &str) -> EconomicEvent {
        EconomicEvent::new(EventType::Jobs, release_date)
            .with_reference_period("Jul")
            .with_surprise(surprise)
            .with_revision("14K", revision)
    }

    fn sample_events() -> Vec<EconomicEvent> {
        vec![
            EconomicEvent::new(EventType::Cpi, "2024-01-02").with_surprise("+0.1pp"),
            EconomicEvent::new(EventType::Cpi, "2024-01-09").with_surprise("-0.2pp"),
            jobs_event("2024-01-03", "-37K", "-133K"),
            jobs_event("2024-01-10", "+25K", "+60K"),
            jobs_event("2024-01-11", "+5K", "-10K"),
            EconomicEvent::new(EventType::Fed, "2024-01-04").with_surprise("0.00%"),
            // Saturday release, resolves to Monday the 8th.
            EconomicEvent::new(EventType::Unemployment, "2024-01-06").with_surprise("+0.1%"),
            // Beyond price history: dropped.
            EconomicEvent::new(EventType::Cpi, "2024-02-01").with_surprise("+0.3pp"),
            // Unparseable date: dropped.
            EconomicEvent::new(EventType::Cpi, "pending").with_surprise("+0.3pp"),
        ]
    }

    #[test]
    fn test_event_study_end_to_end() {
        let report = event_study(&sample_events(), closes());

        assert_eq!(report.enriched.len(), 7);
        assert_eq!(report.skipped_unpriced, 1);
        assert_eq!(report.skipped_unparseable, 1);
        assert_eq!(report.observations.len(), 7);

        // Every surviving category appears in the overall summary.
        assert_eq!(report.overall.len(), 4);
        assert_eq!(report.overall[&EventType::Jobs].n, 3);

        // Jobs revisions bucket into large-down, large-up and small.
        assert_eq!(report.jobs_revision_buckets.len(), 3);
        assert_eq!(
            report.jobs_revision_buckets[&RevisionBucket::DownBig].n,
            1
        );

        // Sign table covers the categories with signed surprises.
        assert!(report.surprise_sign.contains_key(&EventType::Cpi));
        let jobs_row = &report.surprise_sign[&EventType::Jobs];
        assert_eq!(jobs_row.n_pos, 2);
        assert_eq!(jobs_row.n_neg, 1);
    }

    #[test]
    fn test_weekend_event_resolves_to_monday() {
        let report = event_study(&sample_events(), closes());
        let saturday = report
            .enriched
            .iter()
            .find(|e| e.event_type() == EventType::Unemployment)
            .unwrap();
        assert_eq!(saturday.release_date, date(2024, 1, 6));
        assert_eq!(saturday.trading_day, date(2024, 1, 8));
        // Prior close is Friday the 5th: 101 / 103 - 1.
        let same = saturday.same_day_return.unwrap();
        assert!((same - (101.0 / 103.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_report_is_order_independent() {
        let events = sample_events();
        let mut reversed = events.clone();
        reversed.reverse();

        let a = event_study(&events, closes());
        let b = event_study(&reversed, closes());
        assert_eq!(a, b);
    }

    #[test]
    fn test_top_revisions_ranked_by_absolute_size() {
        let report = event_study(&sample_events(), closes());
        let deltas: Vec<_> = report
            .top_revisions
            .iter()
            .map(|r| r.revision_change.as_deref().unwrap())
            .collect();
        assert_eq!(deltas, vec!["-133K", "+60K", "-10K"]);
        assert!(report.top_revisions[0].same_day_return.is_some());
    }

    #[test]
    fn test_top_revisions_capped() {
        let mut events = Vec::new();
        for day in 1..=12 {
            events.push(jobs_event(
                &format!("2024-01-{day:02}"),
                "+1K",
                &format!("{}K", day * 10),
            ));
        }
        let report = event_study(&events, closes());
        assert_eq!(report.top_revisions.len(), TOP_REVISIONS);
    }

    #[test]
    fn test_empty_inputs_produce_empty_report() {
        let report = event_study(&[], closes());
        assert!(report.enriched.is_empty());
        assert!(report.overall.is_empty());
        assert!(report.top_revisions.is_empty());

        let report = event_study(&sample_events(), Vec::new());
        assert!(report.enriched.is_empty());
        assert_eq!(report.skipped_unpriced, 8);
    }
}
