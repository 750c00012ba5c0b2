//! Aggregate statistics over enriched release events.
//!
//! Grouping is explicit: observations are bucketed into `BTreeMap`s keyed by
//! category (and bucket), then each group is reduced to its summary
//! statistics. Groups without a valid observation report absent statistics,
//! never a fabricated zero. `BTreeMap` keys keep table output order
//! deterministic.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::types::{EnrichedEvent, EventType};

/// Winsorization tail probability used for display aggregates.
pub const WINSOR_TAIL: f64 = 0.01;

/// Absolute revision size (thousands of jobs) separating small from large
/// revisions.
pub const LARGE_REVISION_THRESHOLD: f64 = 50.0;

/// Mean of a slice of values; `None` when empty.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median of a slice of values; `None` when empty.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Nearest-rank percentile of a slice of values; `None` when empty.
///
/// The result is always a member of the sample, which makes
/// [`winsorize`] exactly idempotent: clipping moves no sample point past
/// the rank that defined the bound.
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64).round() as usize;
    Some(sorted[rank])
}

/// Percent of values strictly greater than zero; `None` when empty.
#[must_use]
pub fn pct_positive(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let positive = values.iter().filter(|v| **v > 0.0).count();
    Some(positive as f64 / values.len() as f64 * 100.0)
}

/// Clips every value to the `[tail, 1 - tail]` percentile range of the
/// slice.
///
/// Used only for display aggregates; per-event enriched records are never
/// winsorized.
#[must_use]
pub fn winsorize(values: &[f64], tail: f64) -> Vec<f64> {
    let (Some(lo), Some(hi)) = (percentile(values, tail), percentile(values, 1.0 - tail)) else {
        return Vec::new();
    };
    values.iter().map(|v| v.clamp(lo, hi)).collect()
}

/// Numeric projection of an enriched event, as consumed by the aggregate
/// tables.
#[derive(Clone, Debug, PartialEq)]
pub struct EventObservation {
    /// Release category.
    pub event_type: EventType,
    /// Parsed release date.
    pub release_date: NaiveDate,
    /// Parsed surprise magnitude.
    pub surprise: Option<f64>,
    /// Parsed revision-change magnitude.
    pub revision_change: Option<f64>,
    /// Same-day return, winsorized across the batch.
    pub same_day_return: Option<f64>,
    /// Next-day return, winsorized across the batch.
    pub next_day_return: Option<f64>,
}

/// Projects enriched events into numeric observations with both return
/// columns winsorized at [`WINSOR_TAIL`].
#[must_use]
pub fn observations(events: &[EnrichedEvent]) -> Vec<EventObservation> {
    observations_with_tail(events, WINSOR_TAIL)
}

/// Projects enriched events into numeric observations, winsorizing both
/// return columns at the given tail probability.
#[must_use]
pub fn observations_with_tail(events: &[EnrichedEvent], tail: f64) -> Vec<EventObservation> {
    let mut obs: Vec<EventObservation> = events
        .iter()
        .map(|e| EventObservation {
            event_type: e.event_type(),
            release_date: e.release_date,
            surprise: e.surprise_magnitude(),
            revision_change: e.revision_magnitude(),
            same_day_return: e.same_day_return,
            next_day_return: e.next_day_return,
        })
        .collect();

    let same: Vec<f64> = obs.iter().filter_map(|o| o.same_day_return).collect();
    if let (Some(lo), Some(hi)) = (percentile(&same, tail), percentile(&same, 1.0 - tail)) {
        for o in &mut obs {
            o.same_day_return = o.same_day_return.map(|v| v.clamp(lo, hi));
        }
    }

    let next: Vec<f64> = obs.iter().filter_map(|o| o.next_day_return).collect();
    if let (Some(lo), Some(hi)) = (percentile(&next, tail), percentile(&next, 1.0 - tail)) {
        for o in &mut obs {
            o.next_day_return = o.next_day_return.map(|v| v.clamp(lo, hi));
        }
    }

    obs
}

/// One event category's sign-bucketed surprise statistics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SignBucketRow {
    /// Observations with surprise strictly greater than zero.
    pub n_pos: usize,
    /// Mean same-day return in the positive bucket.
    pub mean_same_pos: Option<f64>,
    /// Mean next-day return in the positive bucket.
    pub mean_next_pos: Option<f64>,
    /// Observations with surprise strictly less than zero.
    pub n_neg: usize,
    /// Mean same-day return in the negative bucket.
    pub mean_same_neg: Option<f64>,
    /// Mean next-day return in the negative bucket.
    pub mean_next_neg: Option<f64>,
    /// Positive-bucket mean minus negative-bucket mean, same-day horizon.
    pub diff_same_pos_minus_neg: Option<f64>,
    /// Positive-bucket mean minus negative-bucket mean, next-day horizon.
    pub diff_next_pos_minus_neg: Option<f64>,
}

/// Builds the sign-bucketed surprise table, keyed by event category.
///
/// Only observations with a surprise and both returns present participate.
/// Zero surprise falls in neither bucket. An empty bucket reports absent
/// means and an absent difference.
#[must_use]
pub fn surprise_sign_table(obs: &[EventObservation]) -> BTreeMap<EventType, SignBucketRow> {
    let mut groups: BTreeMap<EventType, Vec<&EventObservation>> = BTreeMap::new();
    for o in obs {
        if o.surprise.is_some() && o.same_day_return.is_some() && o.next_day_return.is_some() {
            groups.entry(o.event_type).or_default().push(o);
        }
    }

    groups
        .into_iter()
        .map(|(event_type, rows)| {
            let pos: Vec<&EventObservation> = rows
                .iter()
                .copied()
                .filter(|o| o.surprise.is_some_and(|s| s > 0.0))
                .collect();
            let neg: Vec<&EventObservation> = rows
                .iter()
                .copied()
                .filter(|o| o.surprise.is_some_and(|s| s < 0.0))
                .collect();

            let same_pos: Vec<f64> = pos.iter().filter_map(|o| o.same_day_return).collect();
            let next_pos: Vec<f64> = pos.iter().filter_map(|o| o.next_day_return).collect();
            let same_neg: Vec<f64> = neg.iter().filter_map(|o| o.same_day_return).collect();
            let next_neg: Vec<f64> = neg.iter().filter_map(|o| o.next_day_return).collect();

            let mean_same_pos = mean(&same_pos);
            let mean_next_pos = mean(&next_pos);
            let mean_same_neg = mean(&same_neg);
            let mean_next_neg = mean(&next_neg);

            let row = SignBucketRow {
                n_pos: pos.len(),
                mean_same_pos,
                mean_next_pos,
                n_neg: neg.len(),
                mean_same_neg,
                mean_next_neg,
                diff_same_pos_minus_neg: mean_same_pos.zip(mean_same_neg).map(|(p, n)| p - n),
                diff_next_pos_minus_neg: mean_next_pos.zip(mean_next_neg).map(|(p, n)| p - n),
            };
            (event_type, row)
        })
        .collect()
}

/// Ordered revision-size bucket with fixed thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RevisionBucket {
    /// Revision of at most -[`LARGE_REVISION_THRESHOLD`].
    DownBig,
    /// Revision strictly between the thresholds.
    Small,
    /// Revision of at least +[`LARGE_REVISION_THRESHOLD`].
    UpBig,
}

impl RevisionBucket {
    /// Classifies a revision magnitude into its bucket.
    #[must_use]
    pub fn classify(value: f64) -> Self {
        if value <= -LARGE_REVISION_THRESHOLD {
            Self::DownBig
        } else if value >= LARGE_REVISION_THRESHOLD {
            Self::UpBig
        } else {
            Self::Small
        }
    }

    /// Table label for this bucket.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::DownBig => "down_big(<=-50K)",
            Self::Small => "small(-50K..+50K)",
            Self::UpBig => "up_big(>=+50K)",
        }
    }
}

impl fmt::Display for RevisionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Count, central tendency and percent-positive statistics for one group of
/// observations, per return horizon.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BucketStats {
    /// Number of observations in the group.
    pub n: usize,
    /// Mean same-day return over present values.
    pub mean_same: Option<f64>,
    /// Mean next-day return over present values.
    pub mean_next: Option<f64>,
    /// Median same-day return over present values.
    pub median_same: Option<f64>,
    /// Median next-day return over present values.
    pub median_next: Option<f64>,
    /// Percent of present same-day returns that are positive.
    pub pct_pos_same: Option<f64>,
    /// Percent of present next-day returns that are positive.
    pub pct_pos_next: Option<f64>,
}

impl BucketStats {
    fn from_rows(rows: &[&EventObservation]) -> Self {
        let same: Vec<f64> = rows.iter().filter_map(|o| o.same_day_return).collect();
        let next: Vec<f64> = rows.iter().filter_map(|o| o.next_day_return).collect();
        Self {
            n: rows.len(),
            mean_same: mean(&same),
            mean_next: mean(&next),
            median_same: median(&same),
            median_next: median(&next),
            pct_pos_same: pct_positive(&same),
            pct_pos_next: pct_positive(&next),
        }
    }
}

/// Buckets one category's observations by revision size.
///
/// Only observations of the given category with a revision magnitude and
/// both returns present participate. Buckets without members are omitted
/// from the table rather than reported as zero rows.
#[must_use]
pub fn revision_bucket_table(
    obs: &[EventObservation],
    event_type: EventType,
) -> BTreeMap<RevisionBucket, BucketStats> {
    let mut groups: BTreeMap<RevisionBucket, Vec<&EventObservation>> = BTreeMap::new();
    for o in obs {
        if o.event_type != event_type {
            continue;
        }
        let (Some(revision), Some(_), Some(_)) =
            (o.revision_change, o.same_day_return, o.next_day_return)
        else {
            continue;
        };
        groups
            .entry(RevisionBucket::classify(revision))
            .or_default()
            .push(o);
    }

    groups
        .into_iter()
        .map(|(bucket, rows)| (bucket, BucketStats::from_rows(&rows)))
        .collect()
}

/// Per-category summary over all observations, with no further bucketing.
///
/// `n` counts every observation in the category; each statistic is computed
/// over the observations where its column is present and is absent when
/// none are.
#[must_use]
pub fn overall_summary(obs: &[EventObservation]) -> BTreeMap<EventType, BucketStats> {
    let mut groups: BTreeMap<EventType, Vec<&EventObservation>> = BTreeMap::new();
    for o in obs {
        groups.entry(o.event_type).or_default().push(o);
    }

    groups
        .into_iter()
        .map(|(event_type, rows)| (event_type, BucketStats::from_rows(&rows)))
        .collect()
}

/// Ranks rows by the absolute value of a magnitude column, descending, and
/// returns the first `n`.
///
/// Rows whose magnitude is absent are excluded. The sort is stable, so ties
/// keep their input order and the ranking is reproducible.
#[must_use]
pub fn top_n_by_abs<T, F>(rows: &[T], n: usize, magnitude: F) -> Vec<&T>
where
    F: Fn(&T) -> Option<f64>,
{
    let mut ranked: Vec<(&T, f64)> = rows
        .iter()
        .filter_map(|r| magnitude(r).map(|m| (r, m.abs())))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.truncate(n);
    ranked.into_iter().map(|(r, _)| r).collect()
}
