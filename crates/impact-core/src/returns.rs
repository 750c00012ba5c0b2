//! Return attribution: aligning releases to trading days.
//!
//! For each event the release date is resolved to the first trading day on
//! or after it (t0), the same-day return is computed against the prior
//! session's close, and the next-day return against the following session's
//! close. Events that cannot be dated or priced are dropped, not
//! zero-filled, and counted for the caller.

use tracing::{debug, warn};

use crate::calendar::{PriceSeries, parse_release_date};
use crate::types::{EconomicEvent, EnrichedEvent};

/// Result of a return-attribution pass over an event batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttachedReturns {
    /// Enriched events, sorted ascending by release date then category.
    pub events: Vec<EnrichedEvent>,
    /// Events dropped because their release date could not be parsed.
    pub skipped_unparseable: usize,
    /// Events dropped because they fall beyond the known price history.
    pub skipped_unpriced: usize,
}

impl AttachedReturns {
    /// Total number of events dropped from the batch.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped_unparseable + self.skipped_unpriced
    }
}

/// Attaches same-day and next-day returns to each event in a batch.
///
/// Per event:
///
/// 1. parse the release date; unparseable dates drop the record with a
///    diagnostic, never the batch;
/// 2. resolve t0 via [`PriceSeries::next_trading_day`]; events beyond the
///    known history produce no enriched record;
/// 3. `same_day_return = close(t0) / close(prior session) - 1`, absent when
///    t0 is the first known session;
/// 4. resolve t1, the session after t0, and
///    `next_day_return = close(t1) / close(t0) - 1`, absent when t0 is the
///    last known session.
///
/// The output is sorted ascending by `(release_date, event_type)` so that
/// downstream aggregation is reproducible regardless of input order.
#[must_use]
pub fn attach_returns(events: &[EconomicEvent], prices: &PriceSeries) -> AttachedReturns {
    let mut out = AttachedReturns::default();

    for event in events {
        let Some(release_date) = parse_release_date(&event.release_date) else {
            warn!(
                event_type = %event.event_type,
                release_date = %event.release_date,
                "Skipping event with unparseable release date"
            );
            out.skipped_unparseable += 1;
            continue;
        };

        let Some(i0) = prices.session_on_or_after(release_date) else {
            debug!(
                event_type = %event.event_type,
                %release_date,
                "Event beyond available price history"
            );
            out.skipped_unpriced += 1;
            continue;
        };

        let sessions = prices.sessions();
        let t0 = sessions[i0];
        let t1 = sessions.get(i0 + 1);

        let same_day_return = i0
            .checked_sub(1)
            .map(|prev| t0.close / sessions[prev].close - 1.0);
        let next_day_return = t1.map(|next| next.close / t0.close - 1.0);

        out.events.push(EnrichedEvent {
            event: event.clone(),
            release_date,
            trading_day: t0.date,
            next_trading_day: t1.map(|next| next.date),
            same_day_return,
            next_day_return,
        });
    }

    if out.skipped() > 0 {
        warn!(
            skipped_unparseable = out.skipped_unparseable,
            skipped_unpriced = out.skipped_unpriced,
            "Dropped {} of {} events during return attribution",
            out.skipped(),
            events.len()
        );
    }

    out.events.sort_by(|a, b| {
        (a.release_date, a.event.event_type).cmp(&(b.release_date, b.event.event_type))
    });

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DailyClose, EventType};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn prices() -> PriceSeries {
        PriceSeries::from_closes(vec![
            DailyClose::new(date(2024, 1, 2), 100.0),
            DailyClose::new(date(2024, 1, 3), 101.0),
            DailyClose::new(date(2024, 1, 4), 99.0),
        ])
    }

    fn event(ty: EventType, release_date: &str) -> EconomicEvent {
        EconomicEvent::new(ty, release_date)
    }

    #[test]
    fn test_midweek_event_gets_both_returns() {
        let out = attach_returns(&[event(EventType::Cpi, "2024-01-03")], &prices());
        assert_eq!(out.events.len(), 1);
        let e = &out.events[0];
        assert_eq!(e.trading_day, date(2024, 1, 3));
        assert_eq!(e.next_trading_day, Some(date(2024, 1, 4)));
        let same = e.same_day_return.unwrap();
        let next = e.next_day_return.unwrap();
        assert!((same - 0.01).abs() < 1e-12);
        assert!((next - (99.0 / 101.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_first_session_has_no_same_day_return() {
        let out = attach_returns(&[event(EventType::Cpi, "2024-01-02")], &prices());
        let e = &out.events[0];
        assert_eq!(e.trading_day, date(2024, 1, 2));
        assert_eq!(e.same_day_return, None);
        assert!(e.next_day_return.is_some());
    }

    #[test]
    fn test_last_session_has_no_next_day_return() {
        let out = attach_returns(&[event(EventType::Fed, "2024-01-04")], &prices());
        let e = &out.events[0];
        assert_eq!(e.next_trading_day, None);
        assert_eq!(e.next_day_return, None);
        assert!(e.same_day_return.is_some());
    }

    #[test]
    fn test_weekend_release_resolves_forward() {
        // Sat Jan 6 resolves to Mon Jan 8; prior close is Fri Jan 5.
        let prices = PriceSeries::from_closes(vec![
            DailyClose::new(date(2024, 1, 5), 100.0),
            DailyClose::new(date(2024, 1, 8), 102.0),
        ]);
        let out = attach_returns(&[event(EventType::Jobs, "2024-01-06")], &prices);
        let e = &out.events[0];
        assert_eq!(e.trading_day, date(2024, 1, 8));
        assert!((e.same_day_return.unwrap() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_weekend_release_at_series_start() {
        // Monday is the first entry: no prior close to compare against.
        let prices = PriceSeries::from_closes(vec![
            DailyClose::new(date(2024, 1, 8), 102.0),
            DailyClose::new(date(2024, 1, 9), 103.0),
        ]);
        let out = attach_returns(&[event(EventType::Jobs, "2024-01-06")], &prices);
        let e = &out.events[0];
        assert_eq!(e.trading_day, date(2024, 1, 8));
        assert_eq!(e.same_day_return, None);
    }

    #[test]
    fn test_future_event_is_dropped() {
        let out = attach_returns(&[event(EventType::Cpi, "2024-02-01")], &prices());
        assert!(out.events.is_empty());
        assert_eq!(out.skipped_unpriced, 1);
        assert_eq!(out.skipped_unparseable, 0);
    }

    #[test]
    fn test_unparseable_date_is_dropped_without_aborting() {
        let batch = [
            event(EventType::Cpi, "not a date"),
            event(EventType::Cpi, "2024-01-03"),
        ];
        let out = attach_returns(&batch, &prices());
        assert_eq!(out.events.len(), 1);
        assert_eq!(out.skipped_unparseable, 1);
        assert_eq!(out.skipped(), 1);
    }

    #[test]
    fn test_output_order_is_deterministic() {
        let shuffled = [
            event(EventType::Fed, "2024-01-04"),
            event(EventType::Cpi, "2024-01-02"),
            event(EventType::Jobs, "2024-01-03"),
            event(EventType::Cpi, "2024-01-03"),
        ];
        let out = attach_returns(&shuffled, &prices());
        let order: Vec<_> = out
            .events
            .iter()
            .map(|e| (e.release_date, e.event_type()))
            .collect();
        let mut sorted = order.clone();
        sorted.sort();
        assert_eq!(order, sorted);
        assert_eq!(order[1], (date(2024, 1, 3), EventType::Cpi));
    }

    #[test]
    fn test_annotated_release_date() {
        let out = attach_returns(&[event(EventType::Cpi, "Jan 3, 2024  (Dec)")], &prices());
        assert_eq!(out.events[0].trading_day, date(2024, 1, 3));
    }
}
