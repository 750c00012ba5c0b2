//! Cache trait for storing fetched price history.
//!
//! This module defines the [`PriceCache`] trait that provides a unified
//! interface for caching daily close rows between runs.
//!
//! A cache read error is a hard failure for the caller, never a silent
//! fall-through to a fresh fetch: a corrupt or partial cache must be
//! surfaced, not masked by stale-looking data.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

use crate::{
    error::Result,
    types::{DailyClose, Symbol},
};

/// Trait for caching fetched daily close rows.
///
/// Implementations can store data in various backends (SQLite, in-memory,
/// etc.) to avoid repeated source fetches.
#[async_trait]
pub trait PriceCache: Send + Sync {
    /// Retrieves cached closes for a symbol within a date range, ascending.
    ///
    /// Returns `Ok(Some(rows))` on a hit, `Ok(None)` on a miss, and an
    /// error when the cache itself cannot be read.
    async fn get_closes(
        &self,
        source: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Vec<DailyClose>>>;

    /// Stores close rows in the cache.
    async fn put_closes(&self, source: &str, symbol: &Symbol, closes: &[DailyClose])
    -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
