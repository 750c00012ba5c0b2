//! No-op cache implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use impact_core::{DailyClose, PriceCache, Result, Symbol};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get_closes` always returns `Ok(None)` and `put_closes` returns `Ok(())`.
/// Useful for disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PriceCache for NoopCache {
    async fn get_closes(
        &self,
        _source: &str,
        _symbol: &Symbol,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Option<Vec<DailyClose>>> {
        trace!("NoopCache: get_closes called, returning None");
        Ok(None)
    }

    async fn put_closes(
        &self,
        _source: &str,
        _symbol: &Symbol,
        _closes: &[DailyClose],
    ) -> Result<()> {
        trace!("NoopCache: put_closes called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        trace!("NoopCache: invalidate_stale called, returning 0");
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_noop_cache_get_returns_none() {
        let cache = NoopCache::new();
        let symbol = Symbol::new("IVV");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        assert!(
            cache
                .get_closes("test", &symbol, start, end)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_noop_cache_put_succeeds() {
        let cache = NoopCache::new();
        let symbol = Symbol::new("IVV");
        let closes = [DailyClose::new(
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            480.5,
        )];

        assert!(cache.put_closes("test", &symbol, &closes).await.is_ok());
    }

    #[tokio::test]
    async fn test_noop_cache_management() {
        let cache = NoopCache::new();

        let removed = cache
            .invalidate_stale(Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        assert!(cache.clear().await.is_ok());
    }

    #[test]
    fn test_noop_cache_is_copy() {
        let cache1 = NoopCache::new();
        let cache2 = cache1; // Copy
        let _cache3 = cache2; // Still works because Copy
    }
}
