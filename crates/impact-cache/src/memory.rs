//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use impact_core::{DailyClose, PriceCache, Result, Symbol};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry {
    closes: Vec<DailyClose>,
    cached_at: chrono::DateTime<Utc>,
}

impl CacheEntry {
    fn new(closes: Vec<DailyClose>) -> Self {
        Self {
            closes,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Key for close-row cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CloseKey {
    source: String,
    symbol: String,
}

/// Simple in-memory cache for testing and development.
///
/// Close rows are stored per (source, symbol) in a `RwLock`-protected
/// `HashMap` and are lost when the cache is dropped. Range queries filter
/// the stored rows on read.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    closes: RwLock<HashMap<CloseKey, CacheEntry>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PriceCache for InMemoryCache {
    #[instrument(skip(self), fields(source = %source, symbol = %symbol))]
    async fn get_closes(
        &self,
        source: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Vec<DailyClose>>> {
        let key = CloseKey {
            source: source.to_string(),
            symbol: symbol.to_string(),
        };

        let cache = self.closes.read().await;
        match cache.get(&key) {
            Some(entry) => {
                let rows: Vec<DailyClose> = entry
                    .closes
                    .iter()
                    .filter(|r| r.date >= start && r.date <= end)
                    .copied()
                    .collect();
                if rows.is_empty() {
                    debug!("Cache miss for close data");
                    Ok(None)
                } else {
                    debug!("Cache hit: {} close rows", rows.len());
                    Ok(Some(rows))
                }
            }
            None => {
                debug!("Cache miss for close data");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, closes), fields(source = %source, symbol = %symbol, count = closes.len()))]
    async fn put_closes(
        &self,
        source: &str,
        symbol: &Symbol,
        closes: &[DailyClose],
    ) -> Result<()> {
        let key = CloseKey {
            source: source.to_string(),
            symbol: symbol.to_string(),
        };

        let mut cache = self.closes.write().await;
        cache.insert(key, CacheEntry::new(closes.to_vec()));
        debug!("Cached {} close rows", closes.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut cache = self.closes.write().await;
        let before = cache.len();
        cache.retain(|_, entry| !entry.is_stale(ttl));
        let removed = before - cache.len();

        if removed > 0 {
            debug!("Invalidated {} stale cache entries", removed);
        }

        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.closes.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_closes() -> Vec<DailyClose> {
        vec![
            DailyClose::new(date(2024, 1, 2), 480.5),
            DailyClose::new(date(2024, 1, 3), 482.1),
            DailyClose::new(date(2024, 1, 4), 479.8),
        ]
    }

    #[tokio::test]
    async fn test_memory_cache_round_trip() {
        let cache = InMemoryCache::new();
        let symbol = Symbol::new("IVV");
        let start = date(2024, 1, 1);
        let end = date(2024, 1, 31);

        // Initially no data
        let result = cache.get_closes("test", &symbol, start, end).await.unwrap();
        assert!(result.is_none());

        cache
            .put_closes("test", &symbol, &sample_closes())
            .await
            .unwrap();

        let result = cache.get_closes("test", &symbol, start, end).await.unwrap();
        assert_eq!(result.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_memory_cache_filters_range() {
        let cache = InMemoryCache::new();
        let symbol = Symbol::new("IVV");

        cache
            .put_closes("test", &symbol, &sample_closes())
            .await
            .unwrap();

        let result = cache
            .get_closes("test", &symbol, date(2024, 1, 3), date(2024, 1, 3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].close, 482.1);

        // Entirely outside the stored range is a miss, not an empty hit.
        let result = cache
            .get_closes("test", &symbol, date(2023, 1, 1), date(2023, 12, 31))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_clear() {
        let cache = InMemoryCache::new();
        let symbol = Symbol::new("IVV");

        cache
            .put_closes("test", &symbol, &sample_closes())
            .await
            .unwrap();
        cache.clear().await.unwrap();

        let result = cache
            .get_closes("test", &symbol, date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_invalidate_stale() {
        let cache = InMemoryCache::new();
        let symbol = Symbol::new("IVV");

        cache
            .put_closes("test", &symbol, &sample_closes())
            .await
            .unwrap();

        // Nothing is older than an hour yet.
        let removed = cache
            .invalidate_stale(Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        // A zero TTL invalidates everything.
        let removed = cache.invalidate_stale(Duration::ZERO).await.unwrap();
        assert_eq!(removed, 1);
    }
}
