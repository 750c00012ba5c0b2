//! SQLite-based cache implementation.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use impact_core::{DailyClose, ImpactError, PriceCache, Result, Symbol};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, instrument};

/// SQLite-based cache for daily close rows.
///
/// This cache stores data in a SQLite database file, providing persistence
/// across application restarts. Rows that cannot be decoded back into
/// [`DailyClose`] values surface as a cache error: a corrupt cache must be
/// visible to the caller, not silently treated as a miss.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| ImpactError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory SQLite cache.
    ///
    /// Useful for testing; data is lost when the cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| ImpactError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImpactError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS close_cache (
                source TEXT NOT NULL,
                symbol TEXT NOT NULL,
                date TEXT NOT NULL,
                close REAL NOT NULL,
                cached_at TEXT NOT NULL,
                PRIMARY KEY (source, symbol, date)
            )",
            [],
        )
        .map_err(|e| ImpactError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_close_source_symbol_date
             ON close_cache(source, symbol, date)",
            [],
        )
        .map_err(|e| ImpactError::Cache(e.to_string()))?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }
}

#[async_trait]
impl PriceCache for SqliteCache {
    #[instrument(skip(self), fields(source = %source, symbol = %symbol))]
    async fn get_closes(
        &self,
        source: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Vec<DailyClose>>> {
        let symbol_str = symbol.to_string();
        let start_str = start.to_string();
        let end_str = end.to_string();

        let conn = self
            .conn
            .lock()
            .map_err(|e| ImpactError::Cache(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT date, close FROM close_cache
                 WHERE source = ?1 AND symbol = ?2 AND date >= ?3 AND date <= ?4
                 ORDER BY date ASC",
            )
            .map_err(|e| ImpactError::Cache(e.to_string()))?;

        let rows = stmt
            .query_map(params![source, symbol_str, start_str, end_str], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(|e| ImpactError::Cache(e.to_string()))?;

        let mut closes = Vec::new();
        for row in rows {
            let (date_str, close) = row.map_err(|e| ImpactError::Cache(e.to_string()))?;
            let date = date_str.parse::<NaiveDate>().map_err(|e| {
                ImpactError::Cache(format!("Corrupt date '{date_str}' in close_cache: {e}"))
            })?;
            closes.push(DailyClose::new(date, close));
        }

        if closes.is_empty() {
            debug!("No cached close data found");
            return Ok(None);
        }

        debug!("Found {} cached close rows", closes.len());
        Ok(Some(closes))
    }

    #[instrument(skip(self, closes), fields(source = %source, symbol = %symbol, count = closes.len()))]
    async fn put_closes(
        &self,
        source: &str,
        symbol: &Symbol,
        closes: &[DailyClose],
    ) -> Result<()> {
        let cached_at = Utc::now().to_rfc3339();
        let symbol_str = symbol.to_string();

        let conn = self
            .conn
            .lock()
            .map_err(|e| ImpactError::Cache(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| ImpactError::Cache(e.to_string()))?;

        for row in closes {
            tx.execute(
                "INSERT OR REPLACE INTO close_cache
                 (source, symbol, date, close, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    source,
                    symbol_str,
                    row.date.to_string(),
                    row.close,
                    cached_at
                ],
            )
            .map_err(|e| ImpactError::Cache(e.to_string()))?;
        }

        tx.commit().map_err(|e| ImpactError::Cache(e.to_string()))?;
        debug!("Cached {} close rows", closes.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(ttl)
                .map_err(|e| ImpactError::Cache(format!("Invalid TTL duration: {e}")))?;
        let cutoff_str = cutoff.to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|e| ImpactError::Cache(e.to_string()))?;

        let deleted = conn
            .execute(
                "DELETE FROM close_cache WHERE cached_at < ?1",
                params![cutoff_str],
            )
            .map_err(|e| ImpactError::Cache(e.to_string()))?;

        if deleted > 0 {
            debug!("Invalidated {} stale cache entries", deleted);
        }

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ImpactError::Cache(e.to_string()))?;

        conn.execute("DELETE FROM close_cache", [])
            .map_err(|e| ImpactError::Cache(e.to_string()))?;

        debug!("Cleared all cache entries");
        Ok(())
    }
}
