//! Source registry for managing release and price sources with fallback
//! behavior.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use impact_core::{
    DailyClose, EventType, ImpactError, PriceCache, PriceSource, ReleaseRow, ReleaseSource,
    Result, Symbol,
};

/// Registry for managing multiple data sources with automatic fallback.
///
/// The `SourceRegistry` allows you to register multiple sources for each
/// data kind (releases, prices) and will automatically try them in order
/// until one succeeds.
///
/// When a price cache is configured it is consulted first; a cache read
/// *error* aborts the fetch rather than silently falling through to a
/// source, so a corrupt cache is never masked by a quiet re-fetch.
///
/// # Example
///
/// ```rust,ignore
/// use impact::{SourceRegistry, Symbol};
/// use chrono::NaiveDate;
///
/// let registry = SourceRegistry::new()
///     .with_yahoo()
///     .with_investing();
///
/// let symbol = Symbol::new("IVV");
/// let closes = registry.fetch_closes(
///     &symbol,
///     NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
/// ).await?;
/// ```
#[derive(Default)]
pub struct SourceRegistry {
    release_sources: Vec<Arc<dyn ReleaseSource>>,
    price_sources: Vec<Arc<dyn PriceSource>>,
    cache: Option<Arc<dyn PriceCache>>,
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field(
                "release_sources",
                &self
                    .release_sources
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "price_sources",
                &self
                    .price_sources
                    .iter()
                    .map(|s| s.name())
                    .collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .finish()
    }
}

impl SourceRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new registry with a price cache.
    #[must_use]
    pub fn with_cache(cache: Arc<dyn PriceCache>) -> Self {
        Self {
            cache: Some(cache),
            ..Default::default()
        }
    }

    /// Set the price cache for this registry.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn PriceCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Register a release source.
    pub fn register_release(&mut self, source: Arc<dyn ReleaseSource>) {
        debug!(source = source.name(), "Registering release source");
        self.release_sources.push(source);
    }

    /// Register a price source.
    pub fn register_price(&mut self, source: Arc<dyn PriceSource>) {
        debug!(source = source.name(), "Registering price source");
        self.price_sources.push(source);
    }

    /// Fetch daily closes, trying sources in order until one succeeds.
    ///
    /// If a cache is configured it is checked first and results are cached
    /// on success. A cache read error is returned to the caller.
    pub async fn fetch_closes(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>> {
        if self.price_sources.is_empty() {
            return Err(ImpactError::SourceNotConfigured(
                "No price sources registered".to_string(),
            ));
        }

        // Check cache first; a read error is surfaced, not swallowed.
        if let Some(cache) = &self.cache {
            for source in &self.price_sources {
                match cache.get_closes(source.name(), symbol, start, end).await {
                    Ok(Some(cached)) => {
                        debug!(
                            source = source.name(),
                            symbol = %symbol,
                            "Cache hit for close data"
                        );
                        return Ok(cached);
                    }
                    Ok(None) => {}
                    Err(e) => return Err(e),
                }
            }
        }

        // Try each source in order
        let mut last_error = None;
        for source in &self.price_sources {
            debug!(
                source = source.name(),
                symbol = %symbol,
                "Fetching close data"
            );

            match source.fetch_closes(symbol, start, end).await {
                Ok(closes) => {
                    // Cache the result
                    if let Some(cache) = &self.cache {
                        if let Err(e) = cache.put_closes(source.name(), symbol, &closes).await {
                            warn!(
                                source = source.name(),
                                error = %e,
                                "Failed to cache close data"
                            );
                        }
                    }
                    return Ok(closes);
                }
                Err(e) => {
                    warn!(
                        source = source.name(),
                        error = %e,
                        "Source failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ImpactError::Other("All sources failed with no error".to_string())))
    }

    /// Fetch release rows for one category, trying sources in order until
    /// one succeeds.
    pub async fn fetch_releases(&self, event_type: EventType) -> Result<Vec<ReleaseRow>> {
        if self.release_sources.is_empty() {
            return Err(ImpactError::SourceNotConfigured(
                "No release sources registered".to_string(),
            ));
        }

        let mut last_error = None;
        let mut any_supported = false;
        for source in &self.release_sources {
            if !source.supported_event_types().contains(&event_type) {
                continue;
            }
            any_supported = true;
            debug!(source = source.name(), %event_type, "Fetching releases");

            match source.fetch_releases(event_type).await {
                Ok(rows) => return Ok(rows),
                Err(e) => {
                    warn!(
                        source = source.name(),
                        error = %e,
                        "Source failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        if !any_supported {
            return Err(ImpactError::NotSupported(format!(
                "No registered source serves {event_type} releases"
            )));
        }

        Err(last_error
            .unwrap_or_else(|| ImpactError::Other("All sources failed with no error".to_string())))
    }

    // Builder methods for easy setup with specific sources

    /// Add the Yahoo Finance price source.
    #[cfg(feature = "yahoo")]
    #[must_use]
    pub fn with_yahoo(mut self) -> Self {
        self.register_price(Arc::new(impact_yahoo::YahooSource::new()));
        self
    }

    /// Add the Investing.com release source.
    #[cfg(feature = "investing")]
    #[must_use]
    pub fn with_investing(mut self) -> Self {
        self.register_release(Arc::new(impact_investing::InvestingSource::new()));
        self
    }
}
