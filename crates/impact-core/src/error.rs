//! Error types for impact analysis.
//!
//! This module defines [`ImpactError`] which covers all error cases that can
//! occur when fetching, parsing, caching, or aggregating release and price
//! data.
//!
//! Per-record data-quality problems (an unparseable release date, an event
//! beyond the known price history, a non-numeric surprise string) are *not*
//! errors: they are skip-and-continue conditions handled inline by the
//! engines. Only structural failures surface here.

use thiserror::Error;

/// Errors that can occur during impact analysis.
#[derive(Error, Debug)]
pub enum ImpactError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a source.
    #[error("Rate limited by {source_name}: retry after {retry_after:?}")]
    RateLimited {
        /// The source that rate limited the request.
        source_name: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Price data is not available for the requested symbol and date range.
    #[error("Data not available for {symbol} in range {start} to {end}")]
    DataNotAvailable {
        /// The symbol that was requested.
        symbol: String,
        /// Start of the requested date range.
        start: String,
        /// End of the requested date range.
        end: String,
    },

    /// Error parsing data from a source.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A required column or field is missing from an input batch.
    ///
    /// This is a structural contract violation, fatal for the batch, unlike
    /// per-row data-quality issues which are skipped.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Error interacting with the price cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The requested source is not configured.
    #[error("Source not configured: {0}")]
    SourceNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The requested feature is not supported.
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`ImpactError`].
pub type Result<T> = std::result::Result<T, ImpactError>;
