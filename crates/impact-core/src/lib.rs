#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/macrodyne/impact/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and engines for macro-release impact analysis.
//!
//! This crate provides the foundational pieces for measuring how indicator
//! releases move a reference asset:
//!
//! - [`PriceSeries`](calendar::PriceSeries) - Trading calendar and close lookup
//! - [`attach_returns`](returns::attach_returns) - Event-to-trading-day return attribution
//! - [`parse_magnitude`](magnitude::parse_magnitude) - Normalizing surprise/revision strings
//! - [`stats`] - Winsorized, bucketed aggregate tables
//! - [`ReleaseSource`](source::ReleaseSource) / [`PriceSource`](source::PriceSource) - Source traits
//! - [`PriceCache`](cache::PriceCache) - Caching abstraction

/// Cache trait for storing fetched price history.
pub mod cache;
/// Trading calendar and release-date parsing.
pub mod calendar;
/// Error types for impact analysis.
pub mod error;
/// Magnitude parsing for heterogeneous release strings.
pub mod magnitude;
/// Return attribution for release events.
pub mod returns;
/// Source traits for fetching release and price data.
pub mod source;
/// Aggregate statistics over enriched events.
pub mod stats;
/// Core data types (Symbol, events, closes, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::PriceCache;
pub use calendar::{PriceSeries, parse_release_date};
pub use error::{ImpactError, Result};
pub use magnitude::parse_magnitude;
pub use returns::{AttachedReturns, attach_returns};
pub use source::{DataSource, PriceSource, ReleaseSource};
pub use stats::{
    BucketStats, EventObservation, RevisionBucket, SignBucketRow, observations,
    overall_summary, revision_bucket_table, surprise_sign_table, top_n_by_abs, winsorize,
};
pub use types::{DailyClose, EconomicEvent, EnrichedEvent, EventType, ReleaseRow, Symbol};
