#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/macrodyne/impact/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Macro-release impact analysis for a reference asset.
//!
//! This crate ties the workspace together: it re-exports the core types and
//! engines, the cache and source implementations, and provides a
//! [`SourceRegistry`] for managing sources with automatic fallback plus the
//! batch [`event_study`] pipeline.
//!
//! # Features
//!
//! - `yahoo` - Yahoo Finance daily close source
//! - `investing` - Investing.com economic-calendar release source
//! - `cache-sqlite` - SQLite-based price caching
//!
//! # Example
//!
//! ```rust,ignore
//! use impact::{SourceRegistry, Symbol, fetch_and_study};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> impact::Result<()> {
//!     let registry = SourceRegistry::new()
//!         .with_yahoo()
//!         .with_investing();
//!
//!     let report = fetch_and_study(
//!         &registry,
//!         &Symbol::new("IVV"),
//!         NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
//!     )
//!     .await?;
//!
//!     println!("{} enriched events", report.enriched.len());
//!     Ok(())
//! }
//! ```

// Core types and engines
pub use impact_core::*;

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use impact_cache::SqliteCache;
pub use impact_cache::{InMemoryCache, NoopCache};

// Sources
#[cfg(feature = "investing")]
pub use impact_investing::InvestingSource;
#[cfg(feature = "yahoo")]
pub use impact_yahoo::YahooSource;

// Summarization
pub use impact_report::{IndicatorSummary, pairwise_summaries};

mod pipeline;
mod registry;

pub use pipeline::{EventStudyReport, TOP_REVISIONS, TopRevision, event_study, fetch_and_study};
pub use registry::SourceRegistry;
