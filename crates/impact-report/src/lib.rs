#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/macrodyne/impact/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Release summarization and the CSV boundary for impact analysis.
//!
//! This crate turns raw scraped release histories into summarized
//! [`EconomicEvent`](impact_core::EconomicEvent) rows, and reads/writes the
//! CSV shapes consumed and produced by the analysis:
//!
//! - [`pairwise_summaries`](summary::pairwise_summaries) - (latest, previous)
//!   windows over a release history
//! - [`IndicatorSummary`](summary::IndicatorSummary) - one summarized release
//! - [`csv`] - typed-row readers and writers

/// Typed-row CSV readers and writers.
pub mod csv;
/// Pairwise release summarization.
pub mod summary;

pub use summary::{
    IndicatorSummary, pairwise_summaries, summarize, summarize_cpi, summarize_fed,
    summarize_jobs, summarize_unemployment,
};
