//! Source traits for fetching release and price data.
//!
//! This module defines the collaborator-facing traits:
//!
//! - [`DataSource`] - Base trait for all data sources
//! - [`ReleaseSource`] - Scraped indicator release-history rows
//! - [`PriceSource`] - Daily closes for the reference asset
//!
//! The analysis engines never perform I/O themselves; they consume the
//! structured rows these traits produce.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{DailyClose, EventType, ReleaseRow, Symbol},
};

/// Base trait for all data sources.
///
/// All sources must implement this trait to provide basic metadata about
/// the source and its capabilities.
pub trait DataSource: Send + Sync + Debug {
    /// Returns the name of this source (e.g., "Investing.com").
    fn name(&self) -> &str;

    /// Returns a description of this source.
    fn description(&self) -> &str;
}

/// Source of indicator release-history rows.
///
/// Implement this trait to provide scraped or loaded release tables. Rows
/// are returned newest first, matching source table order.
#[async_trait]
pub trait ReleaseSource: DataSource {
    /// Returns the release categories this source can serve.
    fn supported_event_types(&self) -> &[EventType];

    /// Fetches the release history for one category, newest first.
    async fn fetch_releases(&self, event_type: EventType) -> Result<Vec<ReleaseRow>>;
}

/// Source of daily closing prices for the reference asset.
#[async_trait]
pub trait PriceSource: DataSource {
    /// Fetches daily closes for a symbol over a date range, ascending.
    ///
    /// Closes are adjusted for splits and dividends where the source
    /// supports it.
    async fn fetch_closes(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>>;
}
