#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/macrodyne/impact/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Investing.com economic-calendar release source.
//!
//! This crate provides a release source that implements the
//! [`DataSource`] and [`ReleaseSource`] traits from `impact-core` by
//! scraping the per-indicator release-history tables:
//!
//! | Category | Calendar page | Table |
//! |---|---|---|
//! | CPI (YoY) | `cpi-733` | `eventHistoryTable733` |
//! | Nonfarm payrolls | `nonfarm-payrolls-227` | `eventHistoryTable227` |
//! | Unemployment rate | `unemployment-rate-300` | `eventHistoryTable300` |
//! | Fed rate decision | `interest-rate-decision-168` | `eventHistoryTable168` |
//!
//! Saved calendar pages can be parsed offline via
//! [`InvestingSource::parse_saved_page`], which is also the path exercised
//! by tests.

use std::time::Duration;

use async_trait::async_trait;
use impact_core::{DataSource, EventType, ImpactError, ReleaseRow, ReleaseSource, Result};
use tracing::debug;

/// HTML parsing for release-history tables.
pub mod parser;

pub use parser::{extract_reference_period, parse_history_table};

/// Economic calendar base URL.
const CALENDAR_BASE_URL: &str = "https://www.investing.com/economic-calendar";

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                          AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0 Safari/537.36";

/// Calendar page descriptor for one release category.
#[derive(Debug, Clone, Copy)]
struct CalendarPage {
    slug: &'static str,
    table_id: &'static str,
}

const fn calendar_for(event_type: EventType) -> CalendarPage {
    match event_type {
        EventType::Cpi => CalendarPage {
            slug: "cpi-733",
            table_id: "733",
        },
        EventType::Jobs => CalendarPage {
            slug: "nonfarm-payrolls-227",
            table_id: "227",
        },
        EventType::Unemployment => CalendarPage {
            slug: "unemployment-rate-300",
            table_id: "300",
        },
        EventType::Fed => CalendarPage {
            slug: "interest-rate-decision-168",
            table_id: "168",
        },
    }
}

/// Investing.com release source.
///
/// Implements [`DataSource`] and [`ReleaseSource`].
#[derive(Debug)]
pub struct InvestingSource {
    client: reqwest::Client,
}

impl InvestingSource {
    /// Create a new source with default settings.
    #[must_use]
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(12))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Create a new source with a custom HTTP client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Parse a saved calendar page for one category.
    ///
    /// The offline counterpart of [`ReleaseSource::fetch_releases`]: the
    /// same table-extraction rules applied to HTML obtained elsewhere.
    pub fn parse_saved_page(event_type: EventType, html: &str) -> Result<Vec<ReleaseRow>> {
        parse_history_table(html, calendar_for(event_type).table_id)
    }
}

impl Default for InvestingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for InvestingSource {
    fn name(&self) -> &str {
        "Investing.com"
    }

    fn description(&self) -> &str {
        "Investing.com economic-calendar release histories"
    }
}

#[async_trait]
impl ReleaseSource for InvestingSource {
    fn supported_event_types(&self) -> &[EventType] {
        &EventType::ALL
    }

    async fn fetch_releases(&self, event_type: EventType) -> Result<Vec<ReleaseRow>> {
        let page = calendar_for(event_type);
        let url = format!("{CALENDAR_BASE_URL}/{}", page.slug);
        debug!(%event_type, "Fetching release history: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| ImpactError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ImpactError::RateLimited {
                source_name: "Investing.com".to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if !response.status().is_success() {
            return Err(ImpactError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                url
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ImpactError::Network(e.to_string()))?;

        let rows = parse_history_table(&body, page.table_id)?;
        debug!(%event_type, "Parsed {} release rows", rows.len());
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_info() {
        let source = InvestingSource::new();
        assert_eq!(source.name(), "Investing.com");
        assert_eq!(source.supported_event_types().len(), 4);
    }

    #[test]
    fn test_calendar_lookup() {
        assert_eq!(calendar_for(EventType::Cpi).table_id, "733");
        assert_eq!(calendar_for(EventType::Jobs).slug, "nonfarm-payrolls-227");
        assert_eq!(calendar_for(EventType::Unemployment).table_id, "300");
        assert_eq!(calendar_for(EventType::Fed).table_id, "168");
    }

    #[test]
    fn test_parse_saved_page() {
        let html = r#"
            <table id="eventHistoryTable227">
              <tr>
                <td>Aug 1, 2025  (Jul)</td><td>08:30</td><td>73K</td><td>110K</td><td>14K</td>
              </tr>
            </table>
        "#;
        let rows = InvestingSource::parse_saved_page(EventType::Jobs, html).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].actual, "73K");
    }
}
