#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/macrodyne/impact/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance daily close source.
//!
//! This crate provides a Yahoo Finance source that implements the
//! [`DataSource`] and [`PriceSource`] traits from `impact-core`.
//!
//! # Features
//!
//! - Fetch daily closes using Yahoo Finance's chart API
//! - Split/dividend-adjusted closes, with raw close fallback
//! - Built-in rate limiting (1 request per second by default)
//!
//! # Example
//!
//! ```no_run
//! use impact_yahoo::YahooSource;
//! use impact_core::{PriceSource, Symbol};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> impact_core::Result<()> {
//! let source = YahooSource::new();
//! let symbol = Symbol::new("IVV");
//! let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//!
//! let closes = source.fetch_closes(&symbol, start, end).await?;
//! println!("Fetched {} sessions", closes.len());
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use impact_core::{DailyClose, DataSource, ImpactError, PriceSource, Result, Symbol};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::debug;

/// Yahoo Finance chart API base URL.
const CHART_API_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Yahoo Finance daily close source.
///
/// Implements [`DataSource`] and [`PriceSource`].
#[derive(Debug)]
pub struct YahooSource {
    client: reqwest::Client,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl YahooSource {
    /// Create a new Yahoo Finance source with default settings.
    ///
    /// Uses built-in rate limiting of 1 request per second.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    /// Create a new Yahoo Finance source with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting
    /// is still applied.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Create a new Yahoo Finance source with custom rate limiting.
    #[must_use]
    pub fn with_rate_limit(rate_limit: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            rate_limit_ms: rate_limit.as_millis() as u64,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Apply rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            Ordering::Relaxed,
        );
    }

    /// Build the chart API URL for a symbol and date range.
    fn build_chart_url(&self, symbol: &Symbol, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        format!(
            "{}/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true",
            CHART_API_URL,
            symbol.as_str(),
            start_ts,
            end_ts
        )
    }

    /// Parse a Yahoo Finance chart response into close rows.
    ///
    /// Adjusted closes are preferred; the raw close is the fallback when the
    /// adjusted series is missing or misaligned. Sessions without any close
    /// are skipped.
    fn parse_chart_response(
        &self,
        symbol: &Symbol,
        response: ChartResponse,
    ) -> Result<Vec<DailyClose>> {
        let result = response
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| ImpactError::SymbolNotFound(symbol.to_string()))?;

        let timestamps = result.timestamp.unwrap_or_default();

        if timestamps.is_empty() {
            return Err(ImpactError::DataNotAvailable {
                symbol: symbol.to_string(),
                start: "N/A".to_string(),
                end: "N/A".to_string(),
            });
        }

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| ImpactError::Parse("Missing quote data".to_string()))?;

        let adj_close = result
            .indicators
            .adjclose
            .and_then(|ac| ac.into_iter().next())
            .map(|ac| ac.adjclose)
            .unwrap_or_default();

        let adjusted = if adj_close.len() == timestamps.len() {
            adj_close
        } else {
            quote.close.clone()
        };

        let mut closes = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let Some(date) = Utc.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive()) else {
                continue;
            };
            let close = adjusted
                .get(i)
                .copied()
                .flatten()
                .or_else(|| quote.close.get(i).copied().flatten());
            if let Some(close) = close {
                closes.push(DailyClose::new(date, close));
            }
        }

        Ok(closes)
    }
}

impl Default for YahooSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for YahooSource {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn description(&self) -> &str {
        "Yahoo Finance source for adjusted daily closes"
    }
}

#[async_trait]
impl PriceSource for YahooSource {
    async fn fetch_closes(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>> {
        // Validate date range
        if start > end {
            return Err(ImpactError::InvalidParameter(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }

        // Apply rate limiting
        self.apply_rate_limit().await;

        let url = self.build_chart_url(symbol, start, end);
        debug!("Fetching closes: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ImpactError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ImpactError::RateLimited {
                source_name: "Yahoo Finance".to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ImpactError::SymbolNotFound(symbol.to_string()));
        }

        if !response.status().is_success() {
            return Err(ImpactError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        let chart_response: ChartResponse = response
            .json()
            .await
            .map_err(|e| ImpactError::Parse(e.to_string()))?;

        // Check for API-level errors
        if let Some(error) = chart_response.chart.error {
            if error.code == "Not Found" {
                return Err(ImpactError::SymbolNotFound(symbol.to_string()));
            }
            return Err(ImpactError::Other(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        self.parse_chart_response(symbol, chart_response)
    }
}

// ============================================================================
// Yahoo Finance API Response Types
// ============================================================================

/// Chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Vec<ChartData>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chart_url() {
        let source = YahooSource::new();
        let symbol = Symbol::new("IVV");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        let url = source.build_chart_url(&symbol, start, end);

        assert!(url.contains("IVV"));
        assert!(url.contains("interval=1d"));
        assert!(url.contains("includeAdjustedClose=true"));
    }

    #[test]
    fn test_source_info() {
        let source = YahooSource::new();

        assert_eq!(source.name(), "Yahoo Finance");
        assert!(!source.description().is_empty());
    }

    #[test]
    fn test_default() {
        let source = YahooSource::default();
        assert_eq!(source.name(), "Yahoo Finance");
    }

    #[test]
    fn test_parse_chart_response_prefers_adjusted() {
        let source = YahooSource::new();
        let symbol = Symbol::new("IVV");
        // 2024-01-02 and 2024-01-03 at 14:30 UTC.
        let response = ChartResponse {
            chart: ChartResult {
                result: vec![ChartData {
                    timestamp: Some(vec![1_704_205_800, 1_704_292_200]),
                    indicators: Indicators {
                        quote: vec![QuoteData {
                            close: vec![Some(480.5), Some(482.1)],
                        }],
                        adjclose: Some(vec![AdjClose {
                            adjclose: vec![Some(478.0), None],
                        }]),
                    },
                }],
                error: None,
            },
        };

        let closes = source.parse_chart_response(&symbol, response).unwrap();
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(closes[0].close, 478.0);
        // Missing adjusted entry falls back to the raw close.
        assert_eq!(closes[1].close, 482.1);
    }

    #[test]
    fn test_parse_chart_response_empty_is_unavailable() {
        let source = YahooSource::new();
        let symbol = Symbol::new("IVV");
        let response = ChartResponse {
            chart: ChartResult {
                result: vec![ChartData {
                    timestamp: None,
                    indicators: Indicators {
                        quote: vec![QuoteData { close: vec![] }],
                        adjclose: None,
                    },
                }],
                error: None,
            },
        };

        let result = source.parse_chart_response(&symbol, response);
        assert!(matches!(result, Err(ImpactError::DataNotAvailable { .. })));
    }
}
