//! Yahoo Finance quote provider.
//!
//! Uses the `spark` endpoint, which answers a comma-separated list of
//! symbols in one request. Yahoo symbols carry the market as a suffix
//! (`AI.PA`, `RACE.MI`) and crypto pairs use a dash (`BTC-EUR`).

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::amount::decimal_from_f64;
use crate::quotes::{QuoteSource, QuoteTable};

const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = concat!("networth/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct SparkEnvelope {
    spark: SparkBody,
}

#[derive(Debug, Deserialize)]
struct SparkBody {
    #[serde(default)]
    result: Option<Vec<SparkResult>>,
    #[serde(default)]
    error: Option<SparkError>,
}

#[derive(Debug, Deserialize)]
struct SparkError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SparkResult {
    symbol: String,
    #[serde(default)]
    response: Vec<SparkSeries>,
}

#[derive(Debug, Deserialize)]
struct SparkSeries {
    #[serde(default)]
    meta: Option<SparkMeta>,
    #[serde(default)]
    indicators: Option<SparkIndicators>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SparkMeta {
    #[serde(default)]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct SparkIndicators {
    #[serde(default)]
    quote: Vec<SparkQuote>,
}

#[derive(Debug, Deserialize)]
struct SparkQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl SparkSeries {
    /// Last non-null close of the day, else the regular market price.
    fn last_close(&self) -> Option<f64> {
        let close = self
            .indicators
            .as_ref()
            .and_then(|i| i.quote.first())
            .and_then(|q| q.close.iter().rev().find_map(|c| *c));
        close.or_else(|| self.meta.as_ref().and_then(|m| m.regular_market_price))
    }
}

/// Batched last-close quotes from Yahoo Finance.
pub struct YahooQuoteSource {
    client: Client,
    base_url: String,
}

impl YahooQuoteSource {
    /// Create a source whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(client))
    }

    /// Create a source with a custom HTTP client.
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: YAHOO_BASE_URL.to_string(),
        }
    }

    /// Point the source at another host (mirrors, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn parse_response(envelope: SparkEnvelope) -> Result<QuoteTable> {
        let body = envelope.spark;
        let results = match (body.result, body.error) {
            (Some(results), _) => results,
            (None, Some(err)) => {
                return Err(anyhow!(
                    "Yahoo Finance error {}: {}",
                    err.code.unwrap_or_default(),
                    err.description.unwrap_or_default()
                ))
            }
            (None, None) => Vec::new(),
        };

        Ok(results
            .into_iter()
            .filter_map(|result| {
                let price = result
                    .response
                    .first()
                    .and_then(SparkSeries::last_close)
                    .and_then(decimal_from_f64)?;
                Some((result.symbol, price))
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl QuoteSource for YahooQuoteSource {
    async fn fetch_last_close(&self, symbols: &[String]) -> Result<QuoteTable> {
        if symbols.is_empty() {
            return Ok(QuoteTable::new());
        }

        let url = format!("{}/v7/finance/spark", self.base_url);
        let joined = symbols.join(",");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbols", joined.as_str()),
                ("range", "1d"),
                ("interval", "1d"),
            ])
            .header("Accept", "application/json")
            .send()
            .await
            .context("Yahoo Finance request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Yahoo Finance returned status {}: {}", status, body));
        }

        let envelope: SparkEnvelope = response
            .json()
            .await
            .context("Failed to decode Yahoo Finance response")?;
        Self::parse_response(envelope)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
