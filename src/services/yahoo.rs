//! Yahoo Finance chart API as the quote source

use crate::config::QuoteSettings;
use crate::error::FetchError;
use crate::models::Quote;
use crate::services::join_segments;
use crate::services::market_data::QuoteProvider;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

const SERVICE: &str = "yahoo";

// The chart endpoint refuses requests without a browser-like agent.
const BROWSER_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 ",
    "(KHTML, like Gecko) Chrome/120.0 Safari/537.36"
);

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl ChartResponse {
    /// Last non-null close of the first series, if any
    fn last_close(&self) -> Option<f64> {
        self.chart
            .result
            .as_ref()?
            .first()?
            .indicators
            .as_ref()?
            .quote
            .first()?
            .close
            .iter()
            .rev()
            .find_map(|c| *c)
    }
}

pub struct YahooQuoteProvider {
    client: reqwest::Client,
    settings: QuoteSettings,
}

impl YahooQuoteProvider {
    pub fn new(client: reqwest::Client, settings: QuoteSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait::async_trait]
impl QuoteProvider for YahooQuoteProvider {
    async fn latest_close(&self, ticker: &str) -> Result<Option<Quote>, FetchError> {
        let url = join_segments(&self.settings.api_url, &["v8", "finance", "chart", ticker])
            .map_err(|source| FetchError::Url {
                service: SERVICE,
                source,
            })?;

        let response = self
            .client
            .get(url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(ticker = %ticker, "Yahoo has no chart for {}", ticker);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let payload: ChartResponse = response.json().await.map_err(|e| FetchError::Decode {
            service: SERVICE,
            reason: e.to_string(),
        })?;

        Ok(payload.last_close().map(|price| Quote {
            ticker: ticker.to_string(),
            price,
        }))
    }
}
