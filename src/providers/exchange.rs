use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::ExchangeSource;
use crate::core::currency::CurrencyPair;
use crate::core::rate::{RateProvider, is_valid_rate};

/// A price as exchanges send it: a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Number(f64),
    Text(String),
}

impl PriceValue {
    fn to_rate(&self) -> Result<f64> {
        let rate = match self {
            PriceValue::Number(n) => *n,
            PriceValue::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| anyhow!("Price '{s}' is not a number"))?,
        };
        if !is_valid_rate(rate) {
            return Err(anyhow!("Price {rate} is not a usable rate"));
        }
        Ok(rate)
    }
}

#[derive(Debug, Deserialize)]
struct NestedPrice {
    price: PriceValue,
}

/// Accepted response shapes, tried in declaration order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceResponse {
    /// `{"price": ...}`
    TopLevel { price: PriceValue },
    /// `{"data": {"price": ...}}`
    Nested { data: NestedPrice },
}

impl PriceResponse {
    fn price(&self) -> &PriceValue {
        match self {
            PriceResponse::TopLevel { price } => price,
            PriceResponse::Nested { data } => &data.price,
        }
    }
}

/// Quotes pairs from one exchange's HTTP ticker endpoint.
pub struct ExchangeRateProvider {
    exchange: ExchangeSource,
    source_id: String,
    client: reqwest::Client,
}

impl ExchangeRateProvider {
    pub fn new(exchange: ExchangeSource, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("xrate/0.1")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ExchangeRateProvider {
            source_id: exchange.source_id(),
            exchange,
            client,
        })
    }

    fn request_url(&self, pair: &CurrencyPair) -> Url {
        let value = self
            .exchange
            .template
            .render(pair.from.code(), pair.to.code());
        let mut url = self.exchange.url.clone();
        url.query_pairs_mut()
            .append_pair(&self.exchange.param, &value);
        url
    }
}

#[async_trait]
impl RateProvider for ExchangeRateProvider {
    fn source(&self) -> &str {
        &self.source_id
    }

    #[instrument(
        name = "ExchangeRateFetch",
        skip(self),
        fields(source = %self.source_id, pair = %pair)
    )]
    async fn get_rate(&self, pair: &CurrencyPair) -> Result<f64> {
        let url = self.request_url(pair);
        debug!("Requesting rate from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for pair: {} URL: {}", e, pair, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for pair: {}",
                response.status(),
                pair
            ));
        }

        let text = response.text().await?;

        let data: PriceResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse price response for {}: {}", pair, e))?;

        let rate = data
            .price()
            .to_rate()
            .with_context(|| format!("Invalid price for {pair}"))?;
        debug!(rate, "Received rate");
        Ok(rate)
    }
}
