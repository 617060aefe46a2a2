use crate::core::{ConversionRate, RateSource};
use crate::utils::error::{CalcError, Result};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.frankfurter.app";

/// `GET /latest?from=EUR&to=JPY` 的回應
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeResponse {
    #[serde(default)]
    pub amount: f64,
    pub base: String,
    pub date: String,
    pub rates: HashMap<String, f64>,
}

/// Frankfurter exchange rate API client.
#[derive(Debug, Clone)]
pub struct FrankfurterClient {
    client: Client,
    endpoint: String,
}

impl FrankfurterClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn latest_url(&self) -> String {
        format!("{}/latest", self.endpoint)
    }
}

#[async_trait::async_trait]
impl RateSource for FrankfurterClient {
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<ConversionRate> {
        let url = self.latest_url();
        tracing::debug!("Making API request to: {} (from={}, to={})", url, from, to);

        let response = self
            .client
            .get(&url)
            .query(&[("from", from), ("to", to)])
            .send()
            .await?;

        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(CalcError::ApiStatusError {
                status: response.status().as_u16(),
                endpoint: url,
            });
        }

        let body: ExchangeResponse = response.json().await?;
        let rate = body
            .rates
            .get(to)
            .copied()
            .ok_or_else(|| CalcError::RateNotFoundError {
                currency: to.to_string(),
            })?;

        ConversionRate::new(rate, body.date)
    }
}
