//! Client for the external exchange-rate service.
//!
//! The service authenticates with an access key in the query string, so
//! requests here never go through the session `Authenticator`.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::Config;
use crate::models::CurrencyQuote;

use super::client::{parse_base_url, REQUEST_TIMEOUT_SECS};
use super::ApiError;

/// Base URL of the hosted exchange-rate service
pub const DEFAULT_CURRENCY_BASE_URL: &str = "http://api.currencylayer.com/";

#[derive(Clone)]
pub struct CurrencyClient {
    client: Client,
    base_url: Url,
    access_key: String,
}

impl CurrencyClient {
    pub fn new(base_url: &str, access_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: parse_base_url(base_url)?,
            access_key: access_key.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let key = config
            .currency_access_key
            .as_deref()
            .ok_or_else(|| {
                anyhow::anyhow!("No currency access key configured (set STOREFRONT_CURRENCY_KEY)")
            })?;
        Self::new(&config.currency_base_url, key)
    }

    /// Fetch live rates from `source` into each of the comma-separated `currencies`.
    pub async fn fetch_live(&self, currencies: &str, source: &str) -> Result<CurrencyQuote> {
        let url = self
            .base_url
            .join("api/live")
            .context("Invalid currency endpoint")?;
        debug!(%url, currencies, source, "Fetching live currency rates");

        let response = self
            .client
            .get(url)
            .query(&[
                ("access_key", self.access_key.as_str()),
                ("currencies", currencies),
                ("source", source),
                ("format", "1"),
            ])
            .send()
            .await
            .map_err(ApiError::from)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body).into());
        }

        let quote: CurrencyQuote = response
            .json()
            .await
            .context("Failed to parse currency response")?;

        if !quote.success {
            let info = quote
                .error
                .as_ref()
                .and_then(|e| e.info.clone())
                .unwrap_or_else(|| "currency service reported failure".to_string());
            return Err(ApiError::InvalidResponse(info).into());
        }

        Ok(quote)
    }
}
