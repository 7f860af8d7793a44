//! HTTP rate sources.

use super::RateSourceError;
use crate::pricing::RateTable;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use wreq::Client;

/// Trait for exchange-rate lookups - enables mocking for tests.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches rates relative to `base`.
    ///
    /// `symbols` lists the codes the caller needs. Sources that always return
    /// the whole table may ignore it.
    async fn fetch(&self, base: &str, symbols: &[String]) -> Result<RateTable, RateSourceError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Whether the returned table only covers the requested symbols.
    fn needs_symbols(&self) -> bool {
        false
    }
}

fn build_client() -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(15))
        .connect_timeout(Duration::from_secs(10))
        .build()?)
}

async fn get_text(client: &Client, url: &str) -> Result<String, RateSourceError> {
    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| RateSourceError::Request(e.to_string()))?;

    let status = response.status();
    debug!("Response status: {}", status);

    if !status.is_success() {
        return Err(RateSourceError::Status(status.as_u16()));
    }

    response.text().await.map_err(|e| RateSourceError::Request(e.to_string()))
}

/// Response of the key-based v6 API.
#[derive(Debug, Deserialize)]
struct ApiLatest {
    result: String,
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
}

/// Client for the key-based API returning the whole table of a base currency.
pub struct ExchangeRateApi {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExchangeRateApi {
    /// Creates a client against the production endpoint.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_base_url(crate::config::Provider::ExchangeRateApi.default_base_url(), api_key)
    }

    /// Creates a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }
}

#[async_trait]
impl RateSource for ExchangeRateApi {
    async fn fetch(&self, base: &str, _symbols: &[String]) -> Result<RateTable, RateSourceError> {
        let key = self.api_key.as_deref().ok_or(RateSourceError::MissingApiKey)?;

        let url = format!(
            "{}/v6/{}/latest/{}",
            self.base_url,
            urlencoding::encode(key),
            urlencoding::encode(base)
        );

        info!("Fetching exchange rates for {}", base);
        let body = get_text(&self.client, &url).await?;

        let parsed: ApiLatest =
            serde_json::from_str(&body).map_err(|e| RateSourceError::Decode(e.to_string()))?;

        if parsed.result != "success" {
            return Err(RateSourceError::Api(parsed.error_type.unwrap_or(parsed.result)));
        }

        debug!("Received {} rates", parsed.conversion_rates.len());
        Ok(RateTable::new(base, parsed.conversion_rates))
    }

    fn name(&self) -> &'static str {
        "exchangerate-api"
    }
}

/// Response of the keyless API.
#[derive(Debug, Deserialize)]
struct HostLatest {
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// Client for the keyless API queried with an explicit symbol list.
pub struct ExchangeRateHost {
    client: Client,
    base_url: String,
}

impl ExchangeRateHost {
    /// Creates a client against the production endpoint.
    pub fn new() -> Result<Self> {
        Self::with_base_url(crate::config::Provider::ExchangeRateHost.default_base_url())
    }

    /// Creates a client with a custom base URL (for testing).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RateSource for ExchangeRateHost {
    async fn fetch(&self, base: &str, symbols: &[String]) -> Result<RateTable, RateSourceError> {
        if symbols.is_empty() {
            debug!("No symbols requested, skipping fetch");
            return Ok(RateTable::empty(base));
        }

        let joined =
            symbols.iter().map(|s| urlencoding::encode(s).into_owned()).collect::<Vec<_>>().join(",");
        let url =
            format!("{}/latest?base={}&symbols={}", self.base_url, urlencoding::encode(base), joined);

        info!("Fetching {} exchange rates for {}", symbols.len(), base);
        let body = get_text(&self.client, &url).await?;

        let parsed: HostLatest =
            serde_json::from_str(&body).map_err(|e| RateSourceError::Decode(e.to_string()))?;

        match parsed.rates {
            Some(rates) => Ok(RateTable::new(base, rates)),
            None => {
                let message = parsed
                    .error
                    .map(|e| match e.get("info").and_then(|i| i.as_str()) {
                        Some(info) => info.to_string(),
                        None => e.to_string(),
                    })
                    .unwrap_or_else(|| "response has no rates".to_string());
                Err(RateSourceError::Api(message))
            }
        }
    }

    fn name(&self) -> &'static str {
        "exchangerate-host"
    }

    fn needs_symbols(&self) -> bool {
        true
    }
}
