//! Foreign-exchange rates: remote sources, the on-disk cache and the loader
//! that combines them.

pub mod cache;
pub mod loader;
pub mod source;

pub use cache::{CachedRates, RateCache};
pub use loader::{load_rates, LoadedRates, RateOrigin};
pub use source::{ExchangeRateApi, ExchangeRateHost, RateSource};

use crate::config::{Config, Provider};
use anyhow::Result;

/// Why a rate fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateSourceError {
    #[error("API key not found. Set api_key in the config file or FXTABLE_API_KEY")]
    MissingApiKey,

    #[error("rate source returned status {0}")]
    Status(u16),

    #[error("rate request failed: {0}")]
    Request(String),

    #[error("rate source reported an error: {0}")]
    Api(String),

    #[error("could not decode rate response: {0}")]
    Decode(String),
}

/// Normalizes a base currency code to three uppercase ASCII letters.
pub fn normalize_base(base: &str) -> Result<String> {
    let code = base.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        anyhow::bail!("Invalid currency code: '{}'. Expected three letters such as SGD.", base.trim());
    }
    Ok(code)
}

/// Builds the rate source selected by the configuration.
pub fn rate_source(config: &Config) -> Result<Box<dyn RateSource>> {
    let base_url = config.rate_base_url();
    let source: Box<dyn RateSource> = match config.provider {
        Provider::ExchangeRateApi => {
            Box::new(ExchangeRateApi::with_base_url(base_url, config.api_key.clone())?)
        }
        Provider::ExchangeRateHost => Box::new(ExchangeRateHost::with_base_url(base_url)?),
    };
    Ok(source)
}
