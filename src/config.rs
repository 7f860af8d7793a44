//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Currency every price is converted into
    #[serde(default = "default_base_currency")]
    pub base_currency: String,

    /// API key for providers that need one
    #[serde(default)]
    pub api_key: Option<String>,

    /// Exchange-rate provider
    #[serde(default)]
    pub provider: Provider,

    /// Overrides the provider's base URL
    #[serde(default)]
    pub rate_api_url: Option<String>,

    /// Proxy URL for page fetches (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Price column used when no package is named
    #[serde(default = "default_price_column")]
    pub price_column: usize,

    /// Package (column header) to convert
    #[serde(default)]
    pub package: Option<String>,

    /// Price column header in spreadsheets
    #[serde(default = "default_sheet_price_header")]
    pub sheet_price_header: String,

    /// Number of entries in the cheapest summary
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Directory holding the rate cache
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Always fetch rates, never read or write the cache
    #[serde(default)]
    pub no_cache: bool,
}

fn default_base_currency() -> String {
    "SGD".to_string()
}

fn default_price_column() -> usize {
    1
}

fn default_sheet_price_header() -> String {
    "Premium+ Tier Annual Pricing (Web)".to_string()
}

fn default_top_n() -> usize {
    crate::pricing::DEFAULT_TOP_N
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            api_key: None,
            provider: Provider::default(),
            rate_api_url: None,
            proxy: None,
            price_column: default_price_column(),
            package: None,
            sheet_price_header: default_sheet_price_header(),
            top_n: default_top_n(),
            format: OutputFormat::Table,
            cache_dir: None,
            no_cache: false,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("fxtable.toml");
        if local_config.exists() {
            debug!("Found fxtable.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("fxtable").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var("FXTABLE_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }

        if let Ok(base) = std::env::var("FXTABLE_BASE") {
            if !base.trim().is_empty() {
                self.base_currency = base.trim().to_uppercase();
            }
        }

        if let Ok(provider) = std::env::var("FXTABLE_PROVIDER") {
            if let Ok(p) = provider.parse() {
                self.provider = p;
            }
        }

        self
    }

    /// Base URL of the rate provider, honouring the override.
    pub fn rate_base_url(&self) -> String {
        self.rate_api_url
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }

    /// Location of the rate cache file, if one can be determined.
    pub fn cache_path(&self) -> Option<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Some(dir.join("rates.json")),
            None => dirs::cache_dir().map(|d| d.join("fxtable").join("rates.json")),
        }
    }
}

/// Exchange-rate provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    /// Key-based v6 API, whole table per base currency
    #[default]
    #[serde(rename = "exchangerate-api")]
    ExchangeRateApi,
    /// Keyless API queried with an explicit symbol list
    #[serde(rename = "exchangerate-host")]
    ExchangeRateHost,
}

impl Provider {
    /// Production base URL.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::ExchangeRateApi => "https://v6.exchangerate-api.com",
            Provider::ExchangeRateHost => "https://api.exchangerate.host",
        }
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exchangerate-api" | "api" => Ok(Provider::ExchangeRateApi),
            "exchangerate-host" | "host" => Ok(Provider::ExchangeRateHost),
            _ => Err(format!(
                "Unknown provider: {}. Use: exchangerate-api, exchangerate-host",
                s
            )),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::ExchangeRateApi => write!(f, "exchangerate-api"),
            Provider::ExchangeRateHost => write!(f, "exchangerate-host"),
        }
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
