//! JSON message protocol between a front end and the conversion engine.
//!
//! Requests are tagged by `action`, responses by `status`:
//!
//! ```json
//! {"action":"getPackages"}
//! {"status":"packages","packages":["Basic","Premium"]}
//! ```

use crate::config::Config;
use crate::fx::{self, load_rates, RateCache, RateOrigin, RateSource};
use crate::pricing::{self, currency, ConversionReport, PriceRow, RateTable};
use crate::scrape::{ColumnChoice, PricingTable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Requests a front end can send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Load rates for a base currency (the session's when omitted)
    FetchExchangeRates {
        #[serde(default)]
        base: Option<String>,
    },
    /// List the package columns of the loaded pricing table
    GetPackages,
    /// Switch base currency (and optionally package), then convert the loaded table
    UpdateCurrency {
        currency: String,
        #[serde(default)]
        package: Option<String>,
    },
    /// Convert rows supplied with the request
    ConvertRows {
        rows: Vec<PriceRow>,
        #[serde(default)]
        base: Option<String>,
    },
}

/// Responses, one per request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Response {
    Rates {
        base: String,
        origin: RateOrigin,
        fetched_on: Option<NaiveDate>,
        rates: RateTable,
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
    Packages {
        packages: Vec<String>,
    },
    Converted {
        report: ConversionReport,
        #[serde(skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
    Error {
        message: String,
    },
}

impl Response {
    fn error(message: impl std::fmt::Display) -> Self {
        Response::Error { message: message.to_string() }
    }
}

/// Conversion state shared by consecutive requests.
pub struct Session {
    table: Option<PricingTable>,
    base: String,
    choice: ColumnChoice,
    top_n: usize,
    source: Box<dyn RateSource>,
    cache: RateCache,
    today: Option<NaiveDate>,
}

impl Session {
    /// Creates a session over an optional pricing table.
    pub fn new(
        config: &Config,
        source: Box<dyn RateSource>,
        cache: RateCache,
        table: Option<PricingTable>,
    ) -> Self {
        Self {
            table,
            base: config.base_currency.trim().to_uppercase(),
            choice: ColumnChoice::from_options(config.package.as_deref(), config.price_column),
            top_n: config.top_n,
            source,
            cache,
            today: None,
        }
    }

    /// Pins the date used for cache freshness (for testing).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Current base currency.
    pub fn base(&self) -> &str {
        &self.base
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Handles one raw JSON request line.
    pub async fn handle_line(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => {
                debug!("Rejecting malformed request: {}", e);
                Response::error(format!("Invalid request: {}", e))
            }
        }
    }

    /// Handles one request.
    pub async fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::FetchExchangeRates { base } => self.fetch_rates(base.as_deref()).await,
            Request::GetPackages => match &self.table {
                Some(table) => Response::Packages { packages: table.packages() },
                None => Response::error("No pricing table loaded"),
            },
            Request::UpdateCurrency { currency, package } => {
                self.update_currency(&currency, package).await
            }
            Request::ConvertRows { rows, base } => {
                let base = match base {
                    Some(b) => match fx::normalize_base(&b) {
                        Ok(b) => b,
                        Err(e) => return Response::error(e),
                    },
                    None => self.base.clone(),
                };
                self.convert(&rows, &base).await
            }
        }
    }

    async fn fetch_rates(&mut self, base: Option<&str>) -> Response {
        let base = match base.map(fx::normalize_base).transpose() {
            Ok(b) => b.unwrap_or_else(|| self.base.clone()),
            Err(e) => return Response::error(e),
        };

        let symbols = match &self.table {
            Some(table) => match table.price_rows(&self.choice) {
                Ok(rows) => pricing::required_codes(&rows),
                Err(_) => all_codes(),
            },
            None => all_codes(),
        };

        let today = self.today();
        let loaded = load_rates(self.source.as_ref(), &mut self.cache, &base, &symbols, today).await;

        Response::Rates {
            base,
            origin: loaded.origin,
            fetched_on: loaded.fetched_on,
            rates: loaded.table,
            warning: loaded.error.map(|e| e.to_string()),
        }
    }

    async fn update_currency(&mut self, currency: &str, package: Option<String>) -> Response {
        let base = match fx::normalize_base(currency) {
            Ok(b) => b,
            Err(e) => return Response::error(e),
        };

        let Some(table) = &self.table else {
            return Response::error("No pricing table loaded");
        };

        let choice = match package {
            Some(name) if !name.trim().is_empty() => ColumnChoice::Package(name.trim().to_string()),
            _ => self.choice.clone(),
        };

        let rows = match table.price_rows(&choice) {
            Ok(rows) => rows,
            Err(e) => return Response::error(e),
        };

        debug!("Switching base currency {} -> {}", self.base, base);
        self.base = base.clone();
        self.choice = choice;

        self.convert(&rows, &base).await
    }

    async fn convert(&mut self, rows: &[PriceRow], base: &str) -> Response {
        let symbols = pricing::required_codes(rows);
        let today = self.today();
        let loaded = load_rates(self.source.as_ref(), &mut self.cache, base, &symbols, today).await;

        let warning = loaded.error.map(|e| {
            warn!("Converting with {} rates: {}", loaded.origin, e);
            e.to_string()
        });

        Response::Converted {
            report: pricing::convert_all_top(rows, &loaded.table, self.top_n),
            warning,
        }
    }
}

fn all_codes() -> Vec<String> {
    currency::currencies().into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fx::RateSourceError;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    /// Mock source: rates for SGD and USD bases, failure for anything else.
    struct MockSource;

    #[async_trait]
    impl RateSource for MockSource {
        async fn fetch(&self, base: &str, _symbols: &[String]) -> Result<RateTable, RateSourceError> {
            match base {
                "SGD" => Ok(RateTable::new("SGD", [("JPY", 110.5), ("EUR", 0.68), ("USD", 0.74)])),
                "USD" => Ok(RateTable::new("USD", [("JPY", 150.0), ("EUR", 0.92), ("USD", 1.0)])),
                _ => Err(RateSourceError::Status(500)),
            }
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    const PAGE: &str = r#"
        <table>
            <tr><th>Country</th><th>Basic</th><th>Premium</th></tr>
            <tr><td>Japan</td><td>¥1,500</td><td>¥3,000</td></tr>
            <tr><td>Germany</td><td>9,99 €</td><td>19,99 €</td></tr>
            <tr><td>United States</td><td>$10.00</td><td>$20.00</td></tr>
        </table>
    "#;

    fn session(with_table: bool) -> Session {
        let table = with_table.then(|| PricingTable::parse(PAGE).unwrap());
        Session::new(&Config::default(), Box::new(MockSource), RateCache::in_memory(), table)
            .with_today(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
    }

    fn to_json(response: &Response) -> Value {
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn test_request_wire_format() {
        let request: Request =
            serde_json::from_value(json!({"action": "updateCurrency", "currency": "USD"})).unwrap();
        assert_eq!(request, Request::UpdateCurrency { currency: "USD".into(), package: None });

        let request: Request = serde_json::from_value(json!({"action": "getPackages"})).unwrap();
        assert_eq!(request, Request::GetPackages);

        let request: Request = serde_json::from_value(json!({
            "action": "convertRows",
            "rows": [{"country": "Japan", "raw_price": "¥1,500"}]
        }))
        .unwrap();
        assert!(matches!(request, Request::ConvertRows { ref rows, base: None } if rows.len() == 1));
    }

    #[tokio::test]
    async fn test_get_packages() {
        let mut session = session(true);
        let response = to_json(&session.handle(Request::GetPackages).await);
        assert_eq!(response, json!({"status": "packages", "packages": ["Basic", "Premium"]}));
    }

    #[tokio::test]
    async fn test_get_packages_without_table() {
        let mut session = session(false);
        let response = to_json(&session.handle(Request::GetPackages).await);
        assert_eq!(response["status"], "error");
        assert_eq!(response["message"], "No pricing table loaded");
    }

    #[tokio::test]
    async fn test_fetch_exchange_rates() {
        let mut session = session(true);
        let response = to_json(&session.handle(Request::FetchExchangeRates { base: None }).await);

        assert_eq!(response["status"], "rates");
        assert_eq!(response["base"], "SGD");
        assert_eq!(response["origin"], "fetched");
        assert_eq!(response["fetchedOn"], "2024-03-01");
        assert_eq!(response["rates"]["rates"]["JPY"], 110.5);
        assert!(response.get("warning").is_none());

        let again = to_json(&session.handle(Request::FetchExchangeRates { base: None }).await);
        assert_eq!(again["origin"], "cache");
    }

    #[tokio::test]
    async fn test_fetch_exchange_rates_failure_is_not_fatal() {
        let mut session = session(true);
        let response =
            to_json(&session.handle(Request::FetchExchangeRates { base: Some("eur".into()) }).await);

        assert_eq!(response["status"], "rates");
        assert_eq!(response["base"], "EUR");
        assert_eq!(response["origin"], "empty");
        assert_eq!(response["warning"], "rate source returned status 500");
    }

    #[tokio::test]
    async fn test_update_currency_converts_table() {
        let mut session = session(true);
        let response = session
            .handle(Request::UpdateCurrency { currency: "usd".into(), package: Some("Premium".into()) })
            .await;

        let Response::Converted { report, warning } = response else {
            panic!("expected converted response");
        };
        assert!(warning.is_none());
        assert_eq!(report.base, "USD");
        assert_eq!(report.converted.len(), 3);
        assert_eq!(report.converted[0].value(), Some(20.0));
        assert_eq!(report.cheapest[0].display("USD"), "Japan: USD 20.00");
        assert_eq!(session.base(), "USD");
    }

    #[tokio::test]
    async fn test_update_currency_unknown_package() {
        let mut session = session(true);
        let response = to_json(
            &session
                .handle(Request::UpdateCurrency { currency: "SGD".into(), package: Some("Gold".into()) })
                .await,
        );
        assert_eq!(response["status"], "error");
        assert!(response["message"].as_str().unwrap().contains("Unknown package: Gold"));
        assert_eq!(session.base(), "SGD");
    }

    #[tokio::test]
    async fn test_update_currency_invalid_code() {
        let mut session = session(true);
        let response = to_json(
            &session.handle(Request::UpdateCurrency { currency: "dollars".into(), package: None }).await,
        );
        assert_eq!(response["status"], "error");
    }

    #[tokio::test]
    async fn test_convert_rows() {
        let mut session = session(false);
        let response = to_json(
            &session
                .handle_line(r#"{"action":"convertRows","rows":[{"country":"Japan","raw_price":"¥1,500"},{"country":"Atlantis","raw_price":"$5"}]}"#)
                .await,
        );

        assert_eq!(response["status"], "converted");
        assert_eq!(response["report"]["base"], "SGD");
        assert_eq!(response["report"]["converted"][0]["amount"], 13.57);
        assert_eq!(response["report"]["converted"][1]["amount"], "N/A");
        assert_eq!(response["report"]["cheapest"][0]["country"], "Japan");
    }

    #[tokio::test]
    async fn test_convert_rows_with_failed_rates() {
        let mut session = session(false);
        let response = session
            .handle(Request::ConvertRows { rows: vec![PriceRow::new("Japan", "¥1,500")], base: Some("GBP".into()) })
            .await;

        let Response::Converted { report, warning } = response else {
            panic!("expected converted response");
        };
        assert_eq!(report.failed_count(), 1);
        assert!(report.cheapest.is_empty());
        assert!(warning.unwrap().contains("500"));
    }

    #[tokio::test]
    async fn test_malformed_line() {
        let mut session = session(false);
        let response = to_json(&session.handle_line("{not json").await);
        assert_eq!(response["status"], "error");
        assert!(response["message"].as_str().unwrap().starts_with("Invalid request"));

        let response = to_json(&session.handle_line(r#"{"action":"launchRockets"}"#).await);
        assert_eq!(response["status"], "error");
    }
}
