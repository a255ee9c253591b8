use crate::config::Config;
use crate::data_provider::MarketDataProvider;
use crate::errors::{Result, WeeklysError};
use crate::models::market::{OptionChain, OptionContract, TickerInfo};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info};
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query2.finance.yahoo.com/v1/test/getcrumb";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const OPTIONS_URL: &str = "https://query2.finance.yahoo.com/v7/finance/options";

const INFO_MODULES: &str = "financialData,assetProfile,summaryDetail,defaultKeyStatistics";
const CALENDAR_MODULES: &str = "calendarEvents";

/// Yahoo Finance 行情数据提供者
///
/// The JSON endpoints want a session cookie plus a crumb token. Both are
/// fetched on first use and kept for the life of the provider.
pub struct YahooProvider {
    client: Client,
    crumb: Mutex<Option<String>>,
}

impl YahooProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()
            .map_err(|e| WeeklysError::RequestError(e))?;

        Ok(Self {
            client,
            crumb: Mutex::new(None),
        })
    }

    async fn crumb(&self) -> Result<String> {
        let mut cached = self.crumb.lock().await;
        if let Some(crumb) = cached.as_ref() {
            return Ok(crumb.clone());
        }

        // fc.yahoo.com answers 404 but still sets the session cookie
        self.client.get(COOKIE_URL).send().await?;

        let crumb = self.client
            .get(CRUMB_URL)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?
            .trim()
            .to_string();

        if crumb.is_empty() || crumb.contains('<') {
            return Err(WeeklysError::ProviderError("Yahoo returned no crumb".to_string()));
        }

        info!("Obtained Yahoo Finance crumb");
        *cached = Some(crumb.clone());
        Ok(crumb)
    }

    async fn quote_summary(&self, symbol: &str, modules: &str) -> Result<Value> {
        let crumb = self.crumb().await?;
        debug!("quoteSummary {} [{}]", symbol, modules);

        let json: Value = self.client
            .get(format!("{}/{}", QUOTE_SUMMARY_URL, symbol))
            .query(&[("modules", modules), ("crumb", crumb.as_str())])
            .send()
            .await?
            .json()
            .await?;

        extract_result(json, "quoteSummary", symbol)
    }

    async fn options(&self, symbol: &str, expiration: Option<DateTime<Utc>>) -> Result<Value> {
        let crumb = self.crumb().await?;
        debug!("options {} {:?}", symbol, expiration);

        let mut query = vec![("crumb", crumb)];
        if let Some(expiration) = expiration {
            query.push(("date", expiration.timestamp().to_string()));
        }

        let json: Value = self.client
            .get(format!("{}/{}", OPTIONS_URL, symbol))
            .query(&query)
            .send()
            .await?
            .json()
            .await?;

        extract_result(json, "optionChain", symbol)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn provider_name(&self) -> &'static str {
        "Yahoo Finance"
    }

    async fn fetch_info(&self, symbol: &str) -> Result<TickerInfo> {
        let result = self.quote_summary(symbol, INFO_MODULES).await?;
        Ok(parse_ticker_info(&result))
    }

    async fn fetch_earnings_calendar(&self, symbol: &str) -> Result<Vec<NaiveDate>> {
        let result = self.quote_summary(symbol, CALENDAR_MODULES).await?;
        Ok(parse_earnings_dates(&result))
    }

    async fn fetch_option_expirations(&self, symbol: &str) -> Result<Vec<DateTime<Utc>>> {
        let result = self.options(symbol, None).await?;
        Ok(parse_expirations(&result))
    }

    async fn fetch_option_chain(&self, symbol: &str, expiration: DateTime<Utc>) -> Result<OptionChain> {
        let result = self.options(symbol, Some(expiration)).await?;
        parse_option_chain(&result, expiration)
    }
}

/// Unwraps `{"<root>": {"result": [..], "error": ..}}` to the first result.
fn extract_result(json: Value, root: &str, symbol: &str) -> Result<Value> {
    let body = json
        .get(root)
        .ok_or_else(|| WeeklysError::ProviderError(format!("{}: missing {} in response", symbol, root)))?;

    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let description = error
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or("unknown error");
        return Err(WeeklysError::ProviderError(format!("{}: {}", symbol, description)));
    }

    body.get("result")
        .and_then(|r| r.as_array())
        .and_then(|r| r.first())
        .cloned()
        .ok_or_else(|| WeeklysError::ProviderError(format!("{}: empty {} result", symbol, root)))
}

/// Yahoo wraps most numbers as `{"raw": 1.2, "fmt": "1.20"}`; options use bare numbers.
fn raw_f64(value: Option<&Value>) -> Option<f64> {
    let value = value?;
    value
        .get("raw")
        .and_then(|r| r.as_f64())
        .or_else(|| value.as_f64())
}

fn parse_ticker_info(result: &Value) -> TickerInfo {
    let current_price = raw_f64(result.pointer("/financialData/currentPrice"));
    let sector = result
        .pointer("/assetProfile/sector")
        .and_then(|s| s.as_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    let beta = raw_f64(result.pointer("/summaryDetail/beta"))
        .or_else(|| raw_f64(result.pointer("/defaultKeyStatistics/beta")));

    TickerInfo {
        current_price,
        sector,
        beta,
    }
}

fn parse_earnings_dates(result: &Value) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    if let Some(entries) = result
        .pointer("/calendarEvents/earnings/earningsDate")
        .and_then(|d| d.as_array())
    {
        for entry in entries {
            let from_raw = entry
                .get("raw")
                .and_then(|r| r.as_i64())
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.date_naive());
            let date = from_raw.or_else(|| {
                entry
                    .get("fmt")
                    .and_then(|f| f.as_str())
                    .and_then(|f| NaiveDate::parse_from_str(f, "%Y-%m-%d").ok())
            });
            if let Some(date) = date {
                dates.push(date);
            }
        }
    }
    dates
}

fn parse_expirations(result: &Value) -> Vec<DateTime<Utc>> {
    result
        .get("expirationDates")
        .and_then(|d| d.as_array())
        .map(|dates| {
            dates
                .iter()
                .filter_map(|d| d.as_i64())
                .filter_map(|ts| DateTime::from_timestamp(ts, 0))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_option_chain(result: &Value, expiration: DateTime<Utc>) -> Result<OptionChain> {
    let calls = result
        .pointer("/options/0/calls")
        .and_then(|c| c.as_array())
        .ok_or_else(|| WeeklysError::ProviderError(format!("no option chain for {}", expiration.date_naive())))?;

    let calls = calls
        .iter()
        .filter_map(|call| {
            let strike = raw_f64(call.get("strike"))?;
            Some(OptionContract {
                contract_symbol: call
                    .get("contractSymbol")
                    .and_then(|s| s.as_str())
                    .unwrap_or_default()
                    .to_string(),
                strike,
                implied_volatility: raw_f64(call.get("impliedVolatility")),
            })
        })
        .collect();

    Ok(OptionChain { expiration, calls })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn quote_summary_error_is_provider_error() {
        let json = json!({
            "quoteSummary": {
                "result": null,
                "error": {"code": "Not Found", "description": "Quote not found for symbol: ZZZZ"}
            }
        });
        match extract_result(json, "quoteSummary", "ZZZZ") {
            Err(WeeklysError::ProviderError(msg)) => assert!(msg.contains("Quote not found")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_result_is_provider_error() {
        let json = json!({"optionChain": {"result": [], "error": null}});
        assert!(extract_result(json, "optionChain", "ZZZZ").is_err());
        assert!(extract_result(json!({}), "optionChain", "ZZZZ").is_err());
    }

    #[test]
    fn ticker_info_reads_raw_values() {
        let json = json!({
            "quoteSummary": {
                "result": [{
                    "financialData": {"currentPrice": {"raw": 187.5, "fmt": "187.50"}},
                    "assetProfile": {"sector": "Technology"},
                    "summaryDetail": {"beta": {}},
                    "defaultKeyStatistics": {"beta": {"raw": 1.24, "fmt": "1.24"}}
                }],
                "error": null
            }
        });
        let result = extract_result(json, "quoteSummary", "AAPL").unwrap();
        let info = parse_ticker_info(&result);
        assert_eq!(info.current_price, Some(187.5));
        assert_eq!(info.sector.as_deref(), Some("Technology"));
        assert_eq!(info.beta, Some(1.24));
    }

    #[test]
    fn ticker_info_missing_fields_are_none() {
        let info = parse_ticker_info(&json!({"summaryDetail": {}}));
        assert_eq!(info, TickerInfo::default());
    }

    #[test]
    fn earnings_dates_from_raw_or_fmt() {
        let result = json!({
            "calendarEvents": {
                "earnings": {
                    "earningsDate": [
                        {"raw": 1746014400, "fmt": "2025-04-30"},
                        {"fmt": "2025-05-05"}
                    ]
                }
            }
        });
        assert_eq!(
            parse_earnings_dates(&result),
            vec![
                NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
                NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
            ]
        );
        assert!(parse_earnings_dates(&json!({"calendarEvents": {}})).is_empty());
    }

    #[test]
    fn option_chain_and_expirations() {
        let result = json!({
            "underlyingSymbol": "AAPL",
            "expirationDates": [1742515200, 1743120000],
            "options": [{
                "expirationDate": 1742515200,
                "calls": [
                    {"contractSymbol": "AAPL250321C00185000", "strike": 185.0, "impliedVolatility": 0.3421},
                    {"contractSymbol": "AAPL250321C00190000", "strike": 190.0},
                    {"contractSymbol": "BROKEN"}
                ]
            }]
        });

        let expirations = parse_expirations(&result);
        assert_eq!(expirations.len(), 2);
        assert_eq!(expirations[0].timestamp(), 1742515200);

        let chain = parse_option_chain(&result, expirations[0]).unwrap();
        assert_eq!(chain.calls.len(), 2);
        assert_eq!(chain.calls[0].implied_volatility, Some(0.3421));
        assert_eq!(chain.calls[1].implied_volatility, None);
    }

    #[test]
    fn missing_options_block_is_error() {
        let expiration = DateTime::from_timestamp(1742515200, 0).unwrap();
        assert!(parse_option_chain(&json!({"options": []}), expiration).is_err());
    }
}
