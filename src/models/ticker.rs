use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use crate::util;

pub const NOT_AVAILABLE: &str = "N/A";
pub const ERROR_SECTOR: &str = "Error";

/// Ticker → company name, as parsed from the CBOE list.
pub type TickerMap = HashMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TickerRecord {
    pub ticker: String,
    pub name: String,
}

/// The five fields looked up per ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerMetrics {
    pub price: f64,
    pub sector: String,
    pub beta: Option<f64>,
    pub earnings_date: Option<NaiveDate>,
    pub implied_volatility: Option<f64>,
}

impl TickerMetrics {
    /// Sentinel used when the ticker cannot be looked up at all.
    pub fn degraded() -> Self {
        Self {
            price: 0.0,
            sector: ERROR_SECTOR.to_string(),
            beta: Some(0.0),
            earnings_date: None,
            implied_volatility: None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.sector == ERROR_SECTOR
    }
}

/// One row of the enriched report. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Price", serialize_with = "serialize_number")]
    pub price: f64,
    #[serde(rename = "Sector")]
    pub sector: String,
    #[serde(rename = "Earnings", serialize_with = "serialize_date")]
    pub earnings_date: Option<NaiveDate>,
    #[serde(rename = "Beta", serialize_with = "serialize_optional_number")]
    pub beta: Option<f64>,
    #[serde(rename = "IV", serialize_with = "serialize_percent")]
    pub implied_volatility: Option<f64>,
}

impl EnrichedRecord {
    pub const HEADERS: [&'static str; 7] =
        ["Ticker", "Name", "Price", "Sector", "Earnings", "Beta", "IV"];

    pub fn new(record: TickerRecord, metrics: TickerMetrics) -> Self {
        Self {
            ticker: record.ticker,
            name: record.name,
            price: metrics.price,
            sector: metrics.sector,
            earnings_date: metrics.earnings_date,
            beta: metrics.beta,
            implied_volatility: metrics.implied_volatility,
        }
    }
}

fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string())
}

fn serialize_optional_number<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_str(&v.to_string()),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}

fn serialize_date<S: Serializer>(
    value: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}

fn serialize_percent<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_str(&util::format_percent(*v)),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ticker: &str) -> TickerRecord {
        TickerRecord {
            ticker: ticker.to_string(),
            name: format!("{} INC", ticker),
        }
    }

    fn render(row: &EnrichedRecord) -> String {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(vec![]);
        writer.serialize(row).unwrap();
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn degraded_record_renders_sentinels() {
        let row = EnrichedRecord::new(record("ZZZZ"), TickerMetrics::degraded());
        assert_eq!(render(&row), "ZZZZ,ZZZZ INC,0,Error,N/A,0,N/A\n");
    }

    #[test]
    fn populated_fields_render() {
        let metrics = TickerMetrics {
            price: 187.5,
            sector: "Technology".to_string(),
            beta: Some(1.24),
            earnings_date: NaiveDate::from_ymd_opt(2025, 4, 30),
            implied_volatility: Some(0.3421),
        };
        let row = EnrichedRecord::new(record("AAPL"), metrics);
        assert_eq!(render(&row), "AAPL,AAPL INC,187.5,Technology,2025-04-30,1.24,34.21%\n");
    }

    #[test]
    fn missing_beta_is_not_available() {
        let metrics = TickerMetrics {
            beta: None,
            ..TickerMetrics::degraded()
        };
        let row = EnrichedRecord::new(record("SPY"), metrics);
        assert_eq!(render(&row), "SPY,SPY INC,0,Error,N/A,N/A,N/A\n");
    }
}
