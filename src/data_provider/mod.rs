pub mod yahoo;

use crate::errors::Result;
use crate::models::market::{OptionChain, TickerInfo};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

pub use yahoo::YahooProvider;

/// Market data lookups used to enrich a ticker.
///
/// Every method is one independent lookup, so a failure in one leaves the
/// others usable.
#[async_trait]
pub trait MarketDataProvider {
    fn provider_name(&self) -> &'static str;

    /// Price, sector and beta. An error here means the ticker is unusable.
    async fn fetch_info(&self, symbol: &str) -> Result<TickerInfo>;

    /// Upcoming earnings dates, soonest first. May be empty.
    async fn fetch_earnings_calendar(&self, symbol: &str) -> Result<Vec<NaiveDate>>;

    /// Listed option expirations in the order the provider reports them.
    async fn fetch_option_expirations(&self, symbol: &str) -> Result<Vec<DateTime<Utc>>>;

    async fn fetch_option_chain(&self, symbol: &str, expiration: DateTime<Utc>) -> Result<OptionChain>;
}
