// 公开导出的模块，供外部使用
pub mod models;
pub mod data_provider;
pub mod errors;
pub mod scrapers;
pub mod services;
pub mod config;

#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use data_provider::{MarketDataProvider, YahooProvider};
pub use errors::{Result, WeeklysError};
pub use models::market::{OptionChain, OptionContract, TickerInfo};
pub use models::ticker::{EnrichedRecord, TickerMap, TickerMetrics, TickerRecord};
pub use scrapers::base::WeeklysSource;
pub use scrapers::cboe::CboeScraper;
pub use services::weeklys_service::WeeklysService;
