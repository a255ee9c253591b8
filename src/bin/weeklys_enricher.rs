use weeklys_enricher::config::{self, Config};
use weeklys_enricher::data_provider::YahooProvider;
use weeklys_enricher::scrapers::cboe::CboeScraper;
use weeklys_enricher::services::weeklys_service::WeeklysService;

use anyhow::Context;
use clap::{App, Arg};
use log::info;
use std::path::Path;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = App::new("Weeklys Enricher")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Downloads the CBOE weeklys list and enriches every ticker with market data")
        .arg(
            Arg::with_name("url")
                .long("url")
                .value_name("URL")
                .help("CSV download URL")
                .takes_value(true)
                .default_value(config::CSV_URL),
        )
        .arg(
            Arg::with_name("archive-dir")
                .short('a')
                .long("archive-dir")
                .value_name("DIR")
                .help("Directory for raw snapshots and enriched reports")
                .takes_value(true)
                .default_value(config::ARCHIVE_DIR),
        )
        .arg(
            Arg::with_name("no-iv")
                .long("no-iv")
                .help("Skip the option chain lookups (IV column becomes N/A)")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("raw-file")
                .short('r')
                .long("raw-file")
                .value_name("PATH")
                .help("Enrich an archived raw_weeklys_<date>.csv instead of downloading")
                .takes_value(true),
        );

    // 在开发模式下添加调试参数
    #[cfg(debug_assertions)]
    let app = app
        .arg(
            Arg::with_name("debug")
                .long("debug")
                .help("Enable debug mode")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("debug-limit")
                .long("debug-limit")
                .help("Limit the number of tickers to enrich in debug mode")
                .takes_value(true)
                .default_value("10"),
        );

    let matches = app.get_matches();

    #[cfg(debug_assertions)]
    let debug_mode = matches.is_present("debug");
    #[cfg(not(debug_assertions))]
    let debug_mode = false;

    #[cfg(debug_assertions)]
    let debug_ticker_limit = matches.value_of("debug-limit")
        .unwrap_or("10")
        .parse::<usize>()
        .unwrap_or(10);
    #[cfg(not(debug_assertions))]
    let debug_ticker_limit = usize::MAX;

    let url = matches.value_of("url").unwrap_or(config::CSV_URL);
    let archive_dir = matches.value_of("archive-dir").unwrap_or(config::ARCHIVE_DIR);
    let fetch_real_iv = config::FETCH_REAL_IV && !matches.is_present("no-iv");

    let config = Config::new()
        .with_source_url(url)
        .with_archive_dir(archive_dir)
        .with_fetch_real_iv(fetch_real_iv)
        .with_debug_mode(debug_mode)
        .with_debug_ticker_limit(debug_ticker_limit);

    if !config.fetch_real_iv {
        info!("Implied volatility lookups disabled");
    }

    let source = Arc::new(CboeScraper::new(&config)?);
    let provider = Arc::new(YahooProvider::new(&config)?);
    let service = WeeklysService::new(config, source, provider);

    if let Some(raw_file) = matches.value_of("raw-file") {
        service
            .run_from_snapshot(Path::new(raw_file))
            .await
            .with_context(|| format!("failed to enrich {}", raw_file))?;
    } else {
        service.run().await.context("failed to write enriched report")?;
    }

    Ok(())
}
