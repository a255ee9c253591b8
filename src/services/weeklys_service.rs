use crate::config::Config;
use crate::data_provider::MarketDataProvider;
use crate::errors::Result;
use crate::models::ticker::{EnrichedRecord, TickerMap, TickerMetrics};
use crate::scrapers::base::WeeklysSource;
use crate::services::enrichment;
use crate::util::{self, csv_utils};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// 数据服务：下载、解析、补充行情并生成报告
pub struct WeeklysService {
    config: Config,
    source: Arc<dyn WeeklysSource + Send + Sync>,
    provider: Arc<dyn MarketDataProvider + Send + Sync>,
}

impl WeeklysService {
    pub fn new(
        config: Config,
        source: Arc<dyn WeeklysSource + Send + Sync>,
        provider: Arc<dyn MarketDataProvider + Send + Sync>,
    ) -> Self {
        Self {
            config,
            source,
            provider,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Download, parse, enrich and report.
    ///
    /// Returns `Ok(None)` when the download failed; nothing else runs in that case.
    pub async fn run(&self) -> Result<Option<PathBuf>> {
        util::ensure_archive_dir(&self.config.archive_dir)?;

        let today = chrono::Local::now().format("%Y-%m-%d").to_string();
        let raw_file = match self.fetch_snapshot(&today).await {
            Some(path) => path,
            None => {
                warn!("No snapshot downloaded, skipping enrichment");
                return Ok(None);
            }
        };

        self.run_from_snapshot(&raw_file).await.map(Some)
    }

    /// Parse and enrich an already archived raw snapshot.
    pub async fn run_from_snapshot(&self, raw_file: &Path) -> Result<PathBuf> {
        util::ensure_archive_dir(&self.config.archive_dir)?;

        let date_str = util::date_str_from_snapshot(raw_file)?;
        let data = csv_utils::parse_weeklys_csv(raw_file);
        info!("Parsed {} tickers from {}", data.len(), raw_file.display());

        self.save_enriched_report(&data, &date_str).await
    }

    /// Writes the raw download to `raw_weeklys_<date>.csv`. Any failure is
    /// logged and reported as `None`.
    pub async fn fetch_snapshot(&self, date_str: &str) -> Option<PathBuf> {
        match self.try_fetch_snapshot(date_str).await {
            Ok(path) => Some(path),
            Err(e) => {
                error!("Error downloading from {}: {}", self.source.source_name(), e);
                None
            }
        }
    }

    async fn try_fetch_snapshot(&self, date_str: &str) -> Result<PathBuf> {
        let bytes = self.source.fetch_weeklys_csv().await?;

        util::ensure_archive_dir(&self.config.archive_dir)?;
        let path = self.config.raw_snapshot_path(date_str);
        fs::write(&path, &bytes)?;

        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    pub async fn enrich(&self, symbol: &str) -> TickerMetrics {
        enrichment::enrich_ticker(self.provider.as_ref(), symbol, self.config.fetch_real_iv).await
    }

    /// One row per ticker in lexicographic order, written as it is enriched.
    pub async fn save_enriched_report(&self, data_map: &TickerMap, date_str: &str) -> Result<PathBuf> {
        let path = self.config.enriched_report_path(date_str);
        let mut records = util::sorted_records(data_map);

        // 调试模式：只处理前N个股票
        if self.config.debug_mode {
            util::limit_tickers(&mut records, self.config.debug_ticker_limit);
            info!("DEBUG MODE: Processing only {} tickers", records.len());
        }

        info!(
            "Enriching data for {} tickers from {} (this may take a moment)...",
            records.len(),
            self.provider.provider_name()
        );

        let mut writer = csv_utils::create_report_writer(&path)?;
        let total = records.len();
        let mut degraded = 0;

        for (i, record) in records.into_iter().enumerate() {
            let count = i + 1;
            if count % self.config.progress_interval.max(1) == 0 {
                info!("Processing {}/{}...", count, total);
            }

            let metrics = self.enrich(&record.ticker).await;
            if metrics.is_degraded() {
                degraded += 1;
            }

            let row = EnrichedRecord::new(record, metrics);
            csv_utils::write_report_row(&mut writer, &row)?;
        }

        info!(
            "Done! Enriched file saved to: {} ({} rows, {} degraded)",
            path.display(),
            total,
            degraded
        );
        Ok(path)
    }
}
