use std::path::PathBuf;

pub const CSV_URL: &str = "https://www.cboe.com/available_weeklys/get_csv_download/";
pub const ARCHIVE_DIR: &str = "weeklys_archive";
/// Real IV costs two extra requests per ticker. Turn off to report beta only.
pub const FETCH_REAL_IV: bool = true;

pub struct Config {
    pub source_url: String,
    pub archive_dir: String,
    pub fetch_real_iv: bool,
    pub user_agent: String,
    pub progress_interval: usize,
    pub debug_mode: bool,
    pub debug_ticker_limit: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            source_url: CSV_URL.to_string(),
            archive_dir: ARCHIVE_DIR.to_string(),
            fetch_real_iv: FETCH_REAL_IV,
            user_agent: "Mozilla/5.0".to_string(),
            progress_interval: 10,
            debug_mode: false,
            debug_ticker_limit: 10,
        }
    }

    pub fn with_source_url(mut self, url: &str) -> Self {
        self.source_url = url.to_string();
        self
    }

    pub fn with_archive_dir(mut self, dir: &str) -> Self {
        self.archive_dir = dir.to_string();
        self
    }

    pub fn with_fetch_real_iv(mut self, fetch_real_iv: bool) -> Self {
        self.fetch_real_iv = fetch_real_iv;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval.max(1);
        self
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub fn with_debug_ticker_limit(mut self, limit: usize) -> Self {
        self.debug_ticker_limit = limit;
        self
    }

    /// `<archive>/raw_weeklys_<date>.csv`
    pub fn raw_snapshot_path(&self, date_str: &str) -> PathBuf {
        PathBuf::from(&self.archive_dir).join(format!("raw_weeklys_{}.csv", date_str))
    }

    /// `<archive>/enriched_weeklys_<date>.csv`
    pub fn enriched_report_path(&self, date_str: &str) -> PathBuf {
        PathBuf::from(&self.archive_dir).join(format!("enriched_weeklys_{}.csv", date_str))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
