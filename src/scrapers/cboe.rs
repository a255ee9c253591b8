use crate::config::Config;
use crate::errors::{Result, WeeklysError};
use crate::scrapers::base::WeeklysSource;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::USER_AGENT;
use reqwest::Client;

/// CBOE 每周期权列表下载器
pub struct CboeScraper {
    client: Client,
    url: String,
    user_agent: String,
}

impl CboeScraper {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| WeeklysError::RequestError(e))?;

        Ok(Self {
            client,
            url: config.source_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl WeeklysSource for CboeScraper {
    fn source_name(&self) -> &'static str {
        "CBOE"
    }

    async fn fetch_weeklys_csv(&self) -> Result<Vec<u8>> {
        info!("Downloading CBOE Data from: {}...", self.url);

        let response = self.client
            .get(&self.url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?
            .error_for_status()?;

        let bytes = response.bytes().await?;
        debug!("Received {} bytes from {}", bytes.len(), self.url);

        Ok(bytes.to_vec())
    }
}
