use crate::errors::Result;
use async_trait::async_trait;

/// Source of the raw weeklys list
#[async_trait]
pub trait WeeklysSource {
    /// Short name used in log lines
    fn source_name(&self) -> &'static str;

    /// Download the raw CSV document, byte for byte
    async fn fetch_weeklys_csv(&self) -> Result<Vec<u8>>;
}
