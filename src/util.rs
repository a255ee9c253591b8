use log::info;
use std::fs;
use std::path::Path;

use crate::errors::{Result, WeeklysError};
use crate::models::ticker::{TickerMap, TickerRecord};

/// 0.3421 → "34.21%"
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

pub fn ensure_archive_dir(dir: &str) -> Result<()> {
    if !Path::new(dir).exists() {
        info!("Creating archive directory {}", dir);
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// `raw_weeklys_2025-03-21.csv` → `2025-03-21`
pub fn date_str_from_snapshot(path: &Path) -> Result<String> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| WeeklysError::DataError(format!("Invalid snapshot path: {}", path.display())))?;

    let date_str = file_name.strip_prefix("raw_weeklys_").unwrap_or(file_name);
    let date_str = date_str.strip_suffix(".csv").unwrap_or(date_str);
    Ok(date_str.to_string())
}

/// Lexicographic by ticker.
pub fn sorted_records(data_map: &TickerMap) -> Vec<TickerRecord> {
    let mut records: Vec<TickerRecord> = data_map
        .iter()
        .map(|(ticker, name)| TickerRecord {
            ticker: ticker.clone(),
            name: name.clone(),
        })
        .collect();
    records.sort();
    records
}

// 限制处理的股票数量
pub fn limit_tickers(records: &mut Vec<TickerRecord>, max_records: usize) {
    if records.len() > max_records {
        info!("Limiting {} tickers to {}", records.len(), max_records);
        records.truncate(max_records);
    }
}

pub mod csv_utils {
    use super::*;
    use crate::models::ticker::EnrichedRecord;
    use csv::{ReaderBuilder, Writer, WriterBuilder};
    use log::error;
    use regex::Regex;
    use std::collections::HashMap;
    use std::fs::File;

    const HEADER_MARKERS: [&str; 2] = ["Available Weeklys", "Ticker"];
    const DATE_PATTERN: &str = r"\d{1,2}/\d{1,2}/\d{2,4}";

    /// Builds the ticker → name map from a raw CBOE snapshot.
    ///
    /// A read or tokenizer error is logged and whatever was collected up to
    /// that row is returned.
    pub fn parse_weeklys_csv(path: &Path) -> TickerMap {
        let mut data_map = HashMap::new();
        if let Err(e) = collect_rows(path, &mut data_map) {
            error!("Error parsing {}: {}", path.display(), e);
        }
        data_map
    }

    fn collect_rows(path: &Path, data_map: &mut TickerMap) -> Result<()> {
        let bytes = fs::read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        let date_re = Regex::new(DATE_PATTERN)?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        for record in reader.records() {
            let row = record?;
            if row.len() < 2 {
                continue;
            }
            let col0 = row[0].trim();
            let col1 = row[1].trim();
            if col0.is_empty() || col1.is_empty() {
                continue;
            }
            if HEADER_MARKERS.iter().any(|m| col0.contains(m)) {
                continue;
            }
            // 第二列是日期的行不是公司名称
            if date_re.is_match(col1) {
                continue;
            }
            data_map.insert(col0.to_string(), col1.to_string());
        }
        Ok(())
    }

    /// Creates (or truncates) the report file and writes the header row.
    pub fn create_report_writer(path: &Path) -> Result<Writer<File>> {
        let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
        writer.write_record(EnrichedRecord::HEADERS)?;
        writer.flush()?;
        Ok(writer)
    }

    pub fn write_report_row(writer: &mut Writer<File>, row: &EnrichedRecord) -> Result<()> {
        writer.serialize(row)?;
        writer.flush()?;
        Ok(())
    }
}
