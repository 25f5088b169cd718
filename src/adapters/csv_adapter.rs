//! CSV directory data source: one `<SYMBOL>.csv` per symbol.
//!
//! Expected columns: `date,open,high,low,close,volume` with ISO dates.

use crate::domain::error::MomfolioError;
use crate::domain::ohlcv::{OhlcvBar, PriceSeries};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

const CSV_SUFFIX: &str = ".csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{}{}", code, CSV_SUFFIX))
    }
}

fn field<T: FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    path: &str,
) -> Result<T, MomfolioError>
where
    T::Err: std::fmt::Display,
{
    let raw = record.get(index).ok_or_else(|| MomfolioError::DataSource {
        reason: format!("{}: missing {} column", path, name),
    })?;
    raw.trim().parse().map_err(|e| MomfolioError::DataSource {
        reason: format!("{}: invalid {} value '{}': {}", path, name, raw, e),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, MomfolioError> {
        let path = self.csv_path(code);
        let display = path.display().to_string();
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MomfolioError::NoData {
                code: code.to_string(),
            },
            _ => MomfolioError::DataSource {
                reason: format!("failed to read {}: {}", display, e),
            },
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| MomfolioError::DataSource {
                reason: format!("{}: CSV parse error: {}", display, e),
            })?;

            let date_str = record.get(0).ok_or_else(|| MomfolioError::DataSource {
                reason: format!("{}: missing date column", display),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                MomfolioError::DataSource {
                    reason: format!("{}: invalid date '{}': {}", display, date_str, e),
                }
            })?;

            if start_date.is_some_and(|start| date < start) || date > end_date {
                continue;
            }

            bars.push(OhlcvBar {
                code: code.to_string(),
                date,
                open: field(&record, 1, "open", &display)?,
                high: field(&record, 2, "high", &display)?,
                low: field(&record, 3, "low", &display)?,
                close: field(&record, 4, "close", &display)?,
                volume: field(&record, 5, "volume", &display)?,
            });
        }

        debug!(symbol = code, bars = bars.len(), "loaded csv bars");
        Ok(PriceSeries::new(code, bars))
    }

    fn list_symbols(&self) -> Result<Vec<String>, MomfolioError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| MomfolioError::DataSource {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MomfolioError::DataSource {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(code) = name_str.strip_suffix(CSV_SUFFIX) {
                if !code.is_empty() {
                    symbols.push(code.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
