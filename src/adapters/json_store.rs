//! JSON documents on the local filesystem.
//!
//! Holds the portfolio document and writes result documents into a results
//! directory. Every write goes to a `.tmp` sibling first and is renamed into
//! place, so a crash never leaves a half-written document behind.

use crate::domain::error::MomfolioError;
use crate::domain::portfolio::Portfolio;
use crate::domain::report::{MonitorReport, RebalanceReport};
use crate::ports::portfolio_port::{PortfolioStore, StoreLock};
use crate::ports::report_port::ReportPort;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct JsonStore {
    portfolio_file: PathBuf,
    results_dir: PathBuf,
}

impl JsonStore {
    pub fn new(portfolio_file: PathBuf, results_dir: PathBuf) -> Self {
        Self {
            portfolio_file,
            results_dir,
        }
    }

    pub fn portfolio_file(&self) -> &Path {
        &self.portfolio_file
    }

    pub fn lock_path(&self) -> PathBuf {
        with_suffix(&self.portfolio_file, ".lock")
    }

    fn write_document<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), MomfolioError> {
        let persistence = |reason: String| MomfolioError::Persistence {
            path: path.display().to_string(),
            reason,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| persistence(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(value)?;
        let tmp = with_suffix(path, ".tmp");
        fs::write(&tmp, json.as_bytes()).map_err(|e| persistence(e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            persistence(e.to_string())
        })?;
        debug!(path = %path.display(), "wrote document");
        Ok(())
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

impl PortfolioStore for JsonStore {
    fn load(&self) -> Result<Option<Portfolio>, MomfolioError> {
        let path = &self.portfolio_file;
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no saved portfolio");
                return Ok(None);
            }
            Err(e) => {
                return Err(MomfolioError::Persistence {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let portfolio: Portfolio =
            serde_json::from_str(&content).map_err(|e| MomfolioError::Persistence {
                path: path.display().to_string(),
                reason: format!("malformed portfolio document: {}", e),
            })?;
        let portfolio = portfolio.normalized();
        debug!(path = %path.display(), stocks = portfolio.len(), "loaded portfolio");
        Ok(Some(portfolio))
    }

    fn save(&self, portfolio: &Portfolio) -> Result<(), MomfolioError> {
        self.write_document(&self.portfolio_file, portfolio)?;
        info!(
            path = %self.portfolio_file.display(),
            stocks = portfolio.len(),
            "saved portfolio"
        );
        Ok(())
    }

    fn lock(&self) -> Result<StoreLock, MomfolioError> {
        let lock_path = self.lock_path();
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => MomfolioError::Locked {
                    path: lock_path.display().to_string(),
                },
                _ => MomfolioError::Persistence {
                    path: lock_path.display().to_string(),
                    reason: e.to_string(),
                },
            })?;
        // Holder pid, for whoever finds a stale lock.
        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            warn!(path = %lock_path.display(), error = %e, "failed to record pid in portfolio lock");
        }

        debug!(path = %lock_path.display(), "acquired portfolio lock");
        Ok(StoreLock::new(move || {
            if let Err(e) = fs::remove_file(&lock_path) {
                warn!(path = %lock_path.display(), error = %e, "failed to release portfolio lock");
            }
        }))
    }
}

impl ReportPort for JsonStore {
    fn write_rebalance(&self, report: &RebalanceReport) -> Result<PathBuf, MomfolioError> {
        let path = self.results_dir.join(format!(
            "rebalance_results_{}.json",
            report.rebalance_date.format("%Y%m%d")
        ));
        self.write_document(&path, report)?;
        Ok(path)
    }

    fn write_monitor(&self, report: &MonitorReport) -> Result<PathBuf, MomfolioError> {
        let path = self.results_dir.join(format!(
            "monitoring_results_{}.json",
            report.monitoring_date.format("%Y%m%d")
        ));
        self.write_document(&path, report)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::monitor::MonitorOutcome;
    use crate::domain::portfolio::Holding;
    use chrono::{NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> JsonStore {
        JsonStore::new(dir.path().join("current_portfolio.json"), dir.path().join("results"))
    }

    #[test]
    fn load_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).load().unwrap(), None);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let portfolio = Portfolio::rebalanced(
            vec![Holding {
                symbol: "TCS".into(),
                rank: 1,
            }],
            now,
        );

        store.save(&portfolio).unwrap();
        assert_eq!(store.load().unwrap(), Some(portfolio));
        assert!(!with_suffix(store.portfolio_file(), ".tmp").exists());
    }

    #[test]
    fn load_accepts_minimal_document() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.portfolio_file(), r#"{"stocks": ["TCS", "INFY", "TCS"]}"#).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.symbols(), &["TCS", "INFY"]);
        assert_eq!(loaded.last_rebalance, None);
    }

    #[test]
    fn malformed_document_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.portfolio_file(), "{not json").unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, MomfolioError::Persistence { .. }));
    }

    #[test]
    fn second_lock_is_refused_until_release() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let guard = store.lock().unwrap();
        assert!(store.lock_path().exists());
        let err = store.lock().unwrap_err();
        assert!(matches!(err, MomfolioError::Locked { .. }));

        drop(guard);
        assert!(!store.lock_path().exists());
        assert!(store.lock().is_ok());
    }

    #[test]
    fn lock_file_records_holder_pid() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let _guard = store.lock().unwrap();
        let content = std::fs::read_to_string(store.lock_path()).unwrap();
        assert_eq!(content.trim(), std::process::id().to_string());
    }

    #[test]
    fn monitor_report_lands_in_results_dir() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let report = MonitorReport::build(
            Utc.with_ymd_and_hms(2024, 6, 3, 10, 0, 0).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            &MonitorOutcome { checks: vec![] },
        );

        let path = store.write_monitor(&report).unwrap();
        assert_eq!(path, dir.path().join("results").join("monitoring_results_20240603.json"));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["portfolio_size"], 0);
    }
}
