#![allow(dead_code)]

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use momfolio::cli::Settings;
use momfolio::domain::config::{DataSettings, FileSettings, MomentumConfig};
use momfolio::domain::error::MomfolioError;
pub use momfolio::domain::ohlcv::{OhlcvBar, PriceSeries};
use momfolio::domain::portfolio::Portfolio;
use momfolio::ports::data_port::DataPort;
use momfolio::domain::report::{MonitorReport, RebalanceReport};
use momfolio::ports::portfolio_port::{PortfolioStore, StoreLock};
use momfolio::ports::report_port::ReportPort;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub delays: HashMap<String, Duration>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            delays: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }

    pub fn with_delay(mut self, code: &str, delay: Duration) -> Self {
        self.delays.insert(code.to_string(), delay);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, MomfolioError> {
        if let Some(delay) = self.delays.get(code) {
            thread::sleep(*delay);
        }
        if let Some(reason) = self.errors.get(code) {
            return Err(MomfolioError::DataSource {
                reason: reason.clone(),
            });
        }
        let bars = self.data.get(code).ok_or_else(|| MomfolioError::NoData {
            code: code.to_string(),
        })?;
        let bars = bars
            .iter()
            .filter(|b| start_date.is_none_or(|s| b.date >= s) && b.date <= end_date)
            .cloned()
            .collect();
        Ok(PriceSeries::new(code, bars))
    }

    fn list_symbols(&self) -> Result<Vec<String>, MomfolioError> {
        let mut symbols: Vec<String> = self
            .data
            .keys()
            .chain(self.errors.keys())
            .cloned()
            .collect();
        symbols.sort();
        symbols.dedup();
        Ok(symbols)
    }
}

/// Portfolio store held in memory, with the same lock semantics as the file store.
pub struct MemoryStore {
    pub portfolio: Mutex<Option<Portfolio>>,
    pub locked: Arc<Mutex<bool>>,
    pub saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new(portfolio: Option<Portfolio>) -> Self {
        Self {
            portfolio: Mutex::new(portfolio),
            locked: Arc::new(Mutex::new(false)),
            saves: Mutex::new(0),
        }
    }

    pub fn current(&self) -> Option<Portfolio> {
        self.portfolio.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

impl PortfolioStore for MemoryStore {
    fn load(&self) -> Result<Option<Portfolio>, MomfolioError> {
        Ok(self.current())
    }

    fn save(&self, portfolio: &Portfolio) -> Result<(), MomfolioError> {
        *self.portfolio.lock().unwrap() = Some(portfolio.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }

    fn lock(&self) -> Result<StoreLock, MomfolioError> {
        let mut locked = self.locked.lock().unwrap();
        if *locked {
            return Err(MomfolioError::Locked {
                path: "memory".to_string(),
            });
        }
        *locked = true;
        let flag = Arc::clone(&self.locked);
        Ok(StoreLock::new(move || {
            *flag.lock().unwrap() = false;
        }))
    }
}

/// Keeps written reports in memory.
pub struct MemoryReports {
    pub rebalances: Mutex<Vec<RebalanceReport>>,
    pub monitors: Mutex<Vec<MonitorReport>>,
}

impl ReportPort for MemoryReports {
    fn write_rebalance(&self, report: &RebalanceReport) -> Result<PathBuf, MomfolioError> {
        self.rebalances.lock().unwrap().push(report.clone());
        Ok(PathBuf::from("memory/rebalance_results.json"))
    }

    fn write_monitor(&self, report: &MonitorReport) -> Result<PathBuf, MomfolioError> {
        self.monitors.lock().unwrap().push(report.clone());
        Ok(PathBuf::from("memory/monitoring_results.json"))
    }
}

pub fn memory_reports() -> MemoryReports {
    MemoryReports {
        rebalances: Mutex::new(Vec::new()),
        monitors: Mutex::new(Vec::new()),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
}

/// Evaluation date used across the integration tests.
pub fn as_of() -> NaiveDate {
    date(2024, 5, 31)
}

pub fn make_bar(code: &str, date: NaiveDate, close: f64) -> OhlcvBar {
    OhlcvBar {
        code: code.to_string(),
        date,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 10_000,
    }
}

/// One bar per calendar day ending on `end`, oldest first.
pub fn bars_from_closes(code: &str, end: NaiveDate, closes: &[f64]) -> Vec<OhlcvBar> {
    let n = closes.len() as i64;
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(code, end - chrono::Duration::days(n - 1 - i as i64), close))
        .collect()
}

/// Steady uptrend with a small alternating wobble so volatility is non-zero.
/// A larger `daily_gain` gives a higher Sharpe.
pub fn trending_closes(count: usize, start_price: f64, daily_gain: f64) -> Vec<f64> {
    let mut closes = Vec::with_capacity(count);
    let mut price = start_price;
    for i in 0..count {
        let wobble = if i % 2 == 0 { 1.004 } else { 0.996 };
        closes.push(price * wobble);
        price *= 1.0 + daily_gain;
    }
    closes
}

pub fn trending_bars(code: &str, count: usize, daily_gain: f64) -> Vec<OhlcvBar> {
    bars_from_closes(code, as_of(), &trending_closes(count, 100.0, daily_gain))
}

/// Exchange holidays applied every year, (month, day). Sixteen dates, most on
/// weekdays, similar to an NSE calendar.
const EXCHANGE_HOLIDAYS: [(u32, u32); 16] = [
    (1, 26), (3, 8), (3, 25), (3, 29), (4, 11), (4, 17), (5, 1), (5, 20),
    (6, 17), (7, 17), (8, 15), (10, 2), (11, 1), (11, 15), (11, 20), (12, 25),
];

/// Trading dates from `start` to `end`: weekdays minus exchange holidays.
pub fn exchange_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .filter(|d| !EXCHANGE_HOLIDAYS.contains(&(d.month(), d.day())))
        .collect()
}

/// Steady uptrend on an exchange calendar covering `years` before `end`.
pub fn exchange_bars(code: &str, end: NaiveDate, years: i64, daily_gain: f64) -> Vec<OhlcvBar> {
    let dates = exchange_dates(end - chrono::Duration::days(365 * years), end);
    let closes = trending_closes(dates.len(), 100.0, daily_gain);
    dates
        .into_iter()
        .zip(closes)
        .map(|(date, close)| make_bar(code, date, close))
        .collect()
}

/// Settings for in-memory runs: explicit universe, no timeout.
pub fn settings(universe: &[&str], momentum: MomentumConfig, workers: usize) -> Settings {
    Settings {
        momentum,
        data: DataSettings {
            path: None,
            universe: Some(universe.iter().map(|s| s.to_string()).collect()),
            workers,
            fetch_timeout_secs: 0,
        },
        files: FileSettings {
            portfolio_file: PathBuf::from("current_portfolio.json"),
            results_dir: PathBuf::from("."),
        },
    }
}

/// CSV body in the layout the CSV adapter reads.
pub fn csv_content(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date, b.open, b.high, b.low, b.close, b.volume
        ));
    }
    out
}
