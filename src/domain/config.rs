//! Screening/rebalancing parameters and run settings.
//!
//! Read from the `[portfolio]`, `[data]` and `[files]` sections through
//! [`ConfigPort`]. Unknown keys are ignored; missing keys take the defaults
//! below. Call [`validate_config`](super::config_validation::validate_config)
//! first; the builders assume structurally valid values.

use crate::domain::error::MomfolioError;
use crate::domain::indicator::high::HighReference;
use crate::domain::indicator::sharpe::lookback_bars;
use crate::domain::indicator::WEEK_52_BARS;
use crate::ports::config_port::ConfigPort;
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_MAX_STOCKS: i64 = 30;
pub const DEFAULT_EXIT_RANK: i64 = 60;
pub const DEFAULT_DMA_PERIOD: i64 = 200;
pub const DEFAULT_LOOKBACK_PERIODS: &str = "3,6,9,12";
pub const DEFAULT_HIGH_PERCENTAGE_THRESHOLD: f64 = 30.0;
pub const DEFAULT_VOLUME_PERIOD: i64 = 20;
pub const DEFAULT_WORKERS: i64 = 4;
pub const DEFAULT_FETCH_TIMEOUT_SECS: i64 = 30;
pub const DEFAULT_PORTFOLIO_FILE: &str = "current_portfolio.json";

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumConfig {
    pub max_stocks: usize,
    pub exit_rank: usize,
    pub dma_period: usize,
    /// Lookback windows in months, in configured order.
    pub lookback_periods: Vec<u32>,
    pub high_percentage_threshold: f64,
    pub use_all_time_high: bool,
    /// Minimum trailing average volume; 0 disables the volume stage.
    pub min_avg_volume: f64,
    pub volume_period: usize,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            max_stocks: DEFAULT_MAX_STOCKS as usize,
            exit_rank: DEFAULT_EXIT_RANK as usize,
            dma_period: DEFAULT_DMA_PERIOD as usize,
            lookback_periods: vec![3, 6, 9, 12],
            high_percentage_threshold: DEFAULT_HIGH_PERCENTAGE_THRESHOLD,
            use_all_time_high: false,
            min_avg_volume: 0.0,
            volume_period: DEFAULT_VOLUME_PERIOD as usize,
        }
    }
}

impl MomentumConfig {
    /// Exit rank never sits inside the top `max_stocks`.
    pub fn effective_exit_rank(&self) -> usize {
        self.exit_rank.max(self.max_stocks)
    }

    /// The longest lookback drives the ranking score.
    pub fn primary_lookback(&self) -> Option<u32> {
        self.lookback_periods.iter().copied().max()
    }

    pub fn high_reference(&self) -> HighReference {
        HighReference::from_all_time_flag(self.use_all_time_high)
    }

    /// Bars needed so every filter and every lookback can be evaluated.
    pub fn required_bars(&self) -> usize {
        let lookback = self
            .primary_lookback()
            .map(lookback_bars)
            .unwrap_or(0);
        (lookback + 1).max(self.dma_period).max(WEEK_52_BARS)
    }
}

impl fmt::Display for MomentumConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lookbacks: Vec<String> = self.lookback_periods.iter().map(|m| m.to_string()).collect();
        writeln!(f, "[portfolio]")?;
        writeln!(f, "max_stocks = {}", self.max_stocks)?;
        writeln!(f, "exit_rank = {}", self.exit_rank)?;
        writeln!(f, "dma_period = {}", self.dma_period)?;
        writeln!(f, "lookback_periods = {}", lookbacks.join(","))?;
        writeln!(f, "high_percentage_threshold = {}", self.high_percentage_threshold)?;
        writeln!(f, "use_all_time_high = {}", self.use_all_time_high)?;
        writeln!(f, "min_avg_volume = {}", self.min_avg_volume)?;
        write!(f, "volume_period = {}", self.volume_period)
    }
}

/// Where bars come from and how they are fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub path: Option<PathBuf>,
    /// Explicit universe; `None` means every symbol the data source lists.
    pub universe: Option<Vec<String>>,
    pub workers: usize,
    /// Per-symbol fetch timeout in seconds; 0 disables.
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileSettings {
    pub portfolio_file: PathBuf,
    pub results_dir: PathBuf,
}

/// Boolean spellings accepted in config files.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

pub fn parse_lookback_periods(input: &str) -> Result<Vec<u32>, MomfolioError> {
    let invalid = |reason: String| MomfolioError::ConfigInvalid {
        section: "portfolio".to_string(),
        key: "lookback_periods".to_string(),
        reason,
    };

    let mut periods = Vec::new();
    for token in input.split(',') {
        let trimmed = token.trim().trim_matches(|c| c == '[' || c == ']').trim();
        if trimmed.is_empty() {
            return Err(invalid("empty entry in lookback list".to_string()));
        }
        let months: u32 = trimmed
            .parse()
            .map_err(|_| invalid(format!("'{}' is not a whole number of months", trimmed)))?;
        if months == 0 {
            return Err(invalid("lookback periods must be at least 1 month".to_string()));
        }
        periods.push(months);
    }
    Ok(periods)
}

pub fn build_momentum_config(config: &dyn ConfigPort) -> Result<MomentumConfig, MomfolioError> {
    let lookback_str = config
        .get_string("portfolio", "lookback_periods")
        .unwrap_or_else(|| DEFAULT_LOOKBACK_PERIODS.to_string());

    let momentum = MomentumConfig {
        max_stocks: config.get_int("portfolio", "max_stocks", DEFAULT_MAX_STOCKS) as usize,
        exit_rank: config.get_int("portfolio", "exit_rank", DEFAULT_EXIT_RANK) as usize,
        dma_period: config.get_int("portfolio", "dma_period", DEFAULT_DMA_PERIOD) as usize,
        lookback_periods: parse_lookback_periods(&lookback_str)?,
        high_percentage_threshold: config.get_double(
            "portfolio",
            "high_percentage_threshold",
            DEFAULT_HIGH_PERCENTAGE_THRESHOLD,
        ),
        use_all_time_high: config.get_bool("portfolio", "use_all_time_high", false),
        min_avg_volume: config.get_double("portfolio", "min_avg_volume", 0.0),
        volume_period: config.get_int("portfolio", "volume_period", DEFAULT_VOLUME_PERIOD)
            as usize,
    };

    if momentum.exit_rank < momentum.max_stocks {
        warn!(
            exit_rank = momentum.exit_rank,
            max_stocks = momentum.max_stocks,
            "exit_rank below max_stocks; using max_stocks as exit rank"
        );
    }

    Ok(momentum)
}

pub fn build_data_settings(config: &dyn ConfigPort) -> Result<DataSettings, MomfolioError> {
    let universe = match config
        .get_string("data", "universe")
        .filter(|s| !s.trim().is_empty())
    {
        Some(list) => Some(
            crate::domain::universe::parse_codes(&list).map_err(|e| {
                MomfolioError::ConfigInvalid {
                    section: "data".to_string(),
                    key: "universe".to_string(),
                    reason: e.to_string(),
                }
            })?,
        ),
        None => None,
    };

    Ok(DataSettings {
        path: config.get_string("data", "path").map(PathBuf::from),
        universe,
        workers: config.get_int("data", "workers", DEFAULT_WORKERS) as usize,
        fetch_timeout_secs: config
            .get_int("data", "fetch_timeout_secs", DEFAULT_FETCH_TIMEOUT_SECS)
            as u64,
    })
}

pub fn build_file_settings(config: &dyn ConfigPort) -> FileSettings {
    FileSettings {
        portfolio_file: config
            .get_string("files", "portfolio_file")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PORTFOLIO_FILE)),
        results_dir: config
            .get_string("files", "results_dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

/// Sample configuration written by `init-config`.
pub fn sample_config() -> String {
    format!(
        "{}\n\n[data]\npath = data\n# universe = RELIANCE.NS,TCS.NS,HDFCBANK.NS\nworkers = {}\nfetch_timeout_secs = {}\n\n[files]\nportfolio_file = {}\nresults_dir = .\n",
        MomentumConfig::default(),
        DEFAULT_WORKERS,
        DEFAULT_FETCH_TIMEOUT_SECS,
        DEFAULT_PORTFOLIO_FILE,
    )
}
