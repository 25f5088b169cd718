//! CLI definition and dispatch.

use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_store::JsonStore;
use crate::adapters::timeout_adapter::TimeoutAdapter;
use crate::domain::config::{
    DataSettings, FileSettings, MomentumConfig, build_data_settings, build_file_settings,
    build_momentum_config, sample_config,
};
use crate::domain::config_validation::validate_config;
use crate::domain::error::MomfolioError;
use crate::domain::monitor::{DmaStatus, monitor};
use crate::domain::portfolio::Portfolio;
use crate::domain::rebalancer::rebalance;
use crate::domain::report::{MonitorReport, RebalanceReport};
use crate::domain::screener::{ScreenOptions, screen};
use crate::domain::universe::resolve_universe;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::portfolio_port::PortfolioStore;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "momfolio",
    about = "Momentum portfolio screener, rebalancer and exit monitor"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Screen the universe and rebalance the portfolio
    Rebalance {
        #[arg(short, long)]
        config: PathBuf,
        /// Evaluation date (YYYY-MM-DD); bars after it are ignored
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Compute and print without saving anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Check the current portfolio for DMA breaks
    Monitor {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Print the effective configuration
    Config {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Write a sample configuration file
    InitConfig { path: PathBuf },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Rebalance {
            config,
            as_of,
            dry_run,
        } => run_rebalance(&config, as_of, dry_run),
        Command::Monitor { config, as_of } => run_monitor(&config, as_of),
        Command::Config { config } => run_show_config(&config),
        Command::InitConfig { path } => run_init_config(&path),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

/// Every setting a run needs, validated and resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub momentum: MomentumConfig,
    pub data: DataSettings,
    pub files: FileSettings,
}

impl Settings {
    /// Validates before building so a bad value fails before anything is fetched.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, MomfolioError> {
        validate_config(config)?;
        Ok(Self {
            momentum: build_momentum_config(config)?,
            data: build_data_settings(config)?,
            files: build_file_settings(config),
        })
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| fail(&e))
}

fn fail(err: &MomfolioError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn load_settings(path: &Path) -> Result<Settings, ExitCode> {
    eprintln!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    Settings::from_config(&adapter).map_err(|e| fail(&e))
}

/// CSV source for `[data] path`, wrapped in the per-symbol timeout when enabled.
pub fn build_data_port(data: &DataSettings) -> Result<Arc<dyn DataPort>, MomfolioError> {
    let path = data.path.clone().ok_or_else(|| MomfolioError::ConfigMissing {
        section: "data".into(),
        key: "path".into(),
    })?;
    let csv: Arc<dyn DataPort> = Arc::new(CsvAdapter::new(path));
    if data.fetch_timeout_secs == 0 {
        return Ok(csv);
    }
    Ok(Arc::new(TimeoutAdapter::new(
        csv,
        Duration::from_secs(data.fetch_timeout_secs),
    )))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct RebalanceRun {
    pub report: RebalanceReport,
    pub portfolio: Portfolio,
    /// `None` on a dry run.
    pub report_path: Option<PathBuf>,
}

/// Lock, load, screen, rebalance, save. The lock is held until the new
/// portfolio is on disk; a dry run takes no lock and writes nothing.
pub fn run_rebalance_pipeline(
    data_port: &dyn DataPort,
    store: &dyn PortfolioStore,
    reports: &dyn ReportPort,
    settings: &Settings,
    as_of: NaiveDate,
    now: DateTime<Utc>,
    dry_run: bool,
) -> Result<RebalanceRun, MomfolioError> {
    let _lock = if dry_run { None } else { Some(store.lock()?) };

    let prior = match store.load()? {
        Some(p) => p,
        None => {
            info!("starting from an empty portfolio");
            Portfolio::default()
        }
    };

    let universe = resolve_universe(settings.data.universe.as_deref(), data_port)?;
    if universe.is_empty() {
        return Err(MomfolioError::DataSource {
            reason: "universe is empty".into(),
        });
    }

    let options = ScreenOptions {
        as_of,
        workers: settings.data.workers,
        top_k: None,
    };
    let screened = screen(&universe, data_port, &settings.momentum, &options);
    // Every fetch failing means an outage, not a universe with no winners.
    // One result per universe code, so skipped == evaluated means none arrived.
    if screened.skipped.len() == screened.evaluated() {
        return Err(MomfolioError::DataSource {
            reason: format!(
                "no price data for any of {} symbols; portfolio left unchanged",
                universe.count()
            ),
        });
    }

    let outcome = rebalance(prior.symbols(), &screened.ranking, &settings.momentum);
    let report = RebalanceReport::build(now, as_of, prior.symbols(), &screened, &outcome);
    let portfolio = Portfolio::rebalanced(outcome.new_portfolio, now);

    if dry_run {
        return Ok(RebalanceRun {
            report,
            portfolio,
            report_path: None,
        });
    }

    store.save(&portfolio)?;
    let report_path = reports.write_rebalance(&report)?;

    Ok(RebalanceRun {
        report,
        portfolio,
        report_path: Some(report_path),
    })
}

pub struct MonitorRun {
    pub report: MonitorReport,
    pub report_path: PathBuf,
}

/// Reads the portfolio snapshot once and reports DMA status. Never writes it.
pub fn run_monitor_pipeline(
    data_port: &dyn DataPort,
    store: &dyn PortfolioStore,
    reports: &dyn ReportPort,
    settings: &Settings,
    as_of: NaiveDate,
    now: DateTime<Utc>,
) -> Result<MonitorRun, MomfolioError> {
    let portfolio = store.load()?.ok_or(MomfolioError::NoPortfolio)?;
    let outcome = monitor(
        portfolio.symbols(),
        data_port,
        &settings.momentum,
        as_of,
        settings.data.workers,
    );
    let report = MonitorReport::build(now, as_of, &outcome);
    let report_path = reports.write_monitor(&report)?;
    Ok(MonitorRun {
        report,
        report_path,
    })
}

fn store_for(files: &FileSettings) -> JsonStore {
    JsonStore::new(files.portfolio_file.clone(), files.results_dir.clone())
}

fn run_rebalance(config_path: &Path, as_of: Option<NaiveDate>, dry_run: bool) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let data_port = match build_data_port(&settings.data) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let store = store_for(&settings.files);
    let as_of = as_of.unwrap_or_else(today);

    eprintln!(
        "Rebalancing as of {} (max {} stocks, exit rank {}){}",
        as_of,
        settings.momentum.max_stocks,
        settings.momentum.effective_exit_rank(),
        if dry_run { " [dry run]" } else { "" }
    );

    match run_rebalance_pipeline(
        data_port.as_ref(),
        &store,
        &store,
        &settings,
        as_of,
        Utc::now(),
        dry_run,
    ) {
        Ok(run) => {
            print_rebalance_summary(&run);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "-".to_string())
}

fn print_rebalance_summary(run: &RebalanceRun) {
    let report = &run.report;

    eprintln!(
        "\nScreened {} symbols: {} eligible, {} skipped",
        report.evaluated,
        report.eligible,
        report.skipped.len()
    );
    for skip in &report.skipped {
        eprintln!("  skipped {}: {}", skip.symbol, skip.reason);
    }

    println!("\n=== New Portfolio ({} stocks) ===", report.new_portfolio.len());
    println!(
        "{:>4}  {:<14} {:>10} {:>10} {:>8} {:>7}",
        "Rank", "Symbol", "Price", "DMA", "Off High", "Sharpe"
    );
    for holding in &run.portfolio.holdings {
        let row = report
            .screening_results
            .iter()
            .find(|r| r.symbol == holding.symbol);
        println!(
            "{:>4}  {:<14} {:>10} {:>10} {:>7}% {:>7}",
            holding.rank,
            holding.symbol,
            fmt_opt(row.and_then(|r| r.current_price), 2),
            fmt_opt(row.and_then(|r| r.dma), 2),
            fmt_opt(row.and_then(|r| r.high_distance_pct), 1),
            fmt_opt(row.and_then(|r| r.primary_sharpe), 2),
        );
    }

    if report.added_stocks.is_empty() && report.removed_stocks.is_empty() {
        println!("\nNo changes.");
    } else {
        println!("\nAdded:   {}", join_or_none(&report.added_stocks));
        println!("Removed: {}", join_or_none(&report.removed_stocks));
    }

    match &run.report_path {
        Some(path) => {
            eprintln!("\nPortfolio saved; next rebalance {}", fmt_next(&run.portfolio));
            eprintln!("Results written to: {}", path.display());
        }
        None => eprintln!("\nDry run: nothing saved"),
    }
}

fn fmt_next(portfolio: &Portfolio) -> String {
    portfolio
        .next_rebalance
        .map(|d| d.date_naive().to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn join_or_none(symbols: &[String]) -> String {
    if symbols.is_empty() {
        "(none)".to_string()
    } else {
        symbols.join(", ")
    }
}

fn run_monitor(config_path: &Path, as_of: Option<NaiveDate>) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let data_port = match build_data_port(&settings.data) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let store = store_for(&settings.files);
    let as_of = as_of.unwrap_or_else(today);

    eprintln!("Monitoring portfolio as of {}", as_of);

    let run = match run_monitor_pipeline(
        data_port.as_ref(),
        &store,
        &store,
        &settings,
        as_of,
        Utc::now(),
    ) {
        Ok(run) => run,
        Err(e) => return fail(&e),
    };

    let report = &run.report;
    println!("\n=== DMA Status ({} stocks) ===", report.portfolio_size);
    for check in &report.statuses {
        let status = match check.status {
            DmaStatus::Above => "above",
            DmaStatus::Below => "BELOW",
            DmaStatus::Unavailable => "unavailable",
        };
        println!(
            "  {:<14} {:>10} {:>10}  {}",
            check.symbol,
            fmt_opt(check.price, 2),
            fmt_opt(check.dma, 2),
            status
        );
    }
    println!("\nExit list: {}", join_or_none(&report.broken_stocks));
    if !report.unavailable.is_empty() {
        eprintln!("warning: no data for {}", report.unavailable.join(", "));
    }
    eprintln!("Results written to: {}", run.report_path.display());
    ExitCode::SUCCESS
}

fn run_show_config(config_path: &Path) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    println!("{}", settings.momentum);
    println!("\n[data]");
    println!(
        "path = {}",
        settings
            .data
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    );
    match &settings.data.universe {
        Some(codes) => println!("universe = {}", codes.join(",")),
        None => println!("# universe: every symbol in the data directory"),
    }
    println!("workers = {}", settings.data.workers);
    println!("fetch_timeout_secs = {}", settings.data.fetch_timeout_secs);
    println!("\n[files]");
    println!("portfolio_file = {}", settings.files.portfolio_file.display());
    println!("results_dir = {}", settings.files.results_dir.display());

    if settings.momentum.exit_rank < settings.momentum.max_stocks {
        eprintln!(
            "\nnote: effective exit_rank is {}",
            settings.momentum.effective_exit_rank()
        );
    }
    ExitCode::SUCCESS
}

/// Writes the sample config; never overwrites an existing file.
pub fn write_sample_config(path: &Path) -> Result<(), MomfolioError> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(sample_config().as_bytes())?;
    Ok(())
}

fn run_init_config(path: &Path) -> ExitCode {
    match write_sample_config(path) {
        Ok(()) => {
            eprintln!("Sample configuration written to: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let data_port = match build_data_port(&settings.data) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    let symbols = match data_port.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
