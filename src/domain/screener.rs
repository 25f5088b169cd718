//! Universe screening: fetch, score, rank.
//!
//! A symbol that cannot be fetched is recorded as skipped and scored as
//! unavailable; it never aborts the pass.

use crate::domain::config::MomentumConfig;
use crate::domain::fetch::{FetchPlan, fetch_each};
use crate::domain::ranking::Ranking;
use crate::domain::scorer::{MomentumScorer, ScreenResult};
use crate::domain::universe::Universe;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct ScreenOptions {
    pub as_of: NaiveDate,
    pub workers: usize,
    /// Truncate the ranking to the best `k`; `None` keeps every eligible symbol.
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ScreenReport {
    pub ranking: Ranking,
    /// Every evaluated symbol in universe order, eligible or not.
    pub results: Vec<ScreenResult>,
    pub skipped: Vec<SkippedSymbol>,
}

impl ScreenReport {
    pub fn evaluated(&self) -> usize {
        self.results.len()
    }

    pub fn ineligible(&self) -> impl Iterator<Item = &ScreenResult> {
        self.results.iter().filter(|r| !r.eligible)
    }
}

/// Fetch plan covering every lookback, the DMA and the reference high.
pub fn screening_plan(config: &MomentumConfig, options: &ScreenOptions) -> FetchPlan {
    if config.use_all_time_high {
        FetchPlan::unbounded(options.as_of, options.workers)
    } else {
        FetchPlan::for_bars(options.as_of, config.required_bars(), options.workers)
    }
}

pub fn screen(
    universe: &Universe,
    data_port: &dyn DataPort,
    config: &MomentumConfig,
    options: &ScreenOptions,
) -> ScreenReport {
    let scorer = MomentumScorer::new(config);
    screen_with(universe, data_port, &scorer, config, options)
}

/// Screens with a caller-supplied scorer, e.g. one with extra filter stages.
pub fn screen_with(
    universe: &Universe,
    data_port: &dyn DataPort,
    scorer: &MomentumScorer,
    config: &MomentumConfig,
    options: &ScreenOptions,
) -> ScreenReport {
    let plan = screening_plan(config, options);
    info!(
        symbols = universe.count(),
        workers = options.workers,
        as_of = %options.as_of,
        "screening universe"
    );

    let evaluated = fetch_each(&universe.codes, data_port, &plan, |code, fetched| {
        match fetched {
            Ok(series) => {
                let result = scorer.evaluate(&series);
                if let Some(reason) = result.rejection_reason() {
                    debug!(symbol = code, bars = series.len(), reason = %reason, "ineligible");
                }
                (result, None)
            }
            Err(e) => {
                if e.is_data_error() {
                    warn!(symbol = code, error = %e, "skipping symbol");
                } else {
                    error!(symbol = code, error = %e, "skipping symbol after fetch failure");
                }
                (
                    ScreenResult::unavailable(code),
                    Some(SkippedSymbol {
                        symbol: code.to_string(),
                        reason: e.to_string(),
                    }),
                )
            }
        }
    });

    let mut results = Vec::with_capacity(evaluated.len());
    let mut skipped = Vec::new();
    for (result, skip) in evaluated {
        results.push(result);
        skipped.extend(skip);
    }

    let mut ranking = Ranking::from_results(results.iter().cloned());
    if let Some(k) = options.top_k {
        ranking = ranking.truncated(k);
    }

    info!(
        evaluated = results.len(),
        eligible = ranking.len(),
        skipped = skipped.len(),
        "screening complete"
    );

    ScreenReport {
        ranking,
        results,
        skipped,
    }
}
