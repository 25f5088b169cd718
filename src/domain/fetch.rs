//! Bounded parallel fetch-and-evaluate over a list of symbols.
//!
//! Symbols are independent. Results come back in input order regardless of
//! which fetch finishes first; each worker produces its own values and rayon
//! stitches them together, so there is no shared mutable accumulator.

use crate::domain::error::MomfolioError;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use tracing::warn;

/// Fewest trading sessions assumed per calendar year. NSE runs about 248;
/// this leaves room for a heavier holiday calendar.
const MIN_SESSIONS_PER_YEAR: usize = 240;

/// Extra calendar days on top of the scaled window.
const WINDOW_MARGIN_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchPlan {
    /// `None` requests the entire available history.
    pub start_date: Option<NaiveDate>,
    pub as_of: NaiveDate,
    pub workers: usize,
}

impl FetchPlan {
    /// Calendar window that should hold at least `bars` trading sessions.
    pub fn for_bars(as_of: NaiveDate, bars: usize, workers: usize) -> Self {
        Self {
            start_date: Some(history_start(as_of, bars)),
            as_of,
            workers,
        }
    }

    pub fn unbounded(as_of: NaiveDate, workers: usize) -> Self {
        Self {
            start_date: None,
            as_of,
            workers,
        }
    }
}

/// `as_of - ceil(bars * 365 / 240) - 30` days.
pub fn history_start(as_of: NaiveDate, bars: usize) -> NaiveDate {
    let calendar_days =
        (bars * 365).div_ceil(MIN_SESSIONS_PER_YEAR) as i64 + WINDOW_MARGIN_DAYS;
    as_of - Duration::days(calendar_days)
}

/// Fetches one symbol, clipping anything dated after `as_of`. Empty series are `NoData`.
pub fn fetch_series(
    data_port: &dyn DataPort,
    code: &str,
    plan: &FetchPlan,
) -> Result<PriceSeries, MomfolioError> {
    let mut series = data_port.fetch_ohlcv(code, plan.start_date, plan.as_of)?;
    series.truncate_after(plan.as_of);
    if series.is_empty() {
        return Err(MomfolioError::NoData {
            code: code.to_string(),
        });
    }
    Ok(series)
}

/// Applies `evaluate` to every symbol's fetch result on a pool of
/// `plan.workers` threads. Output order matches `codes`.
pub fn fetch_each<T, F>(
    codes: &[String],
    data_port: &dyn DataPort,
    plan: &FetchPlan,
    evaluate: F,
) -> Vec<T>
where
    T: Send,
    F: Fn(&str, Result<PriceSeries, MomfolioError>) -> T + Sync,
{
    let run = |code: &String| evaluate(code, fetch_series(data_port, code, plan));

    if plan.workers <= 1 {
        return codes.iter().map(run).collect();
    }

    match rayon::ThreadPoolBuilder::new()
        .num_threads(plan.workers)
        .build()
    {
        Ok(pool) => pool.install(|| codes.par_iter().map(run).collect()),
        Err(e) => {
            warn!(error = %e, "failed to build worker pool, fetching sequentially");
            codes.iter().map(run).collect()
        }
    }
}
