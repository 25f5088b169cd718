//! Result documents produced by rebalance and monitor runs.

use crate::domain::monitor::{DmaCheck, MonitorOutcome};
use crate::domain::rebalancer::RebalanceOutcome;
use crate::domain::scorer::PeriodSharpe;
use crate::domain::screener::{ScreenReport, SkippedSymbol};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One ranked symbol as shown in the rebalance report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreeningRow {
    pub rank: usize,
    pub symbol: String,
    pub current_price: Option<f64>,
    pub dma: Option<f64>,
    pub high_distance_pct: Option<f64>,
    pub primary_sharpe: Option<f64>,
    pub sharpe_by_period: Vec<PeriodSharpe>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalanceReport {
    pub rebalance_date: DateTime<Utc>,
    pub as_of: NaiveDate,
    pub new_portfolio: Vec<String>,
    pub previous_portfolio: Vec<String>,
    pub added_stocks: Vec<String>,
    pub removed_stocks: Vec<String>,
    pub screening_results: Vec<ScreeningRow>,
    pub evaluated: usize,
    pub eligible: usize,
    pub skipped: Vec<SkippedSymbol>,
}

impl RebalanceReport {
    pub fn build(
        now: DateTime<Utc>,
        as_of: NaiveDate,
        previous: &[String],
        screen: &ScreenReport,
        outcome: &RebalanceOutcome,
    ) -> Self {
        let screening_results = screen
            .ranking
            .iter()
            .enumerate()
            .map(|(i, r)| ScreeningRow {
                rank: i + 1,
                symbol: r.symbol.clone(),
                current_price: r.current_price,
                dma: r.dma,
                high_distance_pct: r.high_distance_pct,
                primary_sharpe: r.sharpe_score,
                sharpe_by_period: r.sharpe_by_period.clone(),
            })
            .collect();

        Self {
            rebalance_date: now,
            as_of,
            new_portfolio: outcome.symbols(),
            previous_portfolio: previous.to_vec(),
            added_stocks: outcome.added.clone(),
            removed_stocks: outcome.removed.clone(),
            screening_results,
            evaluated: screen.evaluated(),
            eligible: screen.ranking.len(),
            skipped: screen.skipped.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorReport {
    pub monitoring_date: DateTime<Utc>,
    pub as_of: NaiveDate,
    pub portfolio_size: usize,
    pub statuses: Vec<DmaCheck>,
    pub broken_stocks: Vec<String>,
    pub healthy_stocks: Vec<String>,
    pub unavailable: Vec<String>,
}

impl MonitorReport {
    pub fn build(now: DateTime<Utc>, as_of: NaiveDate, outcome: &MonitorOutcome) -> Self {
        Self {
            monitoring_date: now,
            as_of,
            portfolio_size: outcome.checks.len(),
            statuses: outcome.checks.clone(),
            broken_stocks: outcome.exits(),
            healthy_stocks: outcome.healthy(),
            unavailable: outcome.unavailable(),
        }
    }
}
