//! Daily DMA-break monitoring of the current portfolio.
//!
//! Reports only; membership changes happen at the next rebalance.

use crate::domain::config::MomentumConfig;
use crate::domain::error::MomfolioError;
use crate::domain::fetch::{FetchPlan, fetch_each};
use crate::domain::indicator::sma::trailing_sma;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DmaStatus {
    Above,
    Below,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DmaCheck {
    pub symbol: String,
    pub status: DmaStatus,
    pub price: Option<f64>,
    pub dma: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl DmaCheck {
    fn unavailable(symbol: &str, detail: String) -> Self {
        Self {
            symbol: symbol.to_string(),
            status: DmaStatus::Unavailable,
            price: None,
            dma: None,
            detail: Some(detail),
        }
    }

    /// `None` when the check could not be made.
    pub fn above_dma(&self) -> Option<bool> {
        match self.status {
            DmaStatus::Above => Some(true),
            DmaStatus::Below => Some(false),
            DmaStatus::Unavailable => None,
        }
    }
}

/// Latest close versus the trailing `dma_period` SMA. Equality counts as a break.
pub fn check_series(series: &PriceSeries, dma_period: usize) -> DmaCheck {
    let closes = series.closes();
    let Some(price) = closes.last().copied() else {
        return DmaCheck::unavailable(&series.code, "no bars".to_string());
    };
    match trailing_sma(&closes, dma_period) {
        Some(dma) => DmaCheck {
            symbol: series.code.clone(),
            status: if price > dma {
                DmaStatus::Above
            } else {
                DmaStatus::Below
            },
            price: Some(price),
            dma: Some(dma),
            detail: None,
        },
        None => {
            let short = MomfolioError::InsufficientData {
                code: series.code.clone(),
                bars: closes.len(),
                minimum: dma_period,
            };
            DmaCheck {
                price: Some(price),
                ..DmaCheck::unavailable(&series.code, short.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorOutcome {
    /// One check per portfolio symbol, in portfolio order.
    pub checks: Vec<DmaCheck>,
}

impl MonitorOutcome {
    fn symbols_with(&self, status: DmaStatus) -> Vec<String> {
        self.checks
            .iter()
            .filter(|c| c.status == status)
            .map(|c| c.symbol.clone())
            .collect()
    }

    /// Symbols at or below their DMA.
    pub fn exits(&self) -> Vec<String> {
        self.symbols_with(DmaStatus::Below)
    }

    pub fn healthy(&self) -> Vec<String> {
        self.symbols_with(DmaStatus::Above)
    }

    pub fn unavailable(&self) -> Vec<String> {
        self.symbols_with(DmaStatus::Unavailable)
    }
}

pub fn monitor(
    portfolio: &[String],
    data_port: &dyn DataPort,
    config: &MomentumConfig,
    as_of: NaiveDate,
    workers: usize,
) -> MonitorOutcome {
    let plan = FetchPlan::for_bars(as_of, config.dma_period, workers);
    info!(symbols = portfolio.len(), as_of = %as_of, "checking DMA breaks");

    let checks = fetch_each(portfolio, data_port, &plan, |code, fetched| match fetched {
        Ok(series) => check_series(&series, config.dma_period),
        Err(e) => {
            if e.is_data_error() {
                warn!(symbol = code, error = %e, "no data for portfolio symbol");
            } else {
                error!(symbol = code, error = %e, "fetch failed for portfolio symbol");
            }
            DmaCheck::unavailable(code, e.to_string())
        }
    });

    let outcome = MonitorOutcome { checks };
    info!(
        below = outcome.exits().len(),
        above = outcome.healthy().len(),
        unavailable = outcome.unavailable().len(),
        "monitoring complete"
    );
    outcome
}
