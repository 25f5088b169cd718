//! Annualized Sharpe ratio over a trailing lookback (zero risk-free rate).
//!
//! r[t]       = C[t] / C[t-1] - 1
//! return     = mean(r) * 252
//! volatility = stddev(r) * sqrt(252)
//! sharpe     = return / volatility
//!
//! A lookback of m months covers the trailing m * 21 bars.

use super::stddev::{mean, sample_stddev};
use super::{TRADING_DAYS_PER_MONTH, TRADING_DAYS_PER_YEAR};

/// Simple daily returns. Returns `None` if any close is non-positive.
pub fn daily_returns(closes: &[f64]) -> Option<Vec<f64>> {
    closes
        .windows(2)
        .map(|w| {
            if w[0] > 0.0 && w[1].is_finite() {
                Some(w[1] / w[0] - 1.0)
            } else {
                None
            }
        })
        .collect()
}

/// Sharpe ratio of the given closes. Undefined with fewer than two returns
/// or zero volatility.
pub fn annualized_sharpe(closes: &[f64]) -> Option<f64> {
    let returns = daily_returns(closes)?;
    if returns.len() < 2 {
        return None;
    }
    let annual_return = mean(&returns)? * TRADING_DAYS_PER_YEAR;
    let annual_vol = sample_stddev(&returns)? * TRADING_DAYS_PER_YEAR.sqrt();
    if annual_vol == 0.0 || !annual_vol.is_finite() {
        return None;
    }
    let sharpe = annual_return / annual_vol;
    sharpe.is_finite().then_some(sharpe)
}

pub fn lookback_bars(months: u32) -> usize {
    months as usize * TRADING_DAYS_PER_MONTH
}

/// Sharpe over the trailing `months * 21` bars; undefined if the series is shorter.
pub fn sharpe_for_months(closes: &[f64], months: u32) -> Option<f64> {
    let bars = lookback_bars(months);
    if bars == 0 || closes.len() < bars {
        return None;
    }
    annualized_sharpe(&closes[closes.len() - bars..])
}
