//! Price-series statistics used by screening and monitoring.
//!
//! All functions work on a slice of closing prices ordered oldest first:
//! - `sma`: trailing simple moving average (the DMA)
//! - `stddev`: mean and sample standard deviation
//! - `high`: 52-week / all-time reference high and distance from it
//! - `sharpe`: daily returns and annualized Sharpe ratio per lookback

pub mod high;
pub mod sharpe;
pub mod sma;
pub mod stddev;

/// Trading sessions in a year, used for annualization.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Approximate trading sessions in a calendar month.
pub const TRADING_DAYS_PER_MONTH: usize = 21;

/// Bars in the trailing 52-week window.
pub const WEEK_52_BARS: usize = 252;
