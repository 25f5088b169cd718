//! Simple moving average of closing prices.
//!
//! SMA(n) = sum(C[last-j] for j in 0..n) / n
//! Undefined when fewer than n closes exist; short history is never waived.

pub fn trailing_sma(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Trailing average of any numeric field, e.g. volume.
pub fn trailing_mean<I>(values: I, period: usize) -> Option<f64>
where
    I: DoubleEndedIterator<Item = f64> + ExactSizeIterator,
{
    if period == 0 || values.len() < period {
        return None;
    }
    Some(values.rev().take(period).sum::<f64>() / period as f64)
}
