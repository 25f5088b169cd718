//! Reference high and percentage distance below it.

use super::WEEK_52_BARS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighReference {
    /// Highest close over the trailing 252 bars (or the whole series if shorter).
    Week52,
    /// Highest close over the entire available series.
    AllTime,
}

impl HighReference {
    pub fn from_all_time_flag(use_all_time_high: bool) -> Self {
        if use_all_time_high {
            HighReference::AllTime
        } else {
            HighReference::Week52
        }
    }
}

pub fn reference_high(closes: &[f64], reference: HighReference) -> Option<f64> {
    let window = match reference {
        HighReference::Week52 => &closes[closes.len().saturating_sub(WEEK_52_BARS)..],
        HighReference::AllTime => closes,
    };
    window.iter().copied().reduce(f64::max)
}

/// (reference_high - latest_close) / reference_high * 100
pub fn distance_from_high_pct(closes: &[f64], reference: HighReference) -> Option<f64> {
    let latest = *closes.last()?;
    let high = reference_high(closes, reference)?;
    if high <= 0.0 {
        return None;
    }
    Some((high - latest) / high * 100.0)
}
