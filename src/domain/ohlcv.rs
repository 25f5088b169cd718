//! OHLCV bar and per-symbol price series.

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub code: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Daily bars for one symbol, ascending by date with no duplicate dates.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub code: String,
    pub bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    /// Builds a series, sorting by date and dropping repeated dates (first bar wins).
    pub fn new(code: impl Into<String>, mut bars: Vec<OhlcvBar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self {
            code: code.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Drops bars dated after `as_of`.
    pub fn truncate_after(&mut self, as_of: NaiveDate) {
        let keep = self.bars.partition_point(|b| b.date <= as_of);
        self.bars.truncate(keep);
    }
}
