//! Persisted portfolio document.
//!
//! The only state carried between runs. Replaced wholesale by a rebalance,
//! read-only for monitoring.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Days between a rebalance and the next scheduled one.
pub const REBALANCE_INTERVAL_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    /// 1-based ranking position at the rebalance that selected or retained it.
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Portfolio {
    pub stocks: Vec<String>,
    #[serde(default)]
    pub holdings: Vec<Holding>,
    #[serde(default)]
    pub last_rebalance: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_rebalance: Option<DateTime<Utc>>,
}

impl Portfolio {
    /// Builds a portfolio from symbols, dropping repeats (first occurrence wins).
    pub fn from_symbols<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let stocks = symbols
            .into_iter()
            .map(Into::into)
            .filter(|s: &String| seen.insert(s.clone()))
            .collect();
        Self {
            stocks,
            ..Self::default()
        }
    }

    /// Portfolio selected by a rebalance at `now`.
    pub fn rebalanced(holdings: Vec<Holding>, now: DateTime<Utc>) -> Self {
        Self {
            stocks: holdings.iter().map(|h| h.symbol.clone()).collect(),
            holdings,
            last_rebalance: Some(now),
            next_rebalance: Some(now + Duration::days(REBALANCE_INTERVAL_DAYS)),
        }
    }

    pub fn symbols(&self) -> &[String] {
        &self.stocks
    }

    pub fn len(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.stocks.iter().any(|s| s == symbol)
    }

    /// Rank recorded for `symbol` when it was last selected.
    pub fn rank_of(&self, symbol: &str) -> Option<usize> {
        self.holdings
            .iter()
            .find(|h| h.symbol == symbol)
            .map(|h| h.rank)
    }

    /// Removes repeated symbols from a hand-edited document.
    pub fn normalized(self) -> Self {
        let deduped = Self::from_symbols(self.stocks);
        Self {
            stocks: deduped.stocks,
            ..self
        }
    }
}
