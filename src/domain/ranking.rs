//! Ordered list of eligible screen results.

use crate::domain::scorer::ScreenResult;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Eligible results, best Sharpe first, ties broken by symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    entries: Vec<ScreenResult>,
}

fn by_score_then_symbol(a: &ScreenResult, b: &ScreenResult) -> Ordering {
    let score_a = a.sharpe_score.unwrap_or(f64::NEG_INFINITY);
    let score_b = b.sharpe_score.unwrap_or(f64::NEG_INFINITY);
    score_b
        .total_cmp(&score_a)
        .then_with(|| a.symbol.cmp(&b.symbol))
}

impl Ranking {
    /// Keeps eligible results only and sorts them. Input order is irrelevant.
    pub fn from_results<I>(results: I) -> Self
    where
        I: IntoIterator<Item = ScreenResult>,
    {
        let mut entries: Vec<ScreenResult> = results
            .into_iter()
            .filter(|r| r.eligible && r.sharpe_score.is_some())
            .collect();
        entries.sort_by(by_score_then_symbol);
        Self { entries }
    }

    /// First `k` entries.
    pub fn truncated(mut self, k: usize) -> Self {
        self.entries.truncate(k);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ScreenResult] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScreenResult> {
        self.entries.iter()
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.entries.iter().map(|r| r.symbol.as_str()).collect()
    }

    /// 1-based position of `symbol`, if ranked.
    pub fn position(&self, symbol: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|r| r.symbol == symbol)
            .map(|i| i + 1)
    }

    /// 1-based position of every ranked symbol.
    pub fn positions(&self) -> HashMap<&str, usize> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, r)| (r.symbol.as_str(), i + 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(symbol: &str, score: Option<f64>, eligible: bool) -> ScreenResult {
        ScreenResult {
            sharpe_score: score,
            eligible,
            passes_technical_filter: eligible,
            passes_momentum_filter: eligible,
            ..ScreenResult::unavailable(symbol)
        }
    }

    #[test]
    fn sorts_descending_by_score() {
        let ranking = Ranking::from_results(vec![
            result("A", Some(0.5), true),
            result("B", Some(2.0), true),
            result("C", Some(1.0), true),
        ]);
        assert_eq!(ranking.symbols(), vec!["B", "C", "A"]);
        assert_eq!(ranking.position("A"), Some(3));
        assert_eq!(ranking.position("Z"), None);
    }

    #[test]
    fn ties_break_by_symbol() {
        let ranking = Ranking::from_results(vec![
            result("ZEE", Some(1.0), true),
            result("ACC", Some(1.0), true),
            result("MRF", Some(1.0), true),
        ]);
        assert_eq!(ranking.symbols(), vec!["ACC", "MRF", "ZEE"]);
    }

    #[test]
    fn excludes_ineligible() {
        let ranking = Ranking::from_results(vec![
            result("A", Some(3.0), false),
            result("B", None, true),
            result("C", Some(1.0), true),
        ]);
        assert_eq!(ranking.symbols(), vec!["C"]);
    }

    #[test]
    fn input_order_does_not_matter() {
        let forward = Ranking::from_results(vec![
            result("A", Some(1.0), true),
            result("B", Some(2.0), true),
            result("C", Some(2.0), true),
        ]);
        let backward = Ranking::from_results(vec![
            result("C", Some(2.0), true),
            result("B", Some(2.0), true),
            result("A", Some(1.0), true),
        ]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn truncated_keeps_top() {
        let ranking = Ranking::from_results(vec![
            result("A", Some(1.0), true),
            result("B", Some(2.0), true),
            result("C", Some(3.0), true),
        ])
        .truncated(2);
        assert_eq!(ranking.symbols(), vec!["C", "B"]);
        assert_eq!(ranking.positions().get("B"), Some(&2));
    }
}
