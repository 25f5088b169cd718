//! Portfolio rebalancing with exit-rank hysteresis.
//!
//! 1. Incumbents ranked at or above the effective exit rank are retained.
//! 2. The ranking is walked in order, adding non-members until `max_stocks`.
//! 3. `added` is ordered by rank; `removed` lists unranked drops first (in
//!    prior order), then ranked drops from worst rank to best.
//!
//! Pure: inputs are never mutated and identical inputs give identical output.

use crate::domain::config::MomentumConfig;
use crate::domain::portfolio::Holding;
use crate::domain::ranking::Ranking;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebalanceOutcome {
    /// New members ordered by rank.
    pub new_portfolio: Vec<Holding>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Incumbents kept, ordered by rank.
    pub retained: Vec<String>,
}

impl RebalanceOutcome {
    pub fn symbols(&self) -> Vec<String> {
        self.new_portfolio.iter().map(|h| h.symbol.clone()).collect()
    }

    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

pub fn rebalance(prior: &[String], ranking: &Ranking, config: &MomentumConfig) -> RebalanceOutcome {
    let positions = ranking.positions();
    let exit_rank = config.effective_exit_rank();

    let mut seen = HashSet::new();
    let prior: Vec<&str> = prior
        .iter()
        .map(String::as_str)
        .filter(|s| seen.insert(*s))
        .collect();
    let prior_set: HashSet<&str> = prior.iter().copied().collect();

    let mut retained: Vec<Holding> = prior
        .iter()
        .filter_map(|&symbol| {
            positions
                .get(symbol)
                .filter(|&&rank| rank <= exit_rank)
                .map(|&rank| Holding {
                    symbol: symbol.to_string(),
                    rank,
                })
        })
        .collect();
    retained.sort_by_key(|h| h.rank);
    // Only reachable when max_stocks shrank since the last rebalance.
    retained.truncate(config.max_stocks);

    let mut members: HashSet<&str> = retained.iter().map(|h| h.symbol.as_str()).collect();
    let mut new_portfolio = retained.clone();
    for (i, entry) in ranking.iter().enumerate() {
        if new_portfolio.len() >= config.max_stocks {
            break;
        }
        if members.insert(entry.symbol.as_str()) {
            new_portfolio.push(Holding {
                symbol: entry.symbol.clone(),
                rank: i + 1,
            });
        }
    }
    new_portfolio.sort_by_key(|h| h.rank);

    let added: Vec<String> = new_portfolio
        .iter()
        .filter(|h| !prior_set.contains(h.symbol.as_str()))
        .map(|h| h.symbol.clone())
        .collect();

    let dropped: Vec<&str> = prior
        .iter()
        .copied()
        .filter(|s| !members.contains(s))
        .collect();
    let mut removed: Vec<String> = dropped
        .iter()
        .filter(|s| !positions.contains_key(*s))
        .map(|s| s.to_string())
        .collect();
    let mut ranked_drops: Vec<(&str, usize)> = dropped
        .iter()
        .filter_map(|s| positions.get(s).map(|&rank| (*s, rank)))
        .collect();
    ranked_drops.sort_by(|a, b| b.1.cmp(&a.1));
    removed.extend(ranked_drops.into_iter().map(|(s, _)| s.to_string()));

    RebalanceOutcome {
        retained: retained.into_iter().map(|h| h.symbol).collect(),
        new_portfolio,
        added,
        removed,
    }
}
