//! Property tests for rebalancer invariants.
//!
//! Uses proptest to verify:
//! 1. Size cap: the new portfolio never exceeds max_stocks or the ranking
//! 2. Retention: incumbents ranked within the exit rank are kept
//! 3. Idempotence: rebalancing the result again changes nothing
//! 4. Determinism: ranking input order does not matter
//! 5. Diff consistency: new = prior - removed + added

use momfolio::domain::config::MomentumConfig;
use momfolio::domain::ranking::Ranking;
use momfolio::domain::rebalancer::rebalance;
use momfolio::domain::scorer::ScreenResult;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashSet};

// ── Strategies (proptest) ────────────────────────────────────────────

fn symbol(i: usize) -> String {
    format!("S{:02}", i)
}

fn eligible(symbol: &str, score: f64) -> ScreenResult {
    ScreenResult {
        sharpe_score: Some(score),
        eligible: true,
        passes_technical_filter: true,
        passes_momentum_filter: true,
        ..ScreenResult::unavailable(symbol)
    }
}

/// Scores for up to 30 of 40 symbols, rounded so ties occur.
fn arb_scores() -> impl Strategy<Value = BTreeMap<usize, f64>> {
    prop::collection::btree_map(0usize..40, (-30i32..30).prop_map(|s| s as f64 / 10.0), 0..30)
}

/// Prior holdings drawn from a slightly larger pool, so some are unranked.
fn arb_prior() -> impl Strategy<Value = BTreeSet<usize>> {
    prop::collection::btree_set(0usize..45, 0..12)
}

fn arb_config() -> impl Strategy<Value = MomentumConfig> {
    (1usize..10, 1usize..20).prop_map(|(max_stocks, exit_rank)| MomentumConfig {
        max_stocks,
        exit_rank,
        ..MomentumConfig::default()
    })
}

fn build(scores: &BTreeMap<usize, f64>) -> Vec<ScreenResult> {
    scores
        .iter()
        .map(|(&i, &score)| eligible(&symbol(i), score))
        .collect()
}

/// A prior portfolio that respects the cap, as a real saved one would.
fn capped_prior(prior: &BTreeSet<usize>, config: &MomentumConfig) -> Vec<String> {
    prior
        .iter()
        .take(config.max_stocks)
        .map(|&i| symbol(i))
        .collect()
}

proptest! {
    #[test]
    fn new_portfolio_respects_size_cap(
        scores in arb_scores(),
        prior in arb_prior(),
        config in arb_config(),
    ) {
        let ranking = Ranking::from_results(build(&scores));
        let prior: Vec<String> = prior.iter().map(|&i| symbol(i)).collect();
        let outcome = rebalance(&prior, &ranking, &config);

        prop_assert!(outcome.new_portfolio.len() <= config.max_stocks);
        prop_assert!(outcome.new_portfolio.len() <= ranking.len());

        let unique: HashSet<&str> = outcome.new_portfolio.iter().map(|h| h.symbol.as_str()).collect();
        prop_assert_eq!(unique.len(), outcome.new_portfolio.len());
    }

    #[test]
    fn incumbents_within_exit_rank_are_retained(
        scores in arb_scores(),
        prior in arb_prior(),
        config in arb_config(),
    ) {
        let ranking = Ranking::from_results(build(&scores));
        let prior = capped_prior(&prior, &config);
        let outcome = rebalance(&prior, &ranking, &config);
        let selected = outcome.symbols();

        for symbol in &prior {
            if let Some(rank) = ranking.position(symbol) {
                if rank <= config.effective_exit_rank() {
                    prop_assert!(selected.contains(symbol), "{} at rank {} dropped", symbol, rank);
                }
            }
        }
    }

    #[test]
    fn rebalance_is_idempotent(
        scores in arb_scores(),
        prior in arb_prior(),
        config in arb_config(),
    ) {
        let ranking = Ranking::from_results(build(&scores));
        let prior = capped_prior(&prior, &config);
        let first = rebalance(&prior, &ranking, &config);
        let second = rebalance(&first.symbols(), &ranking, &config);

        prop_assert_eq!(second.symbols(), first.symbols());
        prop_assert!(second.added.is_empty());
        prop_assert!(second.removed.is_empty());
    }

    #[test]
    fn ranking_input_order_does_not_matter(
        scores in arb_scores(),
        prior in arb_prior(),
        config in arb_config(),
    ) {
        let forward = Ranking::from_results(build(&scores));
        let mut reversed_input = build(&scores);
        reversed_input.reverse();
        let backward = Ranking::from_results(reversed_input);
        prop_assert_eq!(&forward, &backward);

        let prior = capped_prior(&prior, &config);
        prop_assert_eq!(
            rebalance(&prior, &forward, &config),
            rebalance(&prior, &backward, &config)
        );
    }

    #[test]
    fn diff_lists_are_consistent(
        scores in arb_scores(),
        prior in arb_prior(),
        config in arb_config(),
    ) {
        let ranking = Ranking::from_results(build(&scores));
        let prior: Vec<String> = prior.iter().map(|&i| symbol(i)).collect();
        let outcome = rebalance(&prior, &ranking, &config);

        let prior_set: BTreeSet<&str> = prior.iter().map(String::as_str).collect();
        let new_set: BTreeSet<&str> = outcome.new_portfolio.iter().map(|h| h.symbol.as_str()).collect();
        let added: BTreeSet<&str> = outcome.added.iter().map(String::as_str).collect();
        let removed: BTreeSet<&str> = outcome.removed.iter().map(String::as_str).collect();

        let expected_added: BTreeSet<&str> = new_set.difference(&prior_set).copied().collect();
        let expected_removed: BTreeSet<&str> = prior_set.difference(&new_set).copied().collect();
        prop_assert_eq!(added, expected_added);
        prop_assert_eq!(removed, expected_removed);

        // added is in rank order
        let ranks: Vec<usize> = outcome
            .added
            .iter()
            .map(|s| ranking.position(s).unwrap_or(usize::MAX))
            .collect();
        prop_assert!(ranks.windows(2).all(|w| w[0] < w[1]));
    }
}
