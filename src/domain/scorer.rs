//! Per-symbol momentum evaluation.
//!
//! Runs the filter pipeline and computes the Sharpe ratio for every configured
//! lookback. The longest lookback is the ranking score; a symbol without it is
//! ineligible whatever the shorter windows say.

use crate::domain::config::MomentumConfig;
use crate::domain::filter::{FilterPipeline, StageKind, StageOutcome};
use crate::domain::indicator::sharpe::sharpe_for_months;
use crate::domain::ohlcv::PriceSeries;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodSharpe {
    pub months: u32,
    pub sharpe: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenResult {
    pub symbol: String,
    pub passes_technical_filter: bool,
    pub passes_momentum_filter: bool,
    pub sharpe_score: Option<f64>,
    pub eligible: bool,
    pub current_price: Option<f64>,
    pub dma: Option<f64>,
    pub high_distance_pct: Option<f64>,
    pub sharpe_by_period: Vec<PeriodSharpe>,
    pub stages: Vec<StageOutcome>,
}

impl ScreenResult {
    /// Result for a symbol whose series could not be obtained.
    pub fn unavailable(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            passes_technical_filter: false,
            passes_momentum_filter: false,
            sharpe_score: None,
            eligible: false,
            current_price: None,
            dma: None,
            high_distance_pct: None,
            sharpe_by_period: Vec::new(),
            stages: Vec::new(),
        }
    }

    /// First failing stage, or the missing score, as a one-line reason.
    pub fn rejection_reason(&self) -> Option<String> {
        if self.eligible {
            return None;
        }
        if let Some(stage) = self.stages.iter().find(|s| !s.passed) {
            return Some(match &stage.diagnostic {
                Some(d) => format!("{}: {}", stage.stage, d),
                None => stage.stage.clone(),
            });
        }
        Some("sharpe score indeterminate".to_string())
    }
}

pub struct MomentumScorer {
    pipeline: FilterPipeline,
    lookback_periods: Vec<u32>,
    primary_lookback: Option<u32>,
}

impl MomentumScorer {
    pub fn new(config: &MomentumConfig) -> Self {
        Self::with_pipeline(config, FilterPipeline::from_config(config))
    }

    pub fn with_pipeline(config: &MomentumConfig, pipeline: FilterPipeline) -> Self {
        Self {
            pipeline,
            lookback_periods: config.lookback_periods.clone(),
            primary_lookback: config.primary_lookback(),
        }
    }

    pub fn evaluate(&self, series: &PriceSeries) -> ScreenResult {
        if series.is_empty() {
            return ScreenResult::unavailable(&series.code);
        }

        let stages = self.pipeline.evaluate(series);
        let kind_passes = |kind: StageKind| {
            stages
                .iter()
                .filter(|s| s.kind == kind)
                .all(|s| s.passed)
        };
        let passes_technical_filter = kind_passes(StageKind::Technical);
        let passes_momentum_filter = kind_passes(StageKind::Momentum);
        let all_stages_pass = stages.iter().all(|s| s.passed);

        let closes = series.closes();
        let sharpe_by_period: Vec<PeriodSharpe> = self
            .lookback_periods
            .iter()
            .map(|&months| PeriodSharpe {
                months,
                sharpe: sharpe_for_months(&closes, months),
            })
            .collect();
        let sharpe_score = self.primary_lookback.and_then(|primary| {
            sharpe_by_period
                .iter()
                .find(|p| p.months == primary)
                .and_then(|p| p.sharpe)
        });

        let stage_value = |kind: StageKind| {
            stages
                .iter()
                .find(|s| s.kind == kind)
                .and_then(|s| s.value)
        };

        ScreenResult {
            symbol: series.code.clone(),
            passes_technical_filter,
            passes_momentum_filter,
            sharpe_score,
            eligible: all_stages_pass
                && passes_technical_filter
                && passes_momentum_filter
                && sharpe_score.is_some(),
            current_price: series.latest_close(),
            dma: stage_value(StageKind::Technical),
            high_distance_pct: stage_value(StageKind::Momentum),
            sharpe_by_period,
            stages,
        }
    }
}
