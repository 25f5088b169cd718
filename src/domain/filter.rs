//! Composable screening filter stages.
//!
//! Each stage inspects one price series and returns pass/fail plus the value
//! it measured. Stages are grouped by [`StageKind`] so the scorer can report
//! the technical (trend) and momentum (proximity to high) verdicts separately.
//! New filters are added with [`FilterPipeline::with_stage`].

use crate::domain::config::MomentumConfig;
use crate::domain::error::MomfolioError;
use crate::domain::indicator::high::{HighReference, distance_from_high_pct};
use crate::domain::indicator::sma::{trailing_mean, trailing_sma};
use crate::domain::ohlcv::PriceSeries;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Technical,
    Momentum,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageOutcome {
    pub stage: String,
    pub kind: StageKind,
    pub passed: bool,
    /// The measured quantity (DMA, distance from high, average volume).
    pub value: Option<f64>,
    pub diagnostic: Option<String>,
}

impl StageOutcome {
    fn pass(stage: &dyn FilterStage, value: f64) -> Self {
        Self {
            stage: stage.name().to_string(),
            kind: stage.kind(),
            passed: true,
            value: Some(value),
            diagnostic: None,
        }
    }

    fn fail(stage: &dyn FilterStage, value: Option<f64>, diagnostic: String) -> Self {
        Self {
            stage: stage.name().to_string(),
            kind: stage.kind(),
            passed: false,
            value,
            diagnostic: Some(diagnostic),
        }
    }
}

pub trait FilterStage: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> StageKind;
    fn evaluate(&self, series: &PriceSeries) -> StageOutcome;
}

/// Latest close strictly above the trailing `period`-bar SMA.
#[derive(Debug, Clone)]
pub struct TrendFilter {
    pub period: usize,
}

impl FilterStage for TrendFilter {
    fn name(&self) -> &str {
        "dma_trend"
    }

    fn kind(&self) -> StageKind {
        StageKind::Technical
    }

    fn evaluate(&self, series: &PriceSeries) -> StageOutcome {
        let closes = series.closes();
        let Some(dma) = trailing_sma(&closes, self.period) else {
            let short = MomfolioError::InsufficientData {
                code: series.code.clone(),
                bars: closes.len(),
                minimum: self.period,
            };
            return StageOutcome::fail(self, None, short.to_string());
        };
        match closes.last() {
            Some(&close) if close > dma => StageOutcome::pass(self, dma),
            Some(&close) => StageOutcome::fail(
                self,
                Some(dma),
                format!("close {:.2} not above DMA {:.2}", close, dma),
            ),
            None => StageOutcome::fail(self, None, "empty series".to_string()),
        }
    }
}

/// Latest close within `threshold_pct` percent of the reference high.
#[derive(Debug, Clone)]
pub struct HighProximityFilter {
    pub threshold_pct: f64,
    pub reference: HighReference,
}

impl FilterStage for HighProximityFilter {
    fn name(&self) -> &str {
        match self.reference {
            HighReference::Week52 => "near_52_week_high",
            HighReference::AllTime => "near_all_time_high",
        }
    }

    fn kind(&self) -> StageKind {
        StageKind::Momentum
    }

    fn evaluate(&self, series: &PriceSeries) -> StageOutcome {
        let closes = series.closes();
        match distance_from_high_pct(&closes, self.reference) {
            Some(distance) if distance <= self.threshold_pct => StageOutcome::pass(self, distance),
            Some(distance) => StageOutcome::fail(
                self,
                Some(distance),
                format!(
                    "{:.1}% below high, limit {:.1}%",
                    distance, self.threshold_pct
                ),
            ),
            None => StageOutcome::fail(self, None, "no reference high".to_string()),
        }
    }
}

/// Trailing average volume at least `min_volume`.
#[derive(Debug, Clone)]
pub struct AverageVolumeFilter {
    pub min_volume: f64,
    pub period: usize,
}

impl FilterStage for AverageVolumeFilter {
    fn name(&self) -> &str {
        "min_avg_volume"
    }

    fn kind(&self) -> StageKind {
        StageKind::Custom
    }

    fn evaluate(&self, series: &PriceSeries) -> StageOutcome {
        let volumes = series.bars.iter().map(|b| b.volume as f64);
        match trailing_mean(volumes, self.period) {
            Some(avg) if avg >= self.min_volume => StageOutcome::pass(self, avg),
            Some(avg) => StageOutcome::fail(
                self,
                Some(avg),
                format!("average volume {:.0} below {:.0}", avg, self.min_volume),
            ),
            None => {
                let short = MomfolioError::InsufficientData {
                    code: series.code.clone(),
                    bars: series.len(),
                    minimum: self.period,
                };
                StageOutcome::fail(self, None, short.to_string())
            }
        }
    }
}

pub struct FilterPipeline {
    stages: Vec<Box<dyn FilterStage>>,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Trend and high-proximity stages, plus the volume stage when enabled.
    pub fn from_config(config: &MomentumConfig) -> Self {
        let mut pipeline = Self::new()
            .with_stage(Box::new(TrendFilter {
                period: config.dma_period,
            }))
            .with_stage(Box::new(HighProximityFilter {
                threshold_pct: config.high_percentage_threshold,
                reference: config.high_reference(),
            }));
        if config.min_avg_volume > 0.0 {
            pipeline = pipeline.with_stage(Box::new(AverageVolumeFilter {
                min_volume: config.min_avg_volume,
                period: config.volume_period,
            }));
        }
        pipeline
    }

    pub fn with_stage(mut self, stage: Box<dyn FilterStage>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Every stage runs, so a report shows all failing reasons at once.
    pub fn evaluate(&self, series: &PriceSeries) -> Vec<StageOutcome> {
        self.stages.iter().map(|s| s.evaluate(series)).collect()
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
