//! Domain error types.

/// Top-level error type for momfolio.
#[derive(Debug, thiserror::Error)]
pub enum MomfolioError {
    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("insufficient data for {code}: have {bars} bars, need {minimum}")]
    InsufficientData {
        code: String,
        bars: usize,
        minimum: usize,
    },

    #[error("fetch for {code} timed out after {secs}s")]
    Timeout { code: String, secs: u64 },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("cannot access {path}: {reason}")]
    Persistence { path: String, reason: String },

    #[error("no saved portfolio; run a rebalance first")]
    NoPortfolio,

    #[error("{path} is locked by another rebalance")]
    Locked { path: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MomfolioError {
    /// True for per-symbol failures that downgrade a symbol instead of aborting a run.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            MomfolioError::DataSource { .. }
                | MomfolioError::NoData { .. }
                | MomfolioError::InsufficientData { .. }
                | MomfolioError::Timeout { .. }
        )
    }
}

impl From<&MomfolioError> for std::process::ExitCode {
    fn from(err: &MomfolioError) -> Self {
        let code: u8 = match err {
            MomfolioError::Io(_) => 1,
            MomfolioError::ConfigParse { .. }
            | MomfolioError::ConfigMissing { .. }
            | MomfolioError::ConfigInvalid { .. } => 2,
            MomfolioError::Persistence { .. }
            | MomfolioError::NoPortfolio
            | MomfolioError::Locked { .. }
            | MomfolioError::Json(_) => 3,
            MomfolioError::DataSource { .. }
            | MomfolioError::NoData { .. }
            | MomfolioError::InsufficientData { .. }
            | MomfolioError::Timeout { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_errors_are_classified() {
        assert!(MomfolioError::NoData { code: "TCS".into() }.is_data_error());
        assert!(
            MomfolioError::Timeout {
                code: "TCS".into(),
                secs: 5
            }
            .is_data_error()
        );
        assert!(
            !MomfolioError::ConfigMissing {
                section: "data".into(),
                key: "path".into()
            }
            .is_data_error()
        );
    }

    #[test]
    fn display_includes_context() {
        let err = MomfolioError::InsufficientData {
            code: "INFY".into(),
            bars: 120,
            minimum: 200,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data for INFY: have 120 bars, need 200"
        );
    }
}
