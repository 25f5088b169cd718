//! Configuration validation.
//!
//! Runs before any fetch so that a bad value aborts the run with no side effects.
//! A missing key takes its default; a present key that does not parse is invalid.

use crate::domain::config::{
    DEFAULT_DMA_PERIOD, DEFAULT_EXIT_RANK, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_LOOKBACK_PERIODS,
    DEFAULT_HIGH_PERCENTAGE_THRESHOLD, DEFAULT_MAX_STOCKS, DEFAULT_VOLUME_PERIOD, DEFAULT_WORKERS,
    parse_flag, parse_lookback_periods,
};
use crate::domain::error::MomfolioError;
use crate::ports::config_port::ConfigPort;

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    validate_portfolio_config(config)?;
    validate_data_config(config)?;
    Ok(())
}

pub fn validate_portfolio_config(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    validate_max_stocks(config)?;
    validate_exit_rank(config)?;
    validate_dma_period(config)?;
    validate_lookback_periods(config)?;
    validate_high_threshold(config)?;
    validate_all_time_high(config)?;
    validate_volume_filter(config)?;
    Ok(())
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    validate_workers(config)?;
    validate_fetch_timeout(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> MomfolioError {
    MomfolioError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn int_value(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, MomfolioError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            invalid(section, key, &format!("expected an integer, got '{raw}'"))
        }),
    }
}

fn float_value(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, MomfolioError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => match raw.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(invalid(
                section,
                key,
                &format!("expected a number, got '{raw}'"),
            )),
        },
    }
}

fn validate_max_stocks(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    if int_value(config, "portfolio", "max_stocks", DEFAULT_MAX_STOCKS)? < 1 {
        return Err(invalid(
            "portfolio",
            "max_stocks",
            "max_stocks must be at least 1",
        ));
    }
    Ok(())
}

fn validate_exit_rank(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    if int_value(config, "portfolio", "exit_rank", DEFAULT_EXIT_RANK)? < 1 {
        return Err(invalid(
            "portfolio",
            "exit_rank",
            "exit_rank must be at least 1",
        ));
    }
    Ok(())
}

fn validate_dma_period(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    if int_value(config, "portfolio", "dma_period", DEFAULT_DMA_PERIOD)? < 1 {
        return Err(invalid(
            "portfolio",
            "dma_period",
            "dma_period must be positive",
        ));
    }
    Ok(())
}

fn validate_lookback_periods(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    let value = config
        .get_string("portfolio", "lookback_periods")
        .unwrap_or_else(|| DEFAULT_LOOKBACK_PERIODS.to_string());
    if value.trim().is_empty() {
        return Err(invalid(
            "portfolio",
            "lookback_periods",
            "at least one lookback period is required",
        ));
    }
    parse_lookback_periods(&value).map(|_| ())
}

fn validate_high_threshold(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    let value = float_value(
        config,
        "portfolio",
        "high_percentage_threshold",
        DEFAULT_HIGH_PERCENTAGE_THRESHOLD,
    )?;
    if !(0.0..=100.0).contains(&value) {
        return Err(invalid(
            "portfolio",
            "high_percentage_threshold",
            "high_percentage_threshold must be between 0 and 100",
        ));
    }
    Ok(())
}

fn validate_all_time_high(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    match config.get_string("portfolio", "use_all_time_high") {
        Some(raw) if parse_flag(&raw).is_none() => Err(invalid(
            "portfolio",
            "use_all_time_high",
            &format!("expected true or false, got '{raw}'"),
        )),
        _ => Ok(()),
    }
}

fn validate_volume_filter(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    if float_value(config, "portfolio", "min_avg_volume", 0.0)? < 0.0 {
        return Err(invalid(
            "portfolio",
            "min_avg_volume",
            "min_avg_volume must be non-negative",
        ));
    }
    if int_value(config, "portfolio", "volume_period", DEFAULT_VOLUME_PERIOD)? < 1 {
        return Err(invalid(
            "portfolio",
            "volume_period",
            "volume_period must be at least 1",
        ));
    }
    Ok(())
}

fn validate_workers(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    if int_value(config, "data", "workers", DEFAULT_WORKERS)? < 1 {
        return Err(invalid("data", "workers", "workers must be at least 1"));
    }
    Ok(())
}

fn validate_fetch_timeout(config: &dyn ConfigPort) -> Result<(), MomfolioError> {
    if int_value(config, "data", "fetch_timeout_secs", DEFAULT_FETCH_TIMEOUT_SECS)? < 0 {
        return Err(invalid(
            "data",
            "fetch_timeout_secs",
            "fetch_timeout_secs must be non-negative",
        ));
    }
    Ok(())
}
