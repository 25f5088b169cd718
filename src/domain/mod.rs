//! Core domain types and logic: indicators, screening, ranking, rebalancing
//! and monitoring.

pub mod ohlcv;
pub mod indicator;
pub mod filter;
pub mod scorer;
pub mod ranking;
pub mod universe;
pub mod fetch;
pub mod screener;
pub mod portfolio;
pub mod rebalancer;
pub mod monitor;
pub mod report;
pub mod config;
pub mod config_validation;
pub mod error;
