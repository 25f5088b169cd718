//! Result document port.

use crate::domain::error::MomfolioError;
use crate::domain::report::{MonitorReport, RebalanceReport};
use std::path::PathBuf;

/// Port for writing run reports. Returns where the document was written.
pub trait ReportPort {
    fn write_rebalance(&self, report: &RebalanceReport) -> Result<PathBuf, MomfolioError>;

    fn write_monitor(&self, report: &MonitorReport) -> Result<PathBuf, MomfolioError>;
}
