//! Price history access port.

use crate::domain::error::MomfolioError;
use crate::domain::ohlcv::PriceSeries;
use chrono::NaiveDate;

/// Source of daily bars. Implementations must return bars in ascending date
/// order without synthesizing missing days.
pub trait DataPort: Send + Sync {
    /// Bars for `code` dated within `[start_date, end_date]`; `None` start
    /// means the entire available history.
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, MomfolioError>;

    fn list_symbols(&self) -> Result<Vec<String>, MomfolioError>;
}
