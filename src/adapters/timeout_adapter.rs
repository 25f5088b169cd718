//! Per-symbol fetch deadline around any [`DataPort`].
//!
//! Each fetch runs on its own thread; if no result arrives within the limit
//! the caller gets `Timeout` and the stray thread's result is discarded.

use crate::domain::error::MomfolioError;
use crate::domain::ohlcv::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::warn;

pub struct TimeoutAdapter {
    inner: Arc<dyn DataPort>,
    limit: Duration,
}

impl TimeoutAdapter {
    pub fn new(inner: Arc<dyn DataPort>, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

impl DataPort for TimeoutAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: NaiveDate,
    ) -> Result<PriceSeries, MomfolioError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let owned_code = code.to_string();

        thread::Builder::new()
            .name(format!("fetch-{}", code))
            .spawn(move || {
                // Receiver may be gone after a timeout.
                let _ = tx.send(inner.fetch_ohlcv(&owned_code, start_date, end_date));
            })?;

        match rx.recv_timeout(self.limit) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(symbol = code, secs = self.limit.as_secs(), "fetch timed out");
                Err(MomfolioError::Timeout {
                    code: code.to_string(),
                    secs: self.limit.as_secs(),
                })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(MomfolioError::DataSource {
                reason: format!("fetch worker for {} exited without a result", code),
            }),
        }
    }

    fn list_symbols(&self) -> Result<Vec<String>, MomfolioError> {
        self.inner.list_symbols()
    }
}
