//! Persisted portfolio document port.

use crate::domain::error::MomfolioError;
use crate::domain::portfolio::Portfolio;

/// Exclusive writer guard for the portfolio document. Released on drop.
pub struct StoreLock {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl StoreLock {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }
}

impl std::fmt::Debug for StoreLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreLock").finish_non_exhaustive()
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

pub trait PortfolioStore {
    /// `Ok(None)` when no portfolio has been saved yet. A document that
    /// exists but cannot be read is an error, never an empty portfolio.
    fn load(&self) -> Result<Option<Portfolio>, MomfolioError>;

    /// Replaces the stored document wholesale.
    fn save(&self, portfolio: &Portfolio) -> Result<(), MomfolioError>;

    /// Takes the single-writer lock; fails if another writer holds it.
    fn lock(&self) -> Result<StoreLock, MomfolioError>;
}
