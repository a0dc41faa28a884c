//! Baseline persistence: the last known value of each monitored resource.
//!
//! Each monitor owns exactly one store. A store holds a single record that
//! is overwritten in place; there is no history.

mod file;
mod memory;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileBaselineStore;
pub use memory::MemoryBaselineStore;

use std::io;
use std::time::SystemTime;

use thiserror::Error;

/// The persisted last-known value of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    /// The bare value, trimmed of surrounding whitespace.
    pub value: String,
    /// When the value was last written, if the backend knows.
    pub persisted_at: Option<SystemTime>,
}

impl Baseline {
    /// Creates a baseline record.
    #[must_use]
    pub fn new(value: impl Into<String>, persisted_at: Option<SystemTime>) -> Self {
        Self {
            value: value.into(),
            persisted_at,
        }
    }
}

/// Errors that can occur while reading or writing a baseline.
#[derive(Debug, Error)]
pub enum StateError {
    /// The baseline exists but could not be read.
    #[error("Failed to read baseline: {0}")]
    Read(#[source] io::Error),

    /// The baseline could not be written.
    #[error("Failed to write baseline: {0}")]
    Write(#[source] io::Error),
}

/// Single-slot storage for one monitor's baseline.
///
/// A missing baseline is the normal first-run state, not an error.
/// Writing the value that is already stored is observably a no-op.
pub trait BaselineStore: Send + Sync {
    /// Loads the stored baseline, or `None` if nothing was stored yet.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Read`] if the backing storage exists but
    /// cannot be read.
    fn load(&self) -> Result<Option<Baseline>, StateError>;

    /// Returns the stored value, or an empty string if there is none.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    fn read(&self) -> Result<String, StateError> {
        Ok(self.load()?.map(|b| b.value).unwrap_or_default())
    }

    /// Replaces the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Write`] if the value could not be made durable.
    fn write(&self, value: &str) -> impl std::future::Future<Output = Result<(), StateError>> + Send;
}

impl<T: BaselineStore> BaselineStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<Baseline>, StateError> {
        (**self).load()
    }

    async fn write(&self, value: &str) -> Result<(), StateError> {
        (**self).write(value).await
    }
}
