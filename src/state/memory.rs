//! In-memory baseline store.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::SystemTime;

use super::{Baseline, BaselineStore, StateError};

/// A baseline store that lives only as long as the process.
///
/// Counts the writes that actually changed the stored value, so callers can
/// observe that unchanged values are never rewritten.
#[derive(Debug, Default)]
pub struct MemoryBaselineStore {
    slot: Mutex<Option<Baseline>>,
    writes: AtomicUsize,
}

impl MemoryBaselineStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `value`.
    #[must_use]
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(Baseline::new(value, Some(SystemTime::now())))),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of writes that replaced the stored value.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Baseline>> {
        self.slot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl BaselineStore for MemoryBaselineStore {
    fn load(&self) -> Result<Option<Baseline>, StateError> {
        Ok(self.slot().clone())
    }

    async fn write(&self, value: &str) -> Result<(), StateError> {
        let value = value.trim();
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|b| b.value == value) {
            return Ok(());
        }
        *slot = Some(Baseline::new(value, Some(SystemTime::now())));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
