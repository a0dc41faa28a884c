//! File-backed baseline store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Baseline, BaselineStore, StateError};

/// Stores a baseline as a plain-text file holding the bare value.
///
/// # Atomic Writes
///
/// Uses write-to-temp-then-rename so the file is either fully written or
/// not written at all:
/// 1. Write to `{path}.tmp`
/// 2. Rename `{path}.tmp` to `{path}`
///
/// Missing parent directories are created on first write.
#[derive(Debug, Clone)]
pub struct FileBaselineStore {
    path: PathBuf,
}

impl FileBaselineStore {
    /// Creates a store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the baseline file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Performs the blocking write.
    ///
    /// Separated out so it can be wrapped in `spawn_blocking`.
    fn write_blocking(path: &Path, value: &str) -> Result<(), StateError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(StateError::Write)?;
        }

        // state.txt -> state.txt.tmp, not state.tmp
        let temp_path = PathBuf::from(format!("{}.tmp", path.display()));

        std::fs::write(&temp_path, value).map_err(StateError::Write)?;
        std::fs::rename(&temp_path, path).map_err(StateError::Write)?;

        Ok(())
    }
}

impl BaselineStore for FileBaselineStore {
    fn load(&self) -> Result<Option<Baseline>, StateError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StateError::Read(e)),
        };

        let value = content.trim();
        if value.is_empty() {
            return Ok(None);
        }

        let persisted_at = std::fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .ok();

        Ok(Some(Baseline::new(value, persisted_at)))
    }

    async fn write(&self, value: &str) -> Result<(), StateError> {
        let value = value.trim().to_string();

        if matches!(self.load(), Ok(Some(ref current)) if current.value == value) {
            tracing::debug!("Baseline {} already holds {value}", self.path.display());
            return Ok(());
        }

        let path = self.path.clone();
        tokio::task::spawn_blocking(move || Self::write_blocking(&path, &value))
            .await
            .map_err(|e| StateError::Write(std::io::Error::other(e)))?
    }
}
