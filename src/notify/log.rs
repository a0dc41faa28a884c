//! Notifier that writes messages to the log instead of sending them.

use super::{Notifier, NotifyError};

/// Logs every message at `info` level and reports success.
///
/// Used by `--dry-run`.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    resource: String,
}

impl LogNotifier {
    /// Creates a log notifier tagging messages with `resource`.
    #[must_use]
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
        }
    }
}

impl Notifier for LogNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(resource = %self.resource, "[dry-run] {subject}\n{body}");
        Ok(())
    }
}
