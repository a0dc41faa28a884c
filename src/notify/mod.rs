//! Notification delivery.
//!
//! This module provides:
//! - The delivery contract ([`Notifier`])
//! - An HTTP webhook notifier with retries ([`HttpWebhook`], [`RetryPolicy`])
//! - A notifier that only logs, for dry runs ([`LogNotifier`])
//! - Error handling ([`NotifyError`], [`DeliveryError`])

mod error;
mod log;
mod retry;
mod webhook;


pub use error::{DeliveryError, NotifyError};
pub use log::LogNotifier;
pub use retry::RetryPolicy;
pub use webhook::{HttpWebhook, IsRetryable};

use std::future::Future;

/// Delivers a plain-text message to a human.
///
/// Failures are reported back to the caller but are never fatal to a
/// monitoring cycle.
pub trait Notifier: Send + Sync {
    /// Sends one message.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the message could not be delivered after
    /// all retries.
    fn notify(&self, subject: &str, body: &str) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

impl<T: Notifier> Notifier for std::sync::Arc<T> {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        (**self).notify(subject, body).await
    }
}

impl<T: Notifier> Notifier for &T {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        (**self).notify(subject, body).await
    }
}
