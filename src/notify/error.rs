//! Error types for notification delivery.

use thiserror::Error;

use crate::transport::HttpError;

/// Failure of a single delivery attempt.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Server returned a non-success status code.
    #[error("Non-success status: {status}")]
    NonSuccessStatus {
        /// The HTTP status code returned by the server.
        status: http::StatusCode,
        /// Optional response body for debugging.
        body: Option<String>,
    },

    /// The body template could not be rendered.
    #[error("Template error: {0}")]
    Template(String),
}

/// Error returned by [`Notifier::notify`](super::Notifier::notify).
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Every attempt failed with a transient error.
    #[error("Delivery failed after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        /// Number of attempts made.
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        last_error: DeliveryError,
    },

    /// An attempt failed in a way that retrying cannot fix.
    #[error("Delivery failed: {0}")]
    NonRetryable(#[from] DeliveryError),
}
