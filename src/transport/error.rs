//! Transport failures.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Why an HTTP exchange produced no usable response.
///
/// A response with an unexpected status is not an error at this layer;
/// callers inspect [`HttpResponse::status`](super::HttpResponse::status).
#[derive(Debug, Error)]
pub enum HttpError {
    /// DNS, TCP or TLS failure before a response arrived.
    #[error("Connection error: {0}")]
    Connection(#[source] BoxError),

    /// No complete response within the request's timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request could not be built from the URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The status line arrived but the body could not be read in full.
    #[error("Failed to read response body: {0}")]
    Body(#[source] BoxError),
}

impl HttpError {
    /// Returns true if repeating the same request might succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, Self::InvalidUrl(_))
    }
}
