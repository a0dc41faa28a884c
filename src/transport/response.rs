//! Buffered responses.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub const fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// A 200 response with the given body and no headers.
    #[must_use]
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(StatusCode::OK, HeaderMap::new(), body.into())
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The body as UTF-8, if it is.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// The body as UTF-8 with surrounding whitespace removed.
    ///
    /// Plain-text lookup services end their answer with a newline.
    #[must_use]
    pub fn trimmed_text(&self) -> Option<&str> {
        self.body_text().map(str::trim)
    }

    /// At most `max_chars` characters of the trimmed body, for logs and
    /// error messages. Invalid UTF-8 is replaced rather than rejected.
    #[must_use]
    pub fn excerpt(&self, max_chars: usize) -> String {
        String::from_utf8_lossy(&self.body)
            .trim()
            .chars()
            .take(max_chars)
            .collect()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
