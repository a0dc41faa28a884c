//! Error types for the probe layer.

use std::time::Duration;

use thiserror::Error;

use crate::transport::HttpError;

/// A single remote lookup attempt failed.
///
/// Always recovered locally by moving on to the next endpoint.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The endpoint did not answer within the configured timeout.
    #[error("{endpoint} timed out after {}s", timeout.as_secs())]
    Timeout {
        /// The endpoint that was queried.
        endpoint: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The endpoint answered, but not with an address.
    #[error("{endpoint} returned an invalid address: {body:?}")]
    InvalidResponse {
        /// The endpoint that was queried.
        endpoint: String,
        /// The trimmed body (truncated).
        body: String,
    },

    /// The endpoint answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        /// The endpoint that was queried.
        endpoint: String,
        /// The status code received.
        status: http::StatusCode,
    },

    /// The request could not be completed.
    #[error("{endpoint} request failed: {source}")]
    Http {
        /// The endpoint that was queried.
        endpoint: String,
        /// Underlying transport error.
        #[source]
        source: HttpError,
    },
}

/// Error type for a whole probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Local scan found nothing and every remote endpoint failed.
    #[error("No address found on local interfaces and all {attempts} lookup endpoint(s) failed")]
    AllProbesExhausted {
        /// Number of remote endpoints attempted.
        attempts: usize,
    },

    /// The tunnel agent answered but lists no secure tunnel.
    #[error("Tunnel agent at {endpoint} lists no https tunnel")]
    NoSecureTunnel {
        /// The introspection endpoint.
        endpoint: String,
    },

    /// The tunnel agent could not be reached at all.
    #[error("Tunnel agent unreachable at {endpoint}: {reason}")]
    IntrospectionUnreachable {
        /// The introspection endpoint.
        endpoint: String,
        /// What went wrong.
        reason: String,
    },

    /// The tunnel agent answered with a payload that could not be decoded.
    #[error("Tunnel agent at {endpoint} returned a malformed response: {reason}")]
    IntrospectionMalformed {
        /// The introspection endpoint.
        endpoint: String,
        /// Decoder error.
        reason: String,
    },
}

impl ProbeError {
    /// Returns true when the probe ran normally but found no value.
    #[must_use]
    pub const fn is_undetectable(&self) -> bool {
        matches!(
            self,
            Self::AllProbesExhausted { .. } | Self::NoSecureTunnel { .. }
        )
    }

    /// Returns true when the tunnel agent itself is down.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::IntrospectionUnreachable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_displays_endpoint_and_seconds() {
        let error = LookupError::Timeout {
            endpoint: "https://api.ipify.org/".to_string(),
            timeout: Duration::from_secs(10),
        };

        assert_eq!(error.to_string(), "https://api.ipify.org/ timed out after 10s");
    }

    #[test]
    fn invalid_response_shows_body() {
        let error = LookupError::InvalidResponse {
            endpoint: "https://ifconfig.me/ip".to_string(),
            body: "<html>".to_string(),
        };

        assert!(error.to_string().contains("\"<html>\""));
    }

    #[test]
    fn http_error_preserves_source() {
        use std::error::Error;

        let error = LookupError::Http {
            endpoint: "https://icanhazip.com/".to_string(),
            source: HttpError::Timeout,
        };

        assert!(error.source().is_some());
    }

    #[test]
    fn classification_helpers() {
        let exhausted = ProbeError::AllProbesExhausted { attempts: 4 };
        let no_tunnel = ProbeError::NoSecureTunnel {
            endpoint: "http://127.0.0.1:4040/api/tunnels".to_string(),
        };
        let unreachable = ProbeError::IntrospectionUnreachable {
            endpoint: "http://127.0.0.1:4040/api/tunnels".to_string(),
            reason: "connection refused".to_string(),
        };
        let malformed = ProbeError::IntrospectionMalformed {
            endpoint: "http://127.0.0.1:4040/api/tunnels".to_string(),
            reason: "expected value".to_string(),
        };

        assert!(exhausted.is_undetectable());
        assert!(no_tunnel.is_undetectable());
        assert!(!unreachable.is_undetectable());
        assert!(unreachable.is_unreachable());
        assert!(!malformed.is_undetectable());
        assert!(!malformed.is_unreachable());
    }

    #[test]
    fn exhausted_displays_attempts() {
        let error = ProbeError::AllProbesExhausted { attempts: 4 };
        assert!(error.to_string().contains("all 4 lookup endpoint(s) failed"));
    }
}
