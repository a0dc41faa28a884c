//! Ranked remote lookup endpoints.

use std::time::Duration;

use url::Url;

use super::LookupError;
use crate::network::is_valid_ipv4;
use crate::transport::{HttpClient, HttpError, HttpRequest};

/// Longest body excerpt kept in an [`LookupError::InvalidResponse`].
const BODY_EXCERPT_CHARS: usize = 64;

/// The address returned by the first endpoint that answered correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteMatch {
    /// The validated address, trimmed.
    pub address: String,
    /// The endpoint that returned it.
    pub endpoint: Url,
}

/// An ordered list of "what is my address" endpoints.
///
/// Endpoints are queried one at a time, in order, each bounded by the same
/// timeout. The first valid answer wins and later endpoints are never
/// contacted. Failures are logged and skipped.
#[derive(Debug)]
pub struct RemoteLookupChain<H> {
    client: H,
    endpoints: Vec<Url>,
    timeout: Duration,
}

impl<H> RemoteLookupChain<H> {
    /// Creates a lookup chain.
    #[must_use]
    pub const fn new(client: H, endpoints: Vec<Url>, timeout: Duration) -> Self {
        Self {
            client,
            endpoints,
            timeout,
        }
    }

    /// Returns the configured endpoints in priority order.
    #[must_use]
    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    /// Returns the per-endpoint timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the number of endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Returns true if no endpoints are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

impl<H: HttpClient> RemoteLookupChain<H> {
    /// Walks the chain and returns the first valid address.
    ///
    /// Returns `None` when every endpoint failed.
    pub async fn lookup(&self) -> Option<RemoteMatch> {
        for endpoint in &self.endpoints {
            tracing::debug!("Querying lookup endpoint {endpoint}");

            match self.attempt(endpoint).await {
                Ok(address) => {
                    tracing::info!("Lookup endpoint {endpoint} reported {address}");
                    return Some(RemoteMatch {
                        address,
                        endpoint: endpoint.clone(),
                    });
                }
                Err(e) => tracing::warn!("Lookup failed: {e}"),
            }
        }

        tracing::error!("All {} lookup endpoint(s) failed", self.endpoints.len());
        None
    }

    /// Queries a single endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError`] on timeout, transport failure, non-2xx status,
    /// or a body that is not a valid address once trimmed.
    pub async fn attempt(&self, endpoint: &Url) -> Result<String, LookupError> {
        let request = HttpRequest::get(endpoint.clone())
            .with_user_agent()
            .with_timeout(self.timeout);

        let response = match tokio::time::timeout(self.timeout, self.client.request(request)).await
        {
            Err(_) | Ok(Err(HttpError::Timeout)) => {
                return Err(LookupError::Timeout {
                    endpoint: endpoint.to_string(),
                    timeout: self.timeout,
                });
            }
            Ok(Err(source)) => {
                return Err(LookupError::Http {
                    endpoint: endpoint.to_string(),
                    source,
                });
            }
            Ok(Ok(response)) => response,
        };

        if !response.is_success() {
            return Err(LookupError::Status {
                endpoint: endpoint.to_string(),
                status: response.status,
            });
        }

        match response.trimmed_text() {
            Some(body) if is_valid_ipv4(body) => Ok(body.to_string()),
            _ => Err(LookupError::InvalidResponse {
                endpoint: endpoint.to_string(),
                body: response.excerpt(BODY_EXCERPT_CHARS),
            }),
        }
    }
}
