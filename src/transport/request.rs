//! Outgoing requests and the client seam.

use std::future::Future;
use std::time::Duration;

use http::header::{HeaderName, HeaderValue, USER_AGENT};
use http::{HeaderMap, Method};
use url::Url;

use super::{HttpError, HttpResponse};

/// An HTTP request to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Target URL
    pub url: Url,
    /// Headers, possibly with repeated names
    pub headers: HeaderMap,
    /// Optional request body
    pub body: Option<Vec<u8>>,
    /// Upper bound for the whole exchange, if any
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Creates a request with no headers, body or timeout.
    #[must_use]
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        }
    }

    /// Creates a GET request.
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Creates a POST request.
    #[must_use]
    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Appends a header, keeping earlier values of the same name.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Identifies this program in `User-Agent` unless one is already set.
    ///
    /// Some lookup services reject requests without a user agent.
    #[must_use]
    pub fn with_user_agent(mut self) -> Self {
        self.headers
            .entry(USER_AGENT)
            .or_insert(HeaderValue::from_static(super::USER_AGENT));
        self
    }

    /// Bounds the whole exchange, body included.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Something that can perform an HTTP exchange.
///
/// Probes and the webhook notifier are generic over this trait so tests can
/// script responses without a network.
pub trait HttpClient: Send + Sync {
    /// Sends a request and buffers the response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if no complete response was received. Any
    /// status code, including 4xx and 5xx, is returned as `Ok`.
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, HttpError>> + Send;
}

impl<T: HttpClient> HttpClient for std::sync::Arc<T> {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        (**self).request(req).await
    }
}
