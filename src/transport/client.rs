//! Production HTTP client implementation using reqwest.

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// Largest body [`ReqwestClient`] buffers by default.
///
/// Every body this program reads is either a single address or a short
/// tunnel list, so anything bigger is a misbehaving server.
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;

/// Production HTTP client using reqwest.
///
/// Per-request timeouts come from [`HttpRequest::timeout`]. Bodies larger
/// than the configured cap are rejected with [`HttpError::Body`] instead of
/// being buffered.
///
/// # Example
///
/// ```no_run
/// use ipwatch::transport::{ReqwestClient, HttpClient, HttpRequest};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::new();
/// let url = Url::parse("https://api.ipify.org")?;
/// let response = client.request(HttpRequest::get(url).with_user_agent()).await?;
/// println!("{}: {:?}", response.status, response.trimmed_text());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
    max_body_bytes: usize,
}

impl ReqwestClient {
    /// Creates a client with reqwest's defaults and the default body cap.
    #[must_use]
    pub fn new() -> Self {
        Self::from_client(reqwest::Client::new())
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self {
            inner: client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Replaces the body size cap.
    #[must_use]
    pub const fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// The body size cap.
    #[must_use]
    pub const fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
            timeout,
        } = req;

        let mut builder = self.inner.request(method, url.as_str()).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let mut response = builder.send().await.map_err(classify)?;
        let status = response.status();
        let headers = std::mem::take(response.headers_mut());

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(classify)? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(HttpError::Body(
                    format!("body exceeds {} bytes", self.max_body_bytes).into(),
                ));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(HttpResponse::new(status, headers, body))
    }
}

fn classify(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_builder() {
        HttpError::InvalidUrl(e.to_string())
    } else if e.is_body() || e.is_decode() {
        HttpError::Body(Box::new(e))
    } else {
        HttpError::Connection(Box::new(e))
    }
}
