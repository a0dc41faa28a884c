//! HTTP webhook notifier with retry support.

use handlebars::Handlebars;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;
use url::Url;

use crate::time::{Clock, Sleeper, SystemClock, TokioSleeper, format_rfc3339};
use crate::transport::{HttpClient, HttpError, HttpRequest};

use super::{DeliveryError, Notifier, NotifyError, RetryPolicy};

/// Posts each notification to an HTTP endpoint.
///
/// # Body
///
/// Without a template the body is a JSON object:
///
/// ```json
/// {"subject": "...", "body": "...", "resource": "identity", "timestamp": "2024-01-01T00:00:00Z"}
/// ```
///
/// A Handlebars template can replace it. The same four variables are
/// available, JSON-escaped so they can be embedded inside string literals.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper used between retries (defaults to [`TokioSleeper`])
/// - `C`: The clock used for `timestamp` (defaults to [`SystemClock`])
#[derive(Debug)]
pub struct HttpWebhook<H, S = TokioSleeper, C = SystemClock> {
    client: H,
    sleeper: S,
    clock: C,
    url: Url,
    method: Method,
    headers: HeaderMap,
    body_template: Option<String>,
    resource: String,
    retry_policy: RetryPolicy,
}

impl<H> HttpWebhook<H> {
    /// Creates a webhook with POST, no extra headers, the JSON body and the
    /// default retry policy.
    #[must_use]
    pub fn new(client: H, url: Url) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            clock: SystemClock,
            url,
            method: Method::POST,
            headers: HeaderMap::new(),
            body_template: None,
            resource: String::new(),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl<H, S, C> HttpWebhook<H, S, C> {
    /// Replaces the sleeper used between retries.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> HttpWebhook<H, S2, C> {
        HttpWebhook {
            client: self.client,
            sleeper,
            clock: self.clock,
            url: self.url,
            method: self.method,
            headers: self.headers,
            body_template: self.body_template,
            resource: self.resource,
            retry_policy: self.retry_policy,
        }
    }

    /// Replaces the clock used for the `timestamp` variable.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> HttpWebhook<H, S, C2> {
        HttpWebhook {
            client: self.client,
            sleeper: self.sleeper,
            clock,
            url: self.url,
            method: self.method,
            headers: self.headers,
            body_template: self.body_template,
            resource: self.resource,
            retry_policy: self.retry_policy,
        }
    }

    /// Sets the HTTP method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the extra HTTP headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the body template (Handlebars syntax).
    #[must_use]
    pub fn with_body_template(mut self, template: impl Into<String>) -> Self {
        self.body_template = Some(template.into());
        self
    }

    /// Sets the resource label sent with every message.
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Returns the configured URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the configured HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the resource label.
    #[must_use]
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

#[derive(Serialize)]
struct Payload<'a> {
    subject: &'a str,
    body: &'a str,
    resource: &'a str,
    timestamp: String,
}

fn json_escape(s: &str) -> String {
    let quoted = serde_json::Value::String(s.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

impl<H: HttpClient, S: Sleeper, C: Clock> HttpWebhook<H, S, C> {
    fn render_body(&self, payload: &Payload<'_>) -> Result<Vec<u8>, DeliveryError> {
        let Some(template) = &self.body_template else {
            return serde_json::to_vec(payload).map_err(|e| DeliveryError::Template(e.to_string()));
        };

        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(json_escape);
        handlebars
            .render_template(template, payload)
            .map(String::into_bytes)
            .map_err(|e| DeliveryError::Template(e.to_string()))
    }

    fn build_request(&self, subject: &str, body: &str) -> Result<HttpRequest, DeliveryError> {
        let payload = Payload {
            subject,
            body,
            resource: &self.resource,
            timestamp: format_rfc3339(self.clock.now()),
        };

        let mut request = HttpRequest::new(self.method.clone(), self.url.clone())
            .with_body(self.render_body(&payload)?);

        for (name, value) in &self.headers {
            request.headers.append(name, value.clone());
        }
        if !request.headers.contains_key(CONTENT_TYPE) {
            request
                .headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        Ok(request.with_user_agent())
    }

    async fn attempt(&self, request: &HttpRequest) -> Result<(), DeliveryError> {
        let response = self.client.request(request.clone()).await?;

        if response.is_success() {
            return Ok(());
        }

        Err(DeliveryError::NonSuccessStatus {
            status: response.status,
            body: response.body_text().map(ToString::to_string),
        })
    }
}

impl<H: HttpClient, S: Sleeper, C: Clock> Notifier for HttpWebhook<H, S, C> {
    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotifyError> {
        let request = self.build_request(subject, body)?;
        let mut delays = self.retry_policy.delays();
        let mut attempts = 0;

        loop {
            attempts += 1;
            let error = match self.attempt(&request).await {
                Ok(()) => {
                    tracing::debug!("Webhook delivered after {attempts} attempt(s)");
                    return Ok(());
                }
                Err(e) if !e.is_retryable() => return Err(NotifyError::NonRetryable(e)),
                Err(e) => e,
            };

            let Some(delay) = delays.next() else {
                return Err(NotifyError::MaxRetriesExceeded {
                    attempts,
                    last_error: error,
                });
            };

            tracing::warn!(
                "Webhook attempt {attempts} failed: {error}; retrying in {:.1}s",
                delay.as_secs_f64()
            );
            self.sleeper.sleep(delay).await;
        }
    }
}

/// Whether an error is transient and worth another attempt.
pub trait IsRetryable {
    /// Returns true if the error is potentially transient.
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for HttpError {
    fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

impl IsRetryable for DeliveryError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_retryable(),
            Self::NonSuccessStatus { status, .. } => {
                status.is_server_error()
                    || *status == http::StatusCode::TOO_MANY_REQUESTS
                    || *status == http::StatusCode::REQUEST_TIMEOUT
            }
            Self::Template(_) => false,
        }
    }
}
