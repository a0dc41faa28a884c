//! Scripted HTTP client shared by probe tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// What the scripted client answers for a URL.
#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with this body.
    Body(&'static str),
    /// This status with an empty body.
    Status(u16),
    /// Connection refused.
    Error,
    /// The client itself reports a timeout.
    TransportTimeout,
    /// Never completes.
    Hang,
}

#[derive(Debug, Default)]
struct Inner {
    replies: HashMap<String, Reply>,
    requests: Mutex<Vec<HttpRequest>>,
}

/// HTTP client answering from a per-URL script and recording requests.
///
/// Clones share the same script and request log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClient {
    inner: Arc<Inner>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the reply for `url`. Unscripted URLs are refused.
    pub fn reply(mut self, url: &str, reply: Reply) -> Self {
        Arc::get_mut(&mut self.inner)
            .expect("script before cloning")
            .replies
            .insert(url.to_string(), reply);
        self
    }

    /// URLs requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.inner
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.url.to_string())
            .collect()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.inner.requests.lock().unwrap().last().cloned()
    }
}

impl HttpClient for ScriptedClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let reply = self.inner.replies.get(req.url.as_str()).cloned();
        self.inner.requests.lock().unwrap().push(req);

        match reply {
            Some(Reply::Body(body)) => Ok(HttpResponse::ok(body)),
            Some(Reply::Status(code)) => Ok(HttpResponse::new(
                http::StatusCode::from_u16(code).unwrap(),
                http::HeaderMap::new(),
                vec![],
            )),
            Some(Reply::TransportTimeout) => Err(HttpError::Timeout),
            Some(Reply::Hang) => std::future::pending().await,
            Some(Reply::Error) | None => Err(HttpError::Connection(Box::new(
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused"),
            ))),
        }
    }
}

pub fn url(s: &str) -> url::Url {
    url::Url::parse(s).unwrap()
}
