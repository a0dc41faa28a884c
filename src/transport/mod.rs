//! HTTP transport shared by the remote probes and the webhook notifier.
//!
//! Requests and responses are plain values ([`HttpRequest`],
//! [`HttpResponse`]) built on the `http` crate's types; the [`HttpClient`]
//! trait is the seam tests replace. [`ReqwestClient`] is the only
//! production implementation.

mod client;
mod error;
mod request;
mod response;


pub use client::{DEFAULT_MAX_BODY_BYTES, ReqwestClient};
pub use error::HttpError;
pub use request::{HttpClient, HttpRequest};
pub use response::HttpResponse;

/// Value sent in `User-Agent` by [`HttpRequest::with_user_agent`].
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
