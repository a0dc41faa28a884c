//! Tunnel agent introspection.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::time::{Clock, SystemClock};
use crate::transport::{HttpClient, HttpRequest};

use super::{Probe, ProbeError, ProbeResult, ProbeSource};

/// One tunnel as reported by the agent's local API.
///
/// Only the fields used for selection are decoded; the rest are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TunnelDescriptor {
    /// Tunnel name, if the agent reports one.
    #[serde(default)]
    pub name: String,
    /// Public-facing URL.
    pub public_url: String,
    /// Protocol label (`https`, `http`, `tcp`).
    #[serde(default)]
    pub proto: String,
}

impl TunnelDescriptor {
    /// Returns true if the public URL uses the `https` scheme.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        Url::parse(&self.public_url).is_ok_and(|url| url.scheme() == "https")
    }
}

#[derive(Debug, Deserialize)]
struct TunnelList {
    tunnels: Vec<TunnelDescriptor>,
}

/// Reads the public URL of the secure tunnel from the local agent.
///
/// An agent that cannot be reached is reported as
/// [`ProbeError::IntrospectionUnreachable`], distinct from an agent that
/// answers without a secure tunnel ([`ProbeError::NoSecureTunnel`]).
#[derive(Debug)]
pub struct TunnelProbe<H, C = SystemClock> {
    client: H,
    endpoint: Url,
    timeout: Duration,
    clock: C,
}

impl<H> TunnelProbe<H, SystemClock> {
    /// Creates a tunnel probe using the system clock.
    #[must_use]
    pub const fn new(client: H, endpoint: Url, timeout: Duration) -> Self {
        Self::with_clock(client, endpoint, timeout, SystemClock)
    }
}

impl<H, C> TunnelProbe<H, C> {
    /// Creates a tunnel probe with a custom clock.
    #[must_use]
    pub const fn with_clock(client: H, endpoint: Url, timeout: Duration, clock: C) -> Self {
        Self {
            client,
            endpoint,
            timeout,
            clock,
        }
    }

    /// Returns the introspection endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Picks the first tunnel with a secure public URL.
    #[must_use]
    pub fn select(tunnels: &[TunnelDescriptor]) -> Option<&TunnelDescriptor> {
        tunnels.iter().find(|t| t.is_secure())
    }

    fn unreachable(&self, reason: impl Into<String>) -> ProbeError {
        ProbeError::IntrospectionUnreachable {
            endpoint: self.endpoint.to_string(),
            reason: reason.into(),
        }
    }
}

impl<H: HttpClient, C> TunnelProbe<H, C> {
    /// Fetches the agent's tunnel list.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::IntrospectionUnreachable`] on timeout, transport
    /// failure or non-2xx status, and [`ProbeError::IntrospectionMalformed`]
    /// if the body cannot be decoded.
    pub async fn tunnels(&self) -> Result<Vec<TunnelDescriptor>, ProbeError> {
        let request = HttpRequest::get(self.endpoint.clone())
            .with_user_agent()
            .with_timeout(self.timeout);

        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| self.unreachable(format!("no answer within {}s", self.timeout.as_secs())))?
            .map_err(|e| self.unreachable(e.to_string()))?;

        if !response.is_success() {
            return Err(self.unreachable(format!("HTTP {}", response.status)));
        }

        let list: TunnelList = response.json().map_err(|e| {
            ProbeError::IntrospectionMalformed {
                endpoint: self.endpoint.to_string(),
                reason: e.to_string(),
            }
        })?;

        Ok(list.tunnels)
    }
}

impl<H: HttpClient, C: Clock> Probe for TunnelProbe<H, C> {
    async fn probe(&self) -> Result<ProbeResult, ProbeError> {
        let tunnels = self.tunnels().await?;
        tracing::debug!("Tunnel agent reports {} tunnel(s)", tunnels.len());

        let Some(tunnel) = Self::select(&tunnels) else {
            return Err(ProbeError::NoSecureTunnel {
                endpoint: self.endpoint.to_string(),
            });
        };

        let detail = if tunnel.name.is_empty() {
            self.endpoint.to_string()
        } else {
            tunnel.name.clone()
        };

        Ok(ProbeResult::new(
            tunnel.public_url.clone(),
            ProbeSource::TunnelIntrospection,
            detail,
            self.clock.now(),
        ))
    }
}
