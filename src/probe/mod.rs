//! Probe strategies: discovering the current value of a monitored resource.
//!
//! This module provides:
//! - The probe contract ([`Probe`], [`ProbeResult`], [`ProbeSource`])
//! - Local-interface scan ([`LocalInterfaceProbe`])
//! - Ranked remote lookup endpoints ([`RemoteLookupChain`])
//! - The machine-address probe combining both ([`IdentityProbe`])
//! - Tunnel agent introspection ([`TunnelProbe`])
//! - Error handling ([`ProbeError`], [`LookupError`])

mod error;
mod identity;
mod local;
mod remote;
mod tunnel;

#[cfg(test)]
pub(crate) mod test_fixtures;

use std::fmt;
use std::future::Future;
use std::time::SystemTime;

use serde::Serialize;

pub use error::{LookupError, ProbeError};
pub use identity::IdentityProbe;
pub use local::{LocalInterfaceProbe, LocalMatch};
pub use remote::{RemoteLookupChain, RemoteMatch};
pub use tunnel::{TunnelDescriptor, TunnelProbe};

/// Where a probed value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeSource {
    /// Read from an address assigned to a local interface.
    LocalInterface,
    /// Returned by an external lookup endpoint.
    RemoteLookup,
    /// Reported by the local tunnel agent.
    TunnelIntrospection,
}

impl ProbeSource {
    /// Human-readable description used in notifications.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::LocalInterface => "network interface",
            Self::RemoteLookup => "external lookup service",
            Self::TunnelIntrospection => "tunnel agent",
        }
    }
}

impl fmt::Display for ProbeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// One freshly observed value. Produced per cycle and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// The observed value, already validated by the producing probe.
    pub value: String,
    /// Which strategy produced it.
    pub source: ProbeSource,
    /// Interface name, endpoint URL or tunnel name.
    pub source_detail: String,
    /// When the value was observed.
    pub observed_at: SystemTime,
}

impl ProbeResult {
    /// Creates a new probe result.
    #[must_use]
    pub fn new(
        value: impl Into<String>,
        source: ProbeSource,
        source_detail: impl Into<String>,
        observed_at: SystemTime,
    ) -> Self {
        Self {
            value: value.into(),
            source,
            source_detail: source_detail.into(),
            observed_at,
        }
    }
}

/// A strategy for discovering the current value of a resource.
///
/// Implementations never fail for "nothing found": that case is reported as
/// an error for which [`ProbeError::is_undetectable`] returns true.
pub trait Probe: Send + Sync {
    /// Probes the resource once.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when no value could be determined, when the
    /// tunnel agent is unreachable, or when it answered with garbage.
    fn probe(&self) -> impl Future<Output = Result<ProbeResult, ProbeError>> + Send;
}
