//! The machine-address probe: local scan first, remote chain as fallback.

use crate::network::AddressFetcher;
use crate::time::{Clock, SystemClock};
use crate::transport::HttpClient;

use super::{
    LocalInterfaceProbe, Probe, ProbeError, ProbeResult, ProbeSource, RemoteLookupChain,
};

/// Determines the machine's current address.
///
/// The local scan is free, so it runs first and its answer is used verbatim
/// whenever it finds anything. The remote chain only runs when the scan
/// comes back empty or fails.
///
/// # Type Parameters
///
/// * `F` - The [`AddressFetcher`] used by the local scan
/// * `H` - The [`HttpClient`] used by the remote chain
/// * `C` - The [`Clock`] used for timestamps (defaults to [`SystemClock`])
#[derive(Debug)]
pub struct IdentityProbe<F, H, C = SystemClock> {
    local: LocalInterfaceProbe<F>,
    remote: RemoteLookupChain<H>,
    clock: C,
}

impl<F, H> IdentityProbe<F, H, SystemClock> {
    /// Creates an identity probe using the system clock.
    #[must_use]
    pub const fn new(local: LocalInterfaceProbe<F>, remote: RemoteLookupChain<H>) -> Self {
        Self::with_clock(local, remote, SystemClock)
    }
}

impl<F, H, C> IdentityProbe<F, H, C> {
    /// Creates an identity probe with a custom clock.
    #[must_use]
    pub const fn with_clock(
        local: LocalInterfaceProbe<F>,
        remote: RemoteLookupChain<H>,
        clock: C,
    ) -> Self {
        Self {
            local,
            remote,
            clock,
        }
    }

    /// Returns the local-interface strategy.
    pub const fn local(&self) -> &LocalInterfaceProbe<F> {
        &self.local
    }

    /// Returns the remote lookup strategy.
    pub const fn remote(&self) -> &RemoteLookupChain<H> {
        &self.remote
    }
}

impl<F, H, C> Probe for IdentityProbe<F, H, C>
where
    F: AddressFetcher,
    H: HttpClient,
    C: Clock,
{
    async fn probe(&self) -> Result<ProbeResult, ProbeError> {
        match self.local.scan() {
            Ok(Some(found)) => {
                return Ok(ProbeResult::new(
                    found.address.to_string(),
                    ProbeSource::LocalInterface,
                    found.interface,
                    self.clock.now(),
                ));
            }
            Ok(None) => tracing::debug!("No usable address on local interfaces"),
            Err(e) => tracing::warn!("Local interface scan failed: {e}"),
        }

        match self.remote.lookup().await {
            Some(found) => Ok(ProbeResult::new(
                found.address,
                ProbeSource::RemoteLookup,
                found.endpoint.as_str(),
                self.clock.now(),
            )),
            None => Err(ProbeError::AllProbesExhausted {
                attempts: self.remote.len(),
            }),
        }
    }
}
