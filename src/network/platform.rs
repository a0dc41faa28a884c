//! Platform interface enumeration.
//!
//! Uses `sysinfo` so the same code path works on Linux, macOS and Windows.

use std::net::IpAddr;

use sysinfo::Networks;

use super::{AdapterSnapshot, AddressFetcher, FetchError};

/// Enumerates the host's active network interfaces.
///
/// Interfaces are returned sorted by name: the platform map has no stable
/// order, and the local scan needs one.
///
/// `sysinfo` has no link-state flag, so an interface that has never moved
/// a byte in either direction is treated as down and left out.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFetcher;

impl SystemFetcher {
    /// Creates a new system fetcher.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AddressFetcher for SystemFetcher {
    fn fetch(&self) -> Result<Vec<AdapterSnapshot>, FetchError> {
        let networks = Networks::new_with_refreshed_list();

        let mut adapters: Vec<AdapterSnapshot> = networks
            .iter()
            .filter(|(name, data)| {
                let active = is_active(data.total_received(), data.total_transmitted());
                if !active {
                    tracing::debug!("Skipping inactive interface {name}");
                }
                active
            })
            .map(|(name, data)| {
                let ipv4 = data
                    .ip_networks()
                    .iter()
                    .filter_map(|network| match network.addr {
                        IpAddr::V4(v4) => Some(v4),
                        IpAddr::V6(_) => None,
                    })
                    .collect();
                AdapterSnapshot::new(name.clone(), ipv4)
            })
            .collect();

        adapters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(adapters)
    }
}

const fn is_active(total_received: u64, total_transmitted: u64) -> bool {
    total_received > 0 || total_transmitted > 0
}
