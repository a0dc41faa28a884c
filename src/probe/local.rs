//! Local-interface scan.

use std::net::Ipv4Addr;

use crate::network::{AdapterSnapshot, AddressFetcher, Category, FetchError};

/// The address chosen by a local scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMatch {
    /// The selected address.
    pub address: Ipv4Addr,
    /// Its category (never loopback).
    pub category: Category,
    /// Name of the interface carrying it.
    pub interface: String,
}

/// Picks the machine's address from its own interfaces.
///
/// A public address on a directly connected interface wins over any private
/// one. Among several candidates of the same category the first encountered
/// wins, so the fetcher's ordering decides ties.
#[derive(Debug)]
pub struct LocalInterfaceProbe<F> {
    fetcher: F,
}

impl<F> LocalInterfaceProbe<F> {
    /// Creates a local probe over the given fetcher.
    #[must_use]
    pub const fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Returns the underlying fetcher.
    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Selects the preferred address from a list of interfaces.
    #[must_use]
    pub fn select(adapters: &[AdapterSnapshot]) -> Option<LocalMatch> {
        let mut first_private: Option<LocalMatch> = None;

        for adapter in adapters {
            for address in adapter.candidate_addresses() {
                let category = Category::of(address);
                let found = LocalMatch {
                    address,
                    category,
                    interface: adapter.name.clone(),
                };

                if category == Category::Public {
                    tracing::debug!("Public address {address} on {}", adapter.name);
                    return Some(found);
                }

                if first_private.is_none() {
                    tracing::debug!("Private address {address} on {}", adapter.name);
                    first_private = Some(found);
                }
            }
        }

        first_private
    }
}

impl<F: AddressFetcher> LocalInterfaceProbe<F> {
    /// Enumerates interfaces and selects the preferred address.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the interfaces cannot be enumerated.
    pub fn scan(&self) -> Result<Option<LocalMatch>, FetchError> {
        let adapters = self.fetcher.fetch()?;
        Ok(Self::select(&adapters))
    }
}
