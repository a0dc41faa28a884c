//! The interface enumeration seam.

use thiserror::Error;

use super::AdapterSnapshot;

/// Interfaces could not be enumerated.
///
/// The local scan treats this like an empty result and falls through to
/// the remote lookups, so the variant only needs to carry a reason.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The platform refused or failed the enumeration.
    #[error("Interface enumeration unavailable: {reason}")]
    Unavailable {
        /// What the platform reported.
        reason: String,
    },
}

impl FetchError {
    /// Shorthand for [`FetchError::Unavailable`].
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Lists the host's interfaces with their IPv4 addresses.
///
/// Implementations return every interface; filtering belongs to
/// [`FilteredFetcher`](super::filter::FilteredFetcher). The order must be
/// the same from one call to the next, because the local scan picks the
/// first acceptable address it meets.
pub trait AddressFetcher: Send + Sync {
    /// Enumerates interfaces.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the platform cannot be queried.
    fn fetch(&self) -> Result<Vec<AdapterSnapshot>, FetchError>;
}

impl<T: AddressFetcher + ?Sized> AddressFetcher for &T {
    fn fetch(&self) -> Result<Vec<AdapterSnapshot>, FetchError> {
        (**self).fetch()
    }
}

/// Always answers with the same interfaces, in the given order.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher(Vec<AdapterSnapshot>);

impl StaticFetcher {
    /// Wraps a fixed interface list.
    #[must_use]
    pub const fn new(adapters: Vec<AdapterSnapshot>) -> Self {
        Self(adapters)
    }
}

impl AddressFetcher for StaticFetcher {
    fn fetch(&self) -> Result<Vec<AdapterSnapshot>, FetchError> {
        Ok(self.0.clone())
    }
}
