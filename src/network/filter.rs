//! Interface name filtering applied before the local scan.
//!
//! Users running containers or VPNs often have interfaces whose addresses
//! must never be reported (`docker0`, `veth*`, `tun0`). A [`FilterChain`]
//! of name patterns decides which interfaces the scan may look at, and
//! [`FilteredFetcher`] applies it to any [`AddressFetcher`].

use std::fmt;

use regex::Regex;

use super::{AdapterSnapshot, AddressFetcher, FetchError};

/// A predicate over interface names.
pub trait InterfaceFilter: Send + Sync + fmt::Debug {
    /// Returns `true` if the interface called `name` matches.
    fn matches(&self, name: &str) -> bool;
}

/// Include and exclude rules over interface names.
///
/// An interface is admitted when no exclude rule matches it and either
/// there are no include rules or at least one include rule matches.
///
/// # Examples
///
/// ```
/// use ipwatch::network::filter::{FilterChain, InterfaceFilter, NameRegexFilter};
///
/// let chain = FilterChain::new()
///     .exclude(NameRegexFilter::new(r"^docker").unwrap())
///     .include(NameRegexFilter::new(r"^(eth|en)").unwrap());
///
/// assert!(chain.matches("eth0"));
/// assert!(!chain.matches("docker0"));
/// assert!(!chain.matches("wlan0"));
/// ```
#[derive(Debug, Default)]
pub struct FilterChain {
    includes: Vec<Box<dyn InterfaceFilter>>,
    excludes: Vec<Box<dyn InterfaceFilter>>,
}

impl FilterChain {
    /// An empty chain, admitting every interface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an include rule.
    #[must_use]
    pub fn include(mut self, filter: impl InterfaceFilter + 'static) -> Self {
        self.includes.push(Box::new(filter));
        self
    }

    /// Adds an exclude rule.
    #[must_use]
    pub fn exclude(mut self, filter: impl InterfaceFilter + 'static) -> Self {
        self.excludes.push(Box::new(filter));
        self
    }

    /// Number of rules of both kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.includes.len() + self.excludes.len()
    }

    /// True if the chain admits everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl InterfaceFilter for FilterChain {
    fn matches(&self, name: &str) -> bool {
        !self.excludes.iter().any(|rule| rule.matches(name))
            && (self.includes.is_empty() || self.includes.iter().any(|rule| rule.matches(name)))
    }
}

/// Matches interface names against a regular expression.
///
/// The pattern is unanchored, so `eth` matches `veth0`; use `^eth` to
/// match a prefix.
#[derive(Debug, Clone)]
pub struct NameRegexFilter(Regex);

impl NameRegexFilter {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the regex error if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self)
    }

    /// The source pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for NameRegexFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl InterfaceFilter for NameRegexFilter {
    fn matches(&self, name: &str) -> bool {
        self.0.is_match(name)
    }
}

/// Wraps a fetcher and drops the interfaces a filter rejects.
///
/// The inner fetcher's ordering is preserved, since the local scan breaks
/// ties by position.
#[derive(Debug)]
pub struct FilteredFetcher<F, A> {
    inner: F,
    filter: A,
}

impl<F, A> FilteredFetcher<F, A> {
    /// Applies `filter` to everything `inner` returns.
    #[must_use]
    pub const fn new(inner: F, filter: A) -> Self {
        Self { inner, filter }
    }

    /// The filter in use.
    pub const fn filter(&self) -> &A {
        &self.filter
    }
}

impl<F: AddressFetcher, A: InterfaceFilter> AddressFetcher for FilteredFetcher<F, A> {
    fn fetch(&self) -> Result<Vec<AdapterSnapshot>, FetchError> {
        let mut adapters = self.inner.fetch()?;
        adapters.retain(|adapter| {
            let keep = self.filter.matches(&adapter.name);
            if !keep {
                tracing::debug!("Interface {} filtered out", adapter.name);
            }
            keep
        });
        Ok(adapters)
    }
}
