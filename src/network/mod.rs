//! Network layer: address validation and local interface enumeration.
//!
//! This module provides:
//! - Address validation and classification ([`is_valid_ipv4`], [`classify`], [`Category`])
//! - Interface snapshots ([`AdapterSnapshot`])
//! - Fetching interface information ([`AddressFetcher`], [`platform::SystemFetcher`])
//! - Interface filtering ([`filter`])

mod adapter;
mod address;
mod fetcher;
pub mod filter;
pub mod platform;

#[cfg(test)]
mod filter_tests;

pub use adapter::AdapterSnapshot;
pub use address::{Category, Classification, classify, is_valid_ipv4, parse_ipv4};
pub use fetcher::{AddressFetcher, FetchError, StaticFetcher};
