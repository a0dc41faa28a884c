//! Core network types for interface representation.

use std::net::Ipv4Addr;

use serde::Serialize;

use super::Category;

/// A snapshot of a single network interface's IPv4 addresses.
///
/// # Equality
///
/// Two snapshots are equal if they have the same name and addresses.
/// Address order matters for equality comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterSnapshot {
    /// The interface name (e.g., "eth0", "Wi-Fi").
    pub name: String,
    /// All IPv4 addresses assigned to this interface, in platform order.
    pub ipv4_addresses: Vec<Ipv4Addr>,
}

impl AdapterSnapshot {
    /// Creates a new adapter snapshot.
    #[must_use]
    pub fn new(name: impl Into<String>, ipv4_addresses: Vec<Ipv4Addr>) -> Self {
        Self {
            name: name.into(),
            ipv4_addresses,
        }
    }

    /// Addresses that can stand for this machine's identity.
    ///
    /// Skips loopback, link-local (169.254/16) and unspecified addresses.
    pub fn candidate_addresses(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.ipv4_addresses.iter().copied().filter(|addr| {
            Category::of(*addr) != Category::Loopback
                && !addr.is_link_local()
                && !addr.is_unspecified()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn new_stores_name_and_addresses() {
        let snapshot = AdapterSnapshot::new("eth0", vec![ip("192.168.1.2")]);

        assert_eq!(snapshot.name, "eth0");
        assert_eq!(snapshot.ipv4_addresses, vec![ip("192.168.1.2")]);
    }

    #[test]
    fn interface_without_addresses_has_no_candidates() {
        let snapshot = AdapterSnapshot::new("wlan0", vec![]);

        assert_eq!(snapshot.candidate_addresses().count(), 0);
    }

    #[test]
    fn loopback_only_interface_has_no_candidates() {
        let lo = AdapterSnapshot::new("lo", vec![ip("127.0.0.1"), ip("127.0.1.1")]);

        assert_eq!(lo.candidate_addresses().count(), 0);
    }

    #[test]
    fn candidates_skip_unusable_addresses() {
        let snapshot = AdapterSnapshot::new(
            "eth0",
            vec![
                ip("127.0.0.1"),
                ip("169.254.10.1"),
                ip("0.0.0.0"),
                ip("10.0.0.7"),
                ip("203.0.113.4"),
            ],
        );

        let candidates: Vec<_> = snapshot.candidate_addresses().collect();
        assert_eq!(candidates, vec![ip("10.0.0.7"), ip("203.0.113.4")]);
    }

    #[test]
    fn equality_depends_on_address_order() {
        let a = AdapterSnapshot::new("eth0", vec![ip("10.0.0.1"), ip("10.0.0.2")]);
        let b = AdapterSnapshot::new("eth0", vec![ip("10.0.0.2"), ip("10.0.0.1")]);

        assert_ne!(a, b);
    }
}
