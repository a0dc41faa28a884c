//! Address validation and classification.
//!
//! Pure functions over the textual form of an IPv4 address. Nothing here
//! performs I/O and nothing panics: invalid input is reported through the
//! return value.

use std::fmt;
use std::net::Ipv4Addr;

use serde::Serialize;

/// Category of an IPv4 address.
///
/// First match wins, in this order:
///
/// | Address | Category |
/// |---------|----------|
/// | `127.x.x.x` | [`Loopback`](Category::Loopback) |
/// | `10.x.x.x` | [`Private`](Category::Private) |
/// | `172.16.x.x` - `172.31.x.x` | [`Private`](Category::Private) |
/// | `192.168.x.x` | [`Private`](Category::Private) |
/// | any other valid address | [`Public`](Category::Public) |
/// | not a dotted-quad address | [`Invalid`](Category::Invalid) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// `127.0.0.0/8`.
    Loopback,
    /// RFC 1918 ranges.
    Private,
    /// Everything else that parses.
    Public,
    /// Failed validation.
    Invalid,
}

impl Category {
    /// Classifies a parsed address.
    #[must_use]
    pub const fn of(addr: Ipv4Addr) -> Self {
        match addr.octets() {
            [127, ..] => Self::Loopback,
            [10, ..] | [172, 16..=31, ..] | [192, 168, ..] => Self::Private,
            _ => Self::Public,
        }
    }

    /// Returns true for loopback and RFC 1918 addresses.
    #[must_use]
    pub const fn is_private(self) -> bool {
        matches!(self, Self::Loopback | Self::Private)
    }

    /// Human-readable label used in notifications.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Loopback => "Loopback",
            Self::Private => "Private",
            Self::Public => "Public",
            Self::Invalid => "Invalid",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derived classification of a probed value. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// True for loopback and private addresses.
    pub is_private: bool,
    /// The category the value falls into.
    pub category: Category,
}

impl Classification {
    /// Classifies the given text.
    #[must_use]
    pub fn of(value: &str) -> Self {
        let category = classify(value);
        Self {
            is_private: category.is_private(),
            category,
        }
    }
}

/// Returns true if `s` is a canonical dotted-quad IPv4 address.
///
/// Four decimal octets in `0..=255`, no surrounding whitespace, no leading
/// zeros. Callers must trim transport noise (trailing newlines) first.
///
/// ```
/// use ipwatch::network::is_valid_ipv4;
///
/// assert!(is_valid_ipv4("203.0.113.9"));
/// assert!(!is_valid_ipv4("256.0.0.1"));
/// assert!(!is_valid_ipv4("1.2.3"));
/// ```
#[must_use]
pub fn is_valid_ipv4(s: &str) -> bool {
    parse_ipv4(s).is_some()
}

/// Parses a canonical dotted-quad IPv4 address.
#[must_use]
pub fn parse_ipv4(s: &str) -> Option<Ipv4Addr> {
    s.parse::<Ipv4Addr>().ok()
}

/// Classifies the textual form of an address.
///
/// ```
/// use ipwatch::network::{Category, classify};
///
/// assert_eq!(classify("10.0.0.5"), Category::Private);
/// assert_eq!(classify("8.8.8.8"), Category::Public);
/// assert_eq!(classify("not-an-ip"), Category::Invalid);
/// ```
#[must_use]
pub fn classify(s: &str) -> Category {
    parse_ipv4(s).map_or(Category::Invalid, Category::of)
}
