//! ipwatch: address and tunnel change monitor
//!
//! A library for periodically discovering this machine's IPv4 address and
//! the public URL of a local tunnel agent, comparing each against a
//! persisted baseline and notifying a webhook when either changes.

pub mod config;
pub mod monitor;
pub mod network;
pub mod notify;
pub mod probe;
pub mod state;
pub mod time;
pub mod transport;
