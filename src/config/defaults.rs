//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::path::PathBuf;
use std::time::Duration;

/// Default HTTP method for webhook requests.
pub const METHOD: &str = "POST";

/// Default interval between address checks, in seconds (30 minutes).
pub const IDENTITY_INTERVAL_SECS: u64 = 1800;

/// Default interval between tunnel checks, in seconds (3 hours).
pub const TUNNEL_INTERVAL_SECS: u64 = 10_800;

/// Default per-endpoint timeout for remote lookups, in seconds.
pub const LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Default timeout for the tunnel agent call, in seconds.
pub const TUNNEL_TIMEOUT_SECS: u64 = 10;

/// Default tunnel agent introspection endpoint.
pub const TUNNEL_API_URL: &str = "http://127.0.0.1:4040/api/tunnels";

/// Default remote lookup endpoints, in priority order.
pub const LOOKUP_ENDPOINTS: &[&str] = &[
    "https://ifconfig.me/ip",
    "https://api.ipify.org",
    "https://icanhazip.com",
    "https://checkip.amazonaws.com",
];

/// File name of the address baseline.
pub const IDENTITY_STATE_FILE: &str = "current-ip.txt";

/// File name of the tunnel URL baseline.
pub const TUNNEL_STATE_FILE: &str = "tunnel-url.txt";

/// Default config file name written by `init`.
pub const CONFIG_FILE: &str = "ipwatch.toml";

/// Default maximum number of delivery attempts.
pub const RETRY_MAX_ATTEMPTS: u32 = 3;

/// Default initial retry delay in seconds.
pub const RETRY_INITIAL_DELAY_SECS: u64 = 5;

/// Default maximum retry delay in seconds.
pub const RETRY_MAX_DELAY_SECS: u64 = 60;

/// Default retry backoff multiplier.
pub const RETRY_MULTIPLIER: f64 = 2.0;

/// Default lookup timeout as Duration.
#[must_use]
pub const fn lookup_timeout() -> Duration {
    Duration::from_secs(LOOKUP_TIMEOUT_SECS)
}

/// Directory holding both baseline files.
///
/// The platform state directory if there is one, else the local data
/// directory, else the working directory.
#[must_use]
pub fn state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ipwatch")
}

/// Default address baseline path.
#[must_use]
pub fn identity_state_file() -> PathBuf {
    state_dir().join(IDENTITY_STATE_FILE)
}

/// Default tunnel baseline path.
#[must_use]
pub fn tunnel_state_file() -> PathBuf {
    state_dir().join(TUNNEL_STATE_FILE)
}
