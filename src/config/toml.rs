//! The on-disk configuration format.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// A parsed config file.
///
/// Every key is optional; anything missing falls back to the CLI or the
/// built-in default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Notification delivery
    #[serde(default)]
    pub notify: NotifySection,

    /// Address monitor
    #[serde(default)]
    pub identity: IdentitySection,

    /// Tunnel monitor
    #[serde(default)]
    pub tunnel: TunnelSection,

    /// Webhook retries
    #[serde(default)]
    pub retry: RetrySection,
}

/// Notification delivery section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotifySection {
    /// Webhook URL
    pub url: Option<String>,

    /// HTTP method (default: POST)
    pub method: Option<String>,

    /// HTTP headers as key-value pairs
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Bearer token for Authorization header
    pub bearer: Option<String>,

    /// Handlebars body template
    pub body_template: Option<String>,
}

/// Address monitor section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IdentitySection {
    /// Whether the monitor runs (default: true)
    pub enabled: Option<bool>,

    /// Seconds between checks
    pub interval: Option<u64>,

    /// Baseline file path
    pub state_file: Option<String>,

    /// Per-endpoint timeout in seconds
    pub lookup_timeout: Option<u64>,

    /// Remote lookup endpoints in priority order
    pub lookup: Option<Vec<String>>,

    /// Regex patterns for interfaces to include
    #[serde(default)]
    pub include_interfaces: Vec<String>,

    /// Regex patterns for interfaces to exclude
    #[serde(default)]
    pub exclude_interfaces: Vec<String>,
}

/// Tunnel monitor section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TunnelSection {
    /// Whether the monitor runs (default: false)
    pub enabled: Option<bool>,

    /// Introspection endpoint of the tunnel agent
    pub api_url: Option<String>,

    /// Seconds between checks
    pub interval: Option<u64>,

    /// Introspection call timeout in seconds
    pub timeout: Option<u64>,

    /// Baseline file path
    pub state_file: Option<String>,

    /// Suffix appended to URLs in notifications
    pub link_suffix: Option<String>,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Maximum number of delivery attempts
    pub max_attempts: Option<u32>,

    /// Initial retry delay in seconds
    pub initial_delay: Option<u64>,

    /// Maximum retry delay in seconds
    pub max_delay: Option<u64>,

    /// Backoff multiplier
    pub multiplier: Option<f64>,
}

impl TomlConfig {
    /// Reads and parses `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::FileRead`] or [`ConfigError::TomlParse`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        std::fs::read_to_string(path)
            .map_err(|source| ConfigError::FileRead {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|content| Self::parse(&content))
    }

    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// [`ConfigError::TomlParse`] for bad syntax, unknown keys or wrong types.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// The commented file written by `ipwatch init`.
#[must_use]
pub fn default_config_template() -> String {
    r#"# ipwatch configuration file

[notify]
# Webhook URL (required unless --dry-run)
# url = "https://hooks.example.com/ipwatch"

# HTTP method (default: POST)
# method = "POST"

# HTTP headers
# [notify.headers]
# X-Custom-Header = "value"

# Bearer token for Authorization header
# bearer = "your-token-here"

# Handlebars body template. Without one, a JSON object is sent.
# Available variables: {{subject}}, {{body}}, {{resource}}, {{timestamp}}
# body_template = '{"text": "{{subject}}\n{{body}}"}'

[identity]
# enabled = true

# Seconds between checks (default: 1800)
interval = 1800

# Baseline file (default: <state dir>/ipwatch/current-ip.txt)
# state_file = "~/.local/state/ipwatch/current-ip.txt"

# Per-endpoint timeout in seconds (default: 10)
# lookup_timeout = 10

# Remote lookup endpoints, tried in order when no interface address is found
# lookup = [
#     "https://ifconfig.me/ip",
#     "https://api.ipify.org",
#     "https://icanhazip.com",
#     "https://checkip.amazonaws.com",
# ]

# Regex patterns for interfaces to include (empty = all)
# Note: CLI patterns REPLACE these entirely (not merged)
# include_interfaces = ["^eth", "^en"]

# Regex patterns for interfaces to exclude
# exclude_interfaces = ["^docker", "^veth"]

[tunnel]
# enabled = false

# Tunnel agent introspection endpoint
# api_url = "http://127.0.0.1:4040/api/tunnels"

# Seconds between checks (default: 10800)
# interval = 10800

# Introspection timeout in seconds (default: 10)
# timeout = 10

# Baseline file (default: <state dir>/ipwatch/tunnel-url.txt)
# state_file = "~/.local/state/ipwatch/tunnel-url.txt"

# Appended to tunnel URLs in notifications
# link_suffix = "/upload"

[retry]
# Maximum number of delivery attempts (default: 3)
# max_attempts = 3

# Initial retry delay in seconds (default: 5)
# initial_delay = 5

# Maximum retry delay in seconds (default: 60)
# max_delay = 60

# Backoff multiplier (default: 2.0)
# multiplier = 2.0
"#
    .to_string()
}
