//! Configuration failures.
//!
//! Every variant is fatal at startup: the binary prints it, maybe a hint,
//! and exits with the configuration exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Why the configuration could not be loaded or validated.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file named by `--config` could not be read.
    #[error("Cannot read config file '{}': {source}", path.display())]
    FileRead {
        /// Path given on the command line
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML, or has unknown or mistyped keys.
    #[error("Invalid config file: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// `init` could not write the template.
    #[error("Cannot write config file '{}': {source}", path.display())]
    FileWrite {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A value with no default was given nowhere.
    #[error("Missing required setting {field}. {hint}")]
    MissingRequired {
        /// Dotted TOML key, see [`field`]
        field: &'static str,
        /// How to provide it
        hint: &'static str,
    },

    /// A URL did not parse or uses a scheme other than http/https.
    #[error("Invalid URL in {field} '{url}': {reason}")]
    InvalidUrl {
        /// Dotted TOML key, see [`field`]
        field: &'static str,
        /// The rejected text
        url: String,
        /// Parser message or scheme complaint
        reason: String,
    },

    /// An interface name pattern did not compile.
    #[error("Invalid interface pattern '{pattern}': {source}")]
    InvalidRegex {
        /// The rejected pattern
        pattern: String,
        /// Compiler error
        #[source]
        source: regex::Error,
    },

    /// An interval or timeout was zero.
    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration {
        /// Dotted TOML key
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },

    /// The retry settings are inconsistent.
    #[error("Invalid retry settings: {0}")]
    InvalidRetry(String),

    /// `notify.method` is not an HTTP method token.
    #[error("Invalid HTTP method '{0}'")]
    InvalidMethod(String),

    /// A `--header` argument had neither `=` nor `:`.
    #[error("Invalid header '{value}': expected 'Name=Value' or 'Name: Value'")]
    InvalidHeader {
        /// The rejected argument
        value: String,
    },

    /// A header name contains characters HTTP does not allow.
    #[error("Invalid header name '{name}': {reason}")]
    InvalidHeaderName {
        /// The rejected name
        name: String,
        /// Parser message
        reason: String,
    },

    /// A header value contains characters HTTP does not allow.
    #[error("Invalid value for header '{name}': {reason}")]
    InvalidHeaderValue {
        /// Header the value belongs to
        name: String,
        /// Parser message
        reason: String,
    },

    /// `notify.body_template` is not valid Handlebars.
    #[error("Invalid body template: {reason}")]
    InvalidTemplate {
        /// Handlebars error
        reason: String,
    },

    /// Both monitors are disabled.
    #[error("Nothing to monitor: both the identity and tunnel monitors are disabled")]
    NothingToMonitor,

    /// The address monitor is enabled with an empty lookup list.
    #[error("identity.lookup must name at least one endpoint")]
    NoLookupEndpoints,
}

/// Setting names used in [`ConfigError::MissingRequired`] and
/// [`ConfigError::InvalidUrl`].
pub mod field {
    /// Webhook URL.
    pub const URL: &str = "notify.url";
    /// One of the remote lookup endpoints.
    pub const LOOKUP: &str = "identity.lookup";
    /// Tunnel agent introspection endpoint.
    pub const TUNNEL_API: &str = "tunnel.api_url";
}

impl ConfigError {
    /// Shorthand for [`ConfigError::MissingRequired`].
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
