//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use super::defaults;

/// ipwatch: address and tunnel change monitor
///
/// Periodically determines this machine's IPv4 address and the public URL
/// of the local tunnel agent, and sends a webhook whenever either changes.
#[derive(Debug, Parser)]
#[command(name = "ipwatch")]
#[command(version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct Cli {
    /// Subcommand to run (default: run)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Webhook URL (required unless --dry-run)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// HTTP method for webhook requests
    #[arg(long)]
    pub method: Option<String>,

    /// HTTP headers in 'Key=Value' or 'Key: Value' format (can be specified multiple times)
    #[arg(long = "header", value_name = "K=V")]
    pub headers: Vec<String>,

    /// Bearer token for Authorization header
    #[arg(long)]
    pub bearer: Option<String>,

    /// Handlebars body template for webhook requests
    #[arg(long = "body-template")]
    pub body_template: Option<String>,

    /// Disable the address monitor
    #[arg(long = "no-identity")]
    pub no_identity: bool,

    /// Seconds between address checks
    #[arg(long)]
    pub interval: Option<u64>,

    /// Per-endpoint timeout for remote lookups, in seconds
    #[arg(long = "lookup-timeout")]
    pub lookup_timeout: Option<u64>,

    /// Remote lookup endpoint (can be specified multiple times, in priority order)
    #[arg(long = "lookup", value_name = "URL")]
    pub lookups: Vec<String>,

    /// Path of the address baseline file
    #[arg(long = "identity-state", value_name = "PATH")]
    pub identity_state: Option<PathBuf>,

    /// Regex pattern for interfaces to include (can be specified multiple times)
    #[arg(long = "include-interface", value_name = "PATTERN")]
    pub include_interfaces: Vec<String>,

    /// Regex pattern for interfaces to exclude (can be specified multiple times)
    #[arg(long = "exclude-interface", value_name = "PATTERN")]
    pub exclude_interfaces: Vec<String>,

    /// Enable the tunnel monitor
    #[arg(long)]
    pub tunnel: bool,

    /// Tunnel agent introspection endpoint
    #[arg(long = "tunnel-api", value_name = "URL")]
    pub tunnel_api: Option<String>,

    /// Seconds between tunnel checks
    #[arg(long = "tunnel-interval")]
    pub tunnel_interval: Option<u64>,

    /// Path of the tunnel baseline file
    #[arg(long = "tunnel-state", value_name = "PATH")]
    pub tunnel_state: Option<PathBuf>,

    /// Suffix appended to tunnel URLs in notifications (e.g. "/upload")
    #[arg(long = "link-suffix")]
    pub link_suffix: Option<String>,

    /// Maximum number of delivery attempts
    #[arg(long = "retry-max")]
    pub retry_max: Option<u32>,

    /// Initial retry delay in seconds
    #[arg(long = "retry-delay")]
    pub retry_delay: Option<u64>,

    /// Log notifications instead of sending them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for ipwatch
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run every enabled monitor until interrupted (default)
    Run,
    /// Run one cycle of every enabled monitor and exit
    Check,
    /// Print the current address status as JSON without touching the baseline
    Status,
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = defaults::CONFIG_FILE)]
        output: PathBuf,
    },
}

impl Cli {
    /// Parses CLI arguments from the command line.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Returns the subcommand, treating its absence as [`Command::Run`].
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }

    /// Returns true if this command sends notifications.
    #[must_use]
    pub const fn sends_notifications(&self) -> bool {
        matches!(self.command, None | Some(Command::Run | Command::Check))
    }
}
