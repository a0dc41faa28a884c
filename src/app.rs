//! Process-level plumbing for the binary: exit codes, logging setup and
//! hints printed after configuration errors.

use ipwatch::config::{ConfigError, field};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Clean shutdown, or a `check`/`status` that found nothing wrong.
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Bad arguments or config file (1).
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// A failed `check`, an unreadable baseline or no runtime (2).
    ///
    /// A function because `ExitCode::from` is not `const`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

const INIT_HINT: &str = "Run 'ipwatch init' to generate a configuration template.";

/// The follow-up advice for a configuration error, if there is any.
pub fn config_hint(error: &ConfigError) -> Option<&'static str> {
    match error {
        ConfigError::FileRead { .. } => Some(INIT_HINT),
        ConfigError::MissingRequired { field: f, .. } if *f == field::URL => Some(INIT_HINT),
        ConfigError::NothingToMonitor => {
            Some("Pass --tunnel, or set identity.enabled or tunnel.enabled to true.")
        }
        ConfigError::InvalidRegex { .. } => {
            Some("Interface patterns use Rust regex syntax, e.g. '^eth' or '^(en|wl)'.")
        }
        _ => None,
    }
}

/// Prints [`config_hint`] on stderr.
pub fn print_config_hint(error: &ConfigError) {
    if let Some(hint) = config_hint(error) {
        eprintln!("\n{hint}");
    }
}

/// Installs the global subscriber.
///
/// Logs go to stderr so `status` can print JSON on stdout. `RUST_LOG`
/// overrides the level chosen by `verbose`.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
