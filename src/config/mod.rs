//! Settings for both monitors, the webhook and retries.
//!
//! A [`Cli`] and an optional [`TomlConfig`] are merged by
//! [`ValidatedConfig::from_raw`]; a flag given on the command line beats the
//! file, and the file beats [`defaults`]. Every value is checked once here so
//! the rest of the crate can trust it.
//!
//! Repeatable flags (`--lookup`, `--include-interface`, `--exclude-interface`)
//! swap out the whole TOML list.
//!
//! `--tunnel` and `--no-identity` only ever move away from the default: the
//! first turns the tunnel monitor on, the second turns the address monitor
//! off. Neither can override the file in the other direction.
//!
//! `tunnel.timeout`, `retry.max_delay` and `retry.multiplier` are set in the
//! file only.

mod cli;
pub mod defaults;
mod error;
mod toml;
mod validated;

#[cfg(test)]
mod cli_tests;
#[cfg(test)]
mod toml_tests;

pub use cli::{Cli, Command};
pub use error::{ConfigError, field};
pub use toml::{TomlConfig, default_config_template};
pub use validated::{
    IdentitySettings, NotifySettings, TunnelSettings, ValidatedConfig, write_default_config,
};
