//! ipwatch: address and tunnel change monitor
//!
//! Binary entry point. Parses arguments, loads the configuration and hands
//! off to [`run`] on a multi-threaded Tokio runtime.

use std::path::Path;
use std::process::ExitCode;

use ipwatch::config::{Cli, Command, ValidatedConfig, write_default_config};

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};

#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse_args();
    let command = cli.command();

    // `init` must work before any config exists.
    if let Command::Init { output } = &command {
        return init(output);
    }

    let config = match ValidatedConfig::load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            print_config_hint(&e);
            return exit_code::CONFIG_ERROR;
        }
    };

    setup_tracing(config.verbose);
    tracing::info!("{config}");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Cannot start the async runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    let result = runtime.block_on(async move {
        match command {
            Command::Check => run::check(config).await,
            Command::Status => run::status(config).await,
            Command::Run | Command::Init { .. } => run::execute(config).await,
        }
    });

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            exit_code::runtime_error()
        }
    }
}

fn init(output: &Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Wrote configuration template to {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            exit_code::CONFIG_ERROR
        }
    }
}
