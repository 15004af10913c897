//! Command-line interface for fetching asset layers.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod fetch;
mod layers;
mod logging;

pub use error::CliError;
pub use logging::init_logging;

use fetch::{FetchArgs, run_fetch};

const ARG_FETCH_CONFIG: &str = "config";
const ARG_FETCH_OUTPUT_PREFIX: &str = "output-prefix";
const ARG_FETCH_LAYER: &str = "layer";
const ARG_FETCH_TIMEOUT_SECS: &str = "timeout-secs";

/// Run the assetgrid CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration, or any layer
/// fetch fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Fetch(args) => run_fetch(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "assetgrid",
    about = "Download complete asset layers from a Confirm asset-management service",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the layers listed in the layers file.
    Fetch(FetchArgs),
}

#[cfg(test)]
mod tests;
