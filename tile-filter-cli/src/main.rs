//! Entry point for the `tile-filter` binary.
#![forbid(unsafe_code)]

use std::process::ExitCode;

use tile_filter_cli::CliError;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    match tile_filter_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        // Clap prints help, version and usage errors itself.
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("tile-filter: {err}");
            ExitCode::FAILURE
        }
    }
}
