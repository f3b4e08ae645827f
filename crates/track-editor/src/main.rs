mod commands;
mod error;
mod settings;

use clap::Parser;
use settings::{Command, Settings};
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = Settings::parse();
    setup_logging(settings.verbose);

    let result = match &settings.command {
        Command::Clean(args) => commands::clean(args),
        Command::Stats(args) => commands::stats(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by RUST_LOG or else by the verbosity flag
fn setup_logging(verbose: u8) {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(fmt_layer).init();
}
