//! `stache` binary entry point.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use stache_cli::{run, Cli};
use tracing_subscriber::EnvFilter;

/// Environment variable holding a log filter, e.g. `STACHE_LOG=stache=trace`.
const LOG_ENV: &str = "STACHE_LOG";

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let status = run(&cli, &mut io::stdin(), &mut io::stdout(), &mut io::stderr())?;
    Ok(ExitCode::from(status.code()))
}
