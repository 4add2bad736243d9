//! birthday-provision - provision a host to run the birthday bot

#![cfg_attr(test, allow(clippy::expect_used))]

use birthday_provision::cli::{Cli, EXIT_USAGE, reinvocation};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here, on stdout with exit 0.
            let code = if e.use_stderr() { EXIT_USAGE } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let default_filter = if cli.verbose {
        "birthday_provision=debug"
    } else {
        "birthday_provision=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let reinvoke = reinvocation(std::env::args());
    let code = cli.run(&reinvoke).await;
    std::process::exit(code);
}
