//! taskprio - priority board for markdown task vaults
//!
//! Scans a vault for checkbox tasks, groups them by priority emoji and
//! rewrites priority and completion in place.

use clap::Parser;
use taskprio::cli::Cli;
use taskprio::output::emit_error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = Cli::parse();
    let command = cli.command_name();

    // Tracing is opt-in via RUST_LOG or -v, and always goes to stderr.
    // Ignore invalid/huge filters rather than failing startup.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| {
            if cli.verbose {
                EnvFilter::new("taskprio=debug")
            } else {
                EnvFilter::new("off")
            }
        });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(command, &err, json);
        std::process::exit(err.exit_code());
    }
}
