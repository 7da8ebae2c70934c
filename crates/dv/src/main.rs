//! docview CLI.
//!
//! Serves a directory of notes, documentation and source code over HTTP:
//!
//! ```text
//! dv [PORT] [--root DIR] [--host HOST] [--config FILE] [--assets-dir DIR] [--verbose]
//! ```

mod error;
mod output;
mod serve;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use error::CliError;
use output::Output;
use serve::ServeArgs;

/// docview - browse notes, docs and source code over HTTP.
#[derive(Parser)]
#[command(name = "dv", version, about)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.serve.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = tokio::runtime::Runtime::new()
        .map_err(CliError::from)
        .and_then(|rt| rt.block_on(cli.serve.execute()));

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
