// SPDX-License-Identifier: MIT OR Apache-2.0
//! `jsonflow` - JSON document to laid-out node graph
//!
//! Reads a JSON document from a file or standard input, turns it into a tree
//! of nodes and edges, positions it with the built-in tree layout and writes
//! the result as JSON:
//! - Settings come from `jsonflow.ron` and command-line flags
//! - `--watch` rebuilds on every save and only re-runs layout when the
//!   structure of the document changes
//!
//! Logs go to standard error; set `RUST_LOG` to change the level.

mod cli;
mod error;
mod pipeline;
mod settings;
mod watch;

use clap::Parser;
use cli::Cli;
use error::CliError;
use pipeline::{write_output, Input, Pipeline};
use settings::Settings;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "jsonflow_cli=info,jsonflow_graph=info";

fn main() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let cwd = std::env::current_dir().map_err(|e| CliError::io(".", e))?;
    let mut settings = Settings::discover(cli.config.as_deref(), &cwd)?;
    settings.apply_overrides(&cli);

    if cli.print_config {
        return write_output(cli.output.as_deref(), &settings.to_ron()?);
    }

    let arg = cli
        .input
        .as_deref()
        .ok_or_else(|| CliError::Usage("no input given".to_string()))?;
    let input = Input::from_arg(arg);
    let mut pipeline = Pipeline::new(&settings, !cli.no_layout, cli.pretty);

    tracing::debug!("Starting jsonflow v{}", env!("CARGO_PKG_VERSION"));

    match (&input, cli.watch) {
        (Input::File(path), true) => watch::run(&mut pipeline, path, cli.output.as_deref()),
        (Input::Stdin, true) => Err(CliError::Usage("--watch needs a file input".to_string())),
        (_, false) => pipeline.process(&input, cli.output.as_deref()),
    }
}
