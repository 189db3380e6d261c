// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command-line arguments.

use clap::Parser;
use jsonflow_graph::{IdStrategy, LayoutDirection};
use std::path::PathBuf;

/// Stand-in for standard input
pub const STDIN: &str = "-";

#[derive(Parser, Debug)]
#[command(
    name = "jsonflow",
    about = "Turn a JSON document into a laid-out node graph",
    version
)]
pub struct Cli {
    /// JSON file to read, or `-` for standard input
    #[arg(value_name = "INPUT", required_unless_present = "print_config")]
    pub input: Option<String>,

    /// Settings file (defaults to ./jsonflow.ron when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the graph here instead of standard output
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Layout direction: LR, TB, RL or BT
    #[arg(long, value_name = "DIR")]
    pub direction: Option<LayoutDirection>,

    /// Node id derivation: 'title' or 'path'
    #[arg(long = "id-strategy", value_name = "STRATEGY")]
    pub id_strategy: Option<IdStrategy>,

    /// Deepest nesting accepted before failing
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<usize>,

    /// Layout time limit in milliseconds (0 disables the limit)
    #[arg(long = "timeout-ms", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Skip layout and emit nodes without positions
    #[arg(long = "no-layout", default_value_t = false)]
    pub no_layout: bool,

    /// Pretty-print the output
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Rebuild whenever the input file changes
    #[arg(long, default_value_t = false)]
    pub watch: bool,

    /// Print the effective settings as RON and exit
    #[arg(long = "print-config", default_value_t = false)]
    pub print_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["jsonflow", "doc.json"]);
        assert_eq!(cli.input.as_deref(), Some("doc.json"));
        assert!(cli.direction.is_none());
        assert!(!cli.no_layout);
        assert!(!cli.watch);
    }

    #[test]
    fn test_input_required() {
        assert!(Cli::try_parse_from(["jsonflow"]).is_err());
        assert!(Cli::try_parse_from(["jsonflow", "--print-config"]).is_ok());
    }

    #[test]
    fn test_bad_direction() {
        assert!(Cli::try_parse_from(["jsonflow", "doc.json", "--direction", "up"]).is_err());
    }
}
