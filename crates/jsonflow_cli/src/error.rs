// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors surfaced by the command line.

use std::path::PathBuf;

/// Command-line failure
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Reading or writing a file failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Settings file could not be parsed
    #[error("Invalid settings in {path:?}: {source}")]
    Settings {
        /// Settings file
        path: PathBuf,
        /// Parse error
        source: ron::error::SpannedError,
    },

    /// Settings could not be written as RON
    #[error("Failed to serialize settings: {0}")]
    SettingsOutput(#[from] ron::Error),

    /// Building or laying out the graph failed
    #[error(transparent)]
    Graph(#[from] jsonflow_graph::Error),

    /// Graph document could not be written as JSON
    #[error("Failed to serialize graph: {0}")]
    Output(#[from] serde_json::Error),

    /// File watching failed
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// Invalid combination of arguments
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    /// Wrap an I/O error with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<jsonflow_graph::BuildError> for CliError {
    fn from(err: jsonflow_graph::BuildError) -> Self {
        Self::Graph(err.into())
    }
}

impl From<jsonflow_graph::TreeError> for CliError {
    fn from(err: jsonflow_graph::TreeError) -> Self {
        Self::Graph(err.into())
    }
}
