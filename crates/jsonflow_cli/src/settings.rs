// SPDX-License-Identifier: MIT OR Apache-2.0
//! Settings file and command-line overrides.
//!
//! Settings are stored as RON:
//!
//! ```ron
//! (
//!     build: (max_depth: 200, id_strategy: path),
//!     layout: (direction: TB, timeout_ms: Some(500)),
//! )
//! ```

use crate::cli::Cli;
use crate::error::CliError;
use jsonflow_graph::{BuildConfig, LayoutConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings file looked up in the working directory
pub const SETTINGS_FILE_NAME: &str = "jsonflow.ron";

/// Builder and layout settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graph builder settings
    pub build: BuildConfig,
    /// Layout settings
    pub layout: LayoutConfig,
}

impl Settings {
    /// Load settings from a RON file
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
        let settings = ron::from_str(&text).map_err(|source| CliError::Settings {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Load `explicit` if given, else the default file in `dir` if present, else defaults
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, CliError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = dir.join(SETTINGS_FILE_NAME);
        if default_path.is_file() {
            Self::load(&default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply flags given on the command line
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(direction) = cli.direction {
            self.layout.direction = direction;
        }
        if let Some(strategy) = cli.id_strategy {
            self.build.id_strategy = strategy;
        }
        if let Some(max_depth) = cli.max_depth {
            self.build.max_depth = max_depth;
        }
        if let Some(timeout_ms) = cli.timeout_ms {
            self.layout.timeout_ms = (timeout_ms > 0).then_some(timeout_ms);
        }
    }

    /// Render as pretty RON
    pub fn to_ron(&self) -> Result<String, CliError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }
}
