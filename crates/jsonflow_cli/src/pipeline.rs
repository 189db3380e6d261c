// SPDX-License-Identifier: MIT OR Apache-2.0
//! Load, build, lay out, write.

use crate::cli::STDIN;
use crate::error::CliError;
use crate::settings::Settings;
use jsonflow_graph::{Graph, GraphBuilder, LayoutAdapter, LayoutOutcome};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// Where the JSON document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Standard input
    Stdin,
    /// A file on disk
    File(PathBuf),
}

impl Input {
    /// Interpret a command-line argument
    pub fn from_arg(arg: &str) -> Self {
        if arg == STDIN {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Open the document for reading
    pub fn open(&self) -> Result<Box<dyn Read>, CliError> {
        match self {
            Self::Stdin => Ok(Box::new(std::io::stdin().lock())),
            Self::File(path) => {
                let file = std::fs::File::open(path).map_err(|e| CliError::io(path, e))?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

/// Builder plus an optional layout stage, reused across rebuilds
pub struct Pipeline {
    builder: GraphBuilder,
    adapter: Option<LayoutAdapter>,
    pretty: bool,
}

impl Pipeline {
    /// Create a pipeline; `layout: false` leaves positions unset
    pub fn new(settings: &Settings, layout: bool, pretty: bool) -> Self {
        Self {
            builder: GraphBuilder::new(settings.build.clone()),
            adapter: layout.then(|| LayoutAdapter::with_tree_layout(settings.layout.clone())),
            pretty,
        }
    }

    /// Parse, build and lay out a document from its source.
    ///
    /// Parsing goes through the builder so the configured depth limit, not
    /// the parser's, bounds nesting.
    pub fn load(&mut self, input: &Input) -> Result<Graph, CliError> {
        let graph = self.builder.build_from_reader(input.open()?)?;
        self.finish(graph)
    }

    fn finish(&mut self, mut graph: Graph) -> Result<Graph, CliError> {
        graph.validate_tree()?;

        if let Some(adapter) = self.adapter.as_mut() {
            match adapter.apply_or_seed(&mut graph) {
                LayoutOutcome::Applied { nodes } => tracing::info!("Laid out {} nodes", nodes),
                LayoutOutcome::Unchanged => tracing::info!("Structure unchanged, kept layout"),
                // Already reported by the adapter.
                LayoutOutcome::Fallback(_) => {}
            }
        }

        tracing::info!(
            "Built graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Serialize a graph as JSON
    pub fn render(&self, graph: &Graph) -> Result<String, CliError> {
        let document = graph.to_document();
        let text = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        Ok(text)
    }

    /// Read, build, render and write in one step
    pub fn process(&mut self, input: &Input, output: Option<&Path>) -> Result<(), CliError> {
        let graph = self.load(input)?;
        let text = self.render(&graph)?;
        write_output(output, &text)
    }
}

/// Write to a file, or to standard output when `output` is `None`
pub fn write_output(output: Option<&Path>, text: &str) -> Result<(), CliError> {
    match output {
        Some(path) => std::fs::write(path, format!("{text}\n")).map_err(|e| CliError::io(path, e)),
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{text}").map_err(|e| CliError::io(STDIN, e))
        }
    }
}
