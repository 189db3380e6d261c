// SPDX-License-Identifier: MIT OR Apache-2.0
//! Recursive JSON to graph transform.
//!
//! Walks the document depth-first in pre-order. Every object or array found
//! under a key becomes a branch node linked to its parent; every scalar becomes
//! a field on the node for the container that holds it.
//!
//! ## Ids and titles
//!
//! A child's title is its key, except for index keys (array positions, or
//! object keys made only of digits) which render as `parent[k]`. With
//! [`IdStrategy::Title`] the id is the title, which can collide when unrelated
//! subtrees reuse a key; [`IdStrategy::Path`] qualifies ids with the parent id.
//! Either way a collision is reported as [`BuildError::IdCollision`].

use crate::edge::Edge;
use crate::field::{is_index_key, Container, Entry};
use crate::graph::{Graph, GraphError};
use crate::node::{Node, NodeId, Position};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Read;

/// Default nesting limit
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// How node ids are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Id equals title
    #[default]
    Title,
    /// Id is the parent id joined with the key
    Path,
}

impl std::str::FromStr for IdStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "path" => Ok(Self::Path),
            other => Err(format!("unknown id strategy '{other}', expected 'title' or 'path'")),
        }
    }
}

/// Builder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Deepest composite nesting accepted; the top-level value is depth 0
    pub max_depth: usize,
    /// Id derivation
    pub id_strategy: IdStrategy,
    /// Seed offset of a child from its parent
    pub seed_offset: Position,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            id_strategy: IdStrategy::Title,
            seed_offset: Position::new(200.0, 100.0),
        }
    }
}

impl BuildConfig {
    /// Set the nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the id strategy
    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }
}

/// Builds graphs from JSON values
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: BuildConfig,
}

impl GraphBuilder {
    /// Create a builder
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Get configuration
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Transform a parsed JSON value.
    ///
    /// Scalars and `null` at the top level produce a lone root node.
    pub fn build(&self, json: &Value) -> Result<Graph, BuildError> {
        let mut state = BuildState::new(&self.config);
        if let Entry::Composite(container) = Entry::classify(json) {
            let root = Cursor::of(state.graph.root());
            state.visit(&root, container, 0)?;
        }

        let graph = state.graph;
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            strategy = ?self.config.id_strategy,
            "Built graph from JSON"
        );
        Ok(graph)
    }

    /// Parse then transform a JSON string.
    ///
    /// Nesting is bounded by [`BuildConfig::max_depth`] only; serde_json's own
    /// recursion limit is lifted.
    pub fn build_from_str(&self, json: &str) -> Result<Graph, BuildError> {
        let value = self.parse(json.as_bytes())?;
        self.build(&value)
    }

    /// Parse then transform JSON from a reader
    pub fn build_from_reader(&self, mut reader: impl Read) -> Result<Graph, BuildError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| BuildError::InvalidInput(e.to_string()))?;
        let value = self.parse(&bytes)?;
        self.build(&value)
    }

    /// Parse JSON text, rejecting nesting past the depth limit before any
    /// `Value` is allocated
    fn parse(&self, bytes: &[u8]) -> Result<Value, BuildError> {
        let limit = self.config.max_depth;
        if nesting_depth(bytes) > limit + 1 {
            return Err(BuildError::DepthExceeded {
                depth: limit + 1,
                limit,
            });
        }

        let mut de = serde_json::Deserializer::from_slice(bytes);
        de.disable_recursion_limit();
        let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))
            .map_err(|e| BuildError::InvalidInput(e.to_string()))?;
        de.end().map_err(|e| BuildError::InvalidInput(e.to_string()))?;
        Ok(value)
    }

    /// Convert any serializable value to JSON, then transform it
    pub fn build_serializable<T: Serialize + ?Sized>(&self, value: &T) -> Result<Graph, BuildError> {
        let value = serde_json::to_value(value).map_err(|e| BuildError::InvalidInput(e.to_string()))?;
        self.build(&value)
    }
}

/// Transform a JSON value with the default configuration
pub fn build(json: &Value) -> Result<Graph, BuildError> {
    GraphBuilder::default().build(json)
}

/// Deepest bracket nesting in JSON text, ignoring brackets inside strings.
///
/// The top-level container counts as 1, so a document is within a depth
/// limit `n` when this is at most `n + 1`.
fn nesting_depth(bytes: &[u8]) -> usize {
    let mut depth = 0usize;
    let mut deepest = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for &b in bytes {
        if in_string {
            match (escaped, b) {
                (true, _) => escaped = false,
                (false, b'\\') => escaped = true,
                (false, b'"') => in_string = false,
                (false, _) => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                deepest = deepest.max(depth);
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    deepest
}

/// The node a container's entries attach to
struct Cursor {
    id: NodeId,
    title: String,
    seed: Position,
}

impl Cursor {
    fn of(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            title: node.title.clone(),
            seed: node.seed,
        }
    }
}

/// Accumulator owned by a single `build` call
struct BuildState<'c> {
    config: &'c BuildConfig,
    graph: Graph,
}

impl<'c> BuildState<'c> {
    fn new(config: &'c BuildConfig) -> Self {
        Self {
            config,
            graph: Graph::new(),
        }
    }

    fn visit(&mut self, parent: &Cursor, container: Container<'_>, depth: usize) -> Result<(), BuildError> {
        for (key, value) in container.entries() {
            match Entry::classify(value) {
                Entry::Composite(inner) => {
                    let child_depth = depth + 1;
                    if child_depth > self.config.max_depth {
                        return Err(BuildError::DepthExceeded {
                            depth: child_depth,
                            limit: self.config.max_depth,
                        });
                    }
                    let child = self.add_child(parent, &key)?;
                    self.visit(&child, inner, child_depth)?;
                }
                Entry::Scalar(field) => {
                    // Parent was inserted before its entries are walked.
                    if let Some(node) = self.graph.node_mut(&parent.id) {
                        node.set_field(key, field);
                    }
                }
            }
        }
        Ok(())
    }

    fn add_child(&mut self, parent: &Cursor, key: &str) -> Result<Cursor, BuildError> {
        let indexed = is_index_key(key);
        let title = if indexed {
            format!("{}[{key}]", parent.title)
        } else {
            key.to_string()
        };
        let id = match self.config.id_strategy {
            IdStrategy::Title => NodeId::new(title.clone()),
            IdStrategy::Path if indexed => NodeId::new(format!("{}[{key}]", parent.id)),
            IdStrategy::Path if parent.id == NodeId::root() => NodeId::new(title.clone()),
            IdStrategy::Path => NodeId::new(format!("{}.{key}", parent.id)),
        };

        let seed = parent.seed.offset(self.config.seed_offset);
        let node = Node::branch(id.clone(), title.clone()).with_seed(seed);
        self.graph.add_node(node)?;
        self.graph.add_edge(Edge::new(parent.id.clone(), id.clone()))?;
        tracing::trace!(parent = %parent.id, child = %id, "Added branch node");

        Ok(Cursor { id, title, seed })
    }
}

/// Error while building a graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BuildError {
    /// Input could not be read as JSON
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Nesting is deeper than the configured limit
    #[error("Nesting depth {depth} exceeds limit {limit}")]
    DepthExceeded {
        /// Depth reached
        depth: usize,
        /// Configured limit
        limit: usize,
    },

    /// Two distinct nodes or edges resolved to the same id
    #[error("Id collision: {0}")]
    IdCollision(String),
}

impl From<GraphError> for BuildError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::DuplicateNode(id) | GraphError::SelfLoop(id) => Self::IdCollision(id.0),
            GraphError::DuplicateEdge(id) => Self::IdCollision(id.0),
            GraphError::NodeNotFound(id) => Self::InvalidInput(format!("dangling node {id}")),
        }
    }
}
