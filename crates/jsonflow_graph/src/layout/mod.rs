// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layout stage: assigns final positions to built graphs.
//!
//! The engine is a black box behind [`LayoutEngine`]. [`LayoutAdapter`] feeds
//! it a consistent tree, bounds how long it may run, and writes its output back
//! over the seed positions.

pub mod adapter;
pub mod tree;

pub use adapter::{LayoutAdapter, LayoutOutcome};
pub use tree::TreeLayout;

use crate::graph::Graph;
use crate::node::{NodeId, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Primary axis of ancestor to descendant flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum LayoutDirection {
    /// Left to right
    #[default]
    LR,
    /// Top to bottom
    TB,
    /// Right to left
    RL,
    /// Bottom to top
    BT,
}

impl LayoutDirection {
    /// Whether ranks advance along x
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::LR | Self::RL)
    }

    /// Whether ranks advance toward smaller coordinates
    pub fn is_reversed(&self) -> bool {
        matches!(self, Self::RL | Self::BT)
    }

    /// Two-letter name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LR => "LR",
            Self::TB => "TB",
            Self::RL => "RL",
            Self::BT => "BT",
        }
    }
}

impl fmt::Display for LayoutDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LR" => Ok(Self::LR),
            "TB" | "TD" => Ok(Self::TB),
            "RL" => Ok(Self::RL),
            "BT" => Ok(Self::BT),
            other => Err(format!("unknown layout direction '{other}'")),
        }
    }
}

/// Size of a node as the engine sees it
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    /// Node ID
    pub id: NodeId,
    /// Width in graph units
    pub width: f32,
    /// Height in graph units
    pub height: f32,
}

/// Input handed to a layout engine
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutRequest {
    /// Flow direction
    pub direction: LayoutDirection,
    /// Nodes in graph order
    pub nodes: Vec<LayoutNode>,
    /// `(source, target)` pairs in graph order
    pub edges: Vec<(NodeId, NodeId)>,
}

impl LayoutRequest {
    /// Describe a graph using the sizes from `config`
    pub fn from_graph(graph: &Graph, config: &LayoutConfig) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| LayoutNode {
                id: node.id.clone(),
                width: config.node_width,
                height: config.node_height(node.fields.len()),
            })
            .collect();
        let edges = graph
            .edges()
            .map(|edge| (edge.source.clone(), edge.target.clone()))
            .collect();

        Self {
            direction: config.direction,
            nodes,
            edges,
        }
    }
}

/// Positions keyed by node
pub type Positions = HashMap<NodeId, Position>;

/// A directed graph layout engine
pub trait LayoutEngine: Send + Sync {
    /// Engine name for logs
    fn name(&self) -> &str;

    /// Position every node in the request
    fn layout(&self, request: &LayoutRequest) -> Result<Positions, LayoutError>;
}

/// Layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Flow direction
    pub direction: LayoutDirection,
    /// Width of every node
    pub node_width: f32,
    /// Height of a node with no fields
    pub base_height: f32,
    /// Extra height per field
    pub field_height: f32,
    /// Gap between ranks along the primary axis
    pub rank_gap: f32,
    /// Gap between neighbouring subtrees along the secondary axis
    pub sibling_gap: f32,
    /// Engine time limit in milliseconds; `None` runs inline with no limit
    pub timeout_ms: Option<u64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: LayoutDirection::LR,
            node_width: 180.0,
            base_height: 40.0,
            field_height: 18.0,
            rank_gap: 80.0,
            sibling_gap: 24.0,
            timeout_ms: Some(2000),
        }
    }
}

impl LayoutConfig {
    /// Height of a node showing `fields` fields
    pub fn node_height(&self, fields: usize) -> f32 {
        self.base_height + fields as f32 * self.field_height
    }

    /// Engine time limit
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Set the direction
    pub fn with_direction(mut self, direction: LayoutDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set the time limit
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }
}

/// Layout failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// Engine did not finish in time
    #[error("Layout timed out after {0:?}")]
    Timeout(Duration),

    /// Engine returned no position for a node
    #[error("Layout produced no position for node {0}")]
    MissingPosition(NodeId),

    /// Input is not a forest of trees
    #[error("Layout input is not a tree: {0}")]
    NotATree(String),

    /// Engine-specific failure
    #[error("Layout engine failed: {0}")]
    Engine(String),

    /// Engine worker exited without a result
    #[error("Layout worker exited without a result")]
    WorkerLost,
}
