// SPDX-License-Identifier: MIT OR Apache-2.0
//! Edge definitions for the graph.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an edge, derived from its endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Derive the id for an edge between two nodes: `{source}-{target}`
    pub fn between(source: &NodeId, target: &NodeId) -> Self {
        Self(format!("{source}-{target}"))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parent to child edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Edge ID
    pub id: EdgeId,
    /// Parent node ID
    pub source: NodeId,
    /// Child node ID
    pub target: NodeId,
}

impl Edge {
    /// Create a new edge
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            id: EdgeId::between(&source, &target),
            source,
            target,
        }
    }
}
