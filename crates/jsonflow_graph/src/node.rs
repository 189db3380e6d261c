// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the JSON graph.

use crate::field::Field;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of the synthetic entry node.
pub const ROOT_ID: &str = "start";

/// Unique identifier for a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node ID from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id of the synthetic root
    pub fn root() -> Self {
        Self(ROOT_ID.to_string())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Node kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// The single synthetic entry node
    Root,
    /// A node created from a nested object or array
    Branch,
}

/// 2D coordinate in graph space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Position {
    /// Create a position
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset this position by another
    pub fn offset(self, by: Position) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

/// A node in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique ID
    pub id: NodeId,
    /// Display label: the key that produced the node, or `start`
    pub title: String,
    /// Root or branch
    pub kind: NodeKind,
    /// Scalar values of the source container, in key order
    pub fields: IndexMap<String, Field>,
    /// Placeholder position assigned while building
    pub seed: Position,
    /// Position assigned by layout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Node {
    /// Create the synthetic root node
    pub fn root() -> Self {
        Self {
            id: NodeId::root(),
            title: ROOT_ID.to_string(),
            kind: NodeKind::Root,
            fields: IndexMap::new(),
            seed: Position::default(),
            position: None,
        }
    }

    /// Create a branch node with no fields
    pub fn branch(id: NodeId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            kind: NodeKind::Branch,
            fields: IndexMap::new(),
            seed: Position::default(),
            position: None,
        }
    }

    /// Set the seed position
    pub fn with_seed(mut self, seed: Position) -> Self {
        self.seed = seed;
        self
    }

    /// Whether this is the root node
    pub fn is_root(&self) -> bool {
        self.kind == NodeKind::Root
    }

    /// Get a field by key
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// Set a field, replacing any field with the same key in place
    pub fn set_field(&mut self, key: impl Into<String>, field: Field) -> Option<Field> {
        self.fields.insert(key.into(), field)
    }

    /// Layout position if assigned, otherwise the seed
    pub fn effective_position(&self) -> Position {
        self.position.unwrap_or(self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_node() {
        let root = Node::root();
        assert_eq!(root.id.as_str(), "start");
        assert_eq!(root.title, "start");
        assert!(root.is_root());
        assert!(root.fields.is_empty());
        assert!(root.position.is_none());
    }

    #[test]
    fn test_set_field_keeps_first_slot() {
        let mut node = Node::branch(NodeId::new("a"), "a");
        node.set_field("x", Field::from_scalar(&json!(1)).unwrap());
        node.set_field("y", Field::from_scalar(&json!(2)).unwrap());
        let previous = node.set_field("x", Field::from_scalar(&json!("later")).unwrap());

        assert!(previous.is_some());
        let keys: Vec<_> = node.fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["x", "y"]);
        assert_eq!(node.field("x").unwrap().value, json!("later"));
    }

    #[test]
    fn test_effective_position_prefers_layout() {
        let mut node = Node::root().with_seed(Position::new(1.0, 2.0));
        assert_eq!(node.effective_position(), Position::new(1.0, 2.0));
        node.position = Some(Position::new(5.0, 6.0));
        assert_eq!(node.effective_position(), Position::new(5.0, 6.0));
    }

    #[test]
    fn test_serialized_shape() {
        let node = Node::root();
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["id"], json!("start"));
        assert_eq!(value["kind"], json!("root"));
        assert!(value.get("position").is_none());
    }
}
