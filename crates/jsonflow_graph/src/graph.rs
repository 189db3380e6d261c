// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and edges.

use crate::edge::{Edge, EdgeId};
use crate::field::Field;
use crate::node::{Node, NodeId, NodeKind, Position};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// A tree of nodes rooted at `start`
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    /// Nodes in creation order
    nodes: IndexMap<NodeId, Node>,
    /// Edges in creation order
    edges: IndexMap<EdgeId, Edge>,
}

impl Graph {
    /// Create a graph holding only the root node
    pub fn new() -> Self {
        let root = Node::root();
        let mut nodes = IndexMap::new();
        nodes.insert(root.id.clone(), root);
        Self {
            nodes,
            edges: IndexMap::new(),
        }
    }

    /// Add a node; ids must be unique
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        Ok(id)
    }

    /// Add an edge between two existing nodes
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeId, GraphError> {
        if !self.nodes.contains_key(&edge.source) {
            return Err(GraphError::NodeNotFound(edge.source));
        }
        if !self.nodes.contains_key(&edge.target) {
            return Err(GraphError::NodeNotFound(edge.target));
        }
        if edge.source == edge.target {
            return Err(GraphError::SelfLoop(edge.source));
        }
        if self.edges.contains_key(&edge.id) {
            return Err(GraphError::DuplicateEdge(edge.id));
        }
        let id = edge.id.clone();
        self.edges.insert(id.clone(), edge);
        Ok(id)
    }

    /// The root node
    pub fn root(&self) -> &Node {
        // Index 0 is inserted by `new` and nodes are never removed.
        &self.nodes[0]
    }

    /// Get a node by ID
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Get a node by its id string
    pub fn node_by_str(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(&NodeId::new(node_id))
    }

    /// Get a mutable node by ID
    pub(crate) fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node_id)
    }

    /// All nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get an edge by ID
    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.get(edge_id)
    }

    /// All edges in creation order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Direct children of a node, in creation order
    pub fn children<'a>(&'a self, node_id: &'a NodeId) -> impl Iterator<Item = &'a NodeId> + 'a {
        self.edges
            .values()
            .filter(move |e| e.source == *node_id)
            .map(|e| &e.target)
    }

    /// Parent of a node, `None` for the root
    pub fn parent(&self, node_id: &NodeId) -> Option<&NodeId> {
        self.edges
            .values()
            .find(|e| e.target == *node_id)
            .map(|e| &e.source)
    }

    /// Replace or add a field on a node. Does not change the structure.
    pub fn set_field(
        &mut self,
        node_id: &NodeId,
        key: impl Into<String>,
        field: Field,
    ) -> Result<Option<Field>, GraphError> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.clone()))?;
        Ok(node.set_field(key, field))
    }

    /// Nodes reachable from the root, ancestors before descendants
    pub fn depth_first_order(&self) -> Vec<NodeId> {
        let adjacency = self.adjacency();
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![&self.root().id];
        let mut seen = HashSet::new();

        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            order.push(id.clone());
            if let Some(children) = adjacency.get(id) {
                // Reversed so the first child is visited first.
                stack.extend(children.iter().rev());
            }
        }

        order
    }

    /// Check that nodes and edges form a tree rooted at `start`
    pub fn validate_tree(&self) -> Result<(), TreeError> {
        let root = self.root();
        if root.kind != NodeKind::Root || root.id != NodeId::root() {
            return Err(TreeError::MissingRoot);
        }
        if let Some(extra) = self.nodes.values().skip(1).find(|n| n.is_root()) {
            return Err(TreeError::ExtraRoot(extra.id.clone()));
        }
        if self.edges.len() + 1 != self.nodes.len() {
            return Err(TreeError::EdgeCount {
                nodes: self.nodes.len(),
                edges: self.edges.len(),
            });
        }

        let mut parents: HashMap<&NodeId, &NodeId> = HashMap::new();
        for edge in self.edges.values() {
            for endpoint in [&edge.source, &edge.target] {
                if !self.nodes.contains_key(endpoint) {
                    return Err(TreeError::DanglingEdge(edge.id.clone()));
                }
            }
            if edge.target == root.id {
                return Err(TreeError::RootHasParent);
            }
            if parents.insert(&edge.target, &edge.source).is_some() {
                return Err(TreeError::MultipleParents(edge.target.clone()));
            }
        }

        let reachable = self.depth_first_order();
        if reachable.len() != self.nodes.len() {
            let reached: HashSet<_> = reachable.iter().collect();
            let missing = self
                .nodes
                .keys()
                .find(|id| !reached.contains(id))
                .cloned()
                .unwrap_or_else(NodeId::root);
            return Err(TreeError::Unreachable(missing));
        }

        Ok(())
    }

    /// Hash of the node and edge ids in order. Fields and positions are ignored.
    pub fn structure_fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.nodes.len().hash(&mut hasher);
        for id in self.nodes.keys() {
            id.hash(&mut hasher);
        }
        self.edges.len().hash(&mut hasher);
        for edge in self.edges.values() {
            edge.source.hash(&mut hasher);
            edge.target.hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Write layout positions; returns how many nodes were updated
    pub fn apply_positions(&mut self, positions: &HashMap<NodeId, Position>) -> usize {
        let mut updated = 0;
        for (id, position) in positions {
            if let Some(node) = self.nodes.get_mut(id) {
                node.position = Some(*position);
                updated += 1;
            }
        }
        updated
    }

    /// Use the build-time seeds as positions
    pub fn apply_seed_positions(&mut self) {
        for node in self.nodes.values_mut() {
            node.position = Some(node.seed);
        }
    }

    /// Drop all layout positions
    pub fn clear_positions(&mut self) {
        for node in self.nodes.values_mut() {
            node.position = None;
        }
    }

    /// Whether every node has a layout position
    pub fn is_positioned(&self) -> bool {
        self.nodes.values().all(|n| n.position.is_some())
    }

    /// Ordered lists of nodes and edges, ready to serialize
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.values().cloned().collect(),
        }
    }

    fn adjacency(&self) -> HashMap<&NodeId, Vec<&NodeId>> {
        let mut adjacency: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
        for edge in self.edges.values() {
            adjacency.entry(&edge.source).or_default().push(&edge.target);
        }
        adjacency
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable form of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Nodes in creation order
    pub nodes: Vec<Node>,
    /// Edges in creation order
    pub edges: Vec<Edge>,
}

/// Error when modifying a graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// A node with this id already exists
    #[error("Duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// An edge with this id already exists
    #[error("Duplicate edge id: {0}")]
    DuplicateEdge(EdgeId),

    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Self-loop not allowed
    #[error("Self-loop not allowed on {0}")]
    SelfLoop(NodeId),
}

/// Error when the graph is not a tree rooted at `start`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TreeError {
    /// First node is not the synthetic root
    #[error("Graph has no root node")]
    MissingRoot,

    /// A second root-kind node exists
    #[error("Unexpected second root: {0}")]
    ExtraRoot(NodeId),

    /// Edge count is not node count minus one
    #[error("Expected {} edges for {nodes} nodes, found {edges}", .nodes.saturating_sub(1))]
    EdgeCount {
        /// Node count
        nodes: usize,
        /// Edge count
        edges: usize,
    },

    /// Edge endpoint does not exist
    #[error("Edge {0} references a missing node")]
    DanglingEdge(EdgeId),

    /// Root is the target of an edge
    #[error("Root node has an incoming edge")]
    RootHasParent,

    /// Node has more than one incoming edge
    #[error("Node {0} has more than one parent")]
    MultipleParents(NodeId),

    /// Node cannot be reached from the root
    #[error("Node {0} is unreachable from the root")]
    Unreachable(NodeId),
}
