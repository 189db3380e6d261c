// SPDX-License-Identifier: MIT OR Apache-2.0
//! JSON to node graph transform for `JsonFlow`.
//!
//! Turns an arbitrary JSON document into a tree of nodes and edges that a
//! renderer can draw:
//! - Nested objects and arrays become branch nodes
//! - Scalars become typed fields on the node that holds them
//! - A synthetic `start` node stands for the document itself
//!
//! ## Architecture
//!
//! - [`GraphBuilder`] walks the document depth-first and produces a [`Graph`]
//! - [`LayoutAdapter`] hands the graph to a [`LayoutEngine`] and writes the
//!   returned positions back, re-running only when the structure changes
//! - [`TreeLayout`] is the built-in engine

pub mod builder;
pub mod edge;
pub mod error;
pub mod field;
pub mod graph;
pub mod layout;
pub mod node;

pub use builder::{build, BuildConfig, BuildError, GraphBuilder, IdStrategy};
pub use edge::{Edge, EdgeId};
pub use error::{Error, Result};
pub use field::{Field, ScalarType};
pub use graph::{Graph, GraphDocument, GraphError, TreeError};
pub use layout::{
    LayoutAdapter, LayoutConfig, LayoutDirection, LayoutEngine, LayoutError, LayoutOutcome,
    LayoutRequest, TreeLayout,
};
pub use node::{Node, NodeId, NodeKind, Position};

use serde_json::Value;

/// Build a graph, check it is a tree, then lay it out.
///
/// Layout failures are returned as [`Error::LayoutFailed`]; callers that want
/// seed positions instead can use [`LayoutAdapter::apply_or_seed`] directly.
pub fn build_with_layout(
    json: &Value,
    builder: &GraphBuilder,
    adapter: &mut LayoutAdapter,
) -> Result<Graph> {
    let mut graph = builder.build(json)?;
    graph.validate_tree()?;
    adapter.apply(&mut graph)?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_with_layout() {
        let json = json!({"service": {"name": "api", "replicas": [{"zone": "a"}, {"zone": "b"}]}});
        let mut adapter = LayoutAdapter::default();
        let graph = build_with_layout(&json, &GraphBuilder::default(), &mut adapter).unwrap();

        assert_eq!(graph.node_count(), 5);
        assert!(graph.is_positioned());
        let root_x = graph.root().position.unwrap().x;
        assert!(graph.nodes().skip(1).all(|n| n.position.unwrap().x > root_x));
    }

    #[test]
    fn test_build_errors_surface() {
        let json = json!({"a": {"x": {}}, "b": {"x": {}}});
        let mut adapter = LayoutAdapter::default();
        let err = build_with_layout(&json, &GraphBuilder::default(), &mut adapter).unwrap_err();
        assert_eq!(err, Error::Build(BuildError::IdCollision("x".to_string())));
    }

    #[test]
    fn test_layout_errors_surface() {
        struct Broken;
        impl LayoutEngine for Broken {
            fn name(&self) -> &str {
                "broken"
            }
            fn layout(&self, _: &LayoutRequest) -> std::result::Result<layout::Positions, LayoutError> {
                Err(LayoutError::Engine("no solver".to_string()))
            }
        }

        let config = LayoutConfig::default().with_timeout(None);
        let mut adapter = LayoutAdapter::new(std::sync::Arc::new(Broken), config);
        let err = build_with_layout(&json!({}), &GraphBuilder::default(), &mut adapter).unwrap_err();
        assert!(matches!(err, Error::LayoutFailed(LayoutError::Engine(_))));
        assert!(err.to_string().starts_with("Layout failed"));
    }

    #[test]
    fn test_document_serializes() {
        let mut graph = build(&json!({"a": {"b": 1}})).unwrap();
        graph.apply_seed_positions();
        let value = serde_json::to_value(graph.to_document()).unwrap();
        assert_eq!(value["edges"], json!([{"id": "start-a", "source": "start", "target": "a"}]));
        assert_eq!(value["nodes"][1]["fields"]["b"], json!({"value": 1, "type": "number"}));
        assert_eq!(value["nodes"][1]["position"], json!({"x": 200.0, "y": 100.0}));

        let back: GraphDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back, graph.to_document());
    }
}
