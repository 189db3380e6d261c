// SPDX-License-Identifier: MIT OR Apache-2.0
//! Drives a layout engine for a graph.

use super::{LayoutConfig, LayoutEngine, LayoutError, LayoutRequest, Positions, TreeLayout};
use crate::graph::Graph;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;

/// Result of a layout pass
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutOutcome {
    /// The engine ran and positioned this many nodes
    Applied {
        /// Nodes positioned
        nodes: usize,
    },
    /// Structure matched the previous run; cached positions were reused
    Unchanged,
    /// The engine failed and seed positions were used instead
    Fallback(LayoutError),
}

/// Positions from the last successful run
struct CachedLayout {
    fingerprint: u64,
    positions: Positions,
}

/// Runs an engine over graphs and keeps its output until the structure changes
pub struct LayoutAdapter {
    engine: Arc<dyn LayoutEngine>,
    config: LayoutConfig,
    cache: Option<CachedLayout>,
}

impl LayoutAdapter {
    /// Create an adapter around an engine
    pub fn new(engine: Arc<dyn LayoutEngine>, config: LayoutConfig) -> Self {
        Self {
            engine,
            config,
            cache: None,
        }
    }

    /// Create an adapter around the built-in [`TreeLayout`]
    pub fn with_tree_layout(config: LayoutConfig) -> Self {
        let engine = Arc::new(TreeLayout::from_config(&config));
        Self::new(engine, config)
    }

    /// Get configuration
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Forget cached positions so the next `apply` runs the engine
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Position every node of `graph`.
    ///
    /// The engine runs only when the node or edge set differs from the last
    /// successful run; otherwise cached positions are written back.
    pub fn apply(&mut self, graph: &mut Graph) -> Result<LayoutOutcome, LayoutError> {
        let fingerprint = graph.structure_fingerprint();
        if let Some(cache) = self.cache.as_ref().filter(|c| c.fingerprint == fingerprint) {
            graph.apply_positions(&cache.positions);
            tracing::debug!(engine = self.engine.name(), "Structure unchanged, reusing layout");
            return Ok(LayoutOutcome::Unchanged);
        }

        let request = LayoutRequest::from_graph(graph, &self.config);
        let positions = self.run_engine(request)?;

        if let Some(missing) = graph.nodes().find(|n| !positions.contains_key(&n.id)) {
            return Err(LayoutError::MissingPosition(missing.id.clone()));
        }

        let nodes = graph.apply_positions(&positions);
        tracing::debug!(
            engine = self.engine.name(),
            direction = %self.config.direction,
            nodes,
            "Applied layout"
        );
        self.cache = Some(CachedLayout {
            fingerprint,
            positions,
        });
        Ok(LayoutOutcome::Applied { nodes })
    }

    /// Like [`apply`](Self::apply), but falls back to seed positions on failure
    pub fn apply_or_seed(&mut self, graph: &mut Graph) -> LayoutOutcome {
        match self.apply(graph) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("Layout failed, using seed positions: {}", err);
                graph.apply_seed_positions();
                LayoutOutcome::Fallback(err)
            }
        }
    }

    fn run_engine(&self, request: LayoutRequest) -> Result<Positions, LayoutError> {
        let Some(timeout) = self.config.timeout() else {
            return self.engine.layout(&request);
        };

        let (tx, rx) = mpsc::channel();
        let engine = Arc::clone(&self.engine);
        // A worker that outlives the timeout is left to finish on its own.
        thread::Builder::new()
            .name("jsonflow-layout".to_string())
            .spawn(move || {
                let _ = tx.send(engine.layout(&request));
            })
            .map_err(|e| LayoutError::Engine(e.to_string()))?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(LayoutError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(LayoutError::WorkerLost),
        }
    }
}

impl Default for LayoutAdapter {
    fn default() -> Self {
        Self::with_tree_layout(LayoutConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::field::Field;
    use crate::node::{NodeId, Position};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Counts calls and delegates to the tree layout
    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
        inner: TreeLayout,
    }

    impl LayoutEngine for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn layout(&self, request: &LayoutRequest) -> Result<Positions, LayoutError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.layout(request)
        }
    }

    struct Slow;

    impl LayoutEngine for Slow {
        fn name(&self) -> &str {
            "slow"
        }

        fn layout(&self, _request: &LayoutRequest) -> Result<Positions, LayoutError> {
            thread::sleep(Duration::from_millis(500));
            Ok(Positions::new())
        }
    }

    struct Panics;

    impl LayoutEngine for Panics {
        fn name(&self) -> &str {
            "panics"
        }

        fn layout(&self, _request: &LayoutRequest) -> Result<Positions, LayoutError> {
            panic!("engine crashed")
        }
    }

    /// Positions only the root
    struct RootOnly;

    impl LayoutEngine for RootOnly {
        fn name(&self) -> &str {
            "root-only"
        }

        fn layout(&self, _request: &LayoutRequest) -> Result<Positions, LayoutError> {
            let mut positions = Positions::new();
            positions.insert(NodeId::root(), Position::new(1.0, 1.0));
            Ok(positions)
        }
    }

    fn inline() -> LayoutConfig {
        LayoutConfig::default().with_timeout(None)
    }

    #[test]
    fn test_apply_positions_every_node() {
        let mut graph = build(&json!({"a": {"b": {}}, "c": [{}]})).unwrap();
        let mut adapter = LayoutAdapter::default();

        let outcome = adapter.apply(&mut graph).unwrap();
        assert_eq!(outcome, LayoutOutcome::Applied { nodes: 5 });
        assert!(graph.is_positioned());

        let a = graph.node_by_str("a").unwrap().position.unwrap();
        let b = graph.node_by_str("b").unwrap().position.unwrap();
        assert!(a.x < b.x);
    }

    #[test]
    fn test_structure_change_triggers_relayout() {
        let engine = Arc::new(Counting::default());
        let mut adapter = LayoutAdapter::new(engine.clone(), inline());

        let mut graph = build(&json!({"a": {"x": 1}})).unwrap();
        adapter.apply(&mut graph).unwrap();
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);

        // Same structure, rebuilt with a different field value.
        let mut edited = build(&json!({"a": {"x": 2}})).unwrap();
        assert_eq!(adapter.apply(&mut edited).unwrap(), LayoutOutcome::Unchanged);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            edited.node_by_str("a").unwrap().position,
            graph.node_by_str("a").unwrap().position
        );

        // Field edit on a live graph.
        graph
            .set_field(&NodeId::new("a"), "y", Field::from_scalar(&json!(true)).unwrap())
            .unwrap();
        assert_eq!(adapter.apply(&mut graph).unwrap(), LayoutOutcome::Unchanged);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);

        let mut grown = build(&json!({"a": {"x": 1}, "b": {}})).unwrap();
        assert_eq!(adapter.apply(&mut grown).unwrap(), LayoutOutcome::Applied { nodes: 3 });
        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_invalidate_forces_relayout() {
        let engine = Arc::new(Counting::default());
        let mut adapter = LayoutAdapter::new(engine.clone(), inline());
        let mut graph = build(&json!({"a": {}})).unwrap();

        adapter.apply(&mut graph).unwrap();
        adapter.invalidate();
        adapter.apply(&mut graph).unwrap();
        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_relayout_is_deterministic() {
        let input = json!({"a": {"b": {}, "c": {}}, "d": [{}, {}]});
        let mut first = build(&input).unwrap();
        let mut second = build(&input).unwrap();
        LayoutAdapter::default().apply(&mut first).unwrap();
        LayoutAdapter::default().apply(&mut second).unwrap();
        assert_eq!(first.to_document(), second.to_document());
    }

    #[test]
    fn test_timeout() {
        let config = LayoutConfig::default().with_timeout(Some(Duration::from_millis(20)));
        let mut adapter = LayoutAdapter::new(Arc::new(Slow), config);
        let mut graph = build(&json!({})).unwrap();

        assert_eq!(
            adapter.apply(&mut graph),
            Err(LayoutError::Timeout(Duration::from_millis(20)))
        );
        assert!(!graph.is_positioned());
    }

    #[test]
    fn test_worker_panic() {
        let mut adapter = LayoutAdapter::new(Arc::new(Panics), LayoutConfig::default());
        let mut graph = build(&json!({})).unwrap();
        assert_eq!(adapter.apply(&mut graph), Err(LayoutError::WorkerLost));
    }

    #[test]
    fn test_missing_position() {
        let mut adapter = LayoutAdapter::new(Arc::new(RootOnly), inline());
        let mut graph = build(&json!({"a": {}})).unwrap();
        assert_eq!(
            adapter.apply(&mut graph),
            Err(LayoutError::MissingPosition(NodeId::new("a")))
        );
    }

    #[test]
    fn test_fallback_uses_seeds() {
        let mut adapter = LayoutAdapter::new(Arc::new(RootOnly), inline());
        let mut graph = build(&json!({"a": {}})).unwrap();

        let outcome = adapter.apply_or_seed(&mut graph);
        assert!(matches!(outcome, LayoutOutcome::Fallback(LayoutError::MissingPosition(_))));
        assert_eq!(
            graph.node_by_str("a").unwrap().position,
            Some(Position::new(200.0, 100.0))
        );
    }
}
