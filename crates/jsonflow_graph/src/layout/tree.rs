// SPDX-License-Identifier: MIT OR Apache-2.0
//! Layered tidy-tree layout.
//!
//! Rank is the distance from a root. Each subtree owns a disjoint band along
//! the secondary axis, wide enough for its own node and all of its children,
//! and a parent is centred on its band. Bands of siblings never intersect, so
//! no two nodes overlap.

use super::{LayoutConfig, LayoutEngine, LayoutError, LayoutRequest, Positions};
use crate::node::{NodeId, Position};
use std::collections::HashMap;

/// Built-in layout engine for trees and forests
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLayout {
    /// Gap between ranks
    pub rank_gap: f32,
    /// Gap between neighbouring subtrees
    pub sibling_gap: f32,
}

impl TreeLayout {
    /// Create an engine with explicit spacing
    pub fn new(rank_gap: f32, sibling_gap: f32) -> Self {
        Self { rank_gap, sibling_gap }
    }

    /// Create an engine using the spacing in `config`
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self::new(config.rank_gap, config.sibling_gap)
    }
}

impl Default for TreeLayout {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

/// Adjacency of a request by node index
struct Forest {
    roots: Vec<usize>,
    children: Vec<Vec<usize>>,
    /// Pre-order over all roots
    order: Vec<usize>,
    depth: Vec<usize>,
}

impl Forest {
    fn from_request(request: &LayoutRequest) -> Result<Self, LayoutError> {
        let count = request.nodes.len();
        let index: HashMap<&NodeId, usize> = request
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (&n.id, i))
            .collect();

        let mut children = vec![Vec::new(); count];
        let mut has_parent = vec![false; count];
        for (source, target) in &request.edges {
            let lookup = |id: &NodeId| {
                index
                    .get(id)
                    .copied()
                    .ok_or_else(|| LayoutError::NotATree(format!("edge references unknown node {id}")))
            };
            let (s, t) = (lookup(source)?, lookup(target)?);
            if has_parent[t] {
                return Err(LayoutError::NotATree(format!("node {target} has more than one parent")));
            }
            has_parent[t] = true;
            children[s].push(t);
        }

        let roots: Vec<usize> = (0..count).filter(|&i| !has_parent[i]).collect();

        let mut order = Vec::with_capacity(count);
        let mut depth = vec![0; count];
        let mut visited = vec![false; count];
        let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
        while let Some(i) = stack.pop() {
            if visited[i] {
                continue;
            }
            visited[i] = true;
            order.push(i);
            for &c in children[i].iter().rev() {
                depth[c] = depth[i] + 1;
                stack.push(c);
            }
        }

        if let Some(stray) = visited.iter().position(|v| !v) {
            return Err(LayoutError::NotATree(format!(
                "node {} is not reachable from any root",
                request.nodes[stray].id
            )));
        }

        Ok(Self {
            roots,
            children,
            order,
            depth,
        })
    }
}

impl LayoutEngine for TreeLayout {
    fn name(&self) -> &str {
        "tree"
    }

    fn layout(&self, request: &LayoutRequest) -> Result<Positions, LayoutError> {
        let forest = Forest::from_request(request)?;
        let horizontal = request.direction.is_horizontal();

        let (primary, secondary): (Vec<f32>, Vec<f32>) = request
            .nodes
            .iter()
            .map(|n| if horizontal { (n.width, n.height) } else { (n.height, n.width) })
            .unzip();

        // Band width of each subtree, children before parents.
        let mut band = secondary.clone();
        for &i in forest.order.iter().rev() {
            let kids = &forest.children[i];
            if !kids.is_empty() {
                let block = self.block_width(kids, &band);
                band[i] = band[i].max(block);
            }
        }

        // Band start of each subtree, parents before children.
        let mut start = vec![0.0f32; request.nodes.len()];
        let mut cursor = 0.0;
        for &r in &forest.roots {
            start[r] = cursor;
            cursor += band[r] + self.sibling_gap;
        }
        for &i in &forest.order {
            let kids = &forest.children[i];
            let mut offset = start[i] + (band[i] - self.block_width(kids, &band)) / 2.0;
            for &c in kids {
                start[c] = offset;
                offset += band[c] + self.sibling_gap;
            }
        }

        let rank_step = primary.iter().copied().fold(0.0, f32::max) + self.rank_gap;
        let max_depth = forest.depth.iter().copied().max().unwrap_or(0);

        let positions = request
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let rank = if request.direction.is_reversed() {
                    max_depth - forest.depth[i]
                } else {
                    forest.depth[i]
                };
                let along = rank as f32 * rank_step;
                let across = start[i] + (band[i] - secondary[i]) / 2.0;
                let position = if horizontal {
                    Position::new(along, across)
                } else {
                    Position::new(across, along)
                };
                (node.id.clone(), position)
            })
            .collect();

        Ok(positions)
    }
}

impl TreeLayout {
    fn block_width(&self, kids: &[usize], band: &[f32]) -> f32 {
        if kids.is_empty() {
            return 0.0;
        }
        kids.iter().map(|&c| band[c]).sum::<f32>() + self.sibling_gap * (kids.len() - 1) as f32
    }
}
