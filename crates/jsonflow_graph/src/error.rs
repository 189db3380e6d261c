// SPDX-License-Identifier: MIT OR Apache-2.0
//! Crate-level error type.

use crate::builder::BuildError;
use crate::graph::TreeError;
use crate::layout::LayoutError;

/// Any failure while turning JSON into a positioned graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The transform failed
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The built graph is not a tree
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The layout stage failed
    #[error("Layout failed: {0}")]
    LayoutFailed(#[from] LayoutError),
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, Error>;
