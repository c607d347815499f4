//! Core graph data structures for the mcis workspace.
//!
//! Provides a string-keyed weighted directed graph, generators for
//! matrix-vector multiply (MVM) computation graphs, and Graphviz export.

pub mod dot;
pub mod graph;
pub mod mvm;
pub mod parallel;

pub use dot::{to_dot, write_diagram, DiagramError};
pub use graph::node::Node;
pub use graph::{Graph, GraphError};
pub use mvm::{mvm_from_dimensions, mvm_from_labels, MvmError, DEFAULT_PARALLEL_THRESHOLD};
