//! Matrix-vector multiply (MVM) computation graphs.
//!
//! For an `m x n` matrix and an `n`-vector the graph is layered:
//!
//! ```text
//! S1      matrix labels mat[i][j], vector labels vec[j]
//! S2      products p{i},{j}            <- mat[i][j], vec[j]
//! S3      accumulators acc3,{i}        <- p{i},0 .. p{i},{n-1}
//! S4..    accumulators acc{s},{i}      <- acc{s-1},{i}      (up to s = n+1)
//! ```
//!
//! Every edge carries weight 0 and the result is always a DAG.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::graph::Graph;
use crate::parallel::parallel_map;

/// Label generation runs on scoped threads once `rows * cols` reaches this.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// Errors from MVM graph generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MvmError {
    #[error("matrix row {row} has {found} column(s), expected {expected}")]
    RaggedMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("input label '{0}' collides with a generated product or accumulator name")]
    ReservedLabel(String),
}

fn product_label(i: usize, j: usize) -> String {
    format!("p{i},{j}")
}

fn acc_label(set: usize, i: usize) -> String {
    format!("acc{set},{i}")
}

/// Build the MVM graph for explicit matrix and vector labels.
///
/// An empty matrix or vector yields an empty graph. Labels that repeat
/// collapse onto one node. Labels spelled like a generated node (`p{i},{j}`,
/// `acc{s},{i}`) are rejected.
pub fn mvm_from_labels<S: AsRef<str>>(mat: &[Vec<S>], vec: &[S]) -> Result<Graph, MvmError> {
    let m = mat.len();
    let n = vec.len();
    if m == 0 || n == 0 {
        return Ok(Graph::new());
    }
    if let Some((row, r)) = mat.iter().enumerate().find(|(_, r)| r.len() != n) {
        return Err(MvmError::RaggedMatrix {
            row,
            expected: n,
            found: r.len(),
        });
    }

    let products: Vec<String> = (0..m)
        .flat_map(|i| (0..n).map(move |j| product_label(i, j)))
        .collect();
    let accumulators: Vec<String> = (3..=n + 1)
        .flat_map(|set| (0..m).map(move |i| acc_label(set, i)))
        .collect();

    let generated: HashSet<&str> = products
        .iter()
        .chain(&accumulators)
        .map(String::as_str)
        .collect();
    for label in mat.iter().flatten().chain(vec.iter()) {
        let label: &str = label.as_ref();
        if generated.contains(label) {
            return Err(MvmError::ReservedLabel(label.to_string()));
        }
    }

    let mut graph = Graph::new();
    graph.reserve_nodes(m * n + n + products.len() + accumulators.len());

    // S1: inputs
    let mut collapsed = 0usize;
    for label in mat.iter().flatten().chain(vec.iter()) {
        if graph.add_node(label.as_ref()).is_err() {
            collapsed += 1;
        }
    }
    if collapsed > 0 {
        warn!(collapsed, "duplicate MVM input labels collapsed onto shared nodes");
    }

    // S2: products, S3..S(n+1): accumulators. Both are disjoint from the
    // inputs and from each other.
    for label in products.iter().chain(&accumulators) {
        let _ = graph.add_node(label.as_str());
    }

    // Every endpoint exists and no input is a generated node, so edges only
    // point forward through the layers. A repeated input label re-adds an
    // identical edge, which is a no-op.
    for (i, row) in mat.iter().enumerate() {
        for (j, (m_label, v_label)) in row.iter().zip(vec).enumerate() {
            let product = product_label(i, j);
            let _ = graph.add_edge(m_label.as_ref(), &product, 0);
            let _ = graph.add_edge(v_label.as_ref(), &product, 0);
            if n > 1 {
                let _ = graph.add_edge(&product, &acc_label(3, i), 0);
            }
        }
    }

    for set in 3..n + 1 {
        for i in 0..m {
            let _ = graph.add_edge(&acc_label(set, i), &acc_label(set + 1, i), 0);
        }
    }

    debug!(
        rows = m,
        cols = n,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "built MVM graph"
    );
    Ok(graph)
}

/// Build the MVM graph for an `m x n` problem with generated labels
/// `m{i},{j}` and `v{j}`.
///
/// Zero dimensions yield an empty graph.
pub fn mvm_from_dimensions(m: usize, n: usize, parallel_threshold: usize) -> Graph {
    if m == 0 || n == 0 {
        return Graph::new();
    }

    let cells = m.saturating_mul(n);
    let (mat, vec) = if cells >= parallel_threshold {
        debug!(cells, parallel_threshold, "generating MVM labels in parallel");
        let mat: Vec<Vec<String>> = parallel_map(m, 0, |i| {
            (0..n).map(|j| format!("m{i},{j}")).collect::<Vec<String>>()
        });
        let vec: Vec<String> = parallel_map(n, 0, |j| format!("v{j}"));
        (mat, vec)
    } else {
        let mat: Vec<Vec<String>> = (0..m)
            .map(|i| (0..n).map(|j| format!("m{i},{j}")).collect())
            .collect();
        let vec: Vec<String> = (0..n).map(|j| format!("v{j}")).collect();
        (mat, vec)
    };

    match mvm_from_labels(&mat, &vec) {
        Ok(graph) => graph,
        // Generated rows always have n columns and `m`/`v` labels never
        // collide with `p`/`acc` names.
        Err(_) => Graph::new(),
    }
}
