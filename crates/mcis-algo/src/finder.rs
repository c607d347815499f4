//! The finder interface, search options and result type.

use mcis_core::graph::node::NodeId;
use mcis_core::Graph;
use serde::Serialize;

use crate::error::SearchError;

/// Default cap on modular product vertices (`|G1| * |G2|`).
/// The product's adjacency bitsets need `vertices^2` bits.
pub const DEFAULT_MAX_PRODUCT_VERTICES: usize = 16_384;

/// Tuning knobs shared by every finder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Require mapped edges to carry equal weights, not just to exist.
    pub match_weights: bool,
    /// Stop recording ties once this many maximum mappings are held.
    /// `None` keeps every one.
    pub max_results: Option<usize>,
    /// Worker threads for parallel finders; 0 means available parallelism.
    pub threads: usize,
    /// Refuse inputs whose modular product exceeds this many vertices.
    pub max_product_vertices: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            match_weights: false,
            max_results: None,
            threads: 0,
            max_product_vertices: DEFAULT_MAX_PRODUCT_VERTICES,
        }
    }
}

impl SearchOptions {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_results == Some(0) {
            return Err(SearchError::InvalidOptions(
                "max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Cap on recorded ties, `usize::MAX` when unlimited.
    pub(crate) fn result_cap(&self) -> usize {
        self.max_results.unwrap_or(usize::MAX)
    }
}

/// One maximum common induced subgraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonSubgraph {
    /// `(first-graph id, second-graph id)` pairs, sorted by first-graph id.
    pub mapping: Vec<(NodeId, NodeId)>,
    /// The subgraph of the first graph induced by the mapped nodes.
    pub graph: Graph,
}

impl CommonSubgraph {
    /// Number of mapped nodes.
    pub fn size(&self) -> usize {
        self.mapping.len()
    }

    /// The same subgraph expressed in the second graph's ids.
    pub fn image_in(&self, second: &Graph) -> Graph {
        second.induced_subgraph(self.mapping.iter().map(|(_, b)| b))
    }
}

/// A strategy for finding maximum common induced subgraphs.
pub trait McisFinder: Send + Sync {
    /// Stable name, e.g. `bron-kerbosch-serial`.
    fn name(&self) -> &'static str;

    /// Find every maximum common induced subgraph of `g1` and `g2` (up to
    /// `opts.max_results`), sorted by mapping. Empty when either graph is
    /// empty.
    fn find(
        &self,
        g1: &Graph,
        g2: &Graph,
        opts: &SearchOptions,
    ) -> Result<Vec<CommonSubgraph>, SearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_max_results_rejected() {
        let opts = SearchOptions {
            max_results: Some(0),
            ..SearchOptions::default()
        };
        assert!(matches!(
            opts.validate(),
            Err(SearchError::InvalidOptions(_))
        ));
        assert!(SearchOptions::default().validate().is_ok());
    }

    #[test]
    fn image_uses_second_graph_edges() {
        let mut g2 = Graph::new();
        g2.add_nodes(["x", "y", "z"]).unwrap();
        g2.add_edge("x", "y", 9).unwrap();

        let found = CommonSubgraph {
            mapping: vec![("a".into(), "x".into()), ("b".into(), "y".into())],
            graph: Graph::new(),
        };
        let image = found.image_in(&g2);
        assert_eq!(found.size(), 2);
        assert_eq!(image.node_count(), 2);
        assert_eq!(image.edge_weight("x", "y"), Some(9));
    }
}
