//! Modular product of two directed graphs.
//!
//! Vertex `(a, b)` pairs node `a` of the first graph with node `b` of the
//! second. Two vertices `(a, b)` and `(c, d)` with `a != c` and `b != d` are
//! adjacent when the edge relation agrees in both directions:
//!
//! - `a -> c` exists exactly when `b -> d` exists, and
//! - `c -> a` exists exactly when `d -> b` exists,
//!
//! with equal weights additionally required under `match_weights`. A set of
//! product vertices is a clique exactly when it is a common induced subgraph
//! mapping.

use mcis_core::graph::node::Weight;
use mcis_core::Graph;

use crate::error::SearchError;
use crate::finder::{CommonSubgraph, SearchOptions};

/// Fixed-capacity bitset over `0..len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0; len.div_ceil(64)],
        }
    }

    /// Bitset with bits `0..len` set.
    pub fn full(len: usize) -> Self {
        let mut set = Self::new(len);
        for i in 0..len {
            set.insert(i);
        }
        set
    }

    pub fn insert(&mut self, i: usize) {
        self.words[i / 64] |= 1u64 << (i % 64);
    }

    pub fn remove(&mut self, i: usize) {
        self.words[i / 64] &= !(1u64 << (i % 64));
    }

    pub fn contains(&self, i: usize) -> bool {
        self.words[i / 64] & (1u64 << (i % 64)) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn intersection(&self, other: &BitSet) -> BitSet {
        BitSet {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & b)
                .collect(),
        }
    }

    pub fn difference(&self, other: &BitSet) -> BitSet {
        BitSet {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & !b)
                .collect(),
        }
    }

    pub fn union(&self, other: &BitSet) -> BitSet {
        BitSet {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a | b)
                .collect(),
        }
    }

    /// `|self ∩ other|` without allocating.
    pub fn intersection_count(&self, other: &BitSet) -> usize {
        self.words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// Set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(wi, &word)| {
            let mut w = word;
            std::iter::from_fn(move || {
                if w == 0 {
                    return None;
                }
                let bit = w.trailing_zeros() as usize;
                w &= w - 1;
                Some(wi * 64 + bit)
            })
        })
    }
}

/// Dense `n x n` edge-weight table for one input graph.
struct EdgeTable {
    n: usize,
    cells: Vec<Option<Weight>>,
}

impl EdgeTable {
    fn build(graph: &Graph, ids: &[&str]) -> Self {
        let n = ids.len();
        let mut cells = vec![None; n * n];
        for (a, from) in ids.iter().enumerate() {
            for (c, to) in ids.iter().enumerate() {
                cells[a * n + c] = graph.edge_weight(from, to);
            }
        }
        Self { n, cells }
    }

    fn get(&self, from: usize, to: usize) -> Option<Weight> {
        self.cells[from * self.n + to]
    }
}

fn relation_agrees(e1: Option<Weight>, e2: Option<Weight>, match_weights: bool) -> bool {
    match (e1, e2) {
        (None, None) => true,
        (Some(w1), Some(w2)) => !match_weights || w1 == w2,
        _ => false,
    }
}

/// The modular product of two graphs, with adjacency stored as bitsets.
///
/// Nodes of each input are indexed in sorted id order, so vertex numbering
/// and therefore search order are deterministic.
pub struct ModularProduct<'a> {
    g1: &'a Graph,
    ids1: Vec<&'a str>,
    ids2: Vec<&'a str>,
    adjacency: Vec<BitSet>,
}

impl<'a> ModularProduct<'a> {
    pub fn build(
        g1: &'a Graph,
        g2: &'a Graph,
        opts: &SearchOptions,
    ) -> Result<Self, SearchError> {
        let ids1 = g1.node_ids_sorted();
        let ids2 = g2.node_ids_sorted();
        let (n1, n2) = (ids1.len(), ids2.len());

        let vertices = n1.saturating_mul(n2);
        if vertices > opts.max_product_vertices {
            return Err(SearchError::ProductTooLarge {
                vertices,
                limit: opts.max_product_vertices,
            });
        }

        let t1 = EdgeTable::build(g1, &ids1);
        let t2 = EdgeTable::build(g2, &ids2);

        let mut adjacency = vec![BitSet::new(vertices); vertices];
        for u in 0..vertices {
            let (a, b) = (u / n2, u % n2);
            for v in (u + 1)..vertices {
                let (c, d) = (v / n2, v % n2);
                if a == c || b == d {
                    continue;
                }
                if relation_agrees(t1.get(a, c), t2.get(b, d), opts.match_weights)
                    && relation_agrees(t1.get(c, a), t2.get(d, b), opts.match_weights)
                {
                    adjacency[u].insert(v);
                    adjacency[v].insert(u);
                }
            }
        }

        Ok(Self {
            g1,
            ids1,
            ids2,
            adjacency,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BitSet::count).sum::<usize>() / 2
    }

    /// Neighbours of vertex `v`.
    pub fn neighbors(&self, v: usize) -> &BitSet {
        &self.adjacency[v]
    }

    /// Largest possible clique: the smaller input's node count.
    pub fn clique_upper_bound(&self) -> usize {
        self.ids1.len().min(self.ids2.len())
    }

    /// The `(first, second)` node ids paired by vertex `v`.
    pub fn pair(&self, v: usize) -> (&'a str, &'a str) {
        let n2 = self.ids2.len();
        (self.ids1[v / n2], self.ids2[v % n2])
    }

    /// Translate a clique of product vertices into a result.
    pub fn to_common_subgraph(&self, clique: &[usize]) -> CommonSubgraph {
        let mut mapping: Vec<(String, String)> = clique
            .iter()
            .map(|&v| {
                let (a, b) = self.pair(v);
                (a.to_string(), b.to_string())
            })
            .collect();
        mapping.sort();
        let graph = self.g1.induced_subgraph(mapping.iter().map(|(a, _)| a));
        CommonSubgraph { mapping, graph }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(ids: &[&str]) -> Graph {
        let mut g = Graph::new();
        g.add_nodes(ids.iter().copied()).unwrap();
        for w in ids.windows(2) {
            g.add_edge(w[0], w[1], 1).unwrap();
        }
        g
    }

    #[test]
    fn bitset_operations() {
        let mut a = BitSet::new(130);
        a.insert(0);
        a.insert(64);
        a.insert(129);
        assert!(a.contains(64));
        assert_eq!(a.count(), 3);
        assert_eq!(a.iter().collect::<Vec<_>>(), vec![0, 64, 129]);

        let mut b = BitSet::new(130);
        b.insert(64);
        b.insert(5);
        assert_eq!(a.intersection(&b).iter().collect::<Vec<_>>(), vec![64]);
        assert_eq!(a.intersection_count(&b), 1);
        assert_eq!(a.difference(&b).iter().collect::<Vec<_>>(), vec![0, 129]);
        assert_eq!(a.union(&b).count(), 4);

        a.remove(64);
        assert!(!a.contains(64));
        assert!(BitSet::new(10).is_empty());
        assert_eq!(BitSet::full(70).count(), 70);
    }

    #[test]
    fn product_of_single_edges() {
        let g1 = path(&["a", "b"]);
        let g2 = path(&["x", "y"]);
        let p = ModularProduct::build(&g1, &g2, &SearchOptions::default()).unwrap();
        assert_eq!(p.vertex_count(), 4);
        // (a,x)-(b,y) agree on a->b / x->y; (a,y)-(b,x) do not.
        assert_eq!(p.edge_count(), 1);
        assert!(p.neighbors(0).contains(3));
        assert_eq!(p.pair(3), ("b", "y"));
    }

    #[test]
    fn non_edges_also_match() {
        let g1 = Graph::from_ids(["a", "b"]);
        let g2 = Graph::from_ids(["x", "y"]);
        let p = ModularProduct::build(&g1, &g2, &SearchOptions::default()).unwrap();
        // Both cross pairings preserve the empty relation.
        assert_eq!(p.edge_count(), 2);
    }

    #[test]
    fn weights_respected_only_when_requested() {
        let mut g1 = path(&["a", "b"]);
        g1.change_edge_weight("a", "b", 5).unwrap();
        let g2 = path(&["x", "y"]);

        let loose = ModularProduct::build(&g1, &g2, &SearchOptions::default()).unwrap();
        assert_eq!(loose.edge_count(), 1);

        let strict_opts = SearchOptions {
            match_weights: true,
            ..SearchOptions::default()
        };
        let strict = ModularProduct::build(&g1, &g2, &strict_opts).unwrap();
        assert_eq!(strict.edge_count(), 0);
    }

    #[test]
    fn oversized_product_rejected() {
        let g = Graph::from_ids((0..10).map(|i| i.to_string()));
        let opts = SearchOptions {
            max_product_vertices: 50,
            ..SearchOptions::default()
        };
        assert!(matches!(
            ModularProduct::build(&g, &g, &opts),
            Err(SearchError::ProductTooLarge {
                vertices: 100,
                limit: 50
            })
        ));
    }

    #[test]
    fn clique_translates_to_sorted_mapping() {
        let g1 = path(&["a", "b", "c"]);
        let g2 = path(&["x", "y"]);
        let p = ModularProduct::build(&g1, &g2, &SearchOptions::default()).unwrap();
        // vertex index = a_idx * 2 + b_idx; (b,x) = 2, (c,y) = 5
        let found = p.to_common_subgraph(&[5, 2]);
        assert_eq!(
            found.mapping,
            vec![("b".to_string(), "x".to_string()), ("c".to_string(), "y".to_string())]
        );
        assert_eq!(found.graph.edge_weight("b", "c"), Some(1));
    }
}
