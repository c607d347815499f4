//! Weighted directed graph keyed by string node identifiers.
//!
//! Edges are stored on their source node; every node also tracks how many
//! edges point at it. All mutation goes through [`Graph`] so the two views
//! stay consistent. Self-loops are rejected and each ordered pair carries at
//! most one edge.

pub mod node;

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::node::{Node, NodeId, Weight};

/// Errors that can occur during graph construction or validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node not found: '{0}'")]
    NodeNotFound(NodeId),

    #[error("duplicate node id: '{0}'")]
    DuplicateNode(NodeId),

    #[error("edge not found: '{from}' -> '{to}'")]
    EdgeNotFound { from: NodeId, to: NodeId },

    #[error("self-loop rejected on node '{0}'")]
    SelfLoop(NodeId),

    #[error("edge '{from}' -> '{to}' already exists with weight {existing} (requested {requested})")]
    ConflictingWeight {
        from: NodeId,
        to: NodeId,
        existing: Weight,
        requested: Weight,
    },

    #[error("dangling edge: '{from}' -> '{to}' targets a node not in the graph")]
    DanglingEdge { from: NodeId, to: NodeId },

    #[error("node '{node}' records {recorded} parent(s) but has {actual}")]
    ParentCountMismatch {
        node: NodeId,
        recorded: usize,
        actual: usize,
    },

    #[error("node stored under '{key}' carries id '{id}'")]
    IdMismatch { key: NodeId, id: NodeId },

    #[error("cycle detected involving node '{0}'")]
    CycleDetected(NodeId),
}

/// A weighted directed graph.
///
/// Cloning produces an independent deep copy. Taking the graph with
/// [`std::mem::take`] leaves an empty graph behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    nodes: HashMap<NodeId, Node>,
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph containing the given node ids and no edges.
    /// Repeated ids collapse onto one node.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        let mut graph = Self::new();
        for id in ids {
            let id = id.into();
            graph.nodes.entry(id.clone()).or_insert_with(|| Node::new(id));
        }
        graph
    }

    /// Reserve capacity for at least `additional` more nodes.
    pub fn reserve_nodes(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    /// Insert an isolated node.
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> Result<(), GraphError> {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        self.nodes.insert(id.clone(), Node::new(id));
        Ok(())
    }

    /// Insert every id not already present.
    ///
    /// Duplicates do not stop the batch: the remaining ids are still added
    /// and one `DuplicateNode` per rejected id is returned.
    pub fn add_nodes<I, S>(&mut self, ids: I) -> Result<(), Vec<GraphError>>
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        let errors: Vec<GraphError> = ids
            .into_iter()
            .filter_map(|id| self.add_node(id).err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Remove a node together with every edge into or out of it.
    pub fn remove_node(&mut self, id: &str) -> Result<Node, GraphError> {
        let removed = self
            .nodes
            .remove(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))?;

        for child in removed.children().keys() {
            if let Some(child_node) = self.nodes.get_mut(child) {
                child_node.drop_parent();
            }
        }
        if removed.num_parents() > 0 {
            for other in self.nodes.values_mut() {
                other.remove_child(id);
            }
        }
        Ok(removed)
    }

    /// Insert a directed edge `from -> to`.
    ///
    /// Re-adding an existing edge with the same weight is a no-op; a
    /// different weight is rejected with `ConflictingWeight`.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: Weight) -> Result<(), GraphError> {
        if !self.nodes.contains_key(from) {
            return Err(GraphError::NodeNotFound(from.to_string()));
        }
        if !self.nodes.contains_key(to) {
            return Err(GraphError::NodeNotFound(to.to_string()));
        }
        if from == to {
            return Err(GraphError::SelfLoop(from.to_string()));
        }

        let source = self
            .nodes
            .get_mut(from)
            .ok_or_else(|| GraphError::NodeNotFound(from.to_string()))?;
        if let Some(existing) = source.weight_to(to) {
            return if existing == weight {
                Ok(())
            } else {
                Err(GraphError::ConflictingWeight {
                    from: from.to_string(),
                    to: to.to_string(),
                    existing,
                    requested: weight,
                })
            };
        }
        source.insert_child(to, weight);

        if let Some(target) = self.nodes.get_mut(to) {
            target.add_parent();
        }
        Ok(())
    }

    /// Insert edges from `from` to each of `targets`.
    ///
    /// When `weights` is empty or its length differs from `targets`, every
    /// edge gets weight 0. Valid edges are inserted even when others fail;
    /// the failures are returned together.
    pub fn add_edges<S: AsRef<str>>(
        &mut self,
        from: &str,
        targets: &[S],
        weights: &[Weight],
    ) -> Result<(), Vec<GraphError>> {
        if !self.nodes.contains_key(from) {
            return Err(vec![GraphError::NodeNotFound(from.to_string())]);
        }
        let use_zero = weights.len() != targets.len();

        let mut errors = Vec::new();
        for (i, target) in targets.iter().enumerate() {
            let weight = if use_zero { 0 } else { weights[i] };
            if let Err(e) = self.add_edge(from, target.as_ref(), weight) {
                errors.push(e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Remove the edge `from -> to`, returning its weight.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> Result<Weight, GraphError> {
        if !self.nodes.contains_key(to) {
            return Err(GraphError::NodeNotFound(to.to_string()));
        }
        let source = self
            .nodes
            .get_mut(from)
            .ok_or_else(|| GraphError::NodeNotFound(from.to_string()))?;
        let weight = source
            .remove_child(to)
            .ok_or_else(|| GraphError::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        if let Some(target) = self.nodes.get_mut(to) {
            target.drop_parent();
        }
        Ok(weight)
    }

    /// Replace the weight of an existing edge.
    pub fn change_edge_weight(
        &mut self,
        from: &str,
        to: &str,
        weight: Weight,
    ) -> Result<(), GraphError> {
        if !self.nodes.contains_key(to) {
            return Err(GraphError::NodeNotFound(to.to_string()));
        }
        let source = self
            .nodes
            .get_mut(from)
            .ok_or_else(|| GraphError::NodeNotFound(from.to_string()))?;
        if source.set_child_weight(to, weight) {
            Ok(())
        } else {
            Err(GraphError::EdgeNotFound {
                from: from.to_string(),
                to: to.to_string(),
            })
        }
    }

    /// Weight of the edge `from -> to`, if present.
    pub fn edge_weight(&self, from: &str, to: &str) -> Option<Weight> {
        self.nodes.get(from).and_then(|n| n.weight_to(to))
    }

    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.edge_weight(from, to).is_some()
    }

    /// Look up a node by ID.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Return the total number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Return the total number of edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Node::num_children).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over all nodes in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All node ids in lexicographic order.
    pub fn node_ids_sorted(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Iterate over all edges as `(from, to, weight)` in arbitrary node order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, Weight)> {
        self.nodes.values().flat_map(|node| {
            node.children()
                .iter()
                .map(move |(child, w)| (node.id(), child.as_str(), *w))
        })
    }

    /// Ids of nodes without incoming edges, sorted.
    pub fn sources(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .nodes
            .values()
            .filter(|n| n.is_source())
            .map(Node::id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of nodes without outgoing edges, sorted.
    pub fn sinks(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .nodes
            .values()
            .filter(|n| n.is_sink())
            .map(Node::id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// True when the graph contains no directed cycle.
    pub fn is_dag(&self) -> bool {
        self.topological_sort().is_ok()
    }

    /// Compute a topological ordering of the nodes.
    ///
    /// Kahn's algorithm over the recorded parent counts; among ready nodes
    /// the lexicographically smallest id is emitted first, so the order is
    /// deterministic.
    pub fn topological_sort(&self) -> Result<Vec<NodeId>, GraphError> {
        let mut in_degree: HashMap<&str, usize> = self
            .nodes
            .values()
            .map(|n| (n.id(), n.num_parents()))
            .collect();

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(id, _)| *id)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop_first() {
            order.push(id.to_string());
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            for child in node.children().keys() {
                if let Some(deg) = in_degree.get_mut(child.as_str()) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 {
                        ready.insert(child.as_str());
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            return Ok(order);
        }

        let stuck = in_degree
            .iter()
            .filter(|(_, &deg)| deg > 0)
            .map(|(id, _)| *id)
            .min()
            .unwrap_or_default();
        Err(GraphError::CycleDetected(stuck.to_string()))
    }

    /// Extract the subgraph induced by `ids`: the listed nodes that exist,
    /// and every edge whose endpoints are both listed.
    pub fn induced_subgraph<I, S>(&self, ids: I) -> Graph
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keep: HashSet<&str> = ids
            .into_iter()
            .filter_map(|id| self.nodes.get_key_value(id.as_ref()).map(|(k, _)| k.as_str()))
            .collect();

        let mut sub = Graph::from_ids(keep.iter().copied());
        for &id in &keep {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            for (child, &weight) in node.children() {
                if keep.contains(child.as_str()) {
                    // Both endpoints exist and the pair is unique in the source graph.
                    let _ = sub.add_edge(id, child, weight);
                }
            }
        }
        sub
    }

    /// Check structural invariants: every node is stored under its own id,
    /// every child exists, no self-loops, and recorded parent counts match
    /// the actual incoming edges.
    ///
    /// Useful after deserializing a graph from an untrusted source.
    pub fn validate(&self) -> Result<(), Vec<GraphError>> {
        let mut errors = Vec::new();
        let mut actual_parents: HashMap<&str, usize> = HashMap::new();

        for (key, node) in &self.nodes {
            if key != node.id() {
                errors.push(GraphError::IdMismatch {
                    key: key.clone(),
                    id: node.id().to_string(),
                });
            }
            for child in node.children().keys() {
                if child == node.id() {
                    errors.push(GraphError::SelfLoop(child.clone()));
                } else if !self.nodes.contains_key(child) {
                    errors.push(GraphError::DanglingEdge {
                        from: node.id().to_string(),
                        to: child.clone(),
                    });
                }
                *actual_parents.entry(child.as_str()).or_default() += 1;
            }
        }

        let mut ids: Vec<&NodeId> = self.nodes.keys().collect();
        ids.sort_unstable();
        for id in ids {
            let recorded = self.nodes[id].num_parents();
            let actual = actual_parents.get(id.as_str()).copied().unwrap_or(0);
            if recorded != actual {
                errors.push(GraphError::ParentCountMismatch {
                    node: id.clone(),
                    recorded,
                    actual,
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// One `ID: [C1(w1), C2(w2)]` line per node, sorted by id.
    pub fn adjacency_listing(&self) -> String {
        let mut out = String::new();
        for id in self.node_ids_sorted() {
            let node = &self.nodes[id];
            let children: Vec<String> = node
                .children()
                .iter()
                .map(|(child, w)| format!("{child}({w})"))
                .collect();
            let _ = writeln!(out, "{id}: [{}]", children.join(", "));
        }
        out
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for id in self.node_ids_sorted() {
            writeln!(f, "{}", self.nodes[id])?;
        }
        Ok(())
    }
}
