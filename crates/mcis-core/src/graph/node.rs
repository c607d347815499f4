//! The Node struct.
//!
//! A node is identified by an arbitrary string and owns its outgoing edges.
//! Incoming edges are only counted; the owning [`Graph`](super::Graph) keeps
//! the count consistent with the children maps of the other nodes.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Node identifier. Any string is valid, including the empty string.
pub type NodeId = String;

/// Weight carried by a directed edge.
pub type Weight = i32;

/// A node in a weighted directed graph.
///
/// Two nodes are equal when their ids, parent counts, and weighted child
/// sets all match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    num_parents: usize,
    /// Outgoing edges: child id -> weight.
    children: BTreeMap<NodeId, Weight>,
}

impl Node {
    /// Create an isolated node.
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            num_parents: 0,
            children: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Number of incoming edges.
    pub fn num_parents(&self) -> usize {
        self.num_parents
    }

    /// Number of outgoing edges.
    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Outgoing edges keyed by child id, in id order.
    pub fn children(&self) -> &BTreeMap<NodeId, Weight> {
        &self.children
    }

    /// Weight of the edge to `child`, if one exists.
    pub fn weight_to(&self, child: &str) -> Option<Weight> {
        self.children.get(child).copied()
    }

    pub fn contains_edge(&self, child: &str) -> bool {
        self.children.contains_key(child)
    }

    /// True when the node has no incoming edges.
    pub fn is_source(&self) -> bool {
        self.num_parents == 0
    }

    /// True when the node has no outgoing edges.
    pub fn is_sink(&self) -> bool {
        self.children.is_empty()
    }

    /// Compare identifiers only, ignoring edges and counts.
    pub fn same_id(&self, other: &Node) -> bool {
        self.id == other.id
    }

    /// Multi-line report of every field, children sorted by id.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Node ID: {}", self.id);
        let _ = writeln!(out, "Number of Parents: {}", self.num_parents);
        let _ = writeln!(out, "Number of Children: {}", self.children.len());
        out.push_str("Children:\n");
        for (child, weight) in &self.children {
            let _ = writeln!(out, "  Child ID: {child}, Weight: {weight}");
        }
        out
    }

    pub(crate) fn insert_child(&mut self, child: &str, weight: Weight) {
        self.children.insert(child.to_string(), weight);
    }

    pub(crate) fn remove_child(&mut self, child: &str) -> Option<Weight> {
        self.children.remove(child)
    }

    pub(crate) fn set_child_weight(&mut self, child: &str, weight: Weight) -> bool {
        match self.children.get_mut(child) {
            Some(w) => {
                *w = weight;
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_parent(&mut self) {
        self.num_parents += 1;
    }

    pub(crate) fn drop_parent(&mut self) {
        self.num_parents = self.num_parents.saturating_sub(1);
    }
}

/// Quote an identifier with `"`, escaping embedded quotes and backslashes.
pub(crate) fn quote(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 2);
    out.push('"');
    for c in id.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

impl fmt::Display for Node {
    /// Renders `ID -> { "C1"(w1) "C2"(w2) }`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {{ ", self.id)?;
        for (child, weight) in &self.children {
            write!(f, "{}({weight}) ", quote(child))?;
        }
        write!(f, "}}")
    }
}
