//! Errors from reading and writing graph files.

use std::io;

use mcis_core::GraphError;
use thiserror::Error;

/// Errors that can occur during graph file operations.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid magic bytes: expected MCG\\0")]
    InvalidMagic,

    #[error("unsupported format version {major}.{minor}.{patch}")]
    UnsupportedVersion { major: u8, minor: u8, patch: u8 },

    #[error("content hash mismatch: file is corrupted")]
    HashMismatch,

    #[error("file too small to be a valid MCG file")]
    FileTooSmall,

    #[error("header declares {declared_nodes} node(s) and {declared_edges} edge(s), payload has {nodes} and {edges}")]
    CountMismatch {
        declared_nodes: u64,
        declared_edges: u64,
        nodes: u64,
        edges: u64,
    },

    #[error("payload violates graph invariants: {}", join(.0))]
    InvalidGraph(Vec<GraphError>),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("line {line}: {source}")]
    Graph {
        line: usize,
        #[source]
        source: GraphError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn join(errors: &[GraphError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
