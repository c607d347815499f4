//! Graph file formats for the mcis workspace.
//!
//! Two encodings are supported:
//!
//! - **MCG** (`.mcg`): a binary container with a fixed header, a JSON graph
//!   payload, and a trailing SHA-256 content hash.
//! - **Edge list** (any other extension): line-oriented text, one node or
//!   edge per line. Easy to write by hand.
//!
//! ## MCG Layout
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ Magic: 0x4D434700 ("MCG\0") │  4 bytes
//! │ Version: major.minor.patch   │  3 bytes
//! │ Flags                        │  1 byte
//! ├──────────────────────────────┤
//! │   node_count: u64            │
//! │   edge_count: u64            │
//! │   payload_length: u64        │
//! ├──────────────────────────────┤
//! │ JSON payload                 │
//! ├──────────────────────────────┤
//! │ Content Hash (SHA-256)       │  32 bytes
//! └──────────────────────────────┘
//! ```

mod binary;
mod edgelist;
mod error;

use std::fs;
use std::path::Path;

use mcis_core::Graph;
use tracing::debug;

pub use binary::{McgFile, McgFlags, McgVersion, MAGIC};
pub use edgelist::{parse_edge_list, write_edge_list};
pub use error::FormatError;

/// File extension of the binary container.
pub const MCG_EXTENSION: &str = "mcg";

fn is_mcg(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MCG_EXTENSION))
}

/// Load a graph, choosing the format from the file extension.
pub fn load_graph(path: &Path) -> Result<Graph, FormatError> {
    let graph = if is_mcg(path) {
        let bytes = fs::read(path)?;
        McgFile::from_bytes(&bytes)?.graph
    } else {
        let text = fs::read_to_string(path)?;
        parse_edge_list(&text)?
    };
    debug!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded graph"
    );
    Ok(graph)
}

/// Save a graph, choosing the format from the file extension.
pub fn save_graph(path: &Path, graph: &Graph) -> Result<(), FormatError> {
    if is_mcg(path) {
        let bytes = McgFile::new(graph.clone()).to_bytes()?;
        fs::write(path, bytes)?;
    } else {
        fs::write(path, write_edge_list(graph))?;
    }
    debug!(path = %path.display(), "saved graph");
    Ok(())
}
