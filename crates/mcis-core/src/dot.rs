//! Graphviz export.
//!
//! Renders a [`Graph`] in the DOT language and writes timestamped `.gv`
//! diagram files, optionally rasterizing them with the `dot` tool.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::{debug, info};

use crate::graph::node::quote;
use crate::graph::Graph;

/// Errors from diagram generation.
#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("I/O error writing diagram {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("graphviz `dot` could not be run: {0}")]
    GraphvizUnavailable(io::Error),

    #[error("graphviz `dot` failed on {path}: {stderr}")]
    GraphvizFailed { path: PathBuf, stderr: String },
}

/// Render `graph` as a DOT digraph named `name`.
///
/// Edges are labelled with their weight. Nodes without any edge are
/// emitted as standalone statements so they still appear in the drawing.
/// Output is sorted by node id.
pub fn to_dot(graph: &Graph, name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph {} {{", quote(name));
    for id in graph.node_ids_sorted() {
        let Some(node) = graph.get_node(id) else {
            continue;
        };
        if node.is_source() && node.is_sink() {
            let _ = writeln!(out, "    {};", quote(id));
        }
        for (child, weight) in node.children() {
            let _ = writeln!(
                out,
                "    {} -> {} [label=\"{weight}\"];",
                quote(id),
                quote(child)
            );
        }
    }
    out.push_str("}\n");
    out
}

/// Write `graph` to `<dir>/<timestamp>_<name>.gv` and return the path.
///
/// The directory is created if needed. With `render_png`, the file is also
/// passed through `dot -Tpng` to produce `<file>.png` next to it.
pub fn write_diagram(
    graph: &Graph,
    dir: &Path,
    name: &str,
    render_png: bool,
) -> Result<PathBuf, DiagramError> {
    fs::create_dir_all(dir).map_err(|source| DiagramError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let stamp = chrono::Local::now().format("%Y-%m-%d.%H-%M-%S");
    let path = dir.join(format!("{stamp}_{name}.gv"));
    fs::write(&path, to_dot(graph, name)).map_err(|source| DiagramError::Io {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), nodes = graph.node_count(), "wrote diagram");

    if render_png {
        let png = PathBuf::from(format!("{}.png", path.display()));
        let output = Command::new("dot")
            .arg("-Tpng")
            .arg(&path)
            .arg("-o")
            .arg(&png)
            .output()
            .map_err(DiagramError::GraphvizUnavailable)?;
        if !output.status.success() {
            return Err(DiagramError::GraphvizFailed {
                path,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        info!(png = %png.display(), "rendered diagram");
    }

    Ok(path)
}
