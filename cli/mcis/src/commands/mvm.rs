//! `mcis mvm`: generate a matrix-vector multiplication graph.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use mcis_core::{mvm_from_dimensions, write_diagram, Graph};

use crate::manifest::McisManifest;

pub fn run(
    project_dir: &Path,
    manifest: &McisManifest,
    rows: usize,
    cols: usize,
    output: Option<&Path>,
    diagram: Option<&str>,
) -> Result<()> {
    let graph = build(manifest, rows, cols)?;

    println!("MVM graph for a {rows}x{cols} matrix");
    println!("  Nodes: {}", graph.node_count());
    println!("  Edges: {}", graph.edge_count());

    if let Some(path) = output {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        mcis_format::save_graph(path, &graph)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("  Saved: {}", path.display());
    }

    if let Some(name) = diagram {
        let dir = manifest.diagram_dir(project_dir);
        let written = write_diagram(&graph, &dir, name, manifest.diagrams.render_png)
            .context("writing diagram")?;
        println!("  Diagram: {}", written.display());
    }

    Ok(())
}

pub(crate) fn build(manifest: &McisManifest, rows: usize, cols: usize) -> Result<Graph> {
    if rows == 0 || cols == 0 {
        bail!("matrix dimensions must be positive (got {rows}x{cols})");
    }
    Ok(mvm_from_dimensions(
        rows,
        cols,
        manifest.mvm.parallel_threshold,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_counts_match_layers() {
        let graph = build(&McisManifest::default(), 3, 2).unwrap();
        // m*n inputs + n vector + m*n products + m*(n-1) accumulators
        assert_eq!(graph.node_count(), 6 + 2 + 6 + 3);
        assert!(graph.is_dag());
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(build(&McisManifest::default(), 0, 3).is_err());
        assert!(build(&McisManifest::default(), 3, 0).is_err());
    }

    #[test]
    fn run_saves_graph_and_diagram() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("graphs/mvm.mcg");
        let manifest = McisManifest::default();

        run(dir.path(), &manifest, 2, 2, Some(output.as_path()), Some("mvm")).unwrap();

        let graph = mcis_format::load_graph(&output).unwrap();
        assert_eq!(graph.node_count(), 12);
        let entries: Vec<_> = fs::read_dir(dir.path().join("diagrams"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with("_mvm.gv"));
    }
}
