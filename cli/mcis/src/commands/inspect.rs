//! `mcis inspect`: graph structure report.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use mcis_core::{to_dot, Graph};
use serde::Serialize;

pub fn run(path: &Path, format: &str) -> Result<()> {
    let graph =
        mcis_format::load_graph(path).with_context(|| format!("loading {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "graph".to_string());
    print!("{}", render(&graph, &name, format)?);
    Ok(())
}

#[derive(Serialize)]
struct GraphSummary<'a> {
    name: &'a str,
    nodes: usize,
    edges: usize,
    is_dag: bool,
    sources: Vec<&'a str>,
    sinks: Vec<&'a str>,
    topological_order: Option<Vec<String>>,
    edge_list: Vec<(&'a str, &'a str, i32)>,
}

impl<'a> GraphSummary<'a> {
    fn new(graph: &'a Graph, name: &'a str) -> Self {
        let mut edge_list: Vec<_> = graph.edges().collect();
        edge_list.sort();
        Self {
            name,
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            is_dag: graph.is_dag(),
            sources: graph.sources(),
            sinks: graph.sinks(),
            topological_order: graph.topological_sort().ok(),
            edge_list,
        }
    }
}

pub(crate) fn render(graph: &Graph, name: &str, format: &str) -> Result<String> {
    match format {
        "text" => Ok(render_text(graph, name)),
        "json" => {
            let mut json = serde_json::to_string_pretty(&GraphSummary::new(graph, name))?;
            json.push('\n');
            Ok(json)
        }
        "dot" => Ok(to_dot(graph, name)),
        other => bail!("unknown format '{other}' (expected text, json or dot)"),
    }
}

fn render_text(graph: &Graph, name: &str) -> String {
    let summary = GraphSummary::new(graph, name);
    let mut out = String::new();
    let _ = writeln!(out, "--- Graph ({name}) ---");
    let _ = writeln!(out, "  Nodes:   {}", summary.nodes);
    let _ = writeln!(out, "  Edges:   {}", summary.edges);
    let _ = writeln!(out, "  DAG:     {}", if summary.is_dag { "yes" } else { "no" });
    let _ = writeln!(out, "  Sources: {}", summary.sources.join(", "));
    let _ = writeln!(out, "  Sinks:   {}", summary.sinks.join(", "));
    if graph.is_empty() {
        return out;
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "--- Adjacency ---");
    out.push_str(&graph.adjacency_listing());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        let mut g = Graph::new();
        g.add_nodes(["a", "b", "c"]).unwrap();
        g.add_edge("a", "b", 2).unwrap();
        g.add_edge("b", "c", 0).unwrap();
        g
    }

    #[test]
    fn text_report() {
        let text = render(&sample(), "sample", "text").unwrap();
        assert!(text.contains("Nodes:   3"));
        assert!(text.contains("DAG:     yes"));
        assert!(text.contains("Sources: a\n"));
        assert!(text.contains("Sinks:   c\n"));
        assert!(text.contains("--- Adjacency ---"));
    }

    #[test]
    fn json_report() {
        let json = render(&sample(), "sample", "json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["nodes"], 3);
        assert_eq!(value["is_dag"], true);
        assert_eq!(value["topological_order"], serde_json::json!(["a", "b", "c"]));
        assert_eq!(value["edge_list"][0], serde_json::json!(["a", "b", 2]));
    }

    #[test]
    fn cyclic_graph_has_no_order() {
        let mut g = sample();
        g.add_edge("c", "a", 1).unwrap();
        let json = render(&g, "cycle", "json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["is_dag"], false);
        assert!(value["topological_order"].is_null());
    }

    #[test]
    fn dot_report() {
        let dot = render(&sample(), "sample", "dot").unwrap();
        assert!(dot.starts_with("digraph \"sample\" {"));
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(render(&sample(), "sample", "yaml").is_err());
    }

    #[test]
    fn run_reads_edge_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.txt");
        std::fs::write(&path, "a -> b 1\n").unwrap();
        run(&path, "text").unwrap();
        assert!(run(&dir.path().join("missing.txt"), "text").is_err());
    }
}
