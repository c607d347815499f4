//! `mcis find`: maximum common induced subgraph search between two graph files.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use mcis_algo::{AlgorithmType, CommonSubgraph, McisAlgorithm, SearchOptions};
use mcis_core::write_diagram;
use serde::Serialize;

use crate::manifest::McisManifest;

/// Command-line overrides; unset values fall back to the manifest.
#[derive(Debug, Default)]
pub struct FindArgs {
    pub algorithms: Vec<AlgorithmType>,
    pub match_weights: Option<bool>,
    pub max_results: Option<usize>,
    pub threads: Option<usize>,
    pub diagram: Option<String>,
    pub json: bool,
}

/// Outcome of one algorithm run.
#[derive(Debug, Serialize)]
pub struct FindReport {
    pub algorithm: AlgorithmType,
    pub size: usize,
    pub elapsed_ms: u64,
    pub results: Vec<CommonSubgraph>,
}

pub fn run(
    project_dir: &Path,
    manifest: &McisManifest,
    g1: &Path,
    g2: &Path,
    args: &FindArgs,
) -> Result<()> {
    let reports = search(project_dir, manifest, g1, g2, args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        println!("--- {} ---", report.algorithm);
        println!("  Size:    {}", report.size);
        println!("  Results: {}", report.results.len());
        println!("  Time:    {} ms", report.elapsed_ms);
        for (i, found) in report.results.iter().enumerate() {
            println!("  [{i}]");
            for (a, b) in &found.mapping {
                println!("    {a} -> {b}");
            }
        }
    }
    Ok(())
}

fn search_options(manifest: &McisManifest, args: &FindArgs) -> SearchOptions {
    SearchOptions {
        match_weights: args.match_weights.unwrap_or(manifest.search.match_weights),
        max_results: Some(args.max_results.unwrap_or(manifest.search.max_results)),
        threads: args.threads.unwrap_or(manifest.search.threads),
        ..SearchOptions::default()
    }
}

/// Load both graphs and run every selected algorithm.
pub(crate) fn search(
    project_dir: &Path,
    manifest: &McisManifest,
    g1: &Path,
    g2: &Path,
    args: &FindArgs,
) -> Result<Vec<FindReport>> {
    let first = mcis_format::load_graph(g1).with_context(|| format!("loading {}", g1.display()))?;
    let second =
        mcis_format::load_graph(g2).with_context(|| format!("loading {}", g2.display()))?;

    let opts = search_options(manifest, args);
    let algorithms = if args.algorithms.is_empty() {
        &manifest.search.algorithms
    } else {
        &args.algorithms
    };

    let registry = McisAlgorithm::new();
    let mut reports = Vec::with_capacity(algorithms.len());
    for &algorithm in algorithms {
        let started = Instant::now();
        let results = registry
            .run(&first, &second, algorithm, &opts)
            .with_context(|| format!("running {algorithm}"))?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if let Some(prefix) = &args.diagram {
            let dir = manifest.diagram_dir(project_dir);
            for (i, found) in results.iter().enumerate() {
                let name = format!("{prefix}_{algorithm}_{i}");
                write_diagram(&found.graph, &dir, &name, manifest.diagrams.render_png)
                    .with_context(|| format!("writing diagram {name}"))?;
            }
        }

        reports.push(FindReport {
            algorithm,
            size: results.first().map_or(0, CommonSubgraph::size),
            elapsed_ms,
            results,
        });
    }
    Ok(reports)
}
