//! mcis CLI: MVM graph generation and maximum common induced subgraph search.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use mcis_algo::AlgorithmType;
use tracing_subscriber::EnvFilter;

use manifest::McisManifest;

#[derive(Parser)]
#[command(name = "mcis", version, about = "Maximum common induced subgraph toolkit")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new mcis project
    Init {
        /// Project name
        name: String,
    },
    /// Build the matrix-vector multiplication graph for an M x N matrix
    Mvm {
        /// Matrix rows (M)
        #[arg(long)]
        rows: usize,
        /// Matrix columns (N)
        #[arg(long)]
        cols: usize,
        /// Save the graph (.mcg binary, anything else edge list)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also write a Graphviz diagram with this name
        #[arg(long)]
        diagram: Option<String>,
    },
    /// Print structure of a graph file
    Inspect {
        /// Graph file (.mcg or edge list)
        path: PathBuf,
        /// Output format: text, json, dot
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Find the maximum common induced subgraphs of two graphs
    Find {
        /// First graph file
        g1: PathBuf,
        /// Second graph file
        g2: PathBuf,
        /// Algorithm to run (repeatable): bron-kerbosch-serial, bron-kerbosch-parallel
        #[arg(long = "algorithm")]
        algorithms: Vec<AlgorithmType>,
        /// Require mapped edges to carry equal weights
        #[arg(long, overrides_with = "no_match_weights")]
        match_weights: bool,
        /// Compare edge presence only, even if mcis.toml enables weights
        #[arg(long, overrides_with = "match_weights")]
        no_match_weights: bool,
        /// Maximum number of tied results to report
        #[arg(long)]
        max_results: Option<usize>,
        /// Worker threads for parallel algorithms (0 = available parallelism)
        #[arg(long)]
        threads: Option<usize>,
        /// Write each result as a Graphviz diagram with this name prefix
        #[arg(long)]
        diagram: Option<String>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show build settings and tool availability
    Doctor,
    /// Remove generated diagrams
    Clean,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .ok();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Init { name } => commands::init::run(&name),

        Commands::Mvm {
            rows,
            cols,
            output,
            diagram,
        } => {
            let (manifest, project_dir) = load_manifest_or_default(&cwd)?;
            commands::mvm::run(
                &project_dir,
                &manifest,
                rows,
                cols,
                output.as_deref(),
                diagram.as_deref(),
            )
        }

        Commands::Inspect { path, format } => commands::inspect::run(&path, &format),

        Commands::Find {
            g1,
            g2,
            algorithms,
            match_weights,
            no_match_weights,
            max_results,
            threads,
            diagram,
            json,
        } => {
            let (manifest, project_dir) = load_manifest_or_default(&cwd)?;
            let match_weights = match (match_weights, no_match_weights) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let args = commands::find::FindArgs {
                algorithms,
                match_weights,
                max_results,
                threads,
                diagram,
                json,
            };
            commands::find::run(&project_dir, &manifest, &g1, &g2, &args)
        }

        Commands::Doctor => {
            let (_, project_dir) = load_manifest_optional(&cwd)?;
            let project_dir = project_dir.unwrap_or(cwd);
            commands::doctor::run(&project_dir)
        }

        Commands::Clean => {
            let (manifest, project_dir) = load_manifest_or_default(&cwd)?;
            commands::clean::run(&project_dir, &manifest)
        }
    }
}

fn load_manifest_optional(cwd: &Path) -> anyhow::Result<(Option<McisManifest>, Option<PathBuf>)> {
    match McisManifest::find_and_load(cwd)? {
        Some((manifest, dir)) => Ok((Some(manifest), Some(dir))),
        None => Ok((None, None)),
    }
}

/// The project manifest, or defaults rooted at `cwd` outside a project.
fn load_manifest_or_default(cwd: &Path) -> anyhow::Result<(McisManifest, PathBuf)> {
    let (manifest, project_dir) = load_manifest_optional(cwd)?;
    Ok((
        manifest.unwrap_or_default(),
        project_dir.unwrap_or_else(|| cwd.to_path_buf()),
    ))
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn algorithm_flags_parse() {
        let cli = Cli::try_parse_from([
            "mcis",
            "-vv",
            "find",
            "a.txt",
            "b.txt",
            "--algorithm",
            "bron-kerbosch-parallel",
            "--algorithm",
            "bron-kerbosch-serial",
            "--max-results",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Find {
                algorithms,
                max_results,
                ..
            } => {
                assert_eq!(
                    algorithms,
                    vec![
                        AlgorithmType::BronKerboschParallel,
                        AlgorithmType::BronKerboschSerial
                    ]
                );
                assert_eq!(max_results, Some(3));
            }
            _ => panic!("expected find"),
        }
    }

    #[test]
    fn last_weight_flag_wins() {
        let parse = |args: &[&str]| {
            let mut argv = vec!["mcis", "find", "a", "b"];
            argv.extend_from_slice(args);
            match Cli::try_parse_from(argv).unwrap().command {
                Commands::Find {
                    match_weights,
                    no_match_weights,
                    ..
                } => (match_weights, no_match_weights),
                _ => panic!("expected find"),
            }
        };
        assert_eq!(parse(&[]), (false, false));
        assert_eq!(parse(&["--no-match-weights"]), (false, true));
        assert_eq!(parse(&["--no-match-weights", "--match-weights"]), (true, false));
        assert_eq!(parse(&["--match-weights", "--no-match-weights"]), (false, true));
    }

    #[test]
    fn unknown_algorithm_flag_rejected() {
        let result = Cli::try_parse_from(["mcis", "find", "a", "b", "--algorithm", "greedy"]);
        assert!(result.is_err());
    }

    /// Full workflow: init, mvm, inspect, find, clean.
    #[test]
    fn init_mvm_find_clean_workflow() {
        let dir = tempfile::tempdir().unwrap();
        let project_path = dir.path().join("workflow");

        commands::init::create_project(&project_path, "workflow").unwrap();
        let (manifest, project_dir) = load_manifest_or_default(&project_path).unwrap();
        assert_eq!(project_dir, project_path);
        assert_eq!(manifest.project.name, "workflow");

        let small = project_path.join("graphs/small.mcg");
        let large = project_path.join("graphs/large.txt");
        commands::mvm::run(&project_dir, &manifest, 1, 2, Some(small.as_path()), None).unwrap();
        commands::mvm::run(&project_dir, &manifest, 2, 2, Some(large.as_path()), Some("large")).unwrap();
        assert!(small.is_file());
        assert!(large.is_file());

        commands::inspect::run(&small, "text").unwrap();
        commands::inspect::run(&large, "json").unwrap();

        let args = commands::find::FindArgs {
            max_results: Some(2),
            diagram: Some("common".into()),
            ..Default::default()
        };
        let reports = commands::find::search(&project_dir, &manifest, &small, &large, &args).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].size, 7);

        let diagrams = manifest.diagram_dir(&project_dir);
        assert!(std::fs::read_dir(&diagrams).unwrap().count() >= 2);

        commands::clean::run(&project_dir, &manifest).unwrap();
        assert!(!diagrams.exists());
    }
}
