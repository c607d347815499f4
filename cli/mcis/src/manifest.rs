//! `mcis.toml` manifest parsing and project configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mcis_algo::AlgorithmType;
use serde::{Deserialize, Serialize};

pub const MANIFEST_FILE: &str = "mcis.toml";

/// The top-level manifest structure for an mcis project.
///
/// Every section is optional; missing values fall back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McisManifest {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub diagrams: DiagramsConfig,
    #[serde(default)]
    pub mvm: MvmConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Project metadata section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            version: default_version(),
        }
    }
}

fn default_version() -> String {
    "0.1".to_string()
}

/// Where Graphviz diagrams go and whether to render them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramsConfig {
    #[serde(default = "default_diagram_dir")]
    pub dir: PathBuf,
    /// Run `dot -Tpng` on each written diagram.
    #[serde(default)]
    pub render_png: bool,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            dir: default_diagram_dir(),
            render_png: false,
        }
    }
}

fn default_diagram_dir() -> PathBuf {
    PathBuf::from("diagrams")
}

/// MVM graph generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MvmConfig {
    /// `rows * cols` at or above which labels are generated in parallel.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for MvmConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

fn default_parallel_threshold() -> usize {
    mcis_core::DEFAULT_PARALLEL_THRESHOLD
}

/// Defaults for `mcis find`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<AlgorithmType>,
    #[serde(default)]
    pub match_weights: bool,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// 0 means available parallelism.
    #[serde(default)]
    pub threads: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithms: default_algorithms(),
            match_weights: false,
            max_results: default_max_results(),
            threads: 0,
        }
    }
}

fn default_algorithms() -> Vec<AlgorithmType> {
    vec![AlgorithmType::BronKerboschSerial]
}

fn default_max_results() -> usize {
    64
}

impl McisManifest {
    /// Search upward from `start_dir` for an `mcis.toml` file, parse and return
    /// it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join(MANIFEST_FILE);
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: McisManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing mcis.toml")
    }

    /// Diagram directory, resolved against the project root.
    pub fn diagram_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.diagrams.dir)
    }

    /// Generate the default template for `mcis init`.
    pub fn template(name: &str) -> String {
        format!(
            r#"[project]
name = "{name}"
version = "0.1"

[diagrams]
dir = "diagrams"
render_png = false

[mvm]
parallel_threshold = 10000

[search]
algorithms = ["bron-kerbosch-serial"]
match_weights = false
max_results = 64
threads = 0
"#
        )
    }
}
