//! `mcis init`: project scaffolding.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::manifest::{McisManifest, MANIFEST_FILE};

/// Create a new mcis project in directory `name`, relative to cwd.
pub fn run(name: &str) -> Result<()> {
    let project_dir = Path::new(name);
    create_project(project_dir, name)
}

pub(crate) fn create_project(project_dir: &Path, name: &str) -> Result<()> {
    if project_dir.exists() {
        bail!("directory '{}' already exists", project_dir.display());
    }

    fs::create_dir_all(project_dir.join("graphs")).context("creating graphs/ directory")?;
    fs::create_dir_all(project_dir.join("diagrams")).context("creating diagrams/ directory")?;

    fs::write(project_dir.join(MANIFEST_FILE), McisManifest::template(name))
        .context("writing mcis.toml")?;
    fs::write(project_dir.join(".gitignore"), "diagrams/\n").context("writing .gitignore")?;

    println!("Created project '{name}'");
    println!("  {name}/{MANIFEST_FILE}");
    println!("  {name}/graphs/");
    println!("  {name}/diagrams/");
    println!("  {name}/.gitignore");

    Ok(())
}
