//! `mcis clean`: remove generated diagrams.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::manifest::McisManifest;

pub fn run(project_dir: &Path, manifest: &McisManifest) -> Result<()> {
    let diagrams = manifest.diagram_dir(project_dir);
    if diagrams.exists() {
        let root = project_dir
            .canonicalize()
            .with_context(|| format!("resolving {}", project_dir.display()))?;
        let target = diagrams
            .canonicalize()
            .with_context(|| format!("resolving {}", diagrams.display()))?;
        if target == root || !target.starts_with(&root) {
            bail!(
                "refusing to remove {}: diagrams dir must be inside the project at {}",
                target.display(),
                root.display()
            );
        }
        fs::remove_dir_all(&target)
            .with_context(|| format!("removing {}", diagrams.display()))?;
        println!("Removed {}", diagrams.display());
    } else {
        println!("Already clean: {} does not exist", diagrams.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_removes_diagram_dir() {
        let dir = tempfile::tempdir().unwrap();
        let diagrams = dir.path().join("diagrams");
        fs::create_dir(&diagrams).unwrap();
        fs::write(diagrams.join("g.gv"), b"digraph {}").unwrap();

        run(dir.path(), &McisManifest::default()).unwrap();
        assert!(!diagrams.exists());
    }

    #[test]
    fn clean_honours_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = McisManifest::default();
        manifest.diagrams.dir = "out/gv".into();
        let custom = dir.path().join("out/gv");
        fs::create_dir_all(&custom).unwrap();

        run(dir.path(), &manifest).unwrap();
        assert!(!custom.exists());
        assert!(dir.path().join("out").is_dir());
    }

    #[test]
    fn clean_refuses_dirs_outside_project() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("proj");
        let sibling = dir.path().join("sibling");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&sibling).unwrap();
        fs::write(project.join("keep.txt"), b"x").unwrap();

        for configured in [".", "..", "../sibling"] {
            let mut manifest = McisManifest::default();
            manifest.diagrams.dir = configured.into();
            let err = run(&project, &manifest).unwrap_err();
            assert!(err.to_string().contains("refusing"), "{configured}: {err}");
        }

        let mut manifest = McisManifest::default();
        manifest.diagrams.dir = sibling.clone();
        assert!(run(&project, &manifest).is_err());

        assert!(project.join("keep.txt").is_file());
        assert!(sibling.is_dir());
    }

    #[test]
    fn clean_handles_already_clean() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), &McisManifest::default()).unwrap();
    }
}
