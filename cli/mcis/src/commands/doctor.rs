//! `mcis doctor`: build settings and tool diagnostics.

use std::path::Path;
use std::process::Command;

use anyhow::Result;

use crate::manifest::McisManifest;

/// The `os, compiler, build_type, arch` settings of the running binary.
pub(crate) fn build_settings() -> [(&'static str, String); 4] {
    let compiler = tool_version("rustc", &["--version"]).unwrap_or_else(|| "rustc".to_string());
    let build_type = if cfg!(debug_assertions) {
        "Debug"
    } else {
        "Release"
    };
    [
        ("os", std::env::consts::OS.to_string()),
        ("compiler", compiler),
        ("build_type", build_type.to_string()),
        ("arch", std::env::consts::ARCH.to_string()),
    ]
}

pub fn run(project_dir: &Path) -> Result<()> {
    println!("=== mcis doctor ===");
    println!();

    println!("mcis version: {}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("--- Build Settings ---");
    for (key, value) in build_settings() {
        println!("  {key:<10} {value}");
    }
    println!();

    println!("--- System Tools ---");
    print_tool_status("dot", &["-V"]);
    println!();

    println!("--- Project Status ---");
    match McisManifest::find_and_load(project_dir) {
        Ok(Some((manifest, dir))) => {
            println!("  mcis.toml: found at {}", dir.display());
            println!("  Project:   {}", manifest.project.name);
            println!("  Version:   {}", manifest.project.version);
            println!("  Diagrams:  {}", manifest.diagram_dir(&dir).display());
        }
        Ok(None) => println!("  mcis.toml: not found"),
        Err(e) => println!("  mcis.toml: error: {e:#}"),
    }

    Ok(())
}

/// First non-empty output line of `name args`, from stdout or stderr.
fn tool_version(name: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(name).args(args).output().ok()?;
    // Graphviz prints its version on stderr.
    [output.stdout, output.stderr].iter().find_map(|bytes| {
        String::from_utf8_lossy(bytes)
            .lines()
            .next()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
    })
}

fn print_tool_status(name: &str, args: &[&str]) {
    match tool_version(name, args) {
        Some(version) => println!("  {name}: {version}"),
        None => println!("  {name}: not found"),
    }
}
