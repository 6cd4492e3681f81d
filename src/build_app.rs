//! Installing dependencies and building the application with npm.

use anyhow::{Context, Result};
use tracing::info;

use crate::process::{self, Cmd};
use crate::project::ProjectManifest;

/// Run `npm install` and, when the project defines one, `npm run build`.
pub fn build(project: &ProjectManifest) -> Result<()> {
    let npm = process::which("npm")
        .context("npm not found in PATH. Install Node.js/npm or pass --skip-build")?;

    println!("  npm install");
    Cmd::new(npm.to_string_lossy())
        .arg("install")
        .dir(&project.dir)
        .error_msg("npm install failed")
        .run_interactive()?;

    if project.has_script("build") {
        println!("  npm run build");
        Cmd::new(npm.to_string_lossy())
            .args(["run", "build"])
            .dir(&project.dir)
            .error_msg("npm run build failed")
            .run_interactive()?;
    } else {
        info!("package.json defines no build script; using existing output");
    }

    Ok(())
}
