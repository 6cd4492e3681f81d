//! Show command - displays information.

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::archive;
use crate::config::Config;
use crate::generate::manifest::BundleManifest;
use crate::runtime::NodeRuntime;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config,
    /// Show the contents of an installer archive
    Bundle(PathBuf),
}

/// Execute the show command.
pub fn cmd_show(target: ShowTarget, config: &Config) -> Result<()> {
    match target {
        ShowTarget::Config => {
            config.print();
            println!();
            let node = NodeRuntime::from_config(config);
            let cached = node.cached_archive(&config.cache_dir);
            if cached.is_file() {
                println!("Runtime cache: {} [OK]", cached.display());
            } else {
                println!("Runtime cache: {} (not downloaded)", cached.display());
            }
        }
        ShowTarget::Bundle(path) => show_bundle(&path)?,
    }
    Ok(())
}

fn show_bundle(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("Archive not found: {}", path.display());
    }

    if let Some(manifest) = read_manifest(path)? {
        println!("{} {}", manifest.project_name, manifest.project_version);
        println!("  Node.js:     v{} (linux-{})", manifest.node_version, manifest.arch);
        match &manifest.ubuntu_version {
            Some(version) => println!("  Built on:    Ubuntu {}", version),
            None => println!("  Built on:    unknown distribution"),
        }
        println!("  Install dir: {}", manifest.install_dir);
        println!("  Launcher:    {}", manifest.launcher);
        println!("  Service:     {}.service", manifest.service);
        println!("  Built at:    {}", manifest.built_at.to_rfc3339());
        println!();
    }

    let entries = archive::list(path)?;
    // The runtime alone has thousands of files; only show the bundle skeleton.
    for entry in entries.iter().filter(|e| e.path.split('/').count() <= 2) {
        let kind = if entry.is_dir {
            "d"
        } else if entry.is_symlink {
            "l"
        } else if entry.is_executable() {
            "x"
        } else {
            "-"
        };
        println!("  {} {:o} {}", kind, entry.mode & 0o7777, entry.path);
    }
    println!("\n{} entries total", entries.len());
    Ok(())
}

/// Read `<top>/bundle.json` from an installer archive, if present.
fn read_manifest(path: &Path) -> Result<Option<BundleManifest>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));

    for entry in tar.entries().context("Failed to read archive")? {
        let mut entry = entry.context("Corrupt archive entry")?;
        let entry_path = entry.path()?.to_string_lossy().into_owned();
        let mut parts = entry_path.trim_end_matches('/').split('/');
        if parts.nth(1) == Some("bundle.json") && parts.next().is_none() {
            let mut text = String::new();
            entry
                .read_to_string(&mut text)
                .context("Failed to read bundle.json")?;
            return BundleManifest::from_json(&text).map(Some);
        }
    }
    Ok(None)
}
