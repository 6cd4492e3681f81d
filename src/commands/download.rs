//! Download command - fetches the Node.js runtime into the cache.

use anyhow::{Context, Result};
use std::fs;

use crate::config::Config;
use crate::runtime::NodeRuntime;
use crate::timing::Timer;

/// Execute the download command.
pub fn cmd_download(config: &Config) -> Result<()> {
    let node = NodeRuntime::from_config(config);
    println!(
        "Resolving Node.js v{} (linux-{})...\n",
        node.version, node.arch
    );

    fs::create_dir_all(&config.cache_dir)
        .with_context(|| format!("Failed to create {}", config.cache_dir.display()))?;

    let t = Timer::start("Download");
    let archive = node.ensure(&config.cache_dir)?;
    t.finish();

    println!("\nRuntime: {}", archive.path.display());
    println!("SHA-256: {}", archive.sha256);
    if !archive.verified {
        println!("[WARN] Checksum could not be verified against SHASUMS256.txt");
    }
    Ok(())
}
