//! Removing installer outputs and cached runtimes.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Installer archives and staging directories in `output_dir`.
///
/// Matches `<service>-installer-*` so unrelated files are left alone.
pub fn find_outputs(output_dir: &Path, service_name: &str) -> Result<Vec<PathBuf>> {
    let prefix = format!("{}-installer-", service_name);
    let mut found = Vec::new();

    if !output_dir.is_dir() {
        return Ok(found);
    }

    for entry in fs::read_dir(output_dir)
        .with_context(|| format!("Failed to read {}", output_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(&prefix) {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// Remove installer archives and staging directories (preserves downloads).
pub fn clean_outputs(output_dir: &Path, service_name: &str) -> Result<usize> {
    let outputs = find_outputs(output_dir, service_name)?;
    for path in &outputs {
        println!("Removing {}...", path.display());
        if path.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
    }

    if outputs.is_empty() {
        println!("No installer outputs found in {}.", output_dir.display());
    } else {
        println!("Clean complete (downloads preserved).");
    }
    Ok(outputs.len())
}

/// Remove the runtime download cache.
pub fn clean_downloads(cache_dir: &Path) -> Result<()> {
    if cache_dir.exists() {
        println!("Removing {}...", cache_dir.display());
        fs::remove_dir_all(cache_dir)
            .with_context(|| format!("Failed to remove {}", cache_dir.display()))?;
        println!("Downloads cleaned.");
    } else {
        println!("No downloads to clean.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::write_file_with_dirs;
    use tempfile::TempDir;

    #[test]
    fn test_clean_outputs_only_touches_installer_files() {
        let temp = TempDir::new().unwrap();
        let out = temp.path();
        write_file_with_dirs(out.join("claude-router-installer-linux-x64.tar.gz"), "x").unwrap();
        write_file_with_dirs(out.join("claude-router-installer-linux-x64/install.sh"), "x").unwrap();
        write_file_with_dirs(out.join("package.json"), "{}").unwrap();
        write_file_with_dirs(out.join("other-installer-linux-x64.tar.gz"), "x").unwrap();

        let removed = clean_outputs(out, "claude-router").unwrap();
        assert_eq!(removed, 2);
        assert!(out.join("package.json").exists());
        assert!(out.join("other-installer-linux-x64.tar.gz").exists());
        assert!(!out.join("claude-router-installer-linux-x64").exists());
    }

    #[test]
    fn test_clean_missing_dirs_is_ok() {
        let temp = TempDir::new().unwrap();
        assert_eq!(clean_outputs(&temp.path().join("nope"), "svc").unwrap(), 0);
        clean_downloads(&temp.path().join("nope")).unwrap();
    }

    #[test]
    fn test_clean_downloads_removes_cache() {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        write_file_with_dirs(cache.join("node-v20.18.0-linux-x64.tar.gz"), "x").unwrap();
        clean_downloads(&cache).unwrap();
        assert!(!cache.exists());
    }
}
