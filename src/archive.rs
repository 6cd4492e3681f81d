//! Installer archive creation and inspection.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

/// Archive base name, e.g. `claude-router-installer-linux-x64-ubuntu22.04`.
///
/// Without a detected Ubuntu version the suffix is dropped.
pub fn bundle_name(service_name: &str, arch: &str, ubuntu_version: Option<&str>) -> String {
    match ubuntu_version {
        Some(version) => format!("{}-installer-linux-{}-ubuntu{}", service_name, arch, version),
        None => format!("{}-installer-linux-{}", service_name, arch),
    }
}

pub fn archive_file_name(bundle_name: &str) -> String {
    format!("{}.tar.gz", bundle_name)
}

/// One entry of an existing archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub mode: u32,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub size: u64,
}

impl ArchiveEntry {
    pub fn is_executable(&self) -> bool {
        !self.is_dir && self.mode & 0o111 != 0
    }
}

/// Write `<staging_root>` as `<out_path>` (tar.gz).
///
/// The staging directory's own name becomes the single top-level entry.
/// Symlinks are stored as links; headers are deterministic (fixed mtime,
/// root ownership) so rebuilding identical inputs yields identical archives.
pub fn create(staging_root: &Path, out_path: &Path) -> Result<PathBuf> {
    let top = staging_root
        .file_name()
        .with_context(|| format!("{} has no directory name", staging_root.display()))?;
    if !staging_root.is_dir() {
        bail!("Staging directory not found: {}", staging_root.display());
    }

    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let file = File::create(out_path)
        .with_context(|| format!("Failed to create {}", out_path.display()))?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder.mode(tar::HeaderMode::Deterministic);

    builder
        .append_dir_all(top, staging_root)
        .with_context(|| format!("Failed to archive {}", staging_root.display()))?;

    let encoder = builder
        .into_inner()
        .context("Failed to finish tar stream")?;
    encoder
        .finish()
        .context("Failed to finish gzip stream")?
        .into_inner()
        .map_err(|e| e.into_error())
        .context("Failed to flush archive")?;

    let size_mb = fs::metadata(out_path)?.len() as f64 / (1024.0 * 1024.0);
    println!("  {} ({:.1} MB)", out_path.display(), size_mb);

    Ok(out_path.to_path_buf())
}

/// List the entries of a `.tar.gz`.
pub fn list(path: &Path) -> Result<Vec<ArchiveEntry>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    let mut entries = Vec::new();
    for entry in archive
        .entries()
        .with_context(|| format!("Failed to read {} (invalid tar.gz?)", path.display()))?
    {
        let entry = entry.context("Failed to read tar entry")?;
        let header = entry.header();
        let entry_type = header.entry_type();
        entries.push(ArchiveEntry {
            path: entry
                .path()
                .context("Failed to get entry path")?
                .to_string_lossy()
                .trim_end_matches('/')
                .to_string(),
            mode: header.mode().unwrap_or(0),
            is_dir: entry_type.is_dir(),
            is_symlink: entry_type.is_symlink(),
            size: header.size().unwrap_or(0),
        });
    }
    Ok(entries)
}
