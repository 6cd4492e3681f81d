//! Host distribution detection via os-release.
//!
//! Only the build host's Ubuntu version matters: it is baked into the
//! archive name and into the installer's compatibility warning.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Parsed subset of an os-release file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub id: Option<String>,
    pub id_like: Vec<String>,
    pub version_id: Option<String>,
    pub pretty_name: Option<String>,
}

impl OsRelease {
    /// Parse os-release text (`KEY=value` lines, optionally quoted).
    pub fn parse(text: &str) -> Self {
        let mut fields = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                fields.insert(key.trim().to_string(), unquote(value.trim()));
            }
        }

        let mut take = |key: &str| fields.remove(key).filter(|v| !v.is_empty());

        Self {
            id: take("ID").map(|v| v.to_ascii_lowercase()),
            id_like: take("ID_LIKE")
                .map(|v| v.split_whitespace().map(|s| s.to_ascii_lowercase()).collect())
                .unwrap_or_default(),
            version_id: take("VERSION_ID"),
            pretty_name: take("PRETTY_NAME"),
        }
    }

    /// Read and parse an os-release file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    /// Ubuntu version (e.g. "22.04"), or None on other distributions.
    ///
    /// Derivatives report their own VERSION_ID, so only genuine Ubuntu
    /// yields a version.
    pub fn ubuntu_version(&self) -> Option<&str> {
        if self.id.as_deref() == Some("ubuntu") {
            self.version_id.as_deref()
        } else {
            None
        }
    }
}

/// Detect the Ubuntu version of the build host.
///
/// Failure to read the file is not an error; the caller falls back to the
/// generic archive name.
pub fn detect_ubuntu_version(path: &Path) -> Option<String> {
    match OsRelease::load(path) {
        Ok(release) => {
            let version = release.ubuntu_version().map(str::to_string);
            if version.is_none() {
                tracing::debug!(
                    "{} does not describe Ubuntu ({:?})",
                    path.display(),
                    release.pretty_name
                );
            }
            version
        }
        Err(e) => {
            tracing::warn!("OS detection failed: {:#}", e);
            None
        }
    }
}

fn unquote(value: &str) -> String {
    let stripped = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value);
    stripped.to_string()
}
