//! The Node.js project being packaged, as described by its package.json.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::PackagerError;

/// Entry point used when package.json has no `bin` field.
pub const DEFAULT_ENTRY_POINT: &str = "dist/cli.js";

/// The `bin` field: either a single path or a map of command names to paths.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BinField {
    Single(String),
    Map(BTreeMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    bin: Option<BinField>,
    #[serde(default)]
    scripts: BTreeMap<String, String>,
}

/// Metadata of the project being packaged.
#[derive(Debug, Clone)]
pub struct ProjectManifest {
    pub dir: PathBuf,
    pub name: String,
    pub version: String,
    pub bin: Option<BinField>,
    pub scripts: BTreeMap<String, String>,
}

impl ProjectManifest {
    /// Read `<dir>/package.json`.
    ///
    /// A missing file is reported as [`PackagerError::MissingManifest`].
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join("package.json");
        if !path.is_file() {
            return Err(PackagerError::MissingManifest(dir.to_path_buf()).into());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let package: PackageJson = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        let name = package
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| {
                dir.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "app".to_string())
            });

        Ok(Self {
            dir: dir.to_path_buf(),
            name,
            version: package.version.unwrap_or_else(|| "0.0.0".to_string()),
            bin: package.bin,
            scripts: package.scripts,
        })
    }

    pub fn has_script(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    /// CLI entry point relative to the project root.
    ///
    /// For a `bin` map the entry named after the launcher wins, otherwise the
    /// first entry in name order.
    pub fn entry_point(&self, launcher_name: &str) -> String {
        let raw = match &self.bin {
            Some(BinField::Single(path)) => Some(path.as_str()),
            Some(BinField::Map(map)) => map
                .get(launcher_name)
                .or_else(|| map.values().next())
                .map(String::as_str),
            None => None,
        };

        raw.map(|p| p.trim().trim_start_matches("./").to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_ENTRY_POINT.to_string())
    }
}
