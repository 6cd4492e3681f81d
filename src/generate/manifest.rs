//! bundle.json: machine-readable build metadata.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BundleInfo;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleManifest {
    pub project_name: String,
    pub project_version: String,
    pub node_version: String,
    pub arch: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ubuntu_version: Option<String>,
    pub install_dir: String,
    pub launcher: String,
    pub service: String,
    pub entry_point: String,
    pub node_sha256: String,
    pub built_at: DateTime<Utc>,
    pub packager_version: String,
}

impl BundleManifest {
    pub fn new(info: &BundleInfo, node_sha256: &str) -> Self {
        Self {
            project_name: info.project_name.clone(),
            project_version: info.project_version.clone(),
            node_version: info.node_version.clone(),
            arch: info.arch.clone(),
            ubuntu_version: info.ubuntu_version.clone(),
            install_dir: info.install_dir.clone(),
            launcher: info.launcher_name.clone(),
            service: info.service_name.clone(),
            entry_point: info.entry_point.clone(),
            node_sha256: node_sha256.to_string(),
            built_at: Utc::now(),
            packager_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self).context("Failed to serialize bundle.json")?;
        json.push('\n');
        Ok(json)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Failed to parse bundle.json")
    }
}
