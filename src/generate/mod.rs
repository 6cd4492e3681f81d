//! Generated bundle files: launcher, installer, uninstaller, systemd unit,
//! README and bundle.json.
//!
//! Shell and unit templates use `@NAME@` placeholders filled from
//! [`BundleInfo`]. Values are validated by `Config::validate` before they
//! reach a template.

pub mod installer;
pub mod launcher;
pub mod manifest;
pub mod readme;
pub mod uninstaller;
pub mod unit;

use anyhow::{bail, Result};

use crate::common::write_file_mode;
use crate::stage::StagingLayout;

/// Values substituted into the generated files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleInfo {
    pub project_name: String,
    pub project_version: String,
    pub node_version: String,
    pub arch: String,
    pub ubuntu_version: Option<String>,
    pub install_dir: String,
    pub launcher_name: String,
    pub service_name: String,
    pub service_args: String,
    /// Entry point relative to `app/`
    pub entry_point: String,
}

impl BundleInfo {
    /// Placeholder values shared by all templates.
    fn vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("PROJECT_NAME", self.project_name.clone()),
            ("PROJECT_VERSION", self.project_version.clone()),
            ("NODE_VERSION", self.node_version.clone()),
            ("ARCH", self.arch.clone()),
            ("UBUNTU_VERSION", self.ubuntu_version.clone().unwrap_or_default()),
            ("INSTALL_DIR", self.install_dir.clone()),
            ("LAUNCHER", self.launcher_name.clone()),
            ("SERVICE_NAME", self.service_name.clone()),
            ("SERVICE_ARGS", self.service_args.clone()),
            ("ENTRY_POINT", self.entry_point.clone()),
        ]
    }

    /// Fill `@NAME@` placeholders. Unknown placeholders are an error.
    pub fn render(&self, template: &str) -> Result<String> {
        let mut out = template.to_string();
        for (key, value) in self.vars() {
            out = out.replace(&format!("@{}@", key), &value);
        }
        if let Some(left) = find_placeholder(&out) {
            bail!("Unresolved template placeholder @{}@", left);
        }
        Ok(out)
    }
}

/// First remaining `@UPPER_CASE@` token, if any.
fn find_placeholder(text: &str) -> Option<&str> {
    let mut rest = text;
    while let Some(start) = rest.find('@') {
        let after = &rest[start + 1..];
        if let Some(end) = after.find('@') {
            let candidate = &after[..end];
            if !candidate.is_empty()
                && candidate
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c == '_')
            {
                return Some(candidate);
            }
            rest = &after[end..];
        } else {
            break;
        }
    }
    None
}

/// Write every generated file into the staging tree.
pub fn write_all(layout: &StagingLayout, info: &BundleInfo, runtime_sha256: &str) -> Result<()> {
    write_file_mode(
        layout.launcher(&info.launcher_name),
        launcher::render(info)?,
        0o755,
    )?;
    println!("  {} (launcher)", info.launcher_name);

    write_file_mode(layout.install_script(), installer::render(info)?, 0o755)?;
    println!("  install.sh");

    write_file_mode(layout.uninstall_script(), uninstaller::render(info)?, 0o755)?;
    println!("  uninstall.sh");

    write_file_mode(layout.unit_file(&info.service_name), unit::render(info)?, 0o644)?;
    println!("  {}.service", info.service_name);

    write_file_mode(layout.readme(), readme::render(info)?, 0o644)?;
    println!("  README.md");

    let bundle_manifest = manifest::BundleManifest::new(info, runtime_sha256);
    write_file_mode(layout.manifest(), bundle_manifest.to_json()?, 0o644)?;
    println!("  bundle.json");

    Ok(())
}

#[cfg(test)]
pub(crate) fn sample_info() -> BundleInfo {
    BundleInfo {
        project_name: "@musistudio/claude-code-router".to_string(),
        project_version: "1.0.8".to_string(),
        node_version: "20.18.0".to_string(),
        arch: "x64".to_string(),
        ubuntu_version: Some("22.04".to_string()),
        install_dir: "/opt/claude-router".to_string(),
        launcher_name: "ccr".to_string(),
        service_name: "claude-router".to_string(),
        service_args: "start".to_string(),
        entry_point: "dist/cli.js".to_string(),
    }
}
