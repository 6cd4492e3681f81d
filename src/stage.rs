//! Staging directory layout and application file staging.
//!
//! ```text
//! <bundle>/
//!   nodejs/          bundled runtime
//!   app/             package.json, dist/, optional node_modules/
//!   <launcher>       generated wrapper
//!   install.sh
//!   uninstall.sh
//!   <service>.service
//!   README.md
//!   bundle.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::common::{copy_dir_recursive, prepare_work_dir};
use crate::project::ProjectManifest;

/// Directories copied into `app/` when present. `dist` is required.
const OPTIONAL_DIRS: &[&str] = &["node_modules"];

/// Top-level files copied into `app/` when present.
const OPTIONAL_FILES: &[&str] = &["README.md", "LICENSE", "package-lock.json"];

/// Paths inside a staged bundle.
#[derive(Debug, Clone)]
pub struct StagingLayout {
    pub root: PathBuf,
}

impl StagingLayout {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create an empty staging tree at `<output_dir>/<bundle_name>`.
    pub fn prepare(output_dir: &Path, bundle_name: &str) -> Result<Self> {
        let root = prepare_work_dir(&output_dir.join(bundle_name))?;
        Ok(Self { root })
    }

    pub fn nodejs(&self) -> PathBuf {
        self.root.join("nodejs")
    }

    pub fn app(&self) -> PathBuf {
        self.root.join("app")
    }

    pub fn launcher(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn install_script(&self) -> PathBuf {
        self.root.join("install.sh")
    }

    pub fn uninstall_script(&self) -> PathBuf {
        self.root.join("uninstall.sh")
    }

    pub fn unit_file(&self, service_name: &str) -> PathBuf {
        self.root.join(format!("{}.service", service_name))
    }

    pub fn readme(&self) -> PathBuf {
        self.root.join("README.md")
    }

    pub fn manifest(&self) -> PathBuf {
        self.root.join("bundle.json")
    }
}

/// Copy the built application into `app/`.
///
/// `entry_point` is relative to the project root and must exist after
/// staging.
pub fn stage_app(layout: &StagingLayout, project: &ProjectManifest, entry_point: &str) -> Result<()> {
    let app = layout.app();
    fs::create_dir_all(&app).with_context(|| format!("Failed to create {}", app.display()))?;

    fs::copy(project.dir.join("package.json"), app.join("package.json"))
        .context("Failed to copy package.json")?;

    let dist = project.dir.join("dist");
    if !dist.is_dir() {
        bail!(
            "Build output not found: {}\nRun the build first or drop --skip-build.",
            dist.display()
        );
    }
    let files = copy_dir_recursive(&dist, &app.join("dist"))?;
    println!("  app/dist: {} files", files);

    for dir in OPTIONAL_DIRS {
        let src = project.dir.join(dir);
        if src.is_dir() {
            let files = copy_dir_recursive(&src, &app.join(dir))?;
            println!("  app/{}: {} files", dir, files);
        }
    }

    for file in OPTIONAL_FILES {
        let src = project.dir.join(file);
        if src.is_file() {
            fs::copy(&src, app.join(file)).with_context(|| format!("Failed to copy {}", file))?;
        }
    }

    // Entry points outside dist/ (e.g. bin/cli.js) are copied individually.
    let staged_entry = app.join(entry_point);
    if !staged_entry.is_file() {
        let src = project.dir.join(entry_point);
        if !src.is_file() {
            bail!(
                "Application entry point {} not found in {}",
                entry_point,
                project.dir.display()
            );
        }
        if let Some(parent) = staged_entry.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&src, &staged_entry)
            .with_context(|| format!("Failed to copy entry point {}", entry_point))?;
    }

    Ok(())
}
