//! The packaging pipeline.
//!
//! project → OS detection → npm build → runtime → staging → generated
//! files → archive. Each stage runs to completion before the next; any
//! error aborts the run.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use tracing::{debug, info};

use crate::archive;
use crate::build_app;
use crate::common;
use crate::config::Config;
use crate::generate::{self, BundleInfo};
use crate::os_release;
use crate::project::ProjectManifest;
use crate::runtime::NodeRuntime;
use crate::stage::{self, StagingLayout};
use crate::timing::{format_duration, Timer};

/// Inputs of one packaging run.
#[derive(Debug, Clone)]
pub struct PackageSettings {
    pub project_dir: PathBuf,
    /// Where the staging directory and archive are written
    pub output_dir: PathBuf,
    pub config: Config,
    /// Leave the staging directory next to the archive
    pub keep_staging: bool,
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct PackageOutcome {
    pub archive: PathBuf,
    pub info: BundleInfo,
    /// Staging directory, if it was kept
    pub staging: Option<PathBuf>,
}

/// Run the full pipeline.
pub fn package(settings: &PackageSettings) -> Result<PackageOutcome> {
    let config = &settings.config;
    let project = ProjectManifest::load(&settings.project_dir)?;
    config.validate()?;
    println!("=== Packaging {} {} ===\n", project.name, project.version);
    let run_start = Instant::now();

    // 1. Environment
    let ubuntu_version = os_release::detect_ubuntu_version(&config.os_release_path);
    match &ubuntu_version {
        Some(version) => println!("Detected Ubuntu {}", version),
        None => println!("Ubuntu version not detected, using generic archive name"),
    }

    // 2. Application build
    println!("\nBuilding application...");
    if config.skip_build {
        println!("  [SKIP] Build skipped");
    } else {
        let t = Timer::start("Build");
        build_app::build(&project)?;
        t.finish();
    }

    let entry_point = project.entry_point(&config.launcher_name);
    check_entry_point(&entry_point)?;
    debug!(entry_point = %entry_point, "Resolved application entry point");

    // 3. Runtime
    println!("\nPreparing Node.js v{} (linux-{})...", config.node_version, config.node_arch);
    let t = Timer::start("Runtime");
    let node = NodeRuntime::from_config(config);
    fs::create_dir_all(&config.cache_dir)?;
    let runtime_archive = node.ensure(&config.cache_dir)?;
    t.finish();

    // 4. Staging
    let name = archive::bundle_name(&config.service_name, &config.node_arch, ubuntu_version.as_deref());
    println!("\nStaging {}...", name);
    let t = Timer::start("Staging");
    let layout = StagingLayout::prepare(&settings.output_dir, &name)?;
    node.extract(&runtime_archive, &layout.nodejs())?;
    stage::stage_app(&layout, &project, &entry_point)?;
    println!("  Staged {} MB", common::dir_size(&layout.root) / (1024 * 1024));
    t.finish();

    // 5. Generated files
    println!("\nGenerating scripts...");
    let info = BundleInfo {
        project_name: project.name.clone(),
        project_version: project.version.clone(),
        node_version: config.node_version.clone(),
        arch: config.node_arch.clone(),
        ubuntu_version,
        install_dir: config.install_dir.clone(),
        launcher_name: config.launcher_name.clone(),
        service_name: config.service_name.clone(),
        service_args: config.service_args.clone(),
        entry_point,
    };
    generate::write_all(&layout, &info, &runtime_archive.sha256)?;

    // 6. Archive
    println!("\nCreating archive...");
    let t = Timer::start("Archive");
    let archive_path = settings.output_dir.join(archive::archive_file_name(&name));
    archive::create(&layout.root, &archive_path)?;
    t.finish();

    let staging = if settings.keep_staging {
        Some(layout.root.clone())
    } else {
        fs::remove_dir_all(&layout.root)?;
        None
    };

    info!(archive = %archive_path.display(), "Installer archive created");
    println!("\n=== Done in {} ===", format_duration(run_start.elapsed()));
    println!("Installer: {}", archive_path.display());
    println!("Install with:");
    println!("  tar xzf {} && cd {} && sudo ./install.sh", archive::archive_file_name(&name), name);

    Ok(PackageOutcome {
        archive: archive_path,
        info,
        staging,
    })
}

/// The entry point is spliced into shell scripts unquoted in places.
fn check_entry_point(entry: &str) -> Result<()> {
    if entry.starts_with('/') || entry.split('/').any(|part| part == "..") {
        bail!("Entry point {} must be a relative path inside the project", entry);
    }
    if entry
        .chars()
        .any(|c| c.is_whitespace() || "\"'`$\\;&|<>*?#".contains(c))
    {
        bail!("Entry point {} contains characters unsafe for shell scripts", entry);
    }
    Ok(())
}
