//! Build command - packages the project into an installer archive.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::bundle::{self, PackageOutcome, PackageSettings};
use crate::config::Config;

/// Command-line overrides for a build.
#[derive(Debug, Default, Clone)]
pub struct BuildOptions {
    /// Defaults to the project directory
    pub output_dir: Option<PathBuf>,
    pub node_version: Option<String>,
    pub skip_build: bool,
    pub keep_staging: bool,
}

/// Execute the build command.
pub fn cmd_build(project_dir: &Path, options: BuildOptions, config: &Config) -> Result<PackageOutcome> {
    let mut config = config.clone();
    if let Some(version) = &options.node_version {
        config = config.with_node_version(version);
    }
    if options.skip_build {
        config.skip_build = true;
    }

    let settings = PackageSettings {
        project_dir: project_dir.to_path_buf(),
        output_dir: options
            .output_dir
            .unwrap_or_else(|| project_dir.to_path_buf()),
        config,
        keep_staging: options.keep_staging,
    };
    bundle::package(&settings)
}
