//! Clean command - removes installer outputs and downloads.

use anyhow::Result;
use std::path::Path;

use crate::clean;
use crate::config::Config;

/// Clean target for the clean command.
pub enum CleanTarget {
    /// Clean installer archives and staging dirs (default)
    Outputs,
    /// Clean cached Node.js runtimes
    Downloads,
    /// Clean everything
    All,
}

/// Execute the clean command.
pub fn cmd_clean(output_dir: &Path, target: CleanTarget, config: &Config) -> Result<()> {
    match target {
        CleanTarget::Outputs => {
            clean::clean_outputs(output_dir, &config.service_name)?;
        }
        CleanTarget::Downloads => {
            clean::clean_downloads(&config.cache_dir)?;
        }
        CleanTarget::All => {
            clean::clean_outputs(output_dir, &config.service_name)?;
            clean::clean_downloads(&config.cache_dir)?;
        }
    }
    Ok(())
}
