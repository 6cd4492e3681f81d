//! Preflight checks for packaging.
//!
//! Validates the project, host tools and environment before a build.
//! Run with `ccr-packager preflight` to check everything is ready.

mod environment;
mod host_tools;
pub mod types;

use std::path::Path;

use anyhow::{bail, Result};

use crate::config::Config;

pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(project_dir: &Path, output_dir: &Path, config: &Config) -> PreflightReport {
    let mut report = PreflightReport::default();

    println!("Running preflight checks...\n");

    println!("Checking project...");
    report.add_section("Project", environment::check_project(project_dir, config));

    println!("Checking host tools...");
    report.add_section("Host tools", host_tools::check_host_tools(config));

    println!("Checking build environment...");
    report.add_section(
        "Build environment",
        environment::check_build_environment(output_dir, config),
    );

    println!();

    report
}

/// Run preflight, print the report, and bail if any check failed.
pub fn run_preflight_or_fail(project_dir: &Path, output_dir: &Path, config: &Config) -> Result<()> {
    let report = run_preflight(project_dir, output_dir, config);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before packaging.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
