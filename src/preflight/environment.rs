//! Project and build environment checks.

use std::path::Path;

use crate::config::Config;
use crate::os_release::OsRelease;
use crate::process::Cmd;
use crate::project::ProjectManifest;

use super::types::CheckResult;

/// Free space below which packaging is likely to fail (runtime + app + archive).
const MIN_FREE_BYTES: u64 = 1024 * 1024 * 1024;

/// Check package.json, build output and entry point.
pub fn check_project(project_dir: &Path, config: &Config) -> Vec<CheckResult> {
    let mut results = Vec::new();

    let project = match ProjectManifest::load(project_dir) {
        Ok(project) => {
            results.push(CheckResult::pass_with(
                "package.json",
                &format!("{} {}", project.name, project.version),
            ));
            project
        }
        Err(e) => {
            results.push(CheckResult::fail("package.json", &format!("{:#}", e)));
            return results;
        }
    };

    let dist = project_dir.join("dist");
    if dist.is_dir() {
        results.push(CheckResult::pass("dist/"));
    } else if config.skip_build {
        results.push(CheckResult::fail(
            "dist/",
            "Not found and build is skipped - nothing to package",
        ));
    } else if project.has_script("build") {
        results.push(CheckResult::warn("dist/", "Not built yet - `npm run build` will create it"));
    } else {
        results.push(CheckResult::fail(
            "dist/",
            "Not found and package.json has no build script",
        ));
    }

    let entry = project.entry_point(&config.launcher_name);
    if project_dir.join(&entry).is_file() {
        results.push(CheckResult::pass_with("entry point", &entry));
    } else {
        results.push(CheckResult::warn(
            "entry point",
            &format!("{} does not exist yet", entry),
        ));
    }

    results
}

/// Check os-release detection, config values and output/cache writability.
pub fn check_build_environment(output_dir: &Path, config: &Config) -> Vec<CheckResult> {
    let mut results = Vec::new();

    match config.validate() {
        Ok(()) => results.push(CheckResult::pass("configuration")),
        Err(e) => results.push(CheckResult::fail("configuration", &e.to_string())),
    }

    match OsRelease::load(&config.os_release_path) {
        Ok(release) => match release.ubuntu_version() {
            Some(version) => {
                results.push(CheckResult::pass_with("Ubuntu version", version));
            }
            None => results.push(CheckResult::warn(
                "Ubuntu version",
                &format!(
                    "Host is {} - archive will use the generic name",
                    release.pretty_name.as_deref().unwrap_or("not Ubuntu")
                ),
            )),
        },
        Err(e) => results.push(CheckResult::warn("Ubuntu version", &format!("{:#}", e))),
    }

    results.push(check_writable("output dir", output_dir));
    results.push(check_writable("cache dir", &config.cache_dir));

    // Use df rather than a statvfs binding
    if let Ok(result) = Cmd::new("df")
        .args(["--output=avail", "-B1"])
        .arg_path(output_dir)
        .allow_fail()
        .run()
    {
        if result.success() {
            if let Some(avail) = result
                .stdout
                .lines()
                .nth(1)
                .and_then(|l| l.trim().parse::<u64>().ok())
            {
                let free_mb = avail / (1024 * 1024);
                if avail < MIN_FREE_BYTES {
                    results.push(CheckResult::warn(
                        "disk space",
                        &format!("{}MB free - packaging needs ~1GB", free_mb),
                    ));
                } else {
                    results.push(CheckResult::pass_with("disk space", &format!("{}MB free", free_mb)));
                }
            }
        }
    }

    results
}

fn check_writable(name: &str, dir: &Path) -> CheckResult {
    if let Err(e) = std::fs::create_dir_all(dir) {
        return CheckResult::fail(name, &format!("Cannot create {}: {}", dir.display(), e));
    }
    let marker = dir.join(".preflight-test");
    match std::fs::write(&marker, "test") {
        Ok(()) => {
            let _ = std::fs::remove_file(&marker);
            CheckResult::pass_with(name, &dir.display().to_string())
        }
        Err(e) => CheckResult::fail(name, &format!("Cannot write to {}: {}", dir.display(), e)),
    }
}
