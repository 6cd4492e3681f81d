//! Host tool availability checks.

use crate::config::Config;
use crate::process;

use super::types::CheckResult;

/// Check the tools the build stage and the generated scripts rely on.
pub fn check_host_tools(config: &Config) -> Vec<CheckResult> {
    let mut results = Vec::new();

    // npm is only needed when the build stage runs
    let npm_purpose = "Required for `npm install` / `npm run build`";
    results.push(check_tool_exists("npm", "npm", npm_purpose, !config.skip_build));

    let optional_tools = [
        ("node", "nodejs", "Only used to sanity-check the project locally"),
        ("systemctl", "systemd", "Needed on the install target, not for packaging"),
    ];
    for (tool, package, purpose) in optional_tools {
        results.push(check_tool_exists(tool, package, purpose, false));
    }

    results
}

fn check_tool_exists(tool: &str, package: &str, purpose: &str, required: bool) -> CheckResult {
    match process::which(tool) {
        Some(path) => CheckResult::pass_with(tool, &path.display().to_string()),
        None => {
            let msg = format!("Not found. Install '{}' package. {}", package, purpose);
            if required {
                CheckResult::fail(tool, &msg)
            } else {
                CheckResult::warn(tool, &msg)
            }
        }
    }
}
