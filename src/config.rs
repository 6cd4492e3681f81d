//! Configuration management for ccr-packager.
//!
//! Reads configuration from a `.env` file in the project directory and from
//! environment variables. Environment variables take precedence over `.env`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::error::PackagerError;

/// Node.js release bundled when `NODE_VERSION` is not set.
pub const DEFAULT_NODE_VERSION: &str = "20.18.0";

/// Official Node.js distribution mirror.
pub const DEFAULT_NODE_DIST_URL: &str = "https://nodejs.org/dist";

pub const DEFAULT_NODE_ARCH: &str = "x64";
pub const DEFAULT_INSTALL_DIR: &str = "/opt/claude-router";
pub const DEFAULT_LAUNCHER_NAME: &str = "ccr";
pub const DEFAULT_SERVICE_NAME: &str = "claude-router";
pub const DEFAULT_SERVICE_ARGS: &str = "start";
pub const DEFAULT_OS_RELEASE: &str = "/etc/os-release";

/// Packager configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Node.js version without the leading `v` (e.g. "20.18.0")
    pub node_version: String,
    /// Node.js architecture suffix (e.g. "x64", "arm64")
    pub node_arch: String,
    /// Base URL of the Node.js distribution mirror
    pub node_dist_url: String,
    /// Where downloaded runtimes are kept between runs
    pub cache_dir: PathBuf,
    /// Install location used by the generated installer
    pub install_dir: String,
    /// Name of the launcher script and of the /usr/local/bin symlink
    pub launcher_name: String,
    /// systemd unit name, without `.service`
    pub service_name: String,
    /// Arguments passed to the launcher by the systemd unit
    pub service_args: String,
    /// os-release file used for Ubuntu version detection
    pub os_release_path: PathBuf,
    /// Skip `npm install` / `npm run build`
    pub skip_build: bool,
}

impl Config {
    /// Load configuration from `<project_dir>/.env` and the environment.
    pub fn load(project_dir: &Path) -> Self {
        let mut vars = HashMap::new();

        let env_path = project_dir.join(".env");
        if env_path.exists() {
            match dotenvy::from_path_iter(&env_path) {
                Ok(iter) => {
                    for item in iter {
                        match item {
                            Ok((key, value)) => {
                                vars.insert(key, value);
                            }
                            Err(e) => warn!("Skipping malformed line in {}: {}", env_path.display(), e),
                        }
                    }
                }
                Err(e) => warn!("Failed to read {}: {}", env_path.display(), e),
            }
        }

        // Environment variables override .env file
        for (key, value) in std::env::vars() {
            vars.insert(key, value);
        }

        Self::from_vars(&vars, project_dir)
    }

    /// Build a config from an explicit variable map.
    ///
    /// Relative paths are resolved against `base_dir`.
    pub fn from_vars(vars: &HashMap<String, String>, base_dir: &Path) -> Self {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let resolve = |value: &str| {
            let path = PathBuf::from(value);
            if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            }
        };

        let node_version = get("NODE_VERSION")
            .map(normalize_node_version)
            .unwrap_or_else(|| DEFAULT_NODE_VERSION.to_string());

        let cache_dir = get("PACKAGER_CACHE_DIR")
            .map(resolve)
            .unwrap_or_else(default_cache_dir);

        let os_release_path = get("OS_RELEASE_PATH")
            .map(resolve)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OS_RELEASE));

        let skip_build = get("PACKAGER_SKIP_BUILD")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let config = Self {
            node_version,
            node_arch: get("NODE_ARCH").unwrap_or(DEFAULT_NODE_ARCH).to_string(),
            node_dist_url: get("NODE_DIST_URL")
                .unwrap_or(DEFAULT_NODE_DIST_URL)
                .trim_end_matches('/')
                .to_string(),
            cache_dir,
            install_dir: get("INSTALL_DIR")
                .unwrap_or(DEFAULT_INSTALL_DIR)
                .trim_end_matches('/')
                .to_string(),
            launcher_name: get("LAUNCHER_NAME").unwrap_or(DEFAULT_LAUNCHER_NAME).to_string(),
            service_name: get("SERVICE_NAME").unwrap_or(DEFAULT_SERVICE_NAME).to_string(),
            service_args: get("SERVICE_ARGS").unwrap_or(DEFAULT_SERVICE_ARGS).to_string(),
            os_release_path,
            skip_build,
        };
        debug!(?config, "Resolved configuration");
        config
    }

    /// Override the Node.js version (from the command line).
    pub fn with_node_version(mut self, version: &str) -> Self {
        self.node_version = normalize_node_version(version);
        self
    }

    /// Check values that end up inside generated shell scripts.
    ///
    /// Names become file names and unquoted words in the scripts, so they are
    /// limited to a conservative character set.
    pub fn validate(&self) -> Result<()> {
        check_word("LAUNCHER_NAME", &self.launcher_name)?;
        check_word("SERVICE_NAME", &self.service_name)?;
        check_word("NODE_ARCH", &self.node_arch)?;
        check_word("NODE_VERSION", &self.node_version)?;

        if !self.install_dir.starts_with('/') || self.install_dir == "/" {
            return Err(PackagerError::InvalidSetting {
                field: "INSTALL_DIR",
                value: self.install_dir.clone(),
                reason: "must be an absolute path below /",
            }
            .into());
        }
        // Same character set install.sh accepts for its target paths.
        if !self
            .install_dir
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._+/-".contains(c))
        {
            return Err(PackagerError::InvalidSetting {
                field: "INSTALL_DIR",
                value: self.install_dir.clone(),
                reason: "may only contain letters, digits and . _ + - /",
            }
            .into());
        }
        if self.service_args.chars().any(|c| c.is_control() || "\"'`$\\;&|<>".contains(c)) {
            return Err(PackagerError::InvalidSetting {
                field: "SERVICE_ARGS",
                value: self.service_args.clone(),
                reason: "must be plain words without quotes or shell operators",
            }
            .into());
        }
        Ok(())
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  NODE_VERSION:       {}", self.node_version);
        println!("  NODE_ARCH:          {}", self.node_arch);
        println!("  NODE_DIST_URL:      {}", self.node_dist_url);
        println!("  PACKAGER_CACHE_DIR: {}", self.cache_dir.display());
        println!("  INSTALL_DIR:        {}", self.install_dir);
        println!("  LAUNCHER_NAME:      {}", self.launcher_name);
        println!("  SERVICE_NAME:       {}", self.service_name);
        println!("  SERVICE_ARGS:       {}", self.service_args);
        println!("  OS_RELEASE_PATH:    {}", self.os_release_path.display());
        println!("  PACKAGER_SKIP_BUILD: {}", self.skip_build);
    }
}

/// Strip a leading `v` so both "v20.18.0" and "20.18.0" are accepted.
pub fn normalize_node_version(version: &str) -> String {
    let version = version.trim();
    version
        .strip_prefix('v')
        .or_else(|| version.strip_prefix('V'))
        .unwrap_or(version)
        .to_string()
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("ccr-packager")
}

fn check_word(field: &'static str, value: &str) -> Result<()> {
    let ok = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if ok {
        Ok(())
    } else {
        Err(PackagerError::InvalidSetting {
            field,
            value: value.to_string(),
            reason: "only letters, digits, '.', '_' and '-' are allowed",
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_vars(&HashMap::new(), Path::new("/project"));
        assert_eq!(config.node_version, DEFAULT_NODE_VERSION);
        assert_eq!(config.node_arch, "x64");
        assert_eq!(config.install_dir, "/opt/claude-router");
        assert_eq!(config.launcher_name, "ccr");
        assert_eq!(config.service_name, "claude-router");
        assert_eq!(config.os_release_path, PathBuf::from("/etc/os-release"));
        assert!(!config.skip_build);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_node_version_leading_v_stripped() {
        let config = Config::from_vars(&vars(&[("NODE_VERSION", "v22.1.0")]), Path::new("/p"));
        assert_eq!(config.node_version, "22.1.0");

        let config = config.with_node_version("V18.20.4");
        assert_eq!(config.node_version, "18.20.4");
    }

    #[test]
    fn test_relative_paths_resolved_against_base() {
        let config = Config::from_vars(
            &vars(&[("PACKAGER_CACHE_DIR", "cache"), ("OS_RELEASE_PATH", "/tmp/os-release")]),
            Path::new("/project"),
        );
        assert_eq!(config.cache_dir, PathBuf::from("/project/cache"));
        assert_eq!(config.os_release_path, PathBuf::from("/tmp/os-release"));
    }

    #[test]
    fn test_trailing_slashes_trimmed() {
        let config = Config::from_vars(
            &vars(&[
                ("NODE_DIST_URL", "https://mirror.example/node/"),
                ("INSTALL_DIR", "/srv/router/"),
            ]),
            Path::new("/p"),
        );
        assert_eq!(config.node_dist_url, "https://mirror.example/node");
        assert_eq!(config.install_dir, "/srv/router");
    }

    #[test]
    fn test_skip_build_flag() {
        for value in ["1", "true", "YES"] {
            let config = Config::from_vars(&vars(&[("PACKAGER_SKIP_BUILD", value)]), Path::new("/p"));
            assert!(config.skip_build, "{value} should enable skip_build");
        }
        let config = Config::from_vars(&vars(&[("PACKAGER_SKIP_BUILD", "0")]), Path::new("/p"));
        assert!(!config.skip_build);
    }

    #[test]
    fn test_validate_rejects_unsafe_names() {
        let config = Config::from_vars(&vars(&[("LAUNCHER_NAME", "ccr; rm -rf /")]), Path::new("/p"));
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("LAUNCHER_NAME"));

        let config = Config::from_vars(&vars(&[("INSTALL_DIR", "relative/dir")]), Path::new("/p"));
        assert!(config.validate().is_err());

        let config = Config::from_vars(&vars(&[("INSTALL_DIR", "/opt/my router")]), Path::new("/p"));
        assert!(config.validate().is_err());

        for dir in ["/opt/a#b", "/opt/a&b", "/opt/a*b"] {
            let config = Config::from_vars(&vars(&[("INSTALL_DIR", dir)]), Path::new("/p"));
            assert!(config.validate().is_err(), "{} accepted", dir);
        }

        let config = Config::from_vars(&vars(&[("INSTALL_DIR", "/opt/router-2.0_x+y")]), Path::new("/p"));
        assert!(config.validate().is_ok());
    }
}
