//! Shared test utilities for ccr-packager tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use ccr_packager::bundle::PackageSettings;
use ccr_packager::config::Config;
use ccr_packager::runtime::checksum::sha256_file;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

pub const NODE_VERSION: &str = "20.18.0";

/// Stand-in for the node binary: prints its environment and arguments.
pub const FAKE_NODE: &str = "#!/bin/sh\necho \"NODE_ENV=$NODE_ENV\"\necho \"ARGS=$*\"\n";

/// A Node.js project, runtime cache and output directory under one temp dir.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    pub project_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub output_dir: PathBuf,
    pub os_release: PathBuf,
}

impl TestEnv {
    /// Empty project directory with a seeded runtime cache and an Ubuntu
    /// 22.04 os-release file.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base = temp_dir.path();

        let env = Self {
            project_dir: base.join("project"),
            cache_dir: base.join("cache"),
            output_dir: base.join("out"),
            os_release: base.join("os-release"),
            _temp_dir: temp_dir,
        };

        fs::create_dir_all(&env.project_dir).expect("Failed to create project dir");
        fs::create_dir_all(&env.output_dir).expect("Failed to create output dir");
        env.write_os_release("NAME=\"Ubuntu\"\nID=ubuntu\nID_LIKE=debian\nVERSION_ID=\"22.04\"\nPRETTY_NAME=\"Ubuntu 22.04.4 LTS\"\n");
        seed_runtime_cache(&env.cache_dir, NODE_VERSION);
        env
    }

    /// Like `new`, plus a built project: package.json and dist/cli.js.
    pub fn with_project() -> Self {
        let env = Self::new();
        env.write_project_file(
            "package.json",
            r#"{
  "name": "@musistudio/claude-code-router",
  "version": "1.0.8",
  "bin": { "ccr": "./dist/cli.js" },
  "scripts": { "build": "node scripts/build.js" }
}
"#,
        );
        env.write_project_file("dist/cli.js", "console.log('router');\n");
        env.write_project_file("node_modules/dep/index.js", "module.exports = 1;\n");
        env.write_project_file("README.md", "# router\n");
        env
    }

    pub fn write_project_file(&self, rel: &str, content: &str) {
        let path = self.project_dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn write_os_release(&self, content: &str) {
        fs::write(&self.os_release, content).expect("Failed to write os-release");
    }

    /// Config pointing at the temp dirs, with the npm build skipped.
    pub fn config(&self) -> Config {
        self.config_with(&[])
    }

    pub fn config_with(&self, extra: &[(&str, &str)]) -> Config {
        let mut vars: HashMap<String, String> = HashMap::new();
        vars.insert("NODE_VERSION".into(), NODE_VERSION.into());
        vars.insert("PACKAGER_CACHE_DIR".into(), self.cache_dir.display().to_string());
        vars.insert("OS_RELEASE_PATH".into(), self.os_release.display().to_string());
        vars.insert("PACKAGER_SKIP_BUILD".into(), "1".into());
        // Unreachable mirror: anything not in the cache must fail fast
        vars.insert("NODE_DIST_URL".into(), "http://127.0.0.1:9/dist".into());
        for (k, v) in extra {
            vars.insert(k.to_string(), v.to_string());
        }
        Config::from_vars(&vars, &self.project_dir)
    }

    pub fn settings(&self, config: Config) -> PackageSettings {
        PackageSettings {
            project_dir: self.project_dir.clone(),
            output_dir: self.output_dir.clone(),
            config,
            keep_staging: false,
        }
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self._temp_dir.path().join(rel)
    }
}

/// Write a fake `node-v<ver>-linux-x64.tar.gz` and matching SHASUMS file.
pub fn seed_runtime_cache(cache_dir: &Path, version: &str) {
    fs::create_dir_all(cache_dir).expect("Failed to create cache dir");
    let dist = format!("node-v{}-linux-x64", version);
    let archive_name = format!("{}.tar.gz", dist);
    let archive_path = cache_dir.join(&archive_name);

    let file = fs::File::create(&archive_path).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    let entries: [(String, &[u8], u32); 3] = [
        (format!("{}/bin/node", dist), FAKE_NODE.as_bytes(), 0o755),
        (format!("{}/include/node/node.h", dist), &b"/* header */\n"[..], 0o644),
        (format!("{}/LICENSE", dist), &b"MIT\n"[..], 0o644),
    ];
    for (path, data, mode) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(mode);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder.append_data(&mut header, path, data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();

    let sha = sha256_file(&archive_path).unwrap();
    fs::write(
        cache_dir.join(format!("SHASUMS256-v{}.txt", version)),
        format!(
            "{}  node-v{}-darwin-arm64.tar.gz\n{}  {}\n",
            "0".repeat(64),
            version,
            sha,
            archive_name
        ),
    )
    .unwrap();
}

/// True if the current user is root (the generated scripts require it).
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "Expected file to exist: {}", path.display());
}

pub fn assert_not_exists(path: &Path) {
    assert!(
        path.symlink_metadata().is_err(),
        "Expected {} to be gone",
        path.display()
    );
}

pub fn assert_executable(path: &Path) {
    let mode = fs::metadata(path)
        .unwrap_or_else(|e| panic!("Cannot stat {}: {}", path.display(), e))
        .permissions()
        .mode();
    assert!(
        mode & 0o111 != 0,
        "Expected {} to be executable, mode {:o}",
        path.display(),
        mode
    );
}

pub fn assert_file_contains(path: &Path, needle: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Cannot read {}: {}", path.display(), e));
    assert!(
        content.contains(needle),
        "Expected {} to contain '{}', got:\n{}",
        path.display(),
        needle,
        content
    );
}

pub fn assert_symlink(path: &Path, expected_target: &Path) {
    assert!(
        path.is_symlink(),
        "Expected symlink at {}, but it's not a symlink",
        path.display()
    );
    let target = fs::read_link(path).unwrap();
    assert_eq!(target, expected_target, "Symlink {} target mismatch", path.display());
}
