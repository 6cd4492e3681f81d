//! The bundled Node.js runtime: locating, downloading, verifying, extracting.
//!
//! Archives are cached under the configured cache directory, keyed by
//! version and architecture, and reused across runs. When the mirror's
//! SHASUMS256.txt is obtainable the archive is verified against it;
//! a mismatch discards the archive and fails the run.

pub mod checksum;
pub mod download;
pub mod extract;
#[cfg(test)]
pub(crate) mod test_server;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::PackagerError;

use download::DownloadOptions;

/// A Node.js release for one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRuntime {
    pub version: String,
    pub arch: String,
    pub dist_url: String,
}

/// A runtime archive present in the cache.
#[derive(Debug, Clone)]
pub struct RuntimeArchive {
    pub path: PathBuf,
    pub sha256: String,
    /// Whether the hash was checked against the mirror's SHASUMS256.txt
    pub verified: bool,
}

impl NodeRuntime {
    pub fn from_config(config: &Config) -> Self {
        Self {
            version: config.node_version.clone(),
            arch: config.node_arch.clone(),
            dist_url: config.node_dist_url.clone(),
        }
    }

    /// Directory name inside the upstream tarball, e.g. `node-v20.18.0-linux-x64`.
    pub fn dist_name(&self) -> String {
        format!("node-v{}-linux-{}", self.version, self.arch)
    }

    pub fn archive_name(&self) -> String {
        format!("{}.tar.gz", self.dist_name())
    }

    pub fn url(&self) -> String {
        format!("{}/v{}/{}", self.dist_url, self.version, self.archive_name())
    }

    pub fn shasums_url(&self) -> String {
        format!("{}/v{}/SHASUMS256.txt", self.dist_url, self.version)
    }

    pub fn cached_archive(&self, cache_dir: &Path) -> PathBuf {
        cache_dir.join(self.archive_name())
    }

    /// Cached copy of SHASUMS256.txt for this version.
    pub fn cached_shasums(&self, cache_dir: &Path) -> PathBuf {
        cache_dir.join(format!("SHASUMS256-v{}.txt", self.version))
    }

    /// Make sure the runtime archive is in the cache and verified.
    pub fn ensure(&self, cache_dir: &Path) -> Result<RuntimeArchive> {
        let archive = self.cached_archive(cache_dir);

        if archive.is_file() {
            println!("  [SKIP] {} already cached", self.archive_name());
        } else {
            println!("  Downloading {}", self.url());
            let options = DownloadOptions::default();
            download::block_on(download::http(&self.url(), &archive, &options))?.map_err(|e| {
                PackagerError::Download {
                    url: self.url(),
                    reason: format!("{:#}", e),
                }
            })?;
        }

        match self.expected_sha256(cache_dir) {
            Some(expected) => match checksum::verify_sha256(&archive, &expected) {
                Ok(sha256) => {
                    println!("  [OK] SHA-256 verified");
                    Ok(RuntimeArchive {
                        path: archive,
                        sha256,
                        verified: true,
                    })
                }
                Err(e) => {
                    let _ = fs::remove_file(&archive);
                    Err(e)
                }
            },
            None => {
                warn!(
                    "No checksum available for {}; continuing unverified",
                    self.archive_name()
                );
                Ok(RuntimeArchive {
                    sha256: checksum::sha256_file(&archive)?,
                    path: archive,
                    verified: false,
                })
            }
        }
    }

    /// Expected hash from the cached or freshly fetched SHASUMS256.txt.
    ///
    /// A cached copy without an entry for this archive is refetched, and a
    /// fetched body is only cached when it has the entry.
    fn expected_sha256(&self, cache_dir: &Path) -> Option<String> {
        let shasums_path = self.cached_shasums(cache_dir);
        let archive_name = self.archive_name();

        if let Ok(cached) = fs::read_to_string(&shasums_path) {
            match checksum::find_expected(&cached, &archive_name) {
                Some(expected) => return Some(expected),
                None => debug!(
                    "{} has no entry for {}, refetching",
                    shasums_path.display(),
                    archive_name
                ),
            }
        }

        let fetched = download::block_on(download::fetch_text(
            &self.shasums_url(),
            &DownloadOptions::metadata(),
        ));
        let text = match fetched {
            Ok(Ok(text)) => text,
            Ok(Err(e)) | Err(e) => {
                warn!("Could not fetch {}: {:#}", self.shasums_url(), e);
                return None;
            }
        };

        let Some(expected) = checksum::find_expected(&text, &archive_name) else {
            warn!("{} has no entry for {}", self.shasums_url(), archive_name);
            return None;
        };
        if let Err(e) = fs::write(&shasums_path, &text) {
            debug!("Not caching {}: {}", shasums_path.display(), e);
        }
        Some(expected)
    }

    /// Extract the cached archive into `dest` (e.g. `<staging>/nodejs`).
    pub fn extract(&self, archive: &RuntimeArchive, dest: &Path) -> Result<()> {
        let count = extract::extract_stripped(&archive.path, dest)?;
        debug!(entries = count, dest = %dest.display(), "Extracted Node.js runtime");

        let node = dest.join("bin/node");
        if !node.is_file() {
            bail!(
                "{} does not contain bin/node (is it a Node.js Linux build?)",
                archive.path.display()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::{Digest, Sha256};
    use tempfile::TempDir;

    use crate::runtime::test_server::{Reply, TestServer};

    fn runtime() -> NodeRuntime {
        NodeRuntime {
            version: "20.18.0".to_string(),
            arch: "x64".to_string(),
            dist_url: "https://nodejs.org/dist".to_string(),
        }
    }

    #[test]
    fn test_names_and_urls() {
        let node = runtime();
        assert_eq!(node.dist_name(), "node-v20.18.0-linux-x64");
        assert_eq!(node.archive_name(), "node-v20.18.0-linux-x64.tar.gz");
        assert_eq!(
            node.url(),
            "https://nodejs.org/dist/v20.18.0/node-v20.18.0-linux-x64.tar.gz"
        );
        assert_eq!(
            node.shasums_url(),
            "https://nodejs.org/dist/v20.18.0/SHASUMS256.txt"
        );
        assert_eq!(
            node.cached_shasums(Path::new("/cache")),
            PathBuf::from("/cache/SHASUMS256-v20.18.0.txt")
        );
    }

    #[test]
    fn test_ensure_bad_checksum_removes_archive() {
        let temp = TempDir::new().unwrap();
        let node = runtime();
        let archive = node.cached_archive(temp.path());
        fs::write(&archive, b"tampered").unwrap();
        fs::write(
            node.cached_shasums(temp.path()),
            format!("{}  {}\n", "0".repeat(64), node.archive_name()),
        )
        .unwrap();

        let err = node.ensure(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Checksum mismatch"));
        assert!(!archive.exists());
    }

    #[test]
    fn test_ensure_download_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        // Unsupported scheme fails immediately without retries.
        let node = NodeRuntime {
            dist_url: "notaurl://".to_string(),
            ..runtime()
        };
        let err = node.ensure(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to download Node.js runtime"));
    }

    const TARBALL_PATH: &str = "/v20.18.0/node-v20.18.0-linux-x64.tar.gz";
    const SHASUMS_PATH: &str = "/v20.18.0/SHASUMS256.txt";

    fn served_runtime(server: &TestServer) -> NodeRuntime {
        NodeRuntime {
            dist_url: server.base().to_string(),
            ..runtime()
        }
    }

    fn shasums_for(body: &[u8]) -> String {
        format!(
            "{}  node-v20.18.0-darwin-arm64.tar.gz\n{:x}  node-v20.18.0-linux-x64.tar.gz\n",
            "a".repeat(64),
            Sha256::digest(body)
        )
    }

    #[test]
    fn test_ensure_downloads_and_verifies() {
        let body = b"node runtime tarball".to_vec();
        let server = TestServer::start(vec![
            (TARBALL_PATH, vec![Reply::Ok(body.clone())]),
            (SHASUMS_PATH, vec![Reply::Ok(shasums_for(&body).into_bytes())]),
        ]);
        let temp = TempDir::new().unwrap();
        let node = served_runtime(&server);

        let archive = node.ensure(temp.path()).unwrap();

        assert!(archive.verified);
        assert_eq!(archive.sha256, format!("{:x}", Sha256::digest(&body)));
        assert_eq!(fs::read(&archive.path).unwrap(), body);
        assert!(!temp.path().join("node-v20.18.0-linux-x64.tar.gz.part").exists());
        let cached = fs::read_to_string(node.cached_shasums(temp.path())).unwrap();
        assert!(cached.contains("node-v20.18.0-linux-x64.tar.gz"));

        // Second run is served entirely from the cache.
        let again = node.ensure(temp.path()).unwrap();
        assert!(again.verified);
        assert_eq!(server.hits(TARBALL_PATH), 1);
        assert_eq!(server.hits(SHASUMS_PATH), 1);
    }

    #[test]
    fn test_ensure_refetches_shasums_missing_entry() {
        let body = b"node runtime tarball".to_vec();
        let server = TestServer::start(vec![
            (TARBALL_PATH, vec![Reply::Ok(body.clone())]),
            (SHASUMS_PATH, vec![Reply::Ok(shasums_for(&body).into_bytes())]),
        ]);
        let temp = TempDir::new().unwrap();
        let node = served_runtime(&server);
        fs::write(
            node.cached_shasums(temp.path()),
            format!("{}  node-v20.18.0-win-x64.zip\n", "b".repeat(64)),
        )
        .unwrap();

        let archive = node.ensure(temp.path()).unwrap();

        assert!(archive.verified);
        assert_eq!(server.hits(SHASUMS_PATH), 1);
        let cached = fs::read_to_string(node.cached_shasums(temp.path())).unwrap();
        assert!(cached.contains("node-v20.18.0-linux-x64.tar.gz"));
    }

    #[test]
    fn test_ensure_does_not_cache_unusable_shasums() {
        let body = b"node runtime tarball".to_vec();
        let server = TestServer::start(vec![
            (TARBALL_PATH, vec![Reply::Ok(body.clone())]),
            (SHASUMS_PATH, vec![Reply::Ok(b"<html>captive portal</html>".to_vec())]),
        ]);
        let temp = TempDir::new().unwrap();
        let node = served_runtime(&server);

        let archive = node.ensure(temp.path()).unwrap();

        assert!(!archive.verified);
        assert_eq!(archive.sha256, format!("{:x}", Sha256::digest(&body)));
        assert!(!node.cached_shasums(temp.path()).exists());

        // The next run asks the mirror again.
        node.ensure(temp.path()).unwrap();
        assert_eq!(server.hits(SHASUMS_PATH), 2);
    }
}
