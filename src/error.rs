//! Error conditions callers match on.
//!
//! Everything else flows through `anyhow` with context attached at the call
//! site; these variants exist for failures that need a stable message.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PackagerError {
    #[error("package.json not found in {}\nRun ccr-packager from the project root.", .0.display())]
    MissingManifest(PathBuf),

    #[error("Failed to download Node.js runtime from {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Checksum mismatch for {file}\n  Expected: {expected}\n  Actual:   {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid {field} '{value}': {reason}")]
    InvalidSetting {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}
