//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `build` - Package the project into an installer archive
//! - `clean` - Remove installer archives and cached runtimes
//! - `show` - Display configuration or an archive's contents
//! - `download` - Fetch the Node.js runtime into the cache
//! - `preflight` - Run preflight checks

pub mod build;
pub mod clean;
pub mod download;
mod preflight;
pub mod show;

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use download::cmd_download;
pub use preflight::cmd_preflight;
pub use show::cmd_show;
