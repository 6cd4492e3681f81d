//! ccr-packager library exports.
//!
//! The binary in `main.rs` is a thin clap layer over these modules; they are
//! public so integration tests can drive the pipeline directly.

pub mod archive;
pub mod build_app;
pub mod bundle;
pub mod clean;
pub mod commands;
pub mod common;
pub mod config;
pub mod error;
pub mod generate;
pub mod logging;
pub mod os_release;
pub mod preflight;
pub mod process;
pub mod project;
pub mod runtime;
pub mod stage;
pub mod timing;

pub use error::PackagerError;
