//! Shared utilities across ccr-packager modules.

pub mod files;

pub use files::{copy_dir_recursive, dir_size, prepare_work_dir, write_file_mode, write_file_with_dirs};
