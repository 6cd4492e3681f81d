//! ccr-packager - builds a self-contained Ubuntu installer for a Node.js CLI.
//!
//! Produces `<service>-installer-linux-<arch>[-ubuntu<ver>].tar.gz` holding:
//! - a bundled Node.js runtime (`nodejs/`)
//! - the built application (`app/`)
//! - a launcher, install.sh, uninstall.sh and a systemd unit

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use ccr_packager::commands;
use ccr_packager::config::Config;
use ccr_packager::logging;

#[derive(Parser)]
#[command(name = "ccr-packager", version)]
#[command(about = "Package a Node.js CLI with its runtime into an Ubuntu installer")]
#[command(
    after_help = "QUICK START:\n  ccr-packager preflight  Check the project and host\n  ccr-packager            Build the installer archive\n  ccr-packager show bundle <tarball>  Inspect the result\n  ccr-packager clean      Remove installer outputs"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project directory containing package.json
    #[arg(long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Where archives are written (default: the project directory)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Show debug diagnostics
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the installer archive (default)
    Build {
        /// Node.js version to bundle (overrides NODE_VERSION)
        #[arg(long)]
        node_version: Option<String>,

        /// Don't run `npm install` / `npm run build`
        #[arg(long)]
        skip_build: bool,

        /// Keep the staging directory next to the archive
        #[arg(long)]
        keep_staging: bool,
    },

    /// Download and verify the Node.js runtime into the cache
    Download {
        /// Node.js version to fetch (overrides NODE_VERSION)
        #[arg(long)]
        node_version: Option<String>,
    },

    /// Run preflight checks (project, host tools, environment)
    Preflight {
        /// Fail if any checks fail (exit code 1)
        #[arg(long)]
        strict: bool,
    },

    /// Show information
    Show {
        #[command(subcommand)]
        what: ShowTarget,
    },

    /// Clean installer outputs (default: preserves downloads)
    Clean {
        #[command(subcommand)]
        what: Option<CleanTarget>,
    },
}

#[derive(Subcommand)]
enum ShowTarget {
    /// Show current configuration
    Config,
    /// Show an installer archive's metadata and layout
    Bundle {
        /// Path to the .tar.gz
        tarball: PathBuf,
    },
}

#[derive(Subcommand)]
enum CleanTarget {
    /// Clean cached Node.js runtimes
    Downloads,
    /// Clean everything (outputs + downloads)
    All,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet);

    let project_dir = absolute(&cli.project_dir);
    let output_dir = cli
        .output_dir
        .as_deref()
        .map(absolute)
        .unwrap_or_else(|| project_dir.clone());
    let config = Config::load(&project_dir);

    match cli.command {
        None => {
            let options = commands::build::BuildOptions {
                output_dir: Some(output_dir),
                ..Default::default()
            };
            commands::cmd_build(&project_dir, options, &config)?;
        }

        Some(Commands::Build {
            node_version,
            skip_build,
            keep_staging,
        }) => {
            let options = commands::build::BuildOptions {
                output_dir: Some(output_dir),
                node_version,
                skip_build,
                keep_staging,
            };
            commands::cmd_build(&project_dir, options, &config)?;
        }

        Some(Commands::Download { node_version }) => {
            let config = match node_version {
                Some(version) => config.with_node_version(&version),
                None => config,
            };
            commands::cmd_download(&config)?;
        }

        Some(Commands::Preflight { strict }) => {
            commands::cmd_preflight(&project_dir, &output_dir, &config, strict)?;
        }

        Some(Commands::Show { what }) => {
            let show_target = match what {
                ShowTarget::Config => commands::show::ShowTarget::Config,
                ShowTarget::Bundle { tarball } => commands::show::ShowTarget::Bundle(tarball),
            };
            commands::cmd_show(show_target, &config)?;
        }

        Some(Commands::Clean { what }) => {
            let clean_target = match what {
                None => commands::clean::CleanTarget::Outputs,
                Some(CleanTarget::Downloads) => commands::clean::CleanTarget::Downloads,
                Some(CleanTarget::All) => commands::clean::CleanTarget::All,
            };
            commands::cmd_clean(&output_dir, clean_target, &config)?;
        }
    }

    Ok(())
}

/// Canonical path when it exists, so `.` yields a real directory name.
fn absolute(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
