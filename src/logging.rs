//! Diagnostic logging setup.
//!
//! Progress output goes to stdout via `println!`; `tracing` events go to
//! stderr so they never mix with it.

use std::env;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable selecting the packager's own log level.
pub const LOG_LEVEL_ENV: &str = "PACKAGER_LOG";

/// Install the global subscriber. Later calls are no-ops.
///
/// `RUST_LOG` wins when set. Otherwise `--verbose`/`--quiet`, then
/// `PACKAGER_LOG`, then `info`.
pub fn init(verbose: bool, quiet: bool) {
    INIT.call_once(|| {
        let level = resolve_level(verbose, quiet, env::var(LOG_LEVEL_ENV).ok().as_deref());

        let mut filter = EnvFilter::from_default_env();
        if env::var("RUST_LOG").is_err() {
            let directives = [
                format!("ccr_packager={}", level),
                "h2=warn".to_string(),
                "hyper=warn".to_string(),
                "reqwest=warn".to_string(),
            ];
            for directive in directives {
                if let Ok(directive) = directive.parse::<Directive>() {
                    filter = filter.add_directive(directive);
                }
            }
        }

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    });
}

fn resolve_level(verbose: bool, quiet: bool, env_level: Option<&str>) -> Level {
    if verbose {
        Level::DEBUG
    } else if quiet {
        Level::ERROR
    } else {
        env_level.map(parse_level).unwrap_or(Level::INFO)
    }
}

fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid {} '{}', defaulting to info. Valid levels: trace, debug, info, warn, error",
                LOG_LEVEL_ENV, level_str
            );
            Level::INFO
        }
    }
}
