//! Logging system configuration and initialization
//!
//! Sets up a `tracing` registry with:
//! - Configuration based level control (`RUST_LOG` still wins when set)
//! - Console output and optional daily-rotated file output
//! - Optional structured JSON formatting
//!
//! Dependency noise (SQL statements, HTTP internals, HTML tokenizer) is
//! suppressed unless the configured level is `trace`.

#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub use crate::infrastructure::config::LoggingConfig;

const LOG_FILE_PREFIX: &str = "media-scraper.log";

/// Directives applied below `trace` to keep dependency chatter out of the logs
const QUIET_DIRECTIVES: &[&str] = &[
    "sqlx::query=warn",
    "sqlx=warn",
    "reqwest=info",
    "hyper=warn",
    "hyper_util=warn",
    "h2=warn",
    "html5ever=warn",
    "selectors=warn",
];

// Keeps the non-blocking file writer alive for the life of the process
static LOG_GUARDS: Lazy<Mutex<Vec<WorkerGuard>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Get the log directory relative to the executable location
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Build the level filter for `config`, honoring `RUST_LOG` when present.
pub fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(&config.level);
        if !config.level.to_lowercase().contains("trace") {
            for directive in QUIET_DIRECTIVES {
                if let Ok(directive) = directive.parse() {
                    filter = filter.add_directive(directive);
                }
            }
        }
        filter
    })
}

/// Initialize logging with custom configuration.
///
/// Only the first successful call installs a subscriber; later calls (for
/// example from several tests in one process) return `Ok(())`.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    if !config.console_output && !config.file_output {
        return Err(anyhow!("No logging output configured"));
    }

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let mut log_dir = None;
    if config.file_output {
        let dir = config.log_dir.clone().unwrap_or_else(get_log_directory);
        std::fs::create_dir_all(&dir)
            .map_err(|e| anyhow!("Failed to create log directory {:?}: {}", dir, e))?;

        let (file_writer, guard) = non_blocking(rolling::daily(&dir, LOG_FILE_PREFIX));
        if let Ok(mut guards) = LOG_GUARDS.lock() {
            guards.push(guard);
        }

        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .with_target(true);
        if config.json_format {
            layers.push(file_layer.json().with_thread_ids(true).boxed());
        } else {
            layers.push(file_layer.boxed());
        }
        log_dir = Some(dir);
    }

    if config.console_output {
        let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
        if config.json_format {
            layers.push(console_layer.json().boxed());
        } else {
            layers.push(console_layer.boxed());
        }
    }

    let installed = tracing_subscriber::registry()
        .with(layers)
        .with(build_env_filter(config))
        .try_init()
        .is_ok();

    if installed {
        info!("Logging system initialized");
        info!("Log level: {}", config.level);
        info!("JSON format: {}", config.json_format);
        if let Some(dir) = log_dir {
            info!("Log directory: {:?}", dir);
        }
    }

    Ok(())
}

/// Log system information for diagnostics
pub fn log_system_info() {
    info!("=== Media Scraper System Information ===");
    info!("Application version: {}", env!("CARGO_PKG_VERSION"));
    info!("Operating system: {}", std::env::consts::OS);
    info!("Architecture: {}", std::env::consts::ARCH);
    info!("Available parallelism: {:?}", std::thread::available_parallelism().ok());
}
