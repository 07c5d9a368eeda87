//! Logging infrastructure for Aegis.
//!
//! Structured logging using the `tracing` ecosystem. The console keeps its own
//! log file so operators can audit which alerts were sent from which machine.
//!
//! ## Features
//!
//! - JSON lines format for machine parsing
//! - File output to `~/.aegis/logs/aegis.log` (rolled daily)
//! - Console output with configurable verbosity
//!
//! Alert bodies and phone numbers are never logged. Log lengths, priorities,
//! target kinds and recipient counts instead.
//!
//! ## Example
//!
//! ```no_run
//! use aegis_core::logging;
//!
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::info!("aegis started");
//! tracing::debug!(target_kind = "all", "composing alert");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{AegisError, Result};

/// Guard that must be held to ensure log flushing on shutdown.
///
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the Aegis logging system.
///
/// This sets up:
/// - File logging to `<log_dir>/aegis.log` (JSON lines format)
/// - Console logging to stderr (human-readable format)
///
/// # Arguments
///
/// * `log_dir` - Optional custom log directory. Defaults to `~/.aegis/logs/`
/// * `verbose` - If true, sets log level to DEBUG. Otherwise uses INFO.
///
/// `RUST_LOG` overrides the level selection when set.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| AegisError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "aegis.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aegis={default_level}")));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Get the Aegis home directory.
///
/// Returns `~/.aegis/`
pub fn aegis_home() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| AegisError::Internal {
        message: "could not determine home directory".into(),
    })?;

    Ok(home.join(".aegis"))
}

/// Get the default log directory path.
///
/// Returns `~/.aegis/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(aegis_home()?.join("logs"))
}

/// Get the default Aegis log file path.
///
/// Returns `~/.aegis/logs/aegis.log`
pub fn default_log_file() -> Result<PathBuf> {
    Ok(default_log_dir()?.join("aegis.log"))
}

/// Log an alert lifecycle event under the `aegis::alert` target.
///
/// # Example
///
/// ```ignore
/// log_alert_event!("submitted", priority = "emergency", target_kind = "all");
/// log_alert_event!("delivered", recipients = 842);
/// ```
#[macro_export]
macro_rules! log_alert_event {
    ($event:expr) => {
        tracing::info!(
            target: "aegis::alert",
            event = $event,
            "alert event"
        )
    };
    ($event:expr, $($field:tt)*) => {
        tracing::info!(
            target: "aegis::alert",
            event = $event,
            $($field)*,
            "alert event"
        )
    };
}
