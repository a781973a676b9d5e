//! Logging initialization using the `tracing` crate.
//!
//! Two sinks are installed: a compact stderr layer for development, and a
//! plain-text layer appending to `<root>/log/desktop.log` so packaged builds
//! (which have no console on Windows) still leave a trail.
//!
//! Filtering follows `RUST_LOG`; the default is `info` for the shell and the
//! backend output target, `warn` for everything else.

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{BACKEND_LOG_TARGET, DESKTOP_LOG_FILE, LOG_DIR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DesktopLogCategory {
    Runtime,
    Startup,
    Shutdown,
    Shortcut,
}

impl DesktopLogCategory {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Runtime => "runtime",
            Self::Startup => "startup",
            Self::Shutdown => "shutdown",
            Self::Shortcut => "shortcut",
        }
    }
}

pub(crate) fn resolve_desktop_log_path(root_dir: &Path, file_name: &str) -> PathBuf {
    root_dir.join(LOG_DIR).join(file_name)
}

fn default_filter() -> EnvFilter {
    let level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };
    EnvFilter::new(format!(
        "warn,{}={level},{BACKEND_LOG_TARGET}=info",
        env!("CARGO_CRATE_NAME")
    ))
}

/// Installs the global subscriber. Call once, before anything logs.
///
/// A log file that cannot be opened is reported on stderr and skipped; the
/// shell keeps running with console logging only.
pub(crate) fn init(root_dir: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    let console = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    let log_path = resolve_desktop_log_path(root_dir, DESKTOP_LOG_FILE);
    let file_layer = match open_log_file(&log_path) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        ),
        Err(error) => {
            eprintln!("desktop log disabled: {error}");
            None
        }
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        return;
    }

    tracing::info!(path = %log_path.display(), "desktop log initialized");
}

fn open_log_file(log_path: &Path) -> Result<fs::File, String> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "failed to create log directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|error| format!("failed to open log file {}: {}", log_path.display(), error))
}

pub(crate) fn append_desktop_log_with_category(category: DesktopLogCategory, message: &str) {
    tracing::info!(category = category.as_str(), "{message}");
}

pub(crate) fn append_desktop_log(message: &str) {
    append_desktop_log_with_category(DesktopLogCategory::Runtime, message);
}

pub(crate) fn append_startup_log(message: &str) {
    append_desktop_log_with_category(DesktopLogCategory::Startup, message);
}

pub(crate) fn append_shutdown_log(message: &str) {
    append_desktop_log_with_category(DesktopLogCategory::Shutdown, message);
}

pub(crate) fn append_shortcut_log(message: &str) {
    append_desktop_log_with_category(DesktopLogCategory::Shortcut, message);
}
