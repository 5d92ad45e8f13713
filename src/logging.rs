//! Tracing setup for the server and the CLI.
//!
//! The server logs compact lines to stdout and mirrors them, without ANSI colors, into a log
//! file written on a background thread. The CLI logs to stderr only.
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable overriding the server log file location.
const LOG_FILE_ENV: &str = "DOCQUIZ_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "logs/docquiz.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the server subscriber.
///
/// `RUST_LOG` drives filtering and defaults to `info`. When the log file cannot be opened the
/// server keeps running with stdout logging only.
pub fn init_tracing() {
    let file_layer = file_writer(&log_file_path(std::env::var(LOG_FILE_ENV).ok())).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter_or("info"))
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();
}

/// Install the CLI subscriber: stderr only, so stdout carries nothing but the JSON result.
pub fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(filter_or("warn"))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn log_file_path(configured: Option<String>) -> PathBuf {
    configured
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from)
}

fn file_writer(path: &Path) -> Option<NonBlocking> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name()?.to_string_lossy().into_owned();

    if let Err(error) = std::fs::create_dir_all(directory) {
        eprintln!("docquiz: cannot create log directory {}: {error}", directory.display());
        return None;
    }

    let appender = match RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)
    {
        Ok(appender) => appender,
        Err(error) => {
            eprintln!("docquiz: cannot open log file {}: {error}", path.display());
            return None;
        }
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    Some(writer)
}
