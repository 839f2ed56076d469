//! Log routing for the server binary.
//!
//! Compact lines go to stdout and a plain copy goes to `CRUXIFY_LOG_FILE`, or to
//! `logs/cruxify.log` when that variable is unset. `RUST_LOG` filters both (default `info`).
use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_FILE_VAR: &str = "CRUXIFY_LOG_FILE";
const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_LOG_FILE: &str = "cruxify.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. Call once, before anything logs.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = file_writer().map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .init();
}

/// File logging is best effort; failures are reported on stderr and the server keeps going.
fn file_writer() -> Option<NonBlocking> {
    match open_appender(std::env::var(LOG_FILE_VAR).ok()) {
        Ok((writer, guard)) => {
            let _ = LOG_GUARD.set(guard);
            Some(writer)
        }
        Err(reason) => {
            eprintln!("File logging disabled, {reason}");
            None
        }
    }
}

fn open_appender(path: Option<String>) -> Result<(NonBlocking, WorkerGuard), String> {
    match path {
        Some(path) => std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map(tracing_appender::non_blocking)
            .map_err(|err| format!("cannot open {path}: {err}")),
        None => std::fs::create_dir_all(DEFAULT_LOG_DIR)
            .map(|()| {
                let dir = Path::new(DEFAULT_LOG_DIR);
                tracing_appender::non_blocking(tracing_appender::rolling::never(
                    dir,
                    DEFAULT_LOG_FILE,
                ))
            })
            .map_err(|err| format!("cannot create {DEFAULT_LOG_DIR}/: {err}")),
    }
}
