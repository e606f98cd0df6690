//! Console logging bootstrap.
//!
//! # Invariants
//! - The logger is installed at most once per process.
//! - Re-initialization with the same level is a no-op; a different level is rejected.
//! - Call sites emit metadata-only `key=value` events and never log user content.

use log::{info, Level};
use once_cell::sync::OnceCell;

static INSTALLED: OnceCell<Level> = OnceCell::new();

#[cfg(target_arch = "wasm32")]
fn install(level: Level) -> Result<(), String> {
    wasm_logger::init(wasm_logger::Config::new(level));
    Ok(())
}

// Native builds only run tests and tools; they log to stderr.
#[cfg(not(target_arch = "wasm32"))]
fn install(level: Level) -> Result<(), String> {
    struct StderrLogger;

    impl log::Log for StderrLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                eprintln!("{} [{}] {}", record.level(), record.target(), record.args());
            }
        }

        fn flush(&self) {}
    }

    static STDERR: StderrLogger = StderrLogger;
    log::set_logger(&STDERR).map_err(|err| format!("failed to install logger: {err}"))?;
    log::set_max_level(level.to_level_filter());
    Ok(())
}

pub(crate) fn normalize_level(level: &str) -> Result<Level, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(Level::Trace),
        "debug" => Ok(Level::Debug),
        "info" => Ok(Level::Info),
        "warn" => Ok(Level::Warn),
        "error" => Ok(Level::Error),
        other => Err(format!("unsupported log level `{other}`")),
    }
}

/// Installs the console logger (`wasm-logger` in the browser).
///
/// # Errors
/// - Returns an error when `level` is unsupported.
/// - Returns an error when logging was already initialized with another level,
///   or another logger owns the `log` facade.
pub fn init_logging(level: &str) -> Result<(), String> {
    let level = normalize_level(level)?;

    if let Some(installed) = INSTALLED.get() {
        if *installed == level {
            return Ok(());
        }
        return Err(format!(
            "logging already initialized with level `{installed}`; refusing to switch to `{level}`"
        ));
    }
    install(level)?;
    let _ = INSTALLED.set(level);

    info!(
        "event=logging_init module=logging status=ok level={} version={}",
        level,
        env!("CARGO_PKG_VERSION")
    );
    Ok(())
}
