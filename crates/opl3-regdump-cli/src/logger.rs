//! Minimal stderr backend for the `log` facade.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;
static INSTALLED: AtomicBool = AtomicBool::new(false);

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Install the logger; later calls only change the level.
///
/// Fails without touching the level when another logger owns the facade.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    match log::set_logger(&LOGGER) {
        Ok(()) => INSTALLED.store(true, Ordering::Release),
        Err(err) if !INSTALLED.load(Ordering::Acquire) => return Err(err),
        Err(_) => {}
    }
    log::set_max_level(level);
    Ok(())
}
