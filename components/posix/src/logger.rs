//! `log` backend for targets without a host logger
//!
//! Formats each record as `[LEVEL target] message` and hands the line to
//! a sink, normally a raw write to descriptor 2.

use alloc::format;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Receives one formatted log line
pub type LogSink = fn(&[u8]);

/// Logger that forwards records to a kernel write
pub struct KernelLogger {
    level: LevelFilter,
    sink: LogSink,
}

impl KernelLogger {
    pub const fn new(level: LevelFilter, sink: LogSink) -> Self {
        Self { level, sink }
    }

    /// Register as the global logger
    pub fn install(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.level);
        Ok(())
    }
}

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{} {}] {}\n", record.level(), record.target(), record.args());
        (self.sink)(line.as_bytes());
    }

    fn flush(&self) {}
}
