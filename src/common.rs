// Licensed under the Apache-2.0 license

//! Logging facade shared by the bridge components.
//!
//! Components that log take an `L: Logger` type parameter defaulting to
//! [`NoOpLogger`], so a build without a debug port pays nothing for the
//! log statements.

use core::fmt;

/// Severity of a log record.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }
}

/// Sink for diagnostic messages.
///
/// Logging must never affect command outcomes: implementations swallow their
/// own write errors.
pub trait Logger {
    fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>);

    fn error(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, args);
    }

    fn warn(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, args);
    }

    fn info(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, args);
    }

    fn debug(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, args);
    }

    fn trace(&mut self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Trace, args);
    }
}

/// Logger that discards everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn log(&mut self, _level: LogLevel, _args: fmt::Arguments<'_>) {}
}

/// Logger writing `[LEVEL] message` lines to an `embedded_io` port,
/// typically a secondary UART reserved for debugging.
pub struct IoLogger<W: embedded_io::Write> {
    writer: W,
    min_level: LogLevel,
}

impl<W: embedded_io::Write> IoLogger<W> {
    pub fn new(writer: W, min_level: LogLevel) -> Self {
        Self { writer, min_level }
    }

    /// Give the underlying port back.
    pub fn release(self) -> W {
        self.writer
    }
}

impl<W: embedded_io::Write> Logger for IoLogger<W> {
    fn log(&mut self, level: LogLevel, args: fmt::Arguments<'_>) {
        if level > self.min_level {
            return;
        }
        let _ = write!(self.writer, "[{}] {}\r\n", level.as_str(), args);
    }
}
