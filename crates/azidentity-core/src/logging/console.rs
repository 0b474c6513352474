//! Console logger implementation

use super::traits::{Logger, LogLevel};

/// A logger that writes to stderr
///
/// stdout belongs to the host protocol, so every level goes to stderr.
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
    min_level: LogLevel,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a console logger with the default prefix and level
    pub fn new() -> Self {
        Self {
            prefix: "[azidentity]".to_string(),
            min_level: LogLevel::default(),
        }
    }

    /// Create a console logger with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Self::new()
        }
    }

    /// Set the minimum level that gets written
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    fn write(&self, level: LogLevel, message: &str) {
        if level < self.min_level {
            return;
        }
        eprintln!("{} {}: {}", self.prefix, level, message);
    }
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        self.write(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.write(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.write(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.write(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_logger_creation() {
        let logger = ConsoleLogger::new();
        assert_eq!(logger.prefix, "[azidentity]");
        assert_eq!(logger.min_level(), LogLevel::Warn);

        let custom = ConsoleLogger::with_prefix("[host]").with_min_level(LogLevel::Debug);
        assert_eq!(custom.prefix, "[host]");
        assert_eq!(custom.min_level(), LogLevel::Debug);
    }

    #[test]
    fn test_console_logger_logs() {
        let logger = ConsoleLogger::new().with_min_level(LogLevel::Trace);
        logger.debug("debug message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");
    }
}
