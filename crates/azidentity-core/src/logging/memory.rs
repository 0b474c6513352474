//! In-memory logger that records every message

use parking_lot::Mutex;

use super::traits::{Logger, LogLevel};

/// A single captured log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub message: String,
}

/// Logger that keeps records in memory
///
/// Useful in tests that assert a fallback was reported rather than silently taken.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records captured so far
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Messages captured at the given level
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.level == level)
            .map(|r| r.message.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.records.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}

impl Logger for MemoryLogger {
    fn debug(&self, message: &str) {
        self.push(LogLevel::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(LogLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_logger_captures_by_level() {
        let logger = MemoryLogger::new();
        logger.debug("one");
        logger.warn("two");
        logger.warn("three");

        assert_eq!(logger.records().len(), 3);
        assert_eq!(logger.messages(LogLevel::Warn), vec!["two", "three"]);

        logger.clear();
        assert!(logger.records().is_empty());
    }
}
