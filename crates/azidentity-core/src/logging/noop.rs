//! Silent logger

use super::traits::Logger;

/// Discards every message
///
/// For embedders that have no stderr to write to, and for tests that do not assert on logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::parse_timeout;
    use std::time::Duration;

    #[test]
    fn test_usable_where_warnings_are_raised() {
        assert_eq!(parse_timeout(Some("-1s"), &NoOpLogger::new()), Duration::from_secs(30));
    }
}
