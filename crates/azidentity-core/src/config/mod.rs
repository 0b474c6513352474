//! Configuration

mod settings;

pub use settings::{Settings, SettingsError, SettingsResult, LOG_LEVEL_ENV};
