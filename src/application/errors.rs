//! Application layer errors

use std::path::PathBuf;
use thiserror::Error;

use crate::application::response::Outcome;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("Prefix error: {0}")]
    Prefix(#[from] PrefixError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Command execution errors
///
/// `Outcome` is the routine path: the dispatcher renders it and never treats it as a crash.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0}")]
    Outcome(Outcome),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl From<Outcome> for CommandError {
    fn from(outcome: Outcome) -> Self {
        CommandError::Outcome(outcome)
    }
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage task failed: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(e: rusqlite::Error) -> Self {
        StorageError::Database(e.to_string())
    }
}

/// Translation table errors, split into load failures and lookup failures
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("Translation file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Malformed translation file {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Failed to read translation file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Translations not loaded")]
    NotLoaded,

    #[error("Locale '{0}' not supported")]
    UnsupportedLocale(String),

    #[error("Key '{segment}' not found while resolving '{key}'")]
    MissingKey { key: String, segment: String },

    #[error("Key '{0}' does not point to a string value")]
    NotALeaf(String),
}

/// Prefix matcher errors
#[derive(Error, Debug)]
pub enum PrefixError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid prefix pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors raised by the settings-update path
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Locale '{0}' not supported")]
    UnsupportedLocale(String),

    #[error("Invalid time zone: {0}")]
    InvalidTimeZone(String),

    #[error("Prefix must not be empty")]
    EmptyPrefix,

    #[error("Prefix '{0}' is already registered")]
    DuplicatePrefix(String),

    #[error("Prefix '{0}' is not registered")]
    UnknownPrefix(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
