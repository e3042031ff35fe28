/*!
 * Error types for the subtiming application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when loading or persisting settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Error reading the settings file
    #[error("Failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing the settings file
    #[error("Failed to parse settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Error writing the settings file
    #[error("Failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A key that the timing group does not know about
    #[error("Unknown setting: {group}/{key}")]
    UnknownKey { group: String, key: String },

    /// A value that cannot be converted to the key's type
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Timestamp not in HH:MM:SS,mmm form
    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    /// No entries could be recovered from the input
    #[error("No valid subtitle entries were found in the SRT content")]
    NoEntries,
}
