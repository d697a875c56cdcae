//! Error types for the bedug crate.

use thiserror::Error;

/// Errors produced by the engine, the store, and configuration loading.
#[derive(Debug, Error)]
pub enum Error {
    /// A schedule carried a time-of-day string the engine could not place on
    /// the current date. Surfaced to the caller, never defaulted.
    #[error("malformed schedule: {field} = '{value}' is not a valid HH:MM time for this date")]
    MalformedSchedule {
        /// Which schedule field failed to parse
        field: &'static str,
        /// The offending value, verbatim
        value: String,
    },

    /// Input rejected at the CRUD boundary (bad date format, zero duration,
    /// empty update, ...).
    #[error("invalid {field}: {message}")]
    Validation {
        /// Which input field was rejected
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// A schedule already exists for this date (dates are unique keys).
    #[error("schedule for {date} already exists")]
    DuplicateSchedule {
        /// The date that is already taken
        date: String,
    },

    /// Lookup by id found nothing.
    #[error("no {kind} with id {id}")]
    NotFound {
        /// Collection name ("loop video", "sunset video", "schedule")
        kind: &'static str,
        /// The id that was requested
        id: String,
    },

    /// Configuration file problem (unreadable, bad YAML, unknown timezone)
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
