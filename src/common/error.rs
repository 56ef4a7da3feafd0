//! Error types for the test harness
//!
//! Every stage of the pipeline returns this error type unchanged, so the
//! outer boundary only has to print it and pick an exit code.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the test harness
#[derive(Error, Debug)]
pub enum Error {
    // === Profile Errors ===
    #[error("Unknown profile '{name}'. Known profiles: {known}")]
    UnknownProfile { name: String, known: String },

    #[error("Invalid profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    // === Selection Errors ===
    #[error("Failed to resolve pattern '{pattern}': {reason}")]
    PatternResolution { pattern: String, reason: String },

    // === Host Errors ===
    #[error("Failed to launch test host: {0}")]
    Launch(String),

    // === Test Outcome ===
    #[error("{count} test{} failed.", plural(.count))]
    TestsFailed { count: usize },

    #[error("Test runner error: {0}")]
    Runner(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

fn plural(count: &usize) -> &'static str {
    if *count == 1 {
        ""
    } else {
        "s"
    }
}

impl Error {
    /// Create an unknown profile error listing the names that do exist
    pub fn unknown_profile<S: AsRef<str>>(name: &str, known: &[S]) -> Self {
        Self::UnknownProfile {
            name: name.to_string(),
            known: known.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", "),
        }
    }

    /// Create a pattern resolution error
    pub fn pattern_resolution(pattern: impl Into<String>, reason: impl ToString) -> Self {
        Self::PatternResolution {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid profile error
    pub fn invalid_profile(name: &str, reason: &str) -> Self {
        Self::InvalidProfile {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Serializable error carried in the entry report from the host process
///
/// Tagged by a stable `code` so the outer process can rebuild the same
/// error kind the entry point failed with.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportedError {
    UnknownProfile { name: String, known: String },
    InvalidProfile { name: String, reason: String },
    PatternResolution { pattern: String, reason: String },
    LaunchFailed { message: String },
    RunnerFailed { message: String },
    Config { message: String },
    InternalError { message: String },
}

impl From<&Error> for ReportedError {
    fn from(e: &Error) -> Self {
        match e {
            Error::UnknownProfile { name, known } => Self::UnknownProfile {
                name: name.clone(),
                known: known.clone(),
            },
            Error::InvalidProfile { name, reason } => Self::InvalidProfile {
                name: name.clone(),
                reason: reason.clone(),
            },
            Error::PatternResolution { pattern, reason } => Self::PatternResolution {
                pattern: pattern.clone(),
                reason: reason.clone(),
            },
            Error::Launch(message) => Self::LaunchFailed {
                message: message.clone(),
            },
            Error::Runner(message) => Self::RunnerFailed {
                message: message.clone(),
            },
            Error::Config(message) => Self::Config {
                message: message.clone(),
            },
            Error::ConfigParse(_) => Self::Config {
                message: e.to_string(),
            },
            _ => Self::InternalError {
                message: e.to_string(),
            },
        }
    }
}

impl From<ReportedError> for Error {
    fn from(e: ReportedError) -> Self {
        match e {
            ReportedError::UnknownProfile { name, known } => Error::UnknownProfile { name, known },
            ReportedError::InvalidProfile { name, reason } => Error::InvalidProfile { name, reason },
            ReportedError::PatternResolution { pattern, reason } => {
                Error::PatternResolution { pattern, reason }
            }
            ReportedError::LaunchFailed { message } => Error::Launch(message),
            ReportedError::RunnerFailed { message } => Error::Runner(message),
            ReportedError::Config { message } => Error::Config(message),
            ReportedError::InternalError { message } => Error::Internal(message),
        }
    }
}
