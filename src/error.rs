//! Error types for tk
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown task or report)
//! - 4: Operation failed (store I/O, lock contention, corrupt data)

use std::path::PathBuf;
use thiserror::Error;

use crate::codec::ParseError;

/// Exit codes for the tk CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for tk operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unrecognized date: '{0}'")]
    InvalidDate(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Unknown report: {0}")]
    UnknownReport(String),

    // Operation failures (exit code 4)
    #[error("Parse error in {} at line {line}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        source: ParseError,
    },

    #[error("Store is corrupt: {0}")]
    CorruptStore(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Lock acquisition failed: {}", .0.display())]
    LockFailed(PathBuf),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidConfig(_)
            | Error::InvalidArgument(_)
            | Error::InvalidDate(_)
            | Error::TaskNotFound(_)
            | Error::UnknownReport(_) => exit_codes::USER_ERROR,

            // Operation failures
            Error::Parse { .. }
            | Error::CorruptStore(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::LockFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }
}

/// Result type alias for tk operations
pub type Result<T> = std::result::Result<T, Error>;
