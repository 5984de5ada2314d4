// ============================================================================
// reframe-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for reframe-core
//
// This module defines the error types used throughout the library. Errors fall
// into two scopes:
//
// - Run-scoped: a required tool is missing, or nothing was found to process.
//   These are returned from the batch entry points before any job runs.
// - File-scoped: probing, filesystem or encode failures for one input. These
//   are recorded on the job and collected into the batch result; they never
//   abort the rest of a batch.
//
// Helper constructors at the bottom keep the command-related variants
// consistent across the prober and the executor.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the reframe-core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Required external tool not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, #[source] std::io::Error),

    #[error("Failed while waiting for {0}: {1}")]
    CommandWait(String, #[source] std::io::Error),

    #[error("{command} exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("{0} timed out after {1} seconds")]
    CommandTimeout(String, u64),

    #[error("{0} was cancelled")]
    Cancelled(String),

    #[error("No video stream found in {}", .0.display())]
    NoVideoStream(PathBuf),

    #[error("Invalid video information: {0}")]
    VideoInfoError(String),

    #[error("Failed to parse ffprobe output: {0}")]
    JsonParseError(String),

    #[error("No supported video files found")]
    NoFilesFound,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{0}")]
    OperationFailed(String),
}

impl CoreError {
    /// True for errors that stop a whole run before any job is attempted.
    #[must_use]
    pub fn is_run_scoped(&self) -> bool {
        matches!(
            self,
            CoreError::DependencyNotFound(_) | CoreError::NoFilesFound | CoreError::Config(_)
        )
    }
}

/// Result type for reframe-core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

/// Builds a `CommandStart` error, mapping a missing binary to `DependencyNotFound`.
pub fn command_start_error(command: impl Into<String>, err: std::io::Error) -> CoreError {
    let command = command.into();
    if err.kind() == std::io::ErrorKind::NotFound {
        CoreError::DependencyNotFound(command)
    } else {
        CoreError::CommandStart(command, err)
    }
}

pub fn command_wait_error(command: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(command.into(), err)
}

/// Builds a `CommandFailed` error from an exit description and captured stderr.
pub fn command_failed_error(
    command: impl Into<String>,
    status: impl std::fmt::Display,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        command: command.into(),
        status: status.to_string(),
        stderr: stderr.into(),
    }
}
