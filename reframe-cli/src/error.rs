// reframe-cli/src/error.rs
//
// Error helpers for the CLI. Everything funnels into the core error type so
// main has one thing to report.

use reframe_core::{CoreError, CoreResult};
use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = CoreResult<T>;

/// Adds a human-readable prefix to errors, similar to anyhow's `context`,
/// producing a `CoreError::OperationFailed`.
pub trait CliErrorContext<T> {
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display;

    /// Lazy variant of [`cli_context`](Self::cli_context).
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn cli_context<C>(self, context: C) -> CliResult<T>
    where
        C: fmt::Display,
    {
        self.map_err(|e| CoreError::OperationFailed(format!("{context}: {e}")))
    }

    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| CoreError::OperationFailed(format!("{}: {}", f(), e)))
    }
}

/// A one-line hint printed under fatal errors, where one is useful.
pub fn suggestion_for(error: &CoreError) -> Option<&'static str> {
    match error {
        CoreError::DependencyNotFound(_) => {
            Some("Install ffmpeg or point --ffmpeg/--ffprobe (REFRAME_FFMPEG/REFRAME_FFPROBE) at it")
        }
        CoreError::NoFilesFound => Some("Pass video files or directories, or add --recursive"),
        CoreError::PathError(_) => Some("Check that every input path exists"),
        CoreError::Config(_) => Some("Run `reframe convert --help` for valid values"),
        _ => None,
    }
}
