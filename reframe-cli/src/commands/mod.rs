//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command and
//! returns the process exit code on success.

use crate::cli::{Commands, ToolArgs};
use crate::error::CliResult;
use reframe_core::ToolPaths;

/// Module containing the implementation of the `convert` command.
pub mod convert;

/// Module containing the implementation of the `check` command.
pub mod check;

/// Module containing the implementation of the `info` command.
pub mod info;

/// Every file converted (or nothing needed doing).
pub const EXIT_SUCCESS: u8 = 0;
/// The run could not start or was aborted as a whole.
pub const EXIT_FATAL: u8 = 1;
/// The run finished but some files failed.
pub const EXIT_PARTIAL: u8 = 2;

/// Runs the selected subcommand.
pub fn dispatch(command: Commands) -> CliResult<u8> {
    match command {
        Commands::Convert(args) => convert::run_convert(args),
        Commands::Check(tools) => check::run_check(&tools),
        Commands::Info(args) => info::run_info(&args),
    }
}

impl ToolArgs {
    /// Explicit paths win; otherwise the sidecar binary or a PATH lookup.
    pub fn resolve(&self) -> ToolPaths {
        ToolPaths::resolve(self.ffmpeg.clone(), self.ffprobe.clone())
    }
}
