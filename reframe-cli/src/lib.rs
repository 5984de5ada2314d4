// reframe-cli/src/lib.rs
//
// Library portion of the reframe CLI: argument definitions, command logic,
// logging setup and terminal output.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod terminal;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, ConvertArgs, InfoArgs, ToolArgs};
pub use commands::{EXIT_FATAL, EXIT_PARTIAL, EXIT_SUCCESS, dispatch};
pub use error::{CliErrorContext, CliResult};
