// reframe-cli/src/commands/check.rs
//
// The `check` command: report whether ffprobe and ffmpeg can be run.

use crate::cli::ToolArgs;
use crate::commands::EXIT_SUCCESS;
use crate::error::CliResult;
use crate::terminal;
use reframe_core::external::check_dependency;
use reframe_core::{CommandRunner, CoreError, SystemCommandRunner};

/// Checks both tools, printing a status line for each. Fails with the first
/// missing tool after both have been reported.
pub fn run_check(tools: &ToolArgs) -> CliResult<u8> {
    check_with(&SystemCommandRunner, tools)
}

fn check_with(runner: &dyn CommandRunner, tools: &ToolArgs) -> CliResult<u8> {
    let paths = tools.resolve();
    terminal::print_section("External tools");

    let mut first_error: Option<CoreError> = None;
    for (label, program) in [("ffprobe", &paths.ffprobe), ("ffmpeg", &paths.ffmpeg)] {
        match check_dependency(runner, program) {
            Ok(()) => terminal::print_status(label, &format!("ok ({})", program.display()), false),
            Err(e) => {
                terminal::print_status(label, &format!("unavailable ({})", program.display()), true);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            terminal::print_success("ffmpeg and ffprobe are ready");
            Ok(EXIT_SUCCESS)
        }
    }
}
