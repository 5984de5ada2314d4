// reframe-cli/src/main.rs
//
// Entry point for the `reframe` binary: parse arguments, set up logging,
// run the chosen command and turn the outcome into an exit code.
//
// Exit codes: 0 when every file converted, 1 when the run could not proceed
// (bad arguments, missing tools, no inputs), 2 when some files failed.

use clap::Parser;
use reframe_cli::error::suggestion_for;
use reframe_cli::{Cli, EXIT_FATAL, dispatch, logging, terminal};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose, cli.log_dir.as_deref()) {
        eprintln!("Error: {e}");
        return ExitCode::from(EXIT_FATAL);
    }

    match dispatch(cli.command) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            terminal::clear_progress_bar();
            terminal::print_error("Error", &e.to_string(), suggestion_for(&e));
            ExitCode::from(EXIT_FATAL)
        }
    }
}
