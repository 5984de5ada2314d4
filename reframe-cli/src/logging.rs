// reframe-cli/src/logging.rs
//
// Logger setup for the CLI. The core library only uses the `log` macros; this
// module installs a fern dispatch with a console chain and an optional file
// chain.
//
// Console level: --verbose gives Debug, otherwise RUST_LOG when it parses as
// a level, otherwise Info. The log file, when requested, always records Debug
// with ANSI escapes removed.

use crate::error::{CliErrorContext, CliResult};
use crate::terminal;
use console::style;
use log::{Level, LevelFilter, Record};
use std::path::{Path, PathBuf};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// Used to build unique log file names, e.g. `reframe_run_20240601_123045.log`.
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Picks the console level from the flag and the RUST_LOG value.
pub fn console_level(verbose: bool, rust_log: Option<&str>) -> LevelFilter {
    if verbose {
        return LevelFilter::Debug;
    }
    rust_log
        .and_then(|value| value.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Path of the run log inside `log_dir`.
pub fn log_file_path(log_dir: &Path) -> PathBuf {
    log_dir.join(format!("reframe_run_{}.log", get_timestamp()))
}

/// Console rendering of one record. Lines from this crate are UI and print
/// as-is; library warnings and errors get a level prefix.
fn console_line(record: &Record<'_>) -> String {
    let ui = record.target().starts_with(env!("CARGO_CRATE_NAME"));
    match record.level() {
        Level::Error if !ui => format!("{} {}", style("error:").red().bold().for_stderr(), record.args()),
        Level::Warn if !ui => format!("{} {}", style("warning:").yellow().for_stderr(), record.args()),
        Level::Debug | Level::Trace if !ui => {
            format!("{}", style(format!("[{}] {}", record.target(), record.args())).dim().for_stderr())
        }
        _ => record.args().to_string(),
    }
}

/// Installs the global logger. Returns the log file path when one was opened.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    if std::env::var_os("NO_COLOR").is_some() {
        console::set_colors_enabled_stderr(false);
    }

    let rust_log = std::env::var("RUST_LOG").ok();
    let console_level = console_level(verbose, rust_log.as_deref());

    let console = fern::Dispatch::new()
        .level(console_level)
        .chain(fern::Output::call(|record| {
            let line = console_line(record);
            terminal::suspend_progress(|| eprintln!("{line}"));
        }));

    let mut root = fern::Dispatch::new().chain(console);
    let mut max_level = console_level;

    let log_path = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .cli_with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let path = log_file_path(dir);
            let file = fern::log_file(&path)
                .cli_with_context(|| format!("Failed to open log file {}", path.display()))?;
            let file_chain = fern::Dispatch::new()
                .level(LevelFilter::Debug)
                .format(|out, message, record| {
                    let plain = strip_ansi_escapes::strip_str(message.to_string());
                    out.finish(format_args!(
                        "{} [{:<5}] [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        plain
                    ))
                })
                .chain(file);
            root = root.chain(file_chain);
            max_level = max_level.max(LevelFilter::Debug);
            Some(path)
        }
        None => None,
    };

    root.level(max_level)
        .apply()
        .cli_context("Failed to initialize logging")?;

    if let Some(path) = &log_path {
        log::debug!("Logging to {}", path.display());
    }
    Ok(log_path)
}
