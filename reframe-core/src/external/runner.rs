// ============================================================================
// reframe-core/src/external/runner.rs
// ============================================================================
//
// PROCESS EXECUTION: The seam between the pipeline and external programs
//
// Every ffmpeg and ffprobe invocation goes through the `CommandRunner` trait so
// that probing, encoding and dependency checks can be exercised in tests with
// `MockCommandRunner` instead of real binaries.
//
// `SystemCommandRunner` spawns the program with piped output, drains stdout
// and stderr on scoped reader threads, and polls the child every 100 ms so a
// timeout or a cancel request can kill it. Stderr is split on both `\r` and
// `\n` because ffmpeg rewrites its progress line in place.

use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};

use std::collections::VecDeque;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is checked for exit, timeout and cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Stderr lines retained per invocation; older lines are discarded.
const STDERR_BUFFER_LINES: usize = 200;

// ============================================================================
// CANCELLATION
// ============================================================================

/// Shared flag that asks running and pending work to stop.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// RUNNER TYPES
// ============================================================================

/// Per-invocation controls.
#[derive(Default, Clone, Copy)]
pub struct RunOptions<'a> {
    /// Kill the process once it has run this long
    pub timeout: Option<Duration>,
    /// Kill the process as soon as this flag is raised
    pub cancel: Option<&'a CancelFlag>,
    /// Called for every stderr line as it arrives
    pub on_stderr_line: Option<&'a (dyn Fn(&str) + Sync)>,
}

impl<'a> RunOptions<'a> {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..Self::default()
        }
    }
}

/// What a finished process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    /// The most recent stderr lines, newline-joined
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Human-readable exit status for error messages.
    pub fn status_description(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {code}"),
            None => "termination by signal".to_string(),
        }
    }
}

/// Runs an external program to completion.
///
/// A non-zero exit is not an error at this level; callers inspect
/// [`CommandOutput::exit_code`]. Errors are reserved for launch failures,
/// wait failures, timeouts and cancellation.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &Path, args: &[String], options: &RunOptions<'_>) -> CoreResult<CommandOutput>;
}

/// Short name of a program for logs and error messages.
pub fn program_name(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

/// Renders a command line the way a shell user would type it.
pub fn format_command_line(program: &Path, args: &[String]) -> String {
    std::iter::once(program.display().to_string())
        .chain(args.iter().cloned())
        .map(|part| {
            if part.is_empty() || part.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
                format!("'{}'", part.replace('\'', r"'\''"))
            } else {
                part
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// SYSTEM RUNNER
// ============================================================================

/// Runs programs with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

enum Termination {
    Exited(Option<i32>),
    TimedOut(Duration),
    Cancelled,
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &Path, args: &[String], options: &RunOptions<'_>) -> CoreResult<CommandOutput> {
        let name = program_name(program);
        log::debug!("Running: {}", format_command_line(program, args));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| command_start_error(name.clone(), e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let on_line = options.on_stderr_line;
        let started = Instant::now();

        let (termination, stdout, stderr) = thread::scope(|scope| {
            let stdout_reader = scope.spawn(move || {
                let mut text = String::new();
                if let Some(mut pipe) = stdout {
                    let mut bytes = Vec::new();
                    if pipe.read_to_end(&mut bytes).is_ok() {
                        text = String::from_utf8_lossy(&bytes).into_owned();
                    }
                }
                text
            });
            let stderr_reader = scope.spawn(move || match stderr {
                Some(pipe) => read_stderr_lines(pipe, on_line),
                None => VecDeque::new(),
            });

            let termination = loop {
                match child.try_wait() {
                    // A terminal interrupt reaches the child too; report it as cancelled
                    Ok(Some(status)) if !status.success() && options.cancel.is_some_and(CancelFlag::is_cancelled) => {
                        break Ok(Termination::Cancelled);
                    }
                    Ok(Some(status)) => break Ok(Termination::Exited(status.code())),
                    Ok(None) => {}
                    Err(e) => {
                        let _ = child.kill();
                        let _ = child.wait();
                        break Err(command_wait_error(name.clone(), e));
                    }
                }

                if options.cancel.is_some_and(CancelFlag::is_cancelled) {
                    let _ = child.kill();
                    let _ = child.wait();
                    break Ok(Termination::Cancelled);
                }

                if let Some(limit) = options.timeout {
                    if started.elapsed() >= limit {
                        let _ = child.kill();
                        let _ = child.wait();
                        break Ok(Termination::TimedOut(limit));
                    }
                }

                thread::sleep(POLL_INTERVAL);
            };

            let stdout = stdout_reader.join().unwrap_or_default();
            let stderr = stderr_reader.join().unwrap_or_default();
            (termination, stdout, stderr)
        });

        match termination? {
            Termination::Exited(exit_code) => {
                log::debug!("{} finished in {:.1}s ({:?})", name, started.elapsed().as_secs_f64(), exit_code);
                Ok(CommandOutput {
                    exit_code,
                    stdout,
                    stderr: Vec::from(stderr).join("\n"),
                })
            }
            Termination::TimedOut(limit) => {
                log::warn!("{} killed after exceeding {}s", name, limit.as_secs());
                Err(CoreError::CommandTimeout(name, limit.as_secs()))
            }
            Termination::Cancelled => {
                log::debug!("{} killed on cancel request", name);
                Err(CoreError::Cancelled(name))
            }
        }
    }
}

/// Reads stderr to EOF, splitting on `\r` and `\n`, forwarding each line and
/// keeping the most recent ones.
fn read_stderr_lines(mut pipe: impl Read, on_line: Option<&(dyn Fn(&str) + Sync)>) -> VecDeque<String> {
    let mut kept = VecDeque::with_capacity(STDERR_BUFFER_LINES);
    let mut pending = Vec::new();
    let mut chunk = [0u8; 4096];

    let flush = |pending: &mut Vec<u8>, kept: &mut VecDeque<String>| {
        if pending.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(pending).trim_end().to_string();
        pending.clear();
        if line.is_empty() {
            return;
        }
        if let Some(callback) = on_line {
            callback(&line);
        }
        if kept.len() == STDERR_BUFFER_LINES {
            kept.pop_front();
        }
        kept.push_back(line);
    };

    loop {
        let read = match pipe.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        for &byte in &chunk[..read] {
            if byte == b'\n' || byte == b'\r' {
                flush(&mut pending, &mut kept);
            } else {
                pending.push(byte);
            }
        }
    }
    flush(&mut pending, &mut kept);
    kept
}
