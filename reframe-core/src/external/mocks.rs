// reframe-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled only for this crate's unit tests.

use super::runner::{CommandOutput, CommandRunner, RunOptions};
use crate::error::{CoreError, CoreResult, command_start_error};

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Canned result for a matched invocation.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// The process ran and exited; stderr lines are fed to the line callback.
    Exited {
        exit_code: i32,
        stdout: String,
        stderr: String,
        /// Write placeholder bytes to the last argument (the output path)
        writes_output: bool,
    },
    /// The process could not be launched.
    LaunchError(io::ErrorKind),
    /// The process ran past its timeout and was killed.
    TimedOut,
}

impl MockResponse {
    pub fn stdout(stdout: impl Into<String>) -> Self {
        MockResponse::Exited {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            writes_output: false,
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        MockResponse::Exited {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            writes_output: false,
        }
    }

    /// A successful encode that leaves a file at the output path.
    pub fn encoded(stderr: impl Into<String>) -> Self {
        MockResponse::Exited {
            exit_code: 0,
            stdout: String::new(),
            stderr: stderr.into(),
            writes_output: true,
        }
    }
}

struct Expectation {
    program: String,
    arg_needles: Vec<String>,
    response: MockResponse,
}

impl Expectation {
    fn matches(&self, program: &Path, args: &[String]) -> bool {
        program.to_string_lossy().contains(&self.program)
            && self
                .arg_needles
                .iter()
                .all(|needle| args.iter().any(|arg| arg.contains(needle.as_str())))
    }
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: PathBuf,
    pub args: Vec<String>,
}

/// `CommandRunner` that answers from a list of expectations.
///
/// Expectations are matched in insertion order and are not consumed, so one
/// expectation can serve every job of a batch. A call that matches nothing
/// fails with `OperationFailed` rather than panicking inside a worker.
#[derive(Default)]
pub struct MockCommandRunner {
    expectations: Mutex<Vec<Expectation>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A runner that already answers `-version` for ffmpeg and ffprobe.
    pub fn with_tools() -> Self {
        let runner = Self::new();
        runner.expect("ffmpeg", &["-version"], MockResponse::stdout("ffmpeg version mock"));
        runner.expect("ffprobe", &["-version"], MockResponse::stdout("ffprobe version mock"));
        runner
    }

    /// Answers calls to a program containing `program` whose arguments contain
    /// every needle.
    pub fn expect(&self, program: &str, arg_needles: &[&str], response: MockResponse) {
        if let Ok(mut expectations) = self.expectations.lock() {
            expectations.push(Expectation {
                program: program.to_string(),
                arg_needles: arg_needles.iter().map(|s| s.to_string()).collect(),
                response,
            });
        }
    }

    /// Answers the stream probe of any input whose path contains `file`.
    pub fn expect_probe(&self, file: &str, json: &str) {
        self.expect("ffprobe", &["-show_streams", file], MockResponse::stdout(json));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Recorded calls to programs whose path contains `program`.
    pub fn calls_to(&self, program: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.program.to_string_lossy().contains(program))
            .collect()
    }

    fn find_response(&self, program: &Path, args: &[String]) -> Option<MockResponse> {
        let expectations = self.expectations.lock().ok()?;
        expectations
            .iter()
            .find(|expectation| expectation.matches(program, args))
            .map(|expectation| expectation.response.clone())
    }
}

impl CommandRunner for MockCommandRunner {
    fn run(&self, program: &Path, args: &[String], options: &RunOptions<'_>) -> CoreResult<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                program: program.to_path_buf(),
                args: args.to_vec(),
            });
        }

        let name = super::runner::program_name(program);
        if options.cancel.is_some_and(|flag| flag.is_cancelled()) {
            return Err(CoreError::Cancelled(name));
        }

        let response = self.find_response(program, args).ok_or_else(|| {
            log::error!("MockCommandRunner: no expectation for {} {:?}", name, args);
            CoreError::OperationFailed(format!("no mock expectation for {name} {args:?}"))
        })?;

        match response {
            MockResponse::Exited {
                exit_code,
                stdout,
                stderr,
                writes_output,
            } => {
                if let Some(callback) = options.on_stderr_line {
                    stderr.lines().filter(|l| !l.is_empty()).for_each(callback);
                }
                if writes_output {
                    if let Some(output) = args.last() {
                        std::fs::write(output, b"mock encoded video")?;
                    }
                }
                Ok(CommandOutput {
                    exit_code: Some(exit_code),
                    stdout,
                    stderr,
                })
            }
            MockResponse::LaunchError(kind) => {
                Err(command_start_error(name, io::Error::new(kind, "mock launch failure")))
            }
            MockResponse::TimedOut => {
                let secs = options.timeout.map_or(0, |t| t.as_secs());
                Err(CoreError::CommandTimeout(name, secs))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_matching_expectation_wins() {
        let runner = MockCommandRunner::new();
        runner.expect("ffprobe", &["a.mp4"], MockResponse::stdout("first"));
        runner.expect("ffprobe", &[], MockResponse::stdout("fallback"));

        let args = vec!["-i".to_string(), "/v/a.mp4".to_string()];
        let out = runner.run(Path::new("/usr/bin/ffprobe"), &args, &RunOptions::default()).unwrap();
        assert_eq!(out.stdout, "first");

        let args = vec!["/v/b.mp4".to_string()];
        let out = runner.run(Path::new("ffprobe"), &args, &RunOptions::default()).unwrap();
        assert_eq!(out.stdout, "fallback");
        assert_eq!(runner.calls_to("ffprobe").len(), 2);
    }

    #[test]
    fn test_unmatched_call_is_an_error() {
        let runner = MockCommandRunner::new();
        let result = runner.run(Path::new("ffmpeg"), &[], &RunOptions::default());
        assert!(matches!(result, Err(CoreError::OperationFailed(_))));
    }

    #[test]
    fn test_launch_error_not_found_is_dependency_error() {
        let runner = MockCommandRunner::new();
        runner.expect("ffmpeg", &[], MockResponse::LaunchError(io::ErrorKind::NotFound));
        let result = runner.run(Path::new("ffmpeg"), &[], &RunOptions::default());
        assert!(matches!(result, Err(CoreError::DependencyNotFound(_))));
    }
}
