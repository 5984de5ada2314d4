// ============================================================================
// reframe-core/src/processing/executor.rs
// ============================================================================
//
// TRANSCODE EXECUTOR: Runs one ffmpeg encode for a probed job
//
// The encode writes into a hidden staging file beside the final output and is
// renamed into place only after ffmpeg exits successfully. Every other path
// (non-zero exit, launch failure, timeout, cancellation) drops the staging
// file, so no partial output is ever left at the final location.
//
// There are no retries. Progress lines on ffmpeg's stderr are parsed with
// ffmpeg-sidecar and converted to a percentage of the probed duration.

use crate::config::{STDERR_TAIL_LINES, TARGET_HEIGHT, TARGET_WIDTH, ToolPaths};
use crate::error::{CoreError, command_failed_error};
use crate::external::ffmpeg::{EncodeOptions, build_ffmpeg_args};
use crate::external::ffprobe_executor::probe_dimensions;
use crate::external::runner::{CancelFlag, CommandRunner, RunOptions, program_name};
use crate::processing::job::{FailureStage, JobOutcome, TranscodeJob};
use crate::progress_reporting::ProgressReporter;
use crate::temp_files::{commit_staging_file, create_staging_file};
use crate::utils::{format_bytes, parse_ffmpeg_time, tail_lines};

use ffmpeg_sidecar::log_parser::try_parse_progress;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

/// Settings shared by every encode of a batch.
#[derive(Clone, Copy)]
pub struct ExecuteOptions<'a> {
    pub tools: &'a ToolPaths,
    pub encode: EncodeOptions,
    /// Probe the finished file and warn when it is not 1080x1920
    pub verify_output: bool,
    pub timeout: Option<Duration>,
    pub cancel: Option<&'a CancelFlag>,
    pub reporter: &'a dyn ProgressReporter,
}

/// Encodes a job whose profile and transform are already resolved.
pub fn execute(runner: &dyn CommandRunner, job: &TranscodeJob, options: &ExecuteOptions<'_>) -> JobOutcome {
    let started = Instant::now();

    let (Some(profile), Some(transform)) = (&job.profile, &job.transform) else {
        return JobOutcome::failed(FailureStage::Encode, "job was not probed before encoding");
    };

    let staging = match create_staging_file(&job.output_path) {
        Ok(staging) => staging,
        Err(e) => {
            return JobOutcome::failed(
                FailureStage::Filesystem,
                format!("cannot create temporary output in {}: {}", job.output_dir().display(), e),
            );
        }
    };

    let args = build_ffmpeg_args(&job.input_path, &staging, profile, transform, &options.encode);

    let progress = ProgressTracker::new(&job.input_path, profile.duration_secs, options.reporter);
    let on_line = |line: &str| progress.observe(line);
    let run_options = RunOptions {
        timeout: options.timeout,
        cancel: options.cancel,
        on_stderr_line: Some(&on_line),
    };

    log::info!(
        "Encoding {} -> {}",
        job.input_path.display(),
        job.output_path.display()
    );

    let ffmpeg = &options.tools.ffmpeg;
    let output = match runner.run(ffmpeg, &args, &run_options) {
        Ok(output) => output,
        Err(CoreError::Cancelled(_)) => {
            return JobOutcome::failed(FailureStage::Cancelled, "cancelled before completion");
        }
        Err(e) => return JobOutcome::failed(FailureStage::Encode, e.to_string()),
    };

    if !output.success() {
        let err = command_failed_error(
            program_name(ffmpeg),
            output.status_description(),
            tail_lines(&output.stderr, STDERR_TAIL_LINES),
        );
        return JobOutcome::failed(FailureStage::Encode, err.to_string());
    }

    if let Err(e) = commit_staging_file(staging, &job.output_path) {
        return JobOutcome::failed(
            FailureStage::Filesystem,
            format!("cannot move output into place at {}: {}", job.output_path.display(), e),
        );
    }

    let output_size = std::fs::metadata(&job.output_path).map(|m| m.len()).unwrap_or(0);

    if options.verify_output {
        verify_output(runner, &options.tools.ffprobe, &job.output_path);
    }

    let elapsed = started.elapsed();
    log::info!(
        "Finished {} in {:.1}s ({})",
        job.output_path.display(),
        elapsed.as_secs_f64(),
        format_bytes(output_size)
    );
    JobOutcome::Succeeded { elapsed, output_size }
}

/// Logs a warning when the written file is not the expected canvas size.
fn verify_output(runner: &dyn CommandRunner, ffprobe: &Path, output: &Path) {
    match probe_dimensions(runner, ffprobe, output) {
        Ok((width, height)) if (width, height) == (TARGET_WIDTH, TARGET_HEIGHT) => {
            log::debug!("Verified {}: {}x{}", output.display(), width, height);
        }
        Ok((width, height)) => {
            log::warn!(
                "Output {} is {}x{}, expected {}x{}",
                output.display(),
                width,
                height,
                TARGET_WIDTH,
                TARGET_HEIGHT
            );
        }
        Err(e) => log::warn!("Could not verify {}: {}", output.display(), e),
    }
}

/// Turns ffmpeg progress lines into whole-percent reporter events.
struct ProgressTracker<'a> {
    input: &'a Path,
    duration_secs: Option<f64>,
    reporter: &'a dyn ProgressReporter,
    last_percent: AtomicU32,
}

impl<'a> ProgressTracker<'a> {
    fn new(input: &'a Path, duration_secs: Option<f64>, reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            input,
            duration_secs: duration_secs.filter(|d| *d > 0.0),
            reporter,
            last_percent: AtomicU32::new(u32::MAX),
        }
    }

    fn observe(&self, line: &str) {
        let Some(duration) = self.duration_secs else {
            return;
        };
        let Some(progress) = try_parse_progress(line) else {
            return;
        };
        let Some(position) = parse_ffmpeg_time(&progress.time) else {
            return;
        };

        let percent = (position / duration * 100.0).clamp(0.0, 100.0);
        let whole = percent as u32;
        if self.last_percent.swap(whole, Ordering::Relaxed) != whole {
            self.reporter.on_job_progress(self.input, percent as f32);
        }
    }
}
