//! Progress reporting hooks.
//!
//! The core library never prints. Callers that want live feedback pass a
//! [`ProgressReporter`] to the batch entry point; its methods are called from
//! worker threads, so implementations must be `Send + Sync`.

use crate::processing::job::TranscodeJob;
use std::path::Path;

/// Receives batch and per-job progress events.
///
/// Every method has an empty default so implementors only override what they
/// display.
pub trait ProgressReporter: Send + Sync {
    /// Called once, after discovery, before any job runs.
    fn on_batch_start(&self, _total_jobs: usize, _workers: usize) {}

    /// A worker picked up the job for `input`.
    fn on_job_start(&self, _input: &Path) {}

    /// Encode progress for `input` in percent (0.0 to 100.0).
    fn on_job_progress(&self, _input: &Path, _percent: f32) {}

    /// The job reached a terminal status.
    fn on_job_finish(&self, _job: &TranscodeJob) {}
}

/// Reporter that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl ProgressReporter for NullReporter {}
