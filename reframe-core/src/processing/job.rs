//! Per-file job state.

use crate::media::MediaProfile;
use crate::processing::geometry::FitTransform;

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// The pipeline step at which a job failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureStage {
    Probe,
    Filesystem,
    Encode,
    Cancelled,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureStage::Probe => "probe",
            FailureStage::Filesystem => "filesystem",
            FailureStage::Encode => "encode",
            FailureStage::Cancelled => "cancelled",
        })
    }
}

/// Result of running one job through the executor.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Succeeded { elapsed: Duration, output_size: u64 },
    Failed { stage: FailureStage, reason: String },
}

impl JobOutcome {
    pub fn failed(stage: FailureStage, reason: impl Into<String>) -> Self {
        JobOutcome::Failed {
            stage,
            reason: reason.into(),
        }
    }
}

/// One input file and everything learned about it while processing.
#[derive(Debug, Clone, Serialize)]
pub struct TranscodeJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub profile: Option<MediaProfile>,
    pub transform: Option<FitTransform>,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub failure_stage: Option<FailureStage>,
    pub elapsed: Option<Duration>,
    pub input_size: Option<u64>,
    pub output_size: Option<u64>,
}

impl TranscodeJob {
    /// A pending job writing to `{input_parent}/{output_subdir}/{file_name}`.
    pub fn new(input_path: PathBuf, output_subdir: &str) -> Self {
        let output_path = output_path_for(&input_path, output_subdir);
        Self {
            input_path,
            output_path,
            profile: None,
            transform: None,
            status: JobStatus::Pending,
            error_message: None,
            failure_stage: None,
            elapsed: None,
            input_size: None,
            output_size: None,
        }
    }

    /// Directory the output is written into.
    pub fn output_dir(&self) -> &Path {
        self.output_path.parent().unwrap_or_else(|| Path::new("."))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded | JobStatus::Failed)
    }

    /// Records a terminal outcome.
    pub fn apply(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Succeeded { elapsed, output_size } => {
                self.status = JobStatus::Succeeded;
                self.elapsed = Some(elapsed);
                self.output_size = Some(output_size);
                self.error_message = None;
                self.failure_stage = None;
            }
            JobOutcome::Failed { stage, reason } => {
                self.status = JobStatus::Failed;
                self.failure_stage = Some(stage);
                self.error_message = Some(reason);
            }
        }
    }
}

/// Output location for an input: a sibling subdirectory, same file name.
pub fn output_path_for(input_path: &Path, output_subdir: &str) -> PathBuf {
    let parent = input_path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = input_path.file_name().unwrap_or(input_path.as_os_str());
    parent.join(output_subdir).join(file_name)
}
