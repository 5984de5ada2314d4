//! Core transcode pipeline and orchestration.
//!
//! Geometry is pure; the executor runs one encode; the scheduler ties probing,
//! geometry and execution together across a batch.

/// Scale-then-pad fit computation
pub mod geometry;

/// Per-file job state and outcomes
pub mod job;

/// Single-job ffmpeg execution
pub mod executor;

/// Batch discovery, worker pool and aggregation
pub mod scheduler;

pub use executor::{ExecuteOptions, execute};
pub use geometry::{FitTransform, resolve_fit, resolve_profile, visual_dimensions};
pub use job::{FailureStage, JobOutcome, JobStatus, TranscodeJob};
pub use scheduler::{BatchResult, JobFailure, run_batch};
