//! Core library for converting videos to a 1080x1920 (9:16) letterboxed canvas
//! using ffmpeg and ffprobe.
//!
//! Each input is probed for its true display size (rotation and pixel aspect
//! included), scaled uniformly to fit the canvas, padded with black bars, and
//! re-encoded with the source's frame rate, bitrate, pixel format and color
//! tags. Audio is copied. Batches run on a bounded worker pool and a failing
//! file never stops the others.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use reframe_core::{CancelFlag, CoreConfig, NullReporter, SystemCommandRunner, run_batch};
//! use std::path::PathBuf;
//!
//! let mut config = CoreConfig::new(vec![PathBuf::from("/path/to/videos")]);
//! config.max_workers = Some(2);
//! config.validate().unwrap();
//!
//! let result = run_batch(&SystemCommandRunner, &config, &NullReporter, &CancelFlag::new()).unwrap();
//! for failure in &result.failures {
//!     eprintln!("{}: {}", failure.input_path.display(), failure.reason);
//! }
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod media;
pub mod processing;
pub mod progress_reporting;
pub mod temp_files;
pub mod utils;

// Re-exports for public API
pub use config::{CoreConfig, ToolPaths, VideoCodec};
pub use discovery::find_processable_files;
pub use error::{CoreError, CoreResult};
pub use external::{
    CancelFlag, CommandRunner, EncodeOptions, SystemCommandRunner, build_ffmpeg_args,
    check_dependencies, probe, probe_capability,
};
pub use media::{FrameRate, MediaProfile, Rotation, VisualDimensions};
pub use processing::{
    BatchResult, FailureStage, FitTransform, JobFailure, JobStatus, TranscodeJob, resolve_fit,
    resolve_profile, run_batch, visual_dimensions,
};
pub use progress_reporting::{NullReporter, ProgressReporter};
pub use utils::{format_bytes, format_duration, parse_ffmpeg_time};

use std::path::PathBuf;

/// Converts every supported video under `input` with default settings.
///
/// `input` may be a file or a directory; outputs go to `output_subdir`
/// (default `9x16_output`) next to each source. Uses the system ffmpeg and
/// ffprobe, no progress reporting and no cancellation.
pub fn process(input: impl Into<PathBuf>, output_subdir: Option<&str>) -> CoreResult<BatchResult> {
    let mut config = CoreConfig::new(vec![input.into()]);
    if let Some(subdir) = output_subdir {
        config.output_subdir = subdir.to_string();
    }
    run_batch(&SystemCommandRunner, &config, &NullReporter, &CancelFlag::new())
}
