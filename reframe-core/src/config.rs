// ============================================================================
// reframe-core/src/config.rs
// ============================================================================
//
// CONFIGURATION: Core Configuration Structures and Constants
//
// This module defines the configuration consumed by the batch entry points:
// input paths, output subdirectory naming, discovery options, encoder choice,
// rate-control overrides, worker limits and external tool locations.
//
// KEY COMPONENTS:
// - CoreConfig: Main configuration structure for a batch run
// - VideoCodec: Output video encoder selection and its fixed settings
// - ToolPaths: Locations of the ffmpeg and ffprobe executables
// - Constants: Target canvas, supported extensions, timeouts
//
// USAGE:
// Consumers (like reframe-cli) build a CoreConfig with `CoreConfig::new`,
// adjust fields, call `validate`, and pass it to `run_batch`.

use crate::error::{CoreError, CoreResult};
use crate::media::Rotation;

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// DEFAULT CONSTANTS
// ============================================================================

/// Width of the output canvas in pixels.
pub const TARGET_WIDTH: u32 = 1080;

/// Height of the output canvas in pixels.
pub const TARGET_HEIGHT: u32 = 1920;

/// Name of the subdirectory created next to each input for its output.
pub const DEFAULT_OUTPUT_SUBDIR: &str = "9x16_output";

/// Input extensions accepted by discovery (compared case-insensitively).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm", "m4v", "flv", "wmv"];

/// Upper bound on a single ffprobe stream query.
pub const PROBE_TIMEOUT_SECS: u64 = 30;

/// Upper bound on the best-effort first-frame rotation query.
pub const FRAME_PROBE_TIMEOUT_SECS: u64 = 10;

/// Number of trailing ffmpeg stderr lines kept for failure messages.
pub const STDERR_TAIL_LINES: usize = 20;

// ============================================================================
// VIDEO CODEC
// ============================================================================

/// Output video encoder.
///
/// H.264 is the default and the most compatible choice for vertical-video
/// platforms. HEVC and AV1 trade encode time for smaller files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoCodec {
    #[default]
    H264,
    Hevc,
    Av1,
}

impl VideoCodec {
    /// Machine-friendly identifier for this codec.
    pub const fn as_str(self) -> &'static str {
        match self {
            VideoCodec::H264 => "h264",
            VideoCodec::Hevc => "hevc",
            VideoCodec::Av1 => "av1",
        }
    }

    pub const fn variants_display() -> &'static str {
        "h264, hevc, av1"
    }

    /// ffmpeg encoder name.
    pub const fn encoder(self) -> &'static str {
        match self {
            VideoCodec::H264 => "libx264",
            VideoCodec::Hevc => "libx265",
            VideoCodec::Av1 => "libsvtav1",
        }
    }

    /// Speed-oriented encoder preset.
    pub const fn preset(self) -> &'static str {
        match self {
            VideoCodec::H264 => "veryfast",
            VideoCodec::Hevc => "fast",
            // SVT-AV1 presets run 0-13, higher is faster
            VideoCodec::Av1 => "8",
        }
    }

    /// CRF used when neither an override nor a source bitrate is available.
    pub const fn default_crf(self) -> u8 {
        match self {
            VideoCodec::H264 => 23,
            VideoCodec::Hevc | VideoCodec::Av1 => 28,
        }
    }

    /// Highest CRF value the encoder accepts.
    pub const fn max_crf(self) -> u8 {
        match self {
            VideoCodec::H264 | VideoCodec::Hevc => 51,
            VideoCodec::Av1 => 63,
        }
    }

    /// Codec tag needed for player compatibility, if any.
    pub const fn codec_tag(self) -> Option<&'static str> {
        match self {
            // Apple players refuse hev1-tagged HEVC in MP4
            VideoCodec::Hevc => Some("hvc1"),
            _ => None,
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing codec names from strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCodecParseError {
    invalid_value: String,
}

impl fmt::Display for VideoCodecParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown video codec '{}'. Valid options: {}",
            self.invalid_value,
            VideoCodec::variants_display()
        )
    }
}

impl std::error::Error for VideoCodecParseError {}

impl FromStr for VideoCodec {
    type Err = VideoCodecParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("h264") || s.eq_ignore_ascii_case("avc") {
            Ok(VideoCodec::H264)
        } else if s.eq_ignore_ascii_case("hevc") || s.eq_ignore_ascii_case("h265") {
            Ok(VideoCodec::Hevc)
        } else if s.eq_ignore_ascii_case("av1") {
            Ok(VideoCodec::Av1)
        } else {
            Err(VideoCodecParseError {
                invalid_value: s.to_string(),
            })
        }
    }
}

// ============================================================================
// TOOL PATHS
// ============================================================================

/// Locations of the external tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    /// Resolves each tool from an explicit override, else a bundled sidecar
    /// binary next to the executable, else the bare name looked up on PATH.
    pub fn resolve(ffmpeg: Option<PathBuf>, ffprobe: Option<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.unwrap_or_else(ffmpeg_sidecar::paths::ffmpeg_path),
            ffprobe: ffprobe.unwrap_or_else(ffmpeg_sidecar::ffprobe::ffprobe_path),
        }
    }
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self::resolve(None, None)
    }
}

// ============================================================================
// CORE CONFIGURATION
// ============================================================================

/// Main configuration structure for a batch run.
///
/// # Examples
///
/// ```rust,no_run
/// use reframe_core::CoreConfig;
/// use std::path::PathBuf;
///
/// let mut config = CoreConfig::new(vec![PathBuf::from("/videos")]);
/// config.recursive = true;
/// config.crf = Some(20);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct CoreConfig {
    // ---- Input Selection ----
    /// Files and/or directories to process, in the order given
    pub input_paths: Vec<PathBuf>,

    /// Descend into subdirectories when scanning a directory input
    pub recursive: bool,

    // ---- Output ----
    /// Subdirectory created next to each input to hold its output
    pub output_subdir: String,

    // ---- Encoder Settings ----
    pub codec: VideoCodec,

    /// Constant-quality override; takes precedence over the source bitrate
    pub crf: Option<u8>,

    /// Probe each finished output and warn if it is not 1080x1920
    pub verify_output: bool,

    /// Clockwise rotation applied instead of the one probed from the source
    pub rotate: Option<Rotation>,

    // ---- Scheduling ----
    /// Upper bound on the worker pool; the CPU count still caps it
    pub max_workers: Option<usize>,

    /// Kill and fail an encode that runs longer than this
    pub job_timeout: Option<Duration>,

    // ---- External Tools ----
    pub tools: ToolPaths,
}

impl CoreConfig {
    /// Creates a configuration with defaults for everything but the inputs.
    pub fn new(input_paths: Vec<PathBuf>) -> Self {
        Self {
            input_paths,
            recursive: false,
            output_subdir: DEFAULT_OUTPUT_SUBDIR.to_string(),
            codec: VideoCodec::default(),
            crf: None,
            verify_output: true,
            rotate: None,
            max_workers: None,
            job_timeout: None,
            tools: ToolPaths::default(),
        }
    }

    /// Checks the configuration for values that would misbehave at run time.
    pub fn validate(&self) -> CoreResult<()> {
        if self.input_paths.is_empty() {
            return Err(CoreError::Config("at least one input path is required".to_string()));
        }

        validate_output_subdir(&self.output_subdir)?;

        if let Some(crf) = self.crf {
            if crf > self.codec.max_crf() {
                return Err(CoreError::Config(format!(
                    "CRF {} is out of range for {} (0-{})",
                    crf,
                    self.codec,
                    self.codec.max_crf()
                )));
            }
        }

        if self.max_workers == Some(0) {
            return Err(CoreError::Config("worker count must be at least 1".to_string()));
        }

        if self.job_timeout.is_some_and(|t| t.is_zero()) {
            return Err(CoreError::Config("job timeout must be greater than zero".to_string()));
        }

        Ok(())
    }

    /// Number of encode workers for a batch of `job_count` jobs.
    ///
    /// The CPU count is a hard ceiling; the override can only lower it.
    pub fn worker_count(&self, job_count: usize) -> usize {
        let cpus = num_cpus::get().max(1);
        let limit = self.max_workers.map_or(cpus, |w| w.min(cpus));
        limit.min(job_count).max(1)
    }
}

/// The output subdirectory must be exactly one normal path component.
fn validate_output_subdir(subdir: &str) -> CoreResult<()> {
    let mut components = Path::new(subdir).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(CoreError::Config(format!(
            "output subdirectory '{subdir}' must be a single directory name"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CoreConfig {
        let mut config = CoreConfig::new(vec![PathBuf::from("in")]);
        config.tools = ToolPaths {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        };
        config
    }

    #[test]
    fn test_defaults() {
        let config = config();
        assert_eq!(config.output_subdir, "9x16_output");
        assert_eq!(config.codec, VideoCodec::H264);
        assert!(!config.recursive);
        assert!(config.crf.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_codec_parsing() {
        assert_eq!("H264".parse::<VideoCodec>().unwrap(), VideoCodec::H264);
        assert_eq!("h265".parse::<VideoCodec>().unwrap(), VideoCodec::Hevc);
        assert_eq!("av1".parse::<VideoCodec>().unwrap(), VideoCodec::Av1);
        let err = "vp9".parse::<VideoCodec>().unwrap_err();
        assert!(err.to_string().contains("h264, hevc, av1"));
    }

    #[test]
    fn test_codec_settings() {
        assert_eq!(VideoCodec::H264.encoder(), "libx264");
        assert_eq!(VideoCodec::H264.preset(), "veryfast");
        assert_eq!(VideoCodec::H264.default_crf(), 23);
        assert_eq!(VideoCodec::Hevc.codec_tag(), Some("hvc1"));
        assert_eq!(VideoCodec::Av1.codec_tag(), None);
    }

    #[test]
    fn test_rejects_nested_output_subdir() {
        for bad in ["", "a/b", "..", "/abs", "."] {
            let mut config = config();
            config.output_subdir = bad.to_string();
            assert!(config.validate().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_rejects_crf_out_of_range() {
        let mut config = config();
        config.crf = Some(52);
        assert!(config.validate().is_err());
        config.codec = VideoCodec::Av1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_workers_and_timeout() {
        let mut config = config();
        config.max_workers = Some(0);
        assert!(config.validate().is_err());

        let mut config = self::config();
        config.job_timeout = Some(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_worker_count_never_exceeds_cpus() {
        let cpus = num_cpus::get();
        let mut config = config();
        assert_eq!(config.worker_count(1000), cpus);
        assert_eq!(config.worker_count(1), 1);

        config.max_workers = Some(cpus + 64);
        assert_eq!(config.worker_count(1000), cpus);

        config.max_workers = Some(1);
        assert_eq!(config.worker_count(1000), 1);
    }
}
