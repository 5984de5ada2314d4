// reframe-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Parser, Subcommand};
use reframe_core::{Rotation, VideoCodec};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Reframe: convert videos to a 1080x1920 (9:16) letterboxed canvas",
    long_about = "Scales each video to fit a 1080x1920 portrait canvas, pads it with black bars \
                  and re-encodes it with ffmpeg. Outputs go to a subdirectory next to each source."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug output on the console
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Also write a full debug log to a timestamped file in this directory
    #[arg(long, global = true, value_name = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Converts video files and directories to 9:16
    Convert(ConvertArgs),
    /// Reports whether ffmpeg and ffprobe are usable
    Check(ToolArgs),
    /// Shows how a single file would be converted, without converting it
    Info(InfoArgs),
}

/// Locations of the external tools, shared by every subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ToolArgs {
    /// Path to the ffmpeg binary (defaults to a bundled copy or PATH lookup)
    #[arg(long, value_name = "PATH", env = "REFRAME_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary (defaults to a bundled copy or PATH lookup)
    #[arg(long, value_name = "PATH", env = "REFRAME_FFPROBE")]
    pub ffprobe: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Video files or directories to convert
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Name of the output subdirectory created next to each source
    #[arg(short, long, value_name = "NAME", default_value = reframe_core::config::DEFAULT_OUTPUT_SUBDIR)]
    pub output_subdir: String,

    /// Output video codec (h264, hevc, av1)
    #[arg(long, value_name = "CODEC", default_value_t = VideoCodec::H264)]
    pub codec: VideoCodec,

    /// Constant quality override instead of matching the source bitrate
    #[arg(long, value_name = "CRF")]
    pub crf: Option<u8>,

    /// Clockwise rotation (0, 90, 180, 270) used instead of the source's rotation tag
    #[arg(long, value_name = "DEGREES")]
    pub rotate: Option<Rotation>,

    /// Maximum number of files converted at once (defaults to the CPU count)
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Descend into subdirectories of directory inputs
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Abort any single encode that runs longer than this many seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Skip re-probing outputs after they are written
    #[arg(long, default_value_t = false)]
    pub no_verify: bool,

    #[command(flatten)]
    pub tools: ToolArgs,
}

#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Video file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the report as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Codec used for the printed ffmpeg command
    #[arg(long, value_name = "CODEC", default_value_t = VideoCodec::H264)]
    pub codec: VideoCodec,

    /// CRF used for the printed ffmpeg command
    #[arg(long, value_name = "CRF")]
    pub crf: Option<u8>,

    /// Clockwise rotation (0, 90, 180, 270) used instead of the source's rotation tag
    #[arg(long, value_name = "DEGREES")]
    pub rotate: Option<Rotation>,

    #[command(flatten)]
    pub tools: ToolArgs,
}
