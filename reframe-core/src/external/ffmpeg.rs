//! ffmpeg argument synthesis for the letterbox transcode.
//!
//! The argument list re-encodes the first video stream through the fit filter
//! chain, reproduces the source's rate, pixel format and color tags, and copies
//! the first audio stream untouched.

use crate::config::VideoCodec;
use crate::external::ffmpeg_builder::VideoFilterChain;
use crate::media::{MediaProfile, Rotation};
use crate::processing::geometry::FitTransform;

use std::path::Path;

/// Encoder choices that do not come from the source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeOptions {
    pub codec: VideoCodec,
    /// Constant-quality override; wins over the source bitrate
    pub crf: Option<u8>,
    /// Manual rotation; replaces the container's rotation tag
    pub rotate: Option<Rotation>,
}

/// The WebM muxer only takes VP8/VP9/AV1, so other codecs go into Matroska.
fn needs_matroska_muxer(output: &Path, codec: VideoCodec) -> bool {
    codec != VideoCodec::Av1
        && output
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("webm"))
}

/// Builds the ffmpeg argument list (program name excluded) that writes
/// `output` from `input`.
///
/// Pure: nothing is created on disk.
pub fn build_ffmpeg_args(
    input: &Path,
    output: &Path,
    profile: &MediaProfile,
    transform: &FitTransform,
    options: &EncodeOptions,
) -> Vec<String> {
    let mut args: Vec<String> = Vec::with_capacity(48);
    let mut push = |items: &[&str]| args.extend(items.iter().map(|s| s.to_string()));

    let matroska = needs_matroska_muxer(output, options.codec);
    let input = input.to_string_lossy();
    let output = output.to_string_lossy();

    push(&["-hide_banner", "-nostdin", "-y"]);
    if options.rotate.is_some() {
        push(&["-noautorotate"]);
    }
    push(&["-i", &*input]);

    push(&["-map", "0:v:0"]);
    if profile.has_audio {
        push(&["-map", "0:a:0"]);
    }

    if let Some(filters) = VideoFilterChain::new().add_fit(transform, options.rotate).build() {
        push(&["-vf", filters.as_str()]);
    }

    let codec = options.codec;
    push(&["-c:v", codec.encoder(), "-preset", codec.preset()]);
    if let Some(tag) = codec.codec_tag() {
        push(&["-tag:v", tag]);
    }

    match (options.crf, profile.bit_rate) {
        (Some(crf), _) => push(&["-crf", crf.to_string().as_str()]),
        (None, Some(bit_rate)) => {
            let rate = bit_rate.to_string();
            let buffer = bit_rate.saturating_mul(2).to_string();
            push(&["-b:v", rate.as_str(), "-maxrate", rate.as_str(), "-bufsize", buffer.as_str()]);
        }
        (None, None) => push(&["-crf", codec.default_crf().to_string().as_str()]),
    }

    push(&["-threads", "0"]);

    if let Some(pix_fmt) = &profile.pixel_format {
        push(&["-pix_fmt", pix_fmt.as_str()]);
    }

    let color_tags = [
        ("-colorspace", &profile.color_space),
        ("-color_range", &profile.color_range),
        ("-color_trc", &profile.color_transfer),
        ("-color_primaries", &profile.color_primaries),
    ];
    for (flag, value) in color_tags {
        if let Some(value) = value {
            push(&[flag, value.as_str()]);
        }
    }

    if let Some(rate) = profile.frame_rate {
        push(&["-r", rate.to_string().as_str()]);
    }

    if profile.has_audio {
        push(&["-c:a", "copy"]);
    } else {
        push(&["-an"]);
    }

    // Rotation is baked into the pixels; clear the tag so players don't rotate again
    push(&["-metadata:s:v:0", "rotate=0"]);
    push(&["-movflags", "+faststart"]);
    if matroska {
        push(&["-f", "matroska"]);
    }
    push(&[&*output]);

    args
}
