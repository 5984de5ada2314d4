//! ffprobe integration for media analysis.
//!
//! Runs ffprobe through a [`CommandRunner`], deserializes its JSON output and
//! reduces it to a [`MediaProfile`]. Rotation is read from the `rotate` stream
//! tag or the display-matrix side data; when the stream declares neither, the
//! first decoded frame's side data is consulted as a best effort.

use super::runner::{CommandRunner, RunOptions, program_name};
use crate::config::{FRAME_PROBE_TIMEOUT_SECS, PROBE_TIMEOUT_SECS, STDERR_TAIL_LINES};
use crate::error::{CoreError, CoreResult, command_failed_error};
use crate::media::{FrameRate, MediaProfile, Rotation};
use crate::utils::tail_lines;

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

// ---- ffprobe JSON wire format ----

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    #[serde(default)]
    format: Option<ProbeFormat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<i64>,
    height: Option<i64>,
    sample_aspect_ratio: Option<String>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    bit_rate: Option<String>,
    pix_fmt: Option<String>,
    color_space: Option<String>,
    color_range: Option<String>,
    color_transfer: Option<String>,
    color_primaries: Option<String>,
    duration: Option<String>,
    tags: HashMap<String, Value>,
    side_data_list: Vec<SideData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SideData {
    side_data_type: Option<String>,
    rotation: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrameProbeOutput {
    frames: Vec<FrameEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrameEntry {
    side_data_list: Vec<SideData>,
}

// ---- Public API ----

/// Probes `input` and returns its video stream profile.
pub fn probe(runner: &dyn CommandRunner, ffprobe: &Path, input: &Path) -> CoreResult<MediaProfile> {
    log::debug!("Probing {}", input.display());
    let args = stream_probe_args(input);
    let stdout = run_probe(runner, ffprobe, &args, Duration::from_secs(PROBE_TIMEOUT_SECS))?;

    let (mut profile, declared_rotation) = parse_stream_probe(&stdout, input)?;

    profile.rotation = match declared_rotation {
        Some(rotation) => rotation,
        None => probe_first_frame_rotation(runner, ffprobe, input).unwrap_or_default(),
    };

    log::debug!(
        "{}: {}x{} rotation {} fps {} bitrate {:?}",
        input.display(),
        profile.coded_width,
        profile.coded_height,
        profile.rotation.degrees(),
        profile.frame_rate.map_or_else(|| "unknown".to_string(), |r| r.to_string()),
        profile.bit_rate
    );
    Ok(profile)
}

/// Returns the coded size of the first video stream in `path`.
pub fn probe_dimensions(runner: &dyn CommandRunner, ffprobe: &Path, path: &Path) -> CoreResult<(u32, u32)> {
    let args = stream_probe_args(path);
    let stdout = run_probe(runner, ffprobe, &args, Duration::from_secs(PROBE_TIMEOUT_SECS))?;
    let (profile, _) = parse_stream_probe(&stdout, path)?;
    Ok((profile.coded_width, profile.coded_height))
}

fn stream_probe_args(input: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_streams".to_string(),
        "-show_format".to_string(),
        input.to_string_lossy().into_owned(),
    ]
}

fn run_probe(runner: &dyn CommandRunner, ffprobe: &Path, args: &[String], timeout: Duration) -> CoreResult<String> {
    let output = runner.run(ffprobe, args, &RunOptions::with_timeout(timeout))?;
    if !output.success() {
        return Err(command_failed_error(
            program_name(ffprobe),
            output.status_description(),
            tail_lines(&output.stderr, STDERR_TAIL_LINES),
        ));
    }
    Ok(output.stdout)
}

/// Best-effort rotation lookup in the first frame's side data.
///
/// Some containers only attach the display matrix to decoded frames. Any
/// failure here is logged and treated as "no rotation".
fn probe_first_frame_rotation(runner: &dyn CommandRunner, ffprobe: &Path, input: &Path) -> Option<Rotation> {
    let args: Vec<String> = [
        "-v",
        "error",
        "-select_streams",
        "v:0",
        "-read_intervals",
        "%+#1",
        "-show_entries",
        "frame=side_data_list",
        "-print_format",
        "json",
    ]
    .iter()
    .map(|s| s.to_string())
    .chain(std::iter::once(input.to_string_lossy().into_owned()))
    .collect();

    let stdout = match run_probe(runner, ffprobe, &args, Duration::from_secs(FRAME_PROBE_TIMEOUT_SECS)) {
        Ok(stdout) => stdout,
        Err(e) => {
            log::debug!("Frame rotation probe skipped for {}: {}", input.display(), e);
            return None;
        }
    };

    match serde_json::from_str::<FrameProbeOutput>(&stdout) {
        Ok(parsed) => parsed
            .frames
            .first()
            .and_then(|frame| display_matrix_rotation(&frame.side_data_list)),
        Err(e) => {
            log::debug!("Unreadable frame probe output for {}: {}", input.display(), e);
            None
        }
    }
}

// ---- Parsing ----

/// Parses stream probe JSON. The second value is the rotation the stream
/// declares, or `None` when it declares none.
fn parse_stream_probe(json: &str, input: &Path) -> CoreResult<(MediaProfile, Option<Rotation>)> {
    let parsed: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| CoreError::JsonParseError(format!("{}: {}", input.display(), e)))?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| CoreError::NoVideoStream(input.to_path_buf()))?;
    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"));

    let coded_width = positive_dimension(video.width, "width", input)?;
    let coded_height = positive_dimension(video.height, "height", input)?;

    let declared_rotation = tag_str(&video.tags, "rotate")
        .and_then(|value| value.trim().parse::<f64>().ok())
        .map(Rotation::from_degrees)
        .or_else(|| display_matrix_rotation(&video.side_data_list));

    let frame_rate = video
        .r_frame_rate
        .as_deref()
        .and_then(FrameRate::parse)
        .or_else(|| video.avg_frame_rate.as_deref().and_then(FrameRate::parse));

    let bit_rate = parse_positive_u64(video.bit_rate.as_deref())
        .or_else(|| parse_positive_u64(tag_str(&video.tags, "BPS").as_deref()))
        .or_else(|| parse_positive_u64(tag_str(&video.tags, "BPS-eng").as_deref()));

    let duration_secs = parse_positive_f64(video.duration.as_deref()).or_else(|| {
        parsed
            .format
            .as_ref()
            .and_then(|format| parse_positive_f64(format.duration.as_deref()))
    });

    let profile = MediaProfile {
        codec_name: meaningful(&video.codec_name),
        coded_width,
        coded_height,
        rotation: declared_rotation.unwrap_or_default(),
        sample_aspect_ratio: video.sample_aspect_ratio.as_deref().and_then(parse_sample_aspect_ratio),
        frame_rate,
        bit_rate,
        pixel_format: meaningful(&video.pix_fmt),
        color_space: meaningful(&video.color_space),
        color_range: meaningful(&video.color_range),
        color_transfer: meaningful(&video.color_transfer),
        color_primaries: meaningful(&video.color_primaries),
        duration_secs,
        has_audio: audio.is_some(),
        audio_codec: audio.and_then(|a| meaningful(&a.codec_name)),
    };

    Ok((profile, declared_rotation))
}

fn positive_dimension(value: Option<i64>, label: &str, input: &Path) -> CoreResult<u32> {
    value
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            CoreError::VideoInfoError(format!(
                "Video stream in {} has no usable {} ({:?})",
                input.display(),
                label,
                value
            ))
        })
}

fn display_matrix_rotation(side_data: &[SideData]) -> Option<Rotation> {
    side_data
        .iter()
        .filter(|entry| entry.side_data_type.as_deref() == Some("Display Matrix"))
        .find_map(|entry| entry.rotation.as_ref().and_then(value_as_f64))
        .map(Rotation::from_degrees)
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn tag_str(tags: &HashMap<String, Value>, key: &str) -> Option<String> {
    match tags.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Drops the placeholder tokens ffprobe prints for unknown values.
fn meaningful(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| {
            !v.is_empty()
                && !v.eq_ignore_ascii_case("unknown")
                && !v.eq_ignore_ascii_case("reserved")
                && !v.eq_ignore_ascii_case("N/A")
        })
        .map(str::to_string)
}

fn parse_positive_u64(value: Option<&str>) -> Option<u64> {
    value?.trim().parse::<u64>().ok().filter(|v| *v > 0)
}

fn parse_positive_f64(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// `"32:27"` becomes `Some((32, 27))`; square or undefined ratios become `None`.
fn parse_sample_aspect_ratio(value: &str) -> Option<(u32, u32)> {
    let (num, den) = value.split_once(':')?;
    let num: u32 = num.trim().parse().ok()?;
    let den: u32 = den.trim().parse().ok()?;
    if num == 0 || den == 0 || num == den {
        return None;
    }
    Some((num, den))
}
