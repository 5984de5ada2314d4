// reframe-cli/src/commands/info.rs
//
// The `info` command: probe one file and show what a conversion would do,
// down to the exact ffmpeg command line.

use crate::cli::InfoArgs;
use crate::commands::EXIT_SUCCESS;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal;
use reframe_core::config::DEFAULT_OUTPUT_SUBDIR;
use reframe_core::external::check_dependency;
use reframe_core::external::runner::format_command_line;
use reframe_core::processing::job::output_path_for;
use reframe_core::{
    CommandRunner, EncodeOptions, FitTransform, MediaProfile, Rotation, SystemCommandRunner, VisualDimensions,
    build_ffmpeg_args, format_bytes, format_duration, probe, resolve_profile, visual_dimensions,
};
use std::path::PathBuf;

/// Everything the info command reports about one file.
#[derive(Debug)]
pub struct InfoReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub profile: MediaProfile,
    pub visual: VisualDimensions,
    pub transform: FitTransform,
    pub rotate: Option<Rotation>,
    pub ffmpeg_args: Vec<String>,
    pub command_line: String,
}

impl InfoReport {
    pub fn to_json(&self) -> CliResult<String> {
        let value = serde_json::json!({
            "input": self.input,
            "output": self.output,
            "profile": self.profile,
            "visual_dimensions": self.visual,
            "transform": self.transform,
            "rotate_override": self.rotate.map(Rotation::degrees),
            "ffmpeg_args": self.ffmpeg_args,
            "command_line": self.command_line,
        });
        serde_json::to_string_pretty(&value).cli_context("Failed to serialize report")
    }
}

/// Probes `input` and assembles the report without running ffmpeg.
pub fn build_report(runner: &dyn CommandRunner, args: &InfoArgs) -> CliResult<InfoReport> {
    let tools = args.tools.resolve();
    check_dependency(runner, &tools.ffprobe)?;

    let profile = probe(runner, &tools.ffprobe, &args.file)?;
    let visual = visual_dimensions(&profile, args.rotate);
    let transform = resolve_profile(&profile, args.rotate);
    let output = output_path_for(&args.file, DEFAULT_OUTPUT_SUBDIR);
    let options = EncodeOptions {
        codec: args.codec,
        crf: args.crf,
        rotate: args.rotate,
    };
    let ffmpeg_args = build_ffmpeg_args(&args.file, &output, &profile, &transform, &options);
    let command_line = format_command_line(&tools.ffmpeg, &ffmpeg_args);

    Ok(InfoReport {
        input: args.file.clone(),
        output,
        profile,
        visual,
        transform,
        rotate: args.rotate,
        ffmpeg_args,
        command_line,
    })
}

fn or_unknown(value: Option<&str>) -> &str {
    value.unwrap_or("unknown")
}

fn print_report(report: &InfoReport) {
    let profile = &report.profile;

    terminal::print_section("Source");
    terminal::print_status("File", &report.input.display().to_string(), true);
    terminal::print_status("Codec", or_unknown(profile.codec_name.as_deref()), false);
    terminal::print_status(
        "Coded size",
        &format!("{}x{}", profile.coded_width, profile.coded_height),
        false,
    );
    terminal::print_status("Rotation", &format!("{}°", profile.rotation.degrees()), false);
    if let Some(rotate) = report.rotate {
        terminal::print_status("Rotation override", &format!("{}°", rotate.degrees()), true);
    }
    let sar = profile
        .sample_aspect_ratio
        .map_or_else(|| "1:1".to_string(), |(num, den)| format!("{num}:{den}"));
    terminal::print_status("Pixel aspect", &sar, false);
    let fps = profile
        .frame_rate
        .map_or_else(|| "unknown".to_string(), |r| format!("{} ({:.3} fps)", r, r.as_f64()));
    terminal::print_status("Frame rate", &fps, false);
    let bitrate = profile
        .bit_rate
        .map_or_else(|| "unknown".to_string(), |b| format!("{} kb/s", b / 1000));
    terminal::print_status("Bitrate", &bitrate, false);
    terminal::print_status("Pixel format", or_unknown(profile.pixel_format.as_deref()), false);
    terminal::print_status(
        "Color",
        &format!(
            "{} / {} / {} / {}",
            or_unknown(profile.color_space.as_deref()),
            or_unknown(profile.color_range.as_deref()),
            or_unknown(profile.color_transfer.as_deref()),
            or_unknown(profile.color_primaries.as_deref()),
        ),
        false,
    );
    if let Some(duration) = profile.duration_secs {
        terminal::print_status("Duration", &format_duration(duration), false);
    }
    let audio = if profile.has_audio {
        or_unknown(profile.audio_codec.as_deref()).to_string()
    } else {
        "none".to_string()
    };
    terminal::print_status("Audio", &audio, false);
    if let Ok(meta) = std::fs::metadata(&report.input) {
        terminal::print_status("Size", &format_bytes(meta.len()), false);
    }

    let fit = &report.transform;
    terminal::print_section("Fit");
    terminal::print_status(
        "Display size",
        &format!("{}x{}", report.visual.display_width, report.visual.display_height),
        false,
    );
    terminal::print_status("Scaled to", &format!("{}x{}", fit.scaled_width, fit.scaled_height), true);
    terminal::print_status(
        "Padding",
        &format!(
            "top {} bottom {} left {} right {}",
            fit.pad_top, fit.pad_bottom, fit.pad_left, fit.pad_right
        ),
        false,
    );

    terminal::print_section("Command");
    terminal::print_status("Output", &report.output.display().to_string(), false);
    log::info!("");
    log::info!("{}", report.command_line);
}

/// Runs the info command.
pub fn run_info(args: &InfoArgs) -> CliResult<u8> {
    let report = build_report(&SystemCommandRunner, args)?;
    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use crate::cli::ToolArgs;
    use reframe_core::external::{CommandOutput, RunOptions};
    use reframe_core::{CoreError, VideoCodec};

    const PORTRAIT_PHONE: &str = r#"{"streams":[
        {"codec_type":"video","codec_name":"h264","width":1920,"height":1080,
         "r_frame_rate":"30/1","bit_rate":"8000000","pix_fmt":"yuv420p",
         "side_data_list":[{"side_data_type":"Display Matrix","rotation":-90}]},
        {"codec_type":"audio","codec_name":"aac"}],
        "format":{"duration":"12.5"}}"#;

    /// Serves canned ffprobe output; everything else answers `-version`.
    struct FakeProbe {
        json: &'static str,
    }

    impl CommandRunner for FakeProbe {
        fn run(&self, _program: &Path, args: &[String], _options: &RunOptions<'_>) -> CliResult<CommandOutput> {
            let stdout = if args.iter().any(|a| a == "-show_streams") {
                self.json.to_string()
            } else if args.iter().any(|a| a == "-version") {
                "ffprobe version 7.0".to_string()
            } else {
                "{}".to_string()
            };
            Ok(CommandOutput {
                exit_code: Some(0),
                stdout,
                stderr: String::new(),
            })
        }
    }

    fn info_args(file: &str) -> InfoArgs {
        InfoArgs {
            file: PathBuf::from(file),
            json: false,
            codec: VideoCodec::H264,
            crf: None,
            rotate: None,
            tools: ToolArgs {
                ffmpeg: Some(PathBuf::from("/usr/bin/ffmpeg")),
                ffprobe: Some(PathBuf::from("/usr/bin/ffprobe")),
            },
        }
    }

    #[test]
    fn test_report_for_rotated_landscape_source() {
        let runner = FakeProbe { json: PORTRAIT_PHONE };
        let report = build_report(&runner, &info_args("/clips/phone.mp4")).unwrap();

        assert_eq!(report.visual.display_width, 1080);
        assert_eq!(report.visual.display_height, 1920);
        assert!(!report.transform.is_padded());
        assert_eq!(report.output, PathBuf::from("/clips/9x16_output/phone.mp4"));
        assert!(report.command_line.starts_with("/usr/bin/ffmpeg "));
        assert!(report.ffmpeg_args.iter().any(|a| a == "/clips/phone.mp4"));
        assert_eq!(report.ffmpeg_args.last().map(String::as_str), Some("/clips/9x16_output/phone.mp4"));
    }

    #[test]
    fn test_json_report_contains_transform() {
        let runner = FakeProbe { json: PORTRAIT_PHONE };
        let report = build_report(&runner, &info_args("/clips/phone.mp4")).unwrap();
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["transform"]["scaled_width"], 1080);
        assert_eq!(value["transform"]["scaled_height"], 1920);
        assert_eq!(value["visual_dimensions"]["display_width"], 1080);
        assert_eq!(value["profile"]["coded_width"], 1920);
        assert!(value["ffmpeg_args"].is_array());
    }

    #[test]
    fn test_rotation_override_replaces_display_matrix() {
        let runner = FakeProbe { json: PORTRAIT_PHONE };
        let mut args = info_args("/clips/phone.mp4");
        args.rotate = Some(Rotation::None);
        let report = build_report(&runner, &args).unwrap();

        assert_eq!(report.visual.display_width, 1920);
        assert_eq!(report.transform.scaled_height, 608);
        assert!(report.ffmpeg_args.iter().any(|a| a == "-noautorotate"));
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["rotate_override"], 0);
    }

    #[test]
    fn test_audio_only_file_is_rejected() {
        let runner = FakeProbe {
            json: r#"{"streams":[{"codec_type":"audio","codec_name":"mp3"}]}"#,
        };
        let result = build_report(&runner, &info_args("/clips/song.mp4"));
        assert!(matches!(result, Err(CoreError::NoVideoStream(_))));
    }
}
