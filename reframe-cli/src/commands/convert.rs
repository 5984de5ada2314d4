// reframe-cli/src/commands/convert.rs
//
// The `convert` command: turn CLI arguments into a core configuration, run
// the batch with a live progress bar and print the summary.

use crate::cli::ConvertArgs;
use crate::commands::{EXIT_PARTIAL, EXIT_SUCCESS};
use crate::error::CliResult;
use crate::terminal::{self, BatchProgress};
use reframe_core::{BatchResult, CancelFlag, CoreConfig, SystemCommandRunner, run_batch};
use std::time::Duration;

/// Builds and validates the core configuration for a convert run.
pub fn build_config(args: ConvertArgs) -> CliResult<CoreConfig> {
    let mut config = CoreConfig::new(args.inputs);
    config.recursive = args.recursive;
    config.output_subdir = args.output_subdir;
    config.codec = args.codec;
    config.crf = args.crf;
    config.verify_output = !args.no_verify;
    config.rotate = args.rotate;
    config.max_workers = args.workers;
    config.job_timeout = args.timeout.map(Duration::from_secs);
    config.tools = args.tools.resolve();
    config.validate()?;
    Ok(config)
}

fn print_configuration(config: &CoreConfig) {
    terminal::print_section("Configuration");
    for input in &config.input_paths {
        terminal::print_status("Input", &input.display().to_string(), false);
    }
    terminal::print_status("Output subdir", &config.output_subdir, false);
    terminal::print_status("Codec", config.codec.as_str(), true);
    let quality = match config.crf {
        Some(crf) => format!("CRF {crf}"),
        None => "match source bitrate".to_string(),
    };
    terminal::print_status("Quality", &quality, false);
    if let Some(rotate) = config.rotate {
        terminal::print_status("Rotation", &format!("{}° (manual)", rotate.degrees()), false);
    }
    terminal::print_status("Recursive", if config.recursive { "yes" } else { "no" }, false);
    if let Some(workers) = config.max_workers {
        terminal::print_status("Max workers", &workers.to_string(), false);
    }
    if let Some(timeout) = config.job_timeout {
        terminal::print_status("Job timeout", &format!("{}s", timeout.as_secs()), false);
    }
    log::debug!("ffmpeg: {}", config.tools.ffmpeg.display());
    log::debug!("ffprobe: {}", config.tools.ffprobe.display());
}

/// Exit code for a finished batch.
pub fn exit_code_for(result: &BatchResult) -> u8 {
    if result.all_succeeded() {
        EXIT_SUCCESS
    } else {
        EXIT_PARTIAL
    }
}

/// Raises `cancel` on the first interrupt. Returns true when it was already
/// raised, meaning the user asked twice.
fn on_interrupt(cancel: &CancelFlag) -> bool {
    if cancel.is_cancelled() {
        return true;
    }
    cancel.cancel();
    false
}

fn install_interrupt_handler(cancel: &CancelFlag) {
    let cancel = cancel.clone();
    let installed = ctrlc::set_handler(move || {
        if on_interrupt(&cancel) {
            std::process::exit(130);
        }
        log::warn!("Interrupted; stopping running encodes and removing partial outputs");
    });
    if let Err(e) = installed {
        log::warn!("Cannot install Ctrl+C handler: {e}");
    }
}

/// Runs the convert command and returns the exit code.
pub fn run_convert(args: ConvertArgs) -> CliResult<u8> {
    let config = build_config(args)?;
    print_configuration(&config);

    let cancel = CancelFlag::new();
    install_interrupt_handler(&cancel);

    terminal::print_section("Converting");
    let progress = BatchProgress::new();
    let result = run_batch(&SystemCommandRunner, &config, &progress, &cancel);
    terminal::clear_progress_bar();
    let result = result?;

    terminal::print_batch_summary(&result);
    Ok(exit_code_for(&result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use reframe_core::{CoreError, Rotation, VideoCodec};
    use std::path::PathBuf;

    fn convert_args(extra: &[&str]) -> ConvertArgs {
        let mut argv = vec!["reframe", "convert"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Convert(args) => args,
            other => panic!("Unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_build_config_maps_every_flag() {
        let args = convert_args(&[
            "in.mp4",
            "--codec",
            "av1",
            "--crf",
            "35",
            "--workers",
            "2",
            "--timeout",
            "90",
            "--no-verify",
            "--rotate",
            "90",
            "--recursive",
            "--output-subdir",
            "portrait",
            "--ffmpeg",
            "/x/ffmpeg",
            "--ffprobe",
            "/x/ffprobe",
        ]);
        let config = build_config(args).unwrap();
        assert_eq!(config.input_paths, vec![PathBuf::from("in.mp4")]);
        assert_eq!(config.codec, VideoCodec::Av1);
        assert_eq!(config.crf, Some(35));
        assert_eq!(config.max_workers, Some(2));
        assert_eq!(config.job_timeout, Some(Duration::from_secs(90)));
        assert!(!config.verify_output);
        assert_eq!(config.rotate, Some(Rotation::Cw90));
        assert!(config.recursive);
        assert_eq!(config.output_subdir, "portrait");
        assert_eq!(config.tools.ffmpeg, PathBuf::from("/x/ffmpeg"));
        assert_eq!(config.tools.ffprobe, PathBuf::from("/x/ffprobe"));
    }

    #[test]
    fn test_build_config_rejects_out_of_range_crf() {
        let args = convert_args(&["in.mp4", "--crf", "60"]);
        assert!(matches!(build_config(args), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_build_config_rejects_nested_subdir_and_zero_workers() {
        let args = convert_args(&["in.mp4", "--output-subdir", "a/b"]);
        assert!(matches!(build_config(args), Err(CoreError::Config(_))));
        let args = convert_args(&["in.mp4", "--workers", "0"]);
        assert!(matches!(build_config(args), Err(CoreError::Config(_))));
    }

    #[test]
    fn test_second_interrupt_forces_exit() {
        let cancel = CancelFlag::new();
        assert!(!on_interrupt(&cancel));
        assert!(cancel.is_cancelled());
        assert!(on_interrupt(&cancel));
    }

    #[test]
    fn test_exit_code_for_partial_failure() {
        let mut result = BatchResult {
            total: 3,
            succeeded: 3,
            failed: 0,
            failures: Vec::new(),
            output_dirs: Default::default(),
            jobs: Vec::new(),
            workers: 2,
            elapsed: Duration::ZERO,
        };
        assert_eq!(exit_code_for(&result), EXIT_SUCCESS);
        result.succeeded = 2;
        result.failed = 1;
        result.failures.push(reframe_core::JobFailure {
            input_path: PathBuf::from("/v/bad.mp4"),
            stage: reframe_core::FailureStage::Probe,
            reason: "No video stream found".to_string(),
        });
        assert_eq!(exit_code_for(&result), EXIT_PARTIAL);
    }
}
