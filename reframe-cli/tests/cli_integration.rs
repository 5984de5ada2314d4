use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use tempfile::tempdir;

const MISSING_FFMPEG: &str = "/nonexistent/reframe-test/ffmpeg";
const MISSING_FFPROBE: &str = "/nonexistent/reframe-test/ffprobe";

// Helper function to get the path to the compiled binary
fn reframe_cmd() -> Command {
    let mut cmd = Command::cargo_bin("reframe").expect("Failed to find reframe binary");
    cmd.env_remove("REFRAME_FFMPEG")
        .env_remove("REFRAME_FFPROBE")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    reframe_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("convert"))
        .stdout(contains("check"))
        .stdout(contains("info"));
}

#[test]
fn test_convert_without_tools_is_fatal() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    std::fs::write(input_dir.path().join("clip.mp4"), "dummy content")?;

    reframe_cmd()
        .arg("convert")
        .arg(input_dir.path())
        .args(["--ffmpeg", MISSING_FFMPEG, "--ffprobe", MISSING_FFPROBE])
        .assert()
        .code(1)
        .stderr(contains("not found"))
        .stderr(contains(MISSING_FFPROBE));

    // Nothing was started, so no output directory exists
    assert!(!input_dir.path().join("9x16_output").exists());
    Ok(())
}

#[test]
fn test_convert_rejects_unparseable_crf() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    reframe_cmd()
        .arg("convert")
        .arg(input_dir.path())
        .args(["--crf", "300"])
        .assert()
        .failure()
        .stderr(contains("invalid value '300'"));
    Ok(())
}

#[test]
fn test_convert_rejects_crf_above_codec_range() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    reframe_cmd()
        .arg("convert")
        .arg(input_dir.path())
        .args(["--crf", "60", "--ffmpeg", MISSING_FFMPEG, "--ffprobe", MISSING_FFPROBE])
        .assert()
        .code(1)
        .stderr(contains("out of range"));
    Ok(())
}

#[test]
fn test_convert_rejects_nested_output_subdir() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    reframe_cmd()
        .arg("convert")
        .arg(input_dir.path())
        .args(["--output-subdir", "a/b", "--ffmpeg", MISSING_FFMPEG, "--ffprobe", MISSING_FFPROBE])
        .assert()
        .code(1)
        .stderr(contains("single directory name"));
    Ok(())
}

#[test]
fn test_convert_rejects_non_quarter_turn_rotation() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    reframe_cmd()
        .arg("convert")
        .arg(input_dir.path())
        .args(["--rotate", "45"])
        .assert()
        .failure()
        .stderr(contains("invalid value '45'"))
        .stderr(contains("0, 90, 180, 270"));
    Ok(())
}

#[test]
fn test_convert_requires_an_input() {
    reframe_cmd().arg("convert").assert().failure();
}

#[test]
fn test_check_reports_missing_tools() {
    reframe_cmd()
        .arg("check")
        .args(["--ffmpeg", MISSING_FFMPEG, "--ffprobe", MISSING_FFPROBE])
        .assert()
        .code(1)
        .stderr(contains("unavailable"))
        .stderr(contains(MISSING_FFMPEG));
}

#[test]
fn test_info_without_ffprobe_is_fatal() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let file = input_dir.path().join("clip.mov");
    std::fs::write(&file, "dummy content")?;

    reframe_cmd()
        .arg("info")
        .arg(&file)
        .args(["--json", "--ffmpeg", MISSING_FFMPEG, "--ffprobe", MISSING_FFPROBE])
        .assert()
        .code(1)
        .stdout(predicates::str::is_empty())
        .stderr(contains("not found"));
    Ok(())
}

#[test]
fn test_log_dir_receives_run_log() -> Result<(), Box<dyn Error>> {
    let input_dir = tempdir()?;
    let log_dir = tempdir()?;
    std::fs::write(input_dir.path().join("clip.mp4"), "dummy content")?;

    reframe_cmd()
        .arg("--log-dir")
        .arg(log_dir.path())
        .arg("convert")
        .arg(input_dir.path())
        .args(["--ffmpeg", MISSING_FFMPEG, "--ffprobe", MISSING_FFPROBE])
        .assert()
        .code(1);

    let logs: Vec<_> = std::fs::read_dir(log_dir.path())?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("reframe_run_"))
        })
        .collect();
    assert_eq!(logs.len(), 1, "expected one run log, found {:?}", logs);

    let contents = std::fs::read_to_string(&logs[0])?;
    assert!(contents.contains("not found"), "log was: {contents}");
    assert!(!contents.contains('\u{1b}'), "log contains ANSI escapes");
    Ok(())
}
