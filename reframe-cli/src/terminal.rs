//! Terminal UI components and styling for reframe.
//!
//! Everything user-facing goes through the `log` facade so it reaches both the
//! console and the optional log file. The batch progress bar lives in a shared
//! slot; console logging suspends it while a line is written.

use console::{Term, style};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{error, info, warn};
use reframe_core::{BatchResult, JobStatus, ProgressReporter, TranscodeJob, format_bytes, format_duration};
use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{LazyLock, Mutex};
use std::time::Duration;

const LABEL_WIDTH: usize = 15;

/// Terminal state management
struct TerminalState {
    current_progress: Option<ProgressBar>,
}

static TERMINAL_STATE: LazyLock<Mutex<TerminalState>> =
    LazyLock::new(|| Mutex::new(TerminalState { current_progress: None }));

fn current_progress() -> Option<ProgressBar> {
    TERMINAL_STATE
        .lock()
        .ok()
        .and_then(|state| state.current_progress.clone())
}

/// Runs `f` with the progress bar (if any) hidden, so the line `f` writes
/// does not get mixed into the bar.
pub fn suspend_progress<F: FnOnce()>(f: F) {
    match current_progress() {
        Some(pb) => pb.suspend(f),
        None => f(),
    }
}

// ============================================================================
// PRINTERS
// ============================================================================

/// Print a section header for major workflow phases
pub fn print_section(title: &str) {
    info!("");
    info!("===== {} =====", style(title.to_uppercase()).cyan().for_stderr());
    info!("");
}

/// Print a subsection or processing step
pub fn print_processing(message: &str) {
    info!("  » {}", style(message).bold().for_stderr());
}

/// Print a detail line under a processing step
pub fn print_sub_item(message: &str) {
    info!("    {message}");
}

/// Print a status line (key-value pair)
pub fn print_status(label: &str, value: &str, highlight: bool) {
    let padding = LABEL_WIDTH.saturating_sub(label.chars().count()).max(1);
    if highlight {
        info!("  {}:{}{}", label, " ".repeat(padding), style(value).bold().for_stderr());
    } else {
        info!("  {}:{}{}", label, " ".repeat(padding), value);
    }
}

pub fn print_success(message: &str) {
    info!("  {} {}", style("✓").green().for_stderr(), message);
}

pub fn print_warning(message: &str) {
    warn!("  ⚠ {message}");
}

/// Print an error with an optional suggestion. Always shown.
pub fn print_error(title: &str, message: &str, suggestion: Option<&str>) {
    error!("{} {}", style("✗").red().for_stderr(), style(title).red().bold().for_stderr());
    error!("  Message:    {message}");
    if let Some(suggestion) = suggestion {
        error!("  Suggestion: {suggestion}");
    }
}

// ============================================================================
// BATCH PROGRESS
// ============================================================================

/// Units per job on the progress bar, one per percent.
const JOB_UNITS: u64 = 100;

fn init_progress_bar(total_jobs: usize) -> ProgressBar {
    let pb = ProgressBar::new(total_jobs as u64 * JOB_UNITS);

    let term_width = Term::stderr().size().1 as usize;
    let template = if term_width >= 100 {
        "  ⧖ {prefix} {percent:>3}% [{bar:30}] ({elapsed_precise}) {wide_msg}"
    } else if term_width >= 60 {
        "  ⧖ {prefix} {percent:>3}% [{bar:20}]"
    } else {
        "  ⧖ {percent:>3}% [{bar:10}]"
    };
    let style = ProgressStyle::default_bar()
        .template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##.");
    pb.set_style(style);

    if !std::io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Clear the current progress bar, if one is showing.
pub fn clear_progress_bar() {
    if let Ok(mut state) = TERMINAL_STATE.lock() {
        if let Some(pb) = state.current_progress.take() {
            pb.finish_and_clear();
        }
    }
}

/// [`ProgressReporter`] that drives a single bar across the whole batch and
/// logs one line per finished file.
#[derive(Debug, Default)]
pub struct BatchProgress {
    total: AtomicUsize,
    finished: AtomicUsize,
    running: Mutex<HashMap<PathBuf, f32>>,
}

impl BatchProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn refresh(&self) {
        let Some(pb) = current_progress() else {
            return;
        };
        let finished = self.finished.load(Ordering::Relaxed);
        let in_flight: u64 = self
            .running
            .lock()
            .map(|running| running.values().map(|p| p.clamp(0.0, 100.0) as u64).sum())
            .unwrap_or(0);
        pb.set_position(finished as u64 * JOB_UNITS + in_flight);
        pb.set_prefix(format!("{}/{} files", finished, self.total.load(Ordering::Relaxed)));
    }
}

impl ProgressReporter for BatchProgress {
    fn on_batch_start(&self, total_jobs: usize, workers: usize) {
        self.total.store(total_jobs, Ordering::Relaxed);
        print_processing(&format!("Converting {total_jobs} file(s) with {workers} worker(s)"));
        if let Ok(mut state) = TERMINAL_STATE.lock() {
            state.current_progress = Some(init_progress_bar(total_jobs));
        }
        self.refresh();
    }

    fn on_job_start(&self, input: &Path) {
        if let Ok(mut running) = self.running.lock() {
            running.insert(input.to_path_buf(), 0.0);
        }
        log::debug!("Started {}", input.display());
        if let Some(pb) = current_progress() {
            pb.set_message(file_label(input));
        }
        self.refresh();
    }

    fn on_job_progress(&self, input: &Path, percent: f32) {
        if let Ok(mut running) = self.running.lock() {
            running.insert(input.to_path_buf(), percent);
        }
        self.refresh();
    }

    fn on_job_finish(&self, job: &TranscodeJob) {
        if let Ok(mut running) = self.running.lock() {
            running.remove(&job.input_path);
        }
        self.finished.fetch_add(1, Ordering::Relaxed);
        self.refresh();

        match job.status {
            JobStatus::Succeeded => {
                let size = job.output_size.map(format_bytes).unwrap_or_default();
                let elapsed = job
                    .elapsed
                    .map(|d| format_duration(d.as_secs_f64()))
                    .unwrap_or_default();
                print_success(&format!("{} ({}, {})", file_label(&job.input_path), size, elapsed));
            }
            _ => {
                let stage = job.failure_stage.map(|s| s.to_string()).unwrap_or_default();
                error!(
                    "  {} {} [{}]: {}",
                    style("✗").red().for_stderr(),
                    job.input_path.display(),
                    stage,
                    job.error_message.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Prints the end-of-run summary: counts, sizes, output directories and
/// every failure with its reason.
pub fn print_batch_summary(result: &BatchResult) {
    print_section("Summary");
    print_status("Files", &result.total.to_string(), false);
    print_status("Succeeded", &result.succeeded.to_string(), true);
    print_status("Failed", &result.failed.to_string(), result.failed > 0);
    print_status("Workers", &result.workers.to_string(), false);
    print_status("Elapsed", &format_duration(result.elapsed.as_secs_f64()), false);
    if result.succeeded > 0 {
        print_status("Input size", &format_bytes(result.input_bytes()), false);
        print_status("Output size", &format_bytes(result.output_bytes()), false);
    }

    if !result.output_dirs.is_empty() {
        info!("");
        print_processing("Output directories");
        for dir in &result.output_dirs {
            print_sub_item(&dir.display().to_string());
        }
    }

    if !result.failures.is_empty() {
        info!("");
        print_processing("Failures");
        for failure in &result.failures {
            error!(
                "    {} [{}]: {}",
                failure.input_path.display(),
                failure.stage,
                failure.reason
            );
        }
    }

    info!("");
    if result.all_succeeded() {
        print_success(&format!("All {} file(s) converted", result.total));
    } else {
        print_warning(&format!("{} of {} file(s) failed", result.failed, result.total));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reframe_core::FailureStage;

    #[test]
    fn test_file_label_uses_file_name() {
        assert_eq!(file_label(Path::new("/videos/trip/clip.mp4")), "clip.mp4");
        assert_eq!(file_label(Path::new("/")), "/");
    }

    #[test]
    fn test_batch_progress_counts_finished_jobs() {
        let progress = BatchProgress::new();
        progress.total.store(2, Ordering::Relaxed);

        let mut job = TranscodeJob::new(PathBuf::from("/v/a.mp4"), "9x16_output");
        progress.on_job_start(&job.input_path);
        progress.on_job_progress(&job.input_path, 40.0);
        assert_eq!(progress.running.lock().unwrap().get(&job.input_path), Some(&40.0));

        job.apply(reframe_core::processing::JobOutcome::failed(FailureStage::Encode, "boom"));
        progress.on_job_finish(&job);
        assert!(progress.running.lock().unwrap().is_empty());
        assert_eq!(progress.finished.load(Ordering::Relaxed), 1);
    }
}
