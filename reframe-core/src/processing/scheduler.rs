// ============================================================================
// reframe-core/src/processing/scheduler.rs
// ============================================================================
//
// BATCH SCHEDULER: Discovery, fan-out and aggregation for a batch run
//
// Order of operations:
// 1. Validate the configuration and verify ffprobe/ffmpeg. A missing tool
//    stops the run before any job exists.
// 2. Discover inputs and create one job per file.
// 3. Create each distinct output directory once. A directory that cannot be
//    created fails only the jobs that would write into it.
// 4. Run probe -> fit -> encode for every remaining job on a rayon pool built
//    for this batch, sized min(CPUs, override, job count).
// 5. Collect the outcomes into a BatchResult. One job's failure never stops
//    another job.
//
// Probing happens inside the pool as well, so at most `workers` external
// processes run at any time.

use crate::config::CoreConfig;
use crate::discovery::find_processable_files;
use crate::error::{CoreError, CoreResult};
use crate::external::check_dependencies;
use crate::external::ffmpeg::EncodeOptions;
use crate::external::ffprobe_executor::probe;
use crate::external::runner::{CancelFlag, CommandRunner};
use crate::processing::executor::{ExecuteOptions, execute};
use crate::processing::geometry::{resolve_profile, visual_dimensions};
use crate::processing::job::{FailureStage, JobOutcome, JobStatus, TranscodeJob};
use crate::progress_reporting::ProgressReporter;

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// One failed input and why it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub input_path: PathBuf,
    pub stage: FailureStage,
    pub reason: String,
}

/// Aggregate outcome of a batch.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Sorted by input path
    pub failures: Vec<JobFailure>,
    /// Output directories that were created or already existed
    pub output_dirs: BTreeSet<PathBuf>,
    /// Every job, in discovery order
    pub jobs: Vec<TranscodeJob>,
    pub workers: usize,
    pub elapsed: Duration,
}

impl BatchResult {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Summed source size of the jobs that succeeded.
    pub fn input_bytes(&self) -> u64 {
        self.succeeded_jobs().filter_map(|job| job.input_size).sum()
    }

    /// Summed output size of the jobs that succeeded.
    pub fn output_bytes(&self) -> u64 {
        self.succeeded_jobs().filter_map(|job| job.output_size).sum()
    }

    fn succeeded_jobs(&self) -> impl Iterator<Item = &TranscodeJob> {
        self.jobs.iter().filter(|job| job.status == JobStatus::Succeeded)
    }
}

/// Runs a whole batch described by `config`.
///
/// Returns `Err` only for run-scoped problems: invalid configuration, a
/// missing tool, a nonexistent input path, or nothing to process. Everything
/// that goes wrong with an individual file is recorded in the result.
pub fn run_batch(
    runner: &dyn CommandRunner,
    config: &CoreConfig,
    reporter: &dyn ProgressReporter,
    cancel: &CancelFlag,
) -> CoreResult<BatchResult> {
    let started = Instant::now();

    config.validate()?;
    check_dependencies(runner, &config.tools)?;

    let files = find_processable_files(&config.input_paths, config.recursive, &config.output_subdir)?;
    let mut jobs: Vec<TranscodeJob> = files
        .into_iter()
        .map(|path| {
            let mut job = TranscodeJob::new(path, &config.output_subdir);
            job.input_size = std::fs::metadata(&job.input_path).ok().map(|m| m.len());
            job
        })
        .collect();

    let output_dirs = prepare_output_dirs(&mut jobs);

    let workers = config.worker_count(jobs.len());
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("reframe-worker-{i}"))
        .build()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to build worker pool: {e}")))?;

    log::info!("Processing {} file(s) with {} worker(s)", jobs.len(), workers);
    reporter.on_batch_start(jobs.len(), workers);

    for job in jobs.iter().filter(|job| job.is_terminal()) {
        reporter.on_job_finish(job);
    }

    let options = ExecuteOptions {
        tools: &config.tools,
        encode: EncodeOptions {
            codec: config.codec,
            crf: config.crf,
            rotate: config.rotate,
        },
        verify_output: config.verify_output,
        timeout: config.job_timeout,
        cancel: Some(cancel),
        reporter,
    };

    pool.install(|| {
        jobs.par_iter_mut()
            .filter(|job| !job.is_terminal())
            .for_each(|job| run_job(runner, job, &options));
    });

    Ok(summarize(jobs, output_dirs, workers, started.elapsed()))
}

/// Creates each distinct output directory once, failing the jobs of any
/// directory that cannot be created.
fn prepare_output_dirs(jobs: &mut [TranscodeJob]) -> BTreeSet<PathBuf> {
    let mut by_dir: BTreeMap<PathBuf, Vec<usize>> = BTreeMap::new();
    for (index, job) in jobs.iter().enumerate() {
        by_dir.entry(job.output_dir().to_path_buf()).or_default().push(index);
    }

    let mut created = BTreeSet::new();
    for (dir, indices) in by_dir {
        match std::fs::create_dir_all(&dir) {
            Ok(()) => {
                log::debug!("Output directory ready: {}", dir.display());
                created.insert(dir);
            }
            Err(e) => {
                log::error!("Cannot create output directory {}: {}", dir.display(), e);
                let reason = format!("cannot create output directory {}: {}", dir.display(), e);
                for index in indices {
                    jobs[index].apply(JobOutcome::failed(FailureStage::Filesystem, reason.clone()));
                }
            }
        }
    }
    created
}

/// Probe, fit and encode one job, recording the outcome on it.
fn run_job(runner: &dyn CommandRunner, job: &mut TranscodeJob, options: &ExecuteOptions<'_>) {
    let reporter = options.reporter;

    if options.cancel.is_some_and(CancelFlag::is_cancelled) {
        job.apply(JobOutcome::failed(FailureStage::Cancelled, "cancelled before start"));
        reporter.on_job_finish(job);
        return;
    }

    job.status = JobStatus::Running;
    reporter.on_job_start(&job.input_path);

    match probe(runner, &options.tools.ffprobe, &job.input_path) {
        Ok(profile) => {
            let transform = resolve_profile(&profile, options.encode.rotate);
            let dims = visual_dimensions(&profile, options.encode.rotate);
            log::debug!(
                "{}: display {}x{} -> scale {}x{}, pad top {} bottom {} left {} right {}",
                job.input_path.display(),
                dims.display_width,
                dims.display_height,
                transform.scaled_width,
                transform.scaled_height,
                transform.pad_top,
                transform.pad_bottom,
                transform.pad_left,
                transform.pad_right
            );
            job.profile = Some(profile);
            job.transform = Some(transform);
        }
        Err(e) => {
            log::error!("Probe failed for {}: {}", job.input_path.display(), e);
            job.apply(JobOutcome::failed(FailureStage::Probe, e.to_string()));
            reporter.on_job_finish(job);
            return;
        }
    }

    let outcome = execute(runner, job, options);
    if let JobOutcome::Failed { stage, reason } = &outcome {
        log::error!("{} failed ({}): {}", job.input_path.display(), stage, reason);
    }
    job.apply(outcome);
    reporter.on_job_finish(job);
}

fn summarize(
    jobs: Vec<TranscodeJob>,
    output_dirs: BTreeSet<PathBuf>,
    workers: usize,
    elapsed: Duration,
) -> BatchResult {
    let succeeded = jobs.iter().filter(|job| job.status == JobStatus::Succeeded).count();

    let mut failures: Vec<JobFailure> = jobs
        .iter()
        .filter(|job| job.status == JobStatus::Failed)
        .map(|job| JobFailure {
            input_path: job.input_path.clone(),
            stage: job.failure_stage.unwrap_or(FailureStage::Encode),
            reason: job.error_message.clone().unwrap_or_default(),
        })
        .collect();
    failures.sort_by(|a, b| a.input_path.cmp(&b.input_path));

    BatchResult {
        total: jobs.len(),
        succeeded,
        failed: failures.len(),
        failures,
        output_dirs,
        jobs,
        workers,
        elapsed,
    }
}
