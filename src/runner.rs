//! Batch execution of spectrogram jobs.
//!
//! Jobs are fully independent: each one decodes its own source file,
//! renders its own image, and holds no state across jobs. A single job
//! failure is recorded and never aborts the batch; nothing is retried.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::audio::read_window;
use crate::error::{Error, Result};
use crate::output::progress;
use crate::planner::SpectrogramJob;
use crate::render::render_spectrogram;

/// Aggregated outcome of one batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of jobs that wrote their image.
    pub succeeded: usize,
    /// Failed jobs with their errors.
    pub failed: Vec<(SpectrogramJob, Error)>,
}

impl BatchReport {
    /// Total number of attempted jobs.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed.len()
    }
}

/// Execute one job: read the window, render it, write the PNG.
///
/// Decoder and render buffers are dropped before returning, success or
/// failure; nothing is held across jobs.
///
/// # Errors
///
/// Returns the audio or render error for this job only.
pub fn execute_job(job: &SpectrogramJob, output_dir: &Path) -> Result<PathBuf> {
    let window = read_window(&job.source_path, job.offset_secs, job.window_secs)?;
    let out_path = job.output_path(output_dir);
    render_spectrogram(&window.samples, &out_path)?;
    Ok(out_path)
}

/// Run all jobs across a worker pool.
///
/// `parallelism` of 0 selects the available hardware concurrency. Output
/// filenames are unique per job by construction, so concurrent writers
/// never collide.
///
/// # Errors
///
/// Fails only if the worker pool itself cannot be built; per-job errors
/// are collected into the report.
pub fn run_all(
    jobs: Vec<SpectrogramJob>,
    output_dir: &Path,
    parallelism: usize,
    progress_enabled: bool,
) -> Result<BatchReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .build()
        .map_err(|e| Error::Internal {
            message: format!("failed to build worker pool: {e}"),
        })?;

    let bar = progress::create_batch_progress(jobs.len(), progress_enabled);

    let outcomes: Vec<std::result::Result<(), (SpectrogramJob, Error)>> = pool.install(|| {
        jobs.into_par_iter()
            .map(|job| {
                let outcome = match execute_job(&job, output_dir) {
                    Ok(_) => Ok(()),
                    Err(e) => Err((job, e)),
                };
                progress::inc_progress(bar.as_ref());
                outcome
            })
            .collect()
    });

    progress::finish_progress(bar, "Complete");

    let mut report = BatchReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(()) => report.succeeded += 1,
            Err(failure) => report.failed.push(failure),
        }
    }

    Ok(report)
}
