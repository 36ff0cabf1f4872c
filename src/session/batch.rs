use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::foundation::error::{CompositeError, CompositeResult};
use crate::scene::model::CompositionConfig;
use crate::session::job::{JobRunner, output_name_for};

/// One entry of a batch: where the configuration came from and how decoding went.
#[derive(Debug)]
pub struct BatchJob {
    /// Configuration source, used for reporting and the default output name.
    pub source: PathBuf,
    /// Decoded configuration, or the decode error to report for this job.
    pub config: CompositeResult<CompositionConfig>,
}

impl BatchJob {
    /// Job for an already decoded configuration.
    pub fn new(source: impl Into<PathBuf>, config: CompositionConfig) -> Self {
        Self {
            source: source.into(),
            config: Ok(config),
        }
    }

    /// Decode the configuration file at `path`. Decode errors are kept and reported later.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let source = path.into();
        let config = CompositionConfig::load(&source);
        Self { source, config }
    }
}

/// Result of one batch job.
#[derive(Debug)]
pub struct JobOutcome {
    /// Configuration source.
    pub source: PathBuf,
    /// Saved output path, or the error that aborted the job.
    pub result: CompositeResult<PathBuf>,
}

/// Per-job outcomes of a batch, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per submitted job.
    pub outcomes: Vec<JobOutcome>,
}

impl BatchReport {
    /// Number of jobs whose output was saved.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Number of jobs that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Return `true` when every job succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// Failed jobs with their errors.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &CompositeError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Ok(_) => None,
            Err(e) => Some((o.source.as_path(), e)),
        })
    }
}

fn build_thread_pool(threads: Option<usize>) -> CompositeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(CompositeError::validation("batch 'jobs' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

/// Run independent jobs on a pool of `threads` workers (rayon's default when `None`).
///
/// A failing job never stops or affects the others; every job gets an outcome. Only an invalid
/// worker count fails the batch as a whole.
#[tracing::instrument(skip_all, fields(jobs = jobs.len()))]
pub fn run_batch(
    runner: &JobRunner,
    jobs: Vec<BatchJob>,
    threads: Option<usize>,
) -> CompositeResult<BatchReport> {
    let pool = build_thread_pool(threads)?;
    let outcomes: Vec<JobOutcome> = pool.install(|| {
        jobs.into_par_iter()
            .map(|job| {
                let result = job.config.and_then(|config| {
                    runner.run(&config, &output_name_for(&config, &job.source))
                });
                if let Err(e) = &result {
                    tracing::warn!(source = %job.source.display(), error = %e, "job failed");
                }
                JobOutcome {
                    source: job.source,
                    result,
                }
            })
            .collect()
    });

    let report = BatchReport { outcomes };
    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "batch finished"
    );
    Ok(report)
}

/// List the `*.json` files directly inside `dir`, sorted by path.
pub fn discover_configs(dir: &Path) -> CompositeResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        CompositeError::config_decode(format!("read config dir '{}': {e}", dir.display()))
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| {
                CompositeError::config_decode(format!("read config dir '{}': {e}", dir.display()))
            })?
            .path();
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
#[path = "../../tests/unit/session/batch.rs"]
mod tests;
