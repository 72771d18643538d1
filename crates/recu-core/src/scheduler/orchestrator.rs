use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::RecuConfig;
use crate::control::AbortToken;
use crate::http::{HeaderProfiles, HttpClient};
use crate::job::{CheckpointSink, JobSpec};
use crate::mux::{
    Checkpoint, MuxOptions, MuxOutcome, ProgressStats, RangeSpec, SampleSpec, SegmentMuxEngine,
};
use crate::playlist::Manifest;
use crate::resolver::{ManifestResolver, ResolutionOutcome, ResolverOptions};

use super::summary::{JobReport, JobStatus, RunSummary};

/// Everything a job task needs; cloned into each blocking task.
#[derive(Clone)]
struct JobContext {
    client: Arc<dyn HttpClient>,
    profiles: HeaderProfiles,
    resolver: ResolverOptions,
    mux: MuxOptions,
    sink: Arc<dyn CheckpointSink>,
    abort: AbortToken,
    progress_tx: Option<mpsc::Sender<ProgressStats>>,
}

impl JobContext {
    /// Resolve jobs one after another. Stops resolving (jobs reported as
    /// skipped) once the run is aborted.
    fn resolve_all(&self, jobs: Vec<JobSpec>) -> (Vec<(JobSpec, Manifest)>, RunSummary) {
        let mut summary = RunSummary::default();
        let mut resolved = Vec::with_capacity(jobs.len());
        let resolver =
            ManifestResolver::new(self.client.as_ref(), &self.profiles, self.resolver.clone());
        for job in jobs {
            if self.abort.is_triggered() {
                summary.record(JobReport::new(job.slot, &job.url, JobStatus::Skipped));
                continue;
            }
            match resolver.resolve(&job.url) {
                ResolutionOutcome::Resolved(manifest) => {
                    tracing::info!(
                        slot = job.slot,
                        url = %job.url,
                        basename = manifest.output_basename(),
                        segments = manifest.len(),
                        "resolved"
                    );
                    resolved.push((job, manifest));
                }
                ResolutionOutcome::Blocked(reason) => {
                    tracing::warn!(slot = job.slot, url = %job.url, "{}", reason);
                    summary.record(JobReport::new(job.slot, &job.url, JobStatus::Blocked(reason)));
                }
                ResolutionOutcome::Fatal(e) => {
                    tracing::error!(slot = job.slot, url = %job.url, error = %e, "resolution failed");
                    summary.record(JobReport::new(
                        job.slot,
                        &job.url,
                        JobStatus::Fatal(e.to_string()),
                    ));
                }
            }
        }
        (resolved, summary)
    }

    fn engine(&self, slot: Option<usize>) -> SegmentMuxEngine<'_> {
        let engine = SegmentMuxEngine::new(self.client.as_ref(), &self.profiles, self.mux.clone())
            .with_abort(self.abort.clone());
        match &self.progress_tx {
            Some(tx) => engine.with_progress(slot, tx.clone()),
            None => engine,
        }
    }

    /// Mux one resolved job. On early stop, record the checkpoint and keep the
    /// manifest next to the partial output so the job can be resumed.
    fn mux_job(&self, job: &JobSpec, manifest: &Manifest) -> JobReport {
        let outcome = self
            .engine(Some(job.slot))
            .run(manifest, job.range(), job.sample(), job.checkpoint());
        let status = match outcome {
            MuxOutcome::Completed { path } => {
                tracing::info!(slot = job.slot, url = %job.url, "completed");
                // A finished resume must not append again on the next run.
                if job.resume_index.is_some_and(|i| i > 0) {
                    if let Err(e) = self.sink.persist(job.slot, Checkpoint::new(0)) {
                        tracing::error!(slot = job.slot, error = %format!("{:#}", e), "failed to clear checkpoint");
                    }
                }
                JobStatus::Completed { path }
            }
            MuxOutcome::FailedAt { index, reason } => {
                tracing::warn!(slot = job.slot, url = %job.url, index, %reason, "download stopped");
                if let Err(e) = self.sink.persist(job.slot, Checkpoint::new(index)) {
                    tracing::error!(slot = job.slot, error = %format!("{:#}", e), "failed to save checkpoint");
                }
                if let Err(e) = self.write_playlist(manifest) {
                    tracing::error!(slot = job.slot, error = %format!("{:#}", e), "failed to write playlist data");
                }
                JobStatus::FailedAt { index, reason }
            }
        };
        JobReport::new(job.slot, &job.url, status)
    }

    fn write_playlist(&self, manifest: &Manifest) -> Result<PathBuf> {
        let path = self
            .mux
            .output_dir
            .join(format!("{}.m3u8", manifest.output_basename()));
        std::fs::write(&path, manifest.raw())
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

/// Runs job-store jobs: resolve every job first, then download.
///
/// Failures are job-scoped: a blocked, unresolvable or failed job is reported
/// in the [`RunSummary`] and the others continue. Only task join failures are
/// returned as errors.
pub struct JobOrchestrator {
    ctx: JobContext,
    stagger: Duration,
}

impl JobOrchestrator {
    pub fn new(
        client: Arc<dyn HttpClient>,
        profiles: HeaderProfiles,
        config: &RecuConfig,
        output_dir: impl Into<PathBuf>,
        sink: Arc<dyn CheckpointSink>,
    ) -> Self {
        Self {
            ctx: JobContext {
                client,
                profiles,
                resolver: ResolverOptions::from(config),
                mux: MuxOptions::new(output_dir, config),
                sink,
                abort: AbortToken::new(),
                progress_tx: None,
            },
            stagger: config.launch_stagger(),
        }
    }

    pub fn with_abort(mut self, abort: AbortToken) -> Self {
        self.ctx.abort = abort;
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<ProgressStats>) -> Self {
        self.ctx.progress_tx = Some(tx);
        self
    }

    /// Pause between parallel launches.
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    async fn resolve_all(
        &self,
        jobs: Vec<JobSpec>,
    ) -> Result<(Vec<(JobSpec, Manifest)>, RunSummary)> {
        let ctx = self.ctx.clone();
        tokio::task::spawn_blocking(move || ctx.resolve_all(jobs))
            .await
            .context("resolve task join")
    }

    /// Resolve all jobs, then download them concurrently, launching one task
    /// per job with the configured stagger.
    pub async fn run_parallel(&self, jobs: Vec<JobSpec>) -> Result<RunSummary> {
        let (resolved, mut summary) = self.resolve_all(jobs).await?;
        let count = resolved.len();
        let mut join_set = JoinSet::new();

        for (i, (job, manifest)) in resolved.into_iter().enumerate() {
            if self.ctx.abort.is_triggered() {
                summary.record(JobReport::new(job.slot, &job.url, JobStatus::Skipped));
                continue;
            }
            let ctx = self.ctx.clone();
            join_set.spawn_blocking(move || ctx.mux_job(&job, &manifest));
            if i + 1 < count && !self.stagger.is_zero() {
                tokio::time::sleep(self.stagger).await;
            }
        }

        while let Some(res) = join_set.join_next().await {
            summary.record(res.context("mux task join")?);
        }
        Ok(summary)
    }

    /// Resolve all jobs, then download them one at a time.
    pub async fn run_serial(&self, jobs: Vec<JobSpec>) -> Result<RunSummary> {
        let total = jobs.len();
        let (resolved, mut summary) = self.resolve_all(jobs).await?;

        for (job, manifest) in resolved {
            if self.ctx.abort.is_triggered() {
                summary.record(JobReport::new(job.slot, &job.url, JobStatus::Skipped));
                continue;
            }
            tracing::info!("{}/{}: {}", job.slot + 1, total, manifest.output_basename());
            let ctx = self.ctx.clone();
            let report = tokio::task::spawn_blocking(move || ctx.mux_job(&job, &manifest))
                .await
                .context("mux task join")?;
            summary.record(report);
        }
        Ok(summary)
    }

    /// Resolve all jobs and only save each manifest as `<basename>.m3u8`.
    pub async fn fetch_playlists(&self, jobs: Vec<JobSpec>) -> Result<RunSummary> {
        let (resolved, mut summary) = self.resolve_all(jobs).await?;
        for (job, manifest) in resolved {
            let status = match self.ctx.write_playlist(&manifest) {
                Ok(path) => {
                    tracing::info!(slot = job.slot, path = %path.display(), "playlist saved");
                    JobStatus::PlaylistSaved { path }
                }
                Err(e) => {
                    tracing::error!(slot = job.slot, error = %format!("{:#}", e), "failed to write playlist data");
                    JobStatus::Fatal(format!("{:#}", e))
                }
            };
            summary.record(JobReport::new(job.slot, &job.url, status));
        }
        Ok(summary)
    }

    /// Download the content of an already resolved (e.g. saved) manifest. No
    /// checkpoint is persisted; the caller reports the resume index.
    pub async fn mux_local(
        &self,
        manifest: Manifest,
        range: RangeSpec,
        sample: SampleSpec,
        checkpoint: Option<Checkpoint>,
    ) -> Result<MuxOutcome> {
        let ctx = self.ctx.clone();
        tokio::task::spawn_blocking(move || {
            ctx.engine(None).run(&manifest, range, sample, checkpoint)
        })
        .await
        .context("mux task join")
    }
}
