//! Segment download and concatenation into one container file.
//!
//! Segments are fetched strictly in index order and appended to the output
//! as they arrive. A run ends either [`MuxOutcome::Completed`] or
//! [`MuxOutcome::FailedAt`] with the index to resume from; the caller
//! persists that index as a checkpoint.

mod output;
mod plan;
mod progress;

pub use output::OutputUnavailable;
pub use plan::{Checkpoint, MuxPlan, RangeSpec, SampleSpec};
pub use progress::{format_eta, format_rate, ProgressStats};

use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::config::RecuConfig;
use crate::control::AbortToken;
use crate::http::{HeaderProfile, HeaderProfiles, Headers, HttpClient};
use crate::playlist::Manifest;
use crate::retry::{FetchPolicy, RetryingFetcher};
use crate::rolling::RollingAverage;

use output::SegmentOutput;

/// Why a run stopped before its stop index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The abort token was tripped.
    Aborted,
    /// A segment failed after all retries (or expired).
    FetchExhausted,
    /// The output file could not be created.
    OutputUnavailable,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StopReason::Aborted => "aborted",
            StopReason::FetchExhausted => "segment download failed",
            StopReason::OutputUnavailable => "output file unavailable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MuxOutcome {
    /// Stop index reached. `path` is `None` when nothing was written
    /// (empty range).
    Completed { path: Option<PathBuf> },
    /// Stopped early; `index` is the first segment not yet written.
    FailedAt { index: usize, reason: StopReason },
}

/// Where and how segments are written.
#[derive(Debug, Clone)]
pub struct MuxOptions {
    pub output_dir: PathBuf,
    pub extension: String,
    pub policy: FetchPolicy,
}

impl MuxOptions {
    pub fn new(output_dir: impl Into<PathBuf>, cfg: &RecuConfig) -> Self {
        Self {
            output_dir: output_dir.into(),
            extension: cfg.output_extension.clone(),
            policy: cfg.segment_policy(),
        }
    }
}

/// Downloads and concatenates the segments of one manifest. Blocking; run
/// from `spawn_blocking` in async code.
pub struct SegmentMuxEngine<'a> {
    client: &'a dyn HttpClient,
    headers: Headers,
    options: MuxOptions,
    abort: AbortToken,
    slot: Option<usize>,
    progress_tx: Option<mpsc::Sender<ProgressStats>>,
}

impl<'a> SegmentMuxEngine<'a> {
    pub fn new(client: &'a dyn HttpClient, profiles: &HeaderProfiles, options: MuxOptions) -> Self {
        Self {
            client,
            headers: profiles.build(&HeaderProfile::Segment),
            options,
            abort: AbortToken::new(),
            slot: None,
            progress_tx: None,
        }
    }

    pub fn with_abort(mut self, abort: AbortToken) -> Self {
        self.abort = abort;
        self
    }

    /// Send a [`ProgressStats`] after every segment. Sends never block; a
    /// full channel drops the snapshot.
    pub fn with_progress(mut self, slot: Option<usize>, tx: mpsc::Sender<ProgressStats>) -> Self {
        self.slot = slot;
        self.progress_tx = Some(tx);
        self
    }

    pub fn run(
        &self,
        manifest: &Manifest,
        range: RangeSpec,
        sample: SampleSpec,
        checkpoint: Option<Checkpoint>,
    ) -> MuxOutcome {
        let segments = manifest.segments();
        let segment_count = segments.len();
        let basename = manifest.output_basename();
        let Some(plan) = MuxPlan::new(segment_count, range, sample, checkpoint) else {
            tracing::info!(basename, ?range, "empty range, nothing to download");
            return MuxOutcome::Completed { path: None };
        };
        tracing::debug!(
            basename,
            start = plan.start,
            stop = plan.stop,
            stride = plan.stride,
            resume = plan.resume,
            "mux plan"
        );

        let dir = &self.options.output_dir;
        let ext = &self.options.extension;
        let mut output = if plan.resume {
            SegmentOutput::resume(dir, basename, ext)
        } else {
            SegmentOutput::fresh(dir, basename, ext)
        };
        let fetcher = RetryingFetcher::new(self.client, self.options.policy);
        let mut sizes = RollingAverage::default();
        let mut durations = RollingAverage::default();
        let mut bytes_written = 0u64;

        let mut index = plan.start;
        while index < plan.stop {
            let started = Instant::now();
            let data = match fetcher.fetch(&segments[index], &self.headers) {
                Ok(data) => data,
                Err(e) => {
                    tracing::error!(
                        basename,
                        index,
                        error = %e,
                        "failed at {:.2}%",
                        percent(index, segment_count)
                    );
                    return MuxOutcome::FailedAt {
                        index,
                        reason: StopReason::FetchExhausted,
                    };
                }
            };
            let elapsed = started.elapsed().as_secs_f64();

            if let Err(e) = output.ensure_open() {
                tracing::error!(basename, error = %e, "cannot write output");
                return MuxOutcome::FailedAt {
                    index,
                    reason: StopReason::OutputUnavailable,
                };
            }
            // A failed write is reported but does not stop the run.
            match output.append(&data) {
                Ok(()) => bytes_written += data.len() as u64,
                Err(e) => tracing::error!(
                    basename,
                    index,
                    path = %output.path().display(),
                    error = %e,
                    "failed to write segment"
                ),
            }

            sizes.add(data.len() as f64);
            durations.add(elapsed);
            let next = index + plan.stride;
            self.report(ProgressStats {
                slot: self.slot,
                basename: basename.to_string(),
                index,
                segment_count,
                percent: percent(index, segment_count),
                eta_secs: durations.mean() * plan.remaining_from(next) as f64,
                bytes_per_sec: speed(&sizes, &durations),
                bytes_written,
            });
            index = next;

            if index < plan.stop && self.abort.is_triggered() {
                tracing::info!(basename, index, "aborted, stopping before next segment");
                return MuxOutcome::FailedAt {
                    index,
                    reason: StopReason::Aborted,
                };
            }
        }

        tracing::info!(basename, bytes_written, path = %output.path().display(), "mux complete");
        MuxOutcome::Completed {
            path: output.is_open().then(|| output.path().to_path_buf()),
        }
    }

    fn report(&self, stats: ProgressStats) {
        tracing::trace!(
            basename = %stats.basename,
            index = stats.index,
            percent = stats.percent,
            eta = %stats.eta(),
            rate = %stats.rate(),
            "segment written"
        );
        if let Some(tx) = &self.progress_tx {
            let _ = tx.try_send(stats);
        }
    }
}

fn percent(index: usize, segment_count: usize) -> f64 {
    if segment_count == 0 {
        return 100.0;
    }
    index as f64 / segment_count as f64 * 100.0
}

fn speed(sizes: &RollingAverage, durations: &RollingAverage) -> f64 {
    let d = durations.mean();
    if d <= 0.0 {
        return 0.0;
    }
    sizes.mean() / d
}
