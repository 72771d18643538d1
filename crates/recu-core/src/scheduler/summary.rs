//! Per-job results of one run and their totals.

use std::path::PathBuf;

use crate::mux::StopReason;
use crate::resolver::BlockReason;

#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// Output written (`None`: empty range, nothing to write).
    Completed { path: Option<PathBuf> },
    /// Manifest saved without downloading content.
    PlaylistSaved { path: PathBuf },
    /// Stopped early; checkpoint recorded at `index`.
    FailedAt { index: usize, reason: StopReason },
    Blocked(BlockReason),
    /// Resolution or job-entry error.
    Fatal(String),
    /// Not started because the run was aborted.
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobReport {
    pub slot: usize,
    pub url: String,
    pub status: JobStatus,
}

impl JobReport {
    pub fn new(slot: usize, url: impl Into<String>, status: JobStatus) -> Self {
        Self {
            slot,
            url: url.into(),
            status,
        }
    }
}

/// Totals over all jobs of a run, plus the individual reports in slot order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub completed: usize,
    pub failed: usize,
    pub blocked: usize,
    pub fatal: usize,
    pub skipped: usize,
    pub reports: Vec<JobReport>,
}

impl RunSummary {
    pub fn record(&mut self, report: JobReport) {
        match report.status {
            JobStatus::Completed { .. } | JobStatus::PlaylistSaved { .. } => self.completed += 1,
            JobStatus::FailedAt { .. } => self.failed += 1,
            JobStatus::Blocked(_) => self.blocked += 1,
            JobStatus::Fatal(_) => self.fatal += 1,
            JobStatus::Skipped => self.skipped += 1,
        }
        let at = self.reports.partition_point(|r| r.slot <= report.slot);
        self.reports.insert(at, report);
    }

    pub fn merge(&mut self, other: RunSummary) {
        for r in other.reports {
            self.record(r);
        }
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }
}
