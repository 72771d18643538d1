//! Settings shared by the commands that talk to the site.

use anyhow::Result;
use recu_core::config::RecuConfig;
use recu_core::http::{CurlClient, HeaderProfiles, Headers};
use recu_core::job::{JobStore, JobStoreFile};
use recu_core::scheduler::{JobStatus, RunSummary};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug)]
pub struct Session {
    pub cfg: RecuConfig,
    pub jobs_file: PathBuf,
    pub output_dir: PathBuf,
    pub user_agent: Option<String>,
}

impl Session {
    /// Open the job store for a run. A missing store is replaced by the
    /// template and an unconfigured one is reported; both yield `None`.
    pub fn open_store(&self) -> Result<Option<JobStoreFile>> {
        if !self.jobs_file.exists() {
            JobStore::template().save(&self.jobs_file)?;
            println!(
                "{} created.\nPlease fill in the URLs to download, the Cookie and the User-Agent.",
                self.jobs_file.display()
            );
            return Ok(None);
        }
        let store = JobStoreFile::open(&self.jobs_file)?;
        if store.snapshot().is_unconfigured() {
            println!(
                "{} is not filled in. Please fill in the URLs to download, the Cookie and the User-Agent.",
                self.jobs_file.display()
            );
            return Ok(None);
        }
        Ok(Some(store))
    }

    pub fn profiles(&self, credentials: Headers) -> HeaderProfiles {
        HeaderProfiles::new(credentials).with_user_agent_override(self.user_agent.clone())
    }

    pub fn client(&self) -> Arc<CurlClient> {
        Arc::new(CurlClient::new())
    }
}

/// One line per job, then the totals.
pub fn print_summary(summary: &RunSummary) {
    for r in &summary.reports {
        match &r.status {
            JobStatus::Completed { path: Some(p) } => {
                println!("Completed: {} ({})", p.display(), r.url)
            }
            JobStatus::Completed { path: None } => println!("Nothing to download: {}", r.url),
            JobStatus::PlaylistSaved { path } => {
                println!("Playlist saved: {} ({})", path.display(), r.url)
            }
            JobStatus::FailedAt { index, reason } => println!(
                "Download failed at segment {} ({}), will resume there: {}",
                index, reason, r.url
            ),
            JobStatus::Blocked(reason) => println!("{}: failed on url {}", reason, r.url),
            JobStatus::Fatal(msg) => println!("Error: {}: failed on url {}", msg, r.url),
            JobStatus::Skipped => println!("Skipped (aborted): {}", r.url),
        }
    }
    println!(
        "{} completed, {} failed, {} blocked, {} errors, {} skipped",
        summary.completed, summary.failed, summary.blocked, summary.fatal, summary.skipped
    );
}
