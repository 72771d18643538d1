//! `recu run` – resolve and download every job in the job store.

use anyhow::Result;
use recu_core::control::{install_interrupt_handler, AbortToken};
use recu_core::scheduler::JobOrchestrator;
use recu_core::scheduler::{JobReport, JobStatus, RunSummary};
use std::sync::Arc;

use super::progress::spawn_printer;
use super::session::{print_summary, Session};

pub async fn run_jobs(session: &Session, serial: bool) -> Result<()> {
    let Some(store) = session.open_store()? else {
        return Ok(());
    };
    let snapshot = store.snapshot();
    let mut summary = RunSummary::default();
    let mut jobs = Vec::new();
    for (slot, job) in snapshot.jobs() {
        match job {
            Ok(job) => jobs.push(job),
            Err(e) => {
                tracing::warn!(slot, error = %e, "skipping malformed job entry");
                summary.record(JobReport::new(
                    slot,
                    snapshot.urls[slot].to_string(),
                    JobStatus::Fatal(format!("urls are in wrong format: {}", e)),
                ));
            }
        }
    }
    tracing::info!(jobs = jobs.len(), serial, "starting run");

    let abort = AbortToken::new();
    let interrupt = install_interrupt_handler(abort.clone());
    let (progress_tx, progress_handle) = spawn_printer();
    let orchestrator = JobOrchestrator::new(
        session.client(),
        session.profiles(snapshot.headers()),
        &session.cfg,
        &session.output_dir,
        Arc::new(store),
    )
    .with_abort(abort)
    .with_progress(progress_tx);

    let result = if serial {
        orchestrator.run_serial(jobs).await
    } else {
        orchestrator.run_parallel(jobs).await
    };
    drop(orchestrator);
    let _ = progress_handle.await;
    interrupt.abort();

    summary.merge(result?);
    print_summary(&summary);
    Ok(())
}
