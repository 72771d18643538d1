//! `recu playlist` – resolve every job and save its manifest only.

use anyhow::Result;
use recu_core::control::{install_interrupt_handler, AbortToken};
use recu_core::job::MemorySink;
use recu_core::scheduler::JobOrchestrator;
use std::sync::Arc;

use super::session::{print_summary, Session};

pub async fn run_playlist(session: &Session) -> Result<()> {
    let Some(store) = session.open_store()? else {
        return Ok(());
    };
    let snapshot = store.snapshot();
    let jobs: Vec<_> = snapshot
        .jobs()
        .into_iter()
        .filter_map(|(slot, job)| match job {
            Ok(job) => Some(job),
            Err(e) => {
                println!("Skipping entry {}: urls are in wrong format: {}", slot, e);
                None
            }
        })
        .collect();

    let abort = AbortToken::new();
    let interrupt = install_interrupt_handler(abort.clone());
    // Playlist runs download nothing, so there is nothing to checkpoint.
    let orchestrator = JobOrchestrator::new(
        session.client(),
        session.profiles(snapshot.headers()),
        &session.cfg,
        &session.output_dir,
        Arc::new(MemorySink::new()),
    )
    .with_abort(abort);
    let summary = orchestrator.fetch_playlists(jobs).await;
    interrupt.abort();
    print_summary(&summary?);
    Ok(())
}
