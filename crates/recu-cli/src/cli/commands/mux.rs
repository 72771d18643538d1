//! `recu mux <file.m3u8>` – download the content of a saved manifest.

use anyhow::{Context, Result};
use recu_core::control::{install_interrupt_handler, AbortToken};
use recu_core::http::Headers;
use recu_core::job::{JobStore, MemorySink};
use recu_core::mux::{Checkpoint, MuxOutcome, RangeSpec, SampleSpec};
use recu_core::playlist::Manifest;
use recu_core::scheduler::JobOrchestrator;
use std::path::Path;
use std::sync::Arc;

use super::progress::spawn_printer;
use super::session::Session;

/// Output basename of a saved manifest: its file name without `.m3u8`.
pub(crate) fn basename_of(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(".m3u8").unwrap_or(&name).to_string()
}

pub async fn run_mux(
    session: &Session,
    path: &Path,
    resume: Option<usize>,
    start: f64,
    end: f64,
    sample: Option<u32>,
) -> Result<()> {
    let data =
        std::fs::read(path).with_context(|| format!("failed to read playlist {}", path.display()))?;
    let manifest = Manifest::from_text(data, basename_of(path));
    if manifest.is_empty() {
        anyhow::bail!("playlist {} has no segments", path.display());
    }

    // Credentials are optional here; segment requests never carry the cookie.
    let credentials = if session.jobs_file.exists() {
        JobStore::load(&session.jobs_file)?.headers()
    } else {
        Headers::new()
    };

    let abort = AbortToken::new();
    let interrupt = install_interrupt_handler(abort.clone());
    let (progress_tx, progress_handle) = spawn_printer();
    let orchestrator = JobOrchestrator::new(
        session.client(),
        session.profiles(credentials),
        &session.cfg,
        &session.output_dir,
        Arc::new(MemorySink::new()),
    )
    .with_abort(abort)
    .with_progress(progress_tx);

    let outcome = orchestrator
        .mux_local(
            manifest,
            RangeSpec::new(start, end),
            sample.map_or_else(SampleSpec::none, SampleSpec::new),
            resume.map(Checkpoint::new),
        )
        .await;
    drop(orchestrator);
    let _ = progress_handle.await;
    interrupt.abort();

    match outcome? {
        MuxOutcome::Completed { path: Some(out) } => println!("Completed: {}", out.display()),
        MuxOutcome::Completed { path: None } => println!("Nothing to download in that range."),
        MuxOutcome::FailedAt { index, reason } => println!(
            "Download failed at segment {} ({}). Resume with: recu mux {} --resume {}",
            index,
            reason,
            path.display(),
            index
        ),
    }
    Ok(())
}
