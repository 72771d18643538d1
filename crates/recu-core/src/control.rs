//! Run cancellation: a shared abort token and the interrupt handler that
//! trips it.
//!
//! Jobs poll the token between segments; a tripped token makes the mux
//! engine stop at the next segment boundary and report where it stopped, so
//! the orchestrator can checkpoint it. A second interrupt exits immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Exit status used when the operator interrupts twice (128 + SIGINT).
pub const FORCED_EXIT_CODE: i32 = 130;

/// Cloneable abort flag shared by every job of a run.
#[derive(Debug, Clone, Default)]
pub struct AbortToken(Arc<AtomicBool>);

impl AbortToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Resolves on SIGINT (Ctrl-C) or, on Unix, SIGTERM.
pub async fn wait_for_interrupt() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

/// Spawns the two-stage interrupt handler on the current runtime: the first
/// interrupt trips `token`, the second terminates the process.
pub fn install_interrupt_handler(token: AbortToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_interrupt().await;
        tracing::warn!("interrupt received, stopping after the current segments (again to quit)");
        eprintln!("\nStopping after the current segments; press Ctrl-C again to quit now.");
        token.trigger();
        wait_for_interrupt().await;
        tracing::warn!("second interrupt, exiting");
        std::process::exit(FORCED_EXIT_CODE);
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = AbortToken::new();
        let b = a.clone();
        assert!(!b.is_triggered());
        a.trigger();
        assert!(b.is_triggered());
        a.trigger();
        assert!(a.is_triggered());
    }
}
