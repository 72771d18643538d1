//! Terminal progress lines fed by the engine's progress channel.

use recu_core::mux::ProgressStats;
use std::io::Write;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const PROGRESS_INTERVAL_MS: u128 = 500;

/// Spawns the printer. Drop every sender to stop it, then await the handle.
pub fn spawn_printer() -> (mpsc::Sender<ProgressStats>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<ProgressStats>(64);
    let handle = tokio::spawn(async move {
        let mut last_print: Option<Instant> = None;
        let mut last_name = String::new();
        while let Some(stats) = rx.recv().await {
            let now = Instant::now();
            let switched = stats.basename != last_name;
            let due = last_print.map_or(true, |t| now.duration_since(t).as_millis() >= PROGRESS_INTERVAL_MS);
            if !(switched || due) {
                continue;
            }
            if switched {
                println!();
                last_name = stats.basename.clone();
            }
            print!(
                "\r{}  Downloading: {:.1}%  Remaining: {}  {}   ",
                stats.basename,
                stats.percent,
                stats.eta(),
                stats.rate()
            );
            let _ = std::io::stdout().flush();
            last_print = Some(now);
        }
        println!();
    });
    (tx, handle)
}
