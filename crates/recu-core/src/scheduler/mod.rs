//! Job orchestration: resolve every job, then mux them in parallel (staggered
//! launches) or one at a time, recording checkpoints for jobs that stop early.

mod orchestrator;
mod summary;

pub use orchestrator::JobOrchestrator;
pub use summary::{JobReport, JobStatus, RunSummary};
