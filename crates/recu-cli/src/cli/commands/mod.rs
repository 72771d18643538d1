//! CLI command handlers. Each command is in its own file.

mod completions;
mod import;
mod init;
mod manpage;
mod mux;
mod playlist;
mod progress;
mod run;
mod session;

pub use completions::run_completions;
pub use import::run_import;
pub use init::run_init;
pub use manpage::run_manpage;
pub use mux::run_mux;
#[cfg(test)]
pub(crate) use mux::basename_of;
pub use playlist::run_playlist;
pub use run::run_jobs;
pub use session::Session;
