//! CLI for the recu downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use recu_core::config;
use recu_core::job::DEFAULT_JOB_STORE;
use std::path::PathBuf;

use commands::{
    run_completions, run_import, run_init, run_jobs, run_manpage, run_mux, run_playlist, Session,
};

/// Top-level CLI for recu.
#[derive(Debug, Parser)]
#[command(name = "recu")]
#[command(
    about = "recu: resolve video pages to HLS manifests and download the recordings",
    long_about = None
)]
pub struct Cli {
    /// Job store with the URLs to download and the Cookie/User-Agent headers.
    #[arg(long, global = true, default_value = DEFAULT_JOB_STORE, value_name = "FILE")]
    pub jobs_file: PathBuf,

    /// Directory for output files (default: current directory).
    #[arg(long, global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// User-Agent for API, manifest and segment requests (the page request
    /// keeps the job store's).
    #[arg(long, global = true, value_name = "UA")]
    pub user_agent: Option<String>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve and download every job in the job store.
    Run {
        /// Download one job at a time instead of all at once.
        #[arg(long)]
        serial: bool,
    },

    /// Resolve every job and only save its manifest as <name>.m3u8.
    Playlist,

    /// Download the content of a saved .m3u8 manifest without re-resolving.
    Mux {
        /// Path to the manifest.
        path: PathBuf,

        /// Append to the existing output, starting at this segment index.
        #[arg(long, value_name = "N")]
        resume: Option<usize>,

        /// Start of the range, in percent of the recording.
        #[arg(long, default_value_t = 0.0, value_name = "PERCENT")]
        start: f64,

        /// End of the range, in percent of the recording.
        #[arg(long, default_value_t = 100.0, value_name = "PERCENT")]
        end: f64,

        /// Preview: keep about every N-th segment.
        #[arg(long, value_name = "N")]
        sample: Option<u32>,
    },

    /// Replace the job store's URLs with the video links of a listing page.
    Import {
        /// Listing page URL.
        url: String,
    },

    /// Write an empty job store template.
    Init,

    /// Print shell completions.
    Completions {
        shell: clap_complete::Shell,
    },

    /// Print the man page (roff).
    Manpage,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        // Commands that need neither config nor job store.
        match cli.command {
            CliCommand::Completions { shell } => return run_completions(shell),
            CliCommand::Manpage => return run_manpage(),
            CliCommand::Init => return run_init(&cli.jobs_file),
            _ => {}
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let output_dir = match cli.output_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let session = Session {
            cfg,
            jobs_file: cli.jobs_file,
            output_dir,
            user_agent: cli.user_agent,
        };

        match cli.command {
            CliCommand::Run { serial } => run_jobs(&session, serial).await?,
            CliCommand::Playlist => run_playlist(&session).await?,
            CliCommand::Mux {
                path,
                resume,
                start,
                end,
                sample,
            } => run_mux(&session, &path, resume, start, end, sample).await?,
            CliCommand::Import { url } => run_import(&session, &url).await?,
            CliCommand::Init | CliCommand::Completions { .. } | CliCommand::Manpage => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
