//! `recu init` – write the job store template.

use anyhow::Result;
use recu_core::job::JobStore;
use std::path::Path;

pub fn run_init(jobs_file: &Path) -> Result<()> {
    if jobs_file.exists() {
        println!("{} already exists.", jobs_file.display());
        return Ok(());
    }
    JobStore::template().save(jobs_file)?;
    println!(
        "{} created.\nPlease fill in the URLs to download, the Cookie and the User-Agent.",
        jobs_file.display()
    );
    Ok(())
}
