//! `recu import <url>` – fill the job store from a listing page.

use anyhow::{Context, Result};
use recu_core::job::JobStore;
use recu_core::listing::import_listing;

use super::session::Session;

pub async fn run_import(session: &Session, url: &str) -> Result<()> {
    let mut store = if session.jobs_file.exists() {
        JobStore::load(&session.jobs_file)?
    } else {
        JobStore::template()
    };
    let client = session.client();
    let profiles = session.profiles(store.headers());
    let policy = session.cfg.resolver_policy();
    let listing_url = url.to_string();
    println!("Downloading listing page");
    let links = tokio::task::spawn_blocking(move || {
        import_listing(client.as_ref(), &listing_url, &profiles, policy)
    })
    .await
    .context("import task join")??;

    if links.is_empty() {
        println!("No video links found on {}", url);
        return Ok(());
    }
    let count = links.len();
    store.replace_urls(links);
    store.save(&session.jobs_file)?;
    println!("Saved {} URL(s) to {}", count, session.jobs_file.display());
    Ok(())
}
