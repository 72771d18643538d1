//! Import of video links from a listing page into the job store.

use anyhow::{bail, Context, Result};

use crate::http::{HeaderProfile, HeaderProfiles, HttpClient};
use crate::retry::{FetchPolicy, RetryingFetcher};

const LINK_START: &str = "href=\"/video/";
const LINK_END: &str = "/play\"";

/// Every `href="/video/<id>/play"` link in `html` as an absolute page URL,
/// in page order, without duplicates.
pub fn collect_video_links(html: &str, origin: &str) -> Vec<String> {
    let mut links = Vec::new();
    for line in html.lines() {
        let mut rest = line;
        while let Some(at) = rest.find(LINK_START) {
            let after = &rest[at + LINK_START.len()..];
            let Some(end) = after.find(LINK_END) else {
                break;
            };
            let id = &after[..end];
            if !id.is_empty() && !id.contains(['"', '/', ' ']) {
                let link = format!("{}/video/{}/play", origin, id);
                if !links.contains(&link) {
                    links.push(link);
                }
            }
            rest = &after[end + LINK_END.len()..];
        }
    }
    links
}

/// Fetch the listing page at `url` and collect its video links.
pub fn import_listing(
    client: &dyn HttpClient,
    url: &str,
    profiles: &HeaderProfiles,
    policy: FetchPolicy,
) -> Result<Vec<String>> {
    let parsed = url::Url::parse(url).with_context(|| format!("invalid listing url {}", url))?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        bail!("listing url {} has no origin", url);
    }
    let origin = origin.ascii_serialization();
    let headers = profiles.for_origin(&origin).build(&HeaderProfile::Html);
    tracing::info!(url, "downloading listing page");
    let body = RetryingFetcher::new(client, policy)
        .fetch(url, &headers)
        .context("listing page fetch failed (blocked by anti-bot protection?)")?;
    let links = collect_video_links(&String::from_utf8_lossy(&body), &origin);
    tracing::info!(url, count = links.len(), "collected video links");
    Ok(links)
}
