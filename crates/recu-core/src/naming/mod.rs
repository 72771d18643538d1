//! Output filename derivation.
//!
//! Two URL conventions carry the performer name and the recording date:
//! the structured page URL (`/<root>/<username>/<date>/...`) and the media
//! manifest URL (`.../hl/<username>/<date>/index.m3u8`). Either yields a
//! basename like `CB_alice_24-01-02_03-04`, sanitized for Linux.

mod manifest;
mod page;
mod sanitize;

pub use manifest::from_manifest_url;
pub use page::from_page_url;
pub use sanitize::sanitize_filename_for_linux;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default prefix of every derived basename.
pub const DEFAULT_PREFIX: &str = "CB";

/// Which URL the basename is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilenameSource {
    /// The page URL the job was created from.
    PageUrl,
    /// The media manifest URL returned by the API.
    #[default]
    ManifestUrl,
}

/// Why a basename could not be derived.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    #[error("wrong url format: expected at least 6 path parts in {0}")]
    TooFewSegments(String),
    #[error("wrong date format: {0}")]
    BadDate(String),
    #[error("no `{start}`...`{end}` section in manifest url {url}")]
    MissingMarkers {
        url: String,
        start: &'static str,
        end: &'static str,
    },
    #[error("derived filename is empty")]
    Empty,
}

/// Derive the basename (no extension) using the selected convention.
pub fn derive_basename(
    source: FilenameSource,
    page_url: &str,
    manifest_url: &str,
    prefix: &str,
) -> Result<String, NamingError> {
    let raw = match source {
        FilenameSource::PageUrl => from_page_url(page_url, prefix)?,
        FilenameSource::ManifestUrl => from_manifest_url(manifest_url, prefix)?,
    };
    let clean = sanitize_filename_for_linux(&raw);
    if clean.is_empty() {
        return Err(NamingError::Empty);
    }
    Ok(clean)
}

/// `dir/base.ext` if free, else the first free `dir/base(N).ext` for N = 1, 2, ...
pub fn unique_output_path(dir: &Path, base: &str, ext: &str) -> PathBuf {
    let candidate = dir.join(format!("{}.{}", base, ext));
    if !candidate.exists() {
        return candidate;
    }
    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("{}({}).{}", base, n, ext));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
