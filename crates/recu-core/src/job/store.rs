//! The JSON job store (`config.json`): job entries plus credential headers.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::http::Headers;

use super::spec::{encode_checkpoint, JobEntryError, JobSpec};

/// Default job-store file name, relative to the working directory.
pub const DEFAULT_JOB_STORE: &str = "config.json";

/// On-disk job store. Entries stay raw JSON so their legacy shape survives a
/// rewrite; they are normalized through [`JobSpec::from_entry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStore {
    #[serde(default)]
    pub urls: Vec<Value>,
    #[serde(default)]
    pub header: BTreeMap<String, String>,
}

impl JobStore {
    /// Store written on first run: one empty URL and blank credentials.
    pub fn template() -> Self {
        let mut header = BTreeMap::new();
        header.insert("Cookie".to_string(), String::new());
        header.insert("User-Agent".to_string(), String::new());
        Self {
            urls: vec![Value::String(String::new())],
            header,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading job store {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parsing job store {}", path.display()))
    }

    /// Rewrite the whole file, tab-indented.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        fs::write(path, buf).with_context(|| format!("writing job store {}", path.display()))?;
        Ok(())
    }

    /// True when no entry names a URL or the `Cookie` / `User-Agent`
    /// credentials are blank (fresh or half-filled template).
    pub fn is_unconfigured(&self) -> bool {
        let no_urls = self
            .urls
            .iter()
            .all(|e| matches!(JobSpec::from_entry(0, e), Err(JobEntryError::EmptyUrl)));
        no_urls || self.credential_missing("Cookie") || self.credential_missing("User-Agent")
    }

    fn credential_missing(&self, name: &str) -> bool {
        !self
            .header
            .iter()
            .any(|(k, v)| k.eq_ignore_ascii_case(name) && !v.trim().is_empty())
    }

    /// Credential headers (`Cookie`, `User-Agent`, ...), blanks dropped.
    pub fn headers(&self) -> Headers {
        self.header
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Every entry, normalized. Malformed entries are returned as errors in
    /// their slot so the caller can report and skip them.
    pub fn jobs(&self) -> Vec<(usize, Result<JobSpec, JobEntryError>)> {
        self.urls
            .iter()
            .enumerate()
            .map(|(slot, e)| (slot, JobSpec::from_entry(slot, e)))
            .collect()
    }

    /// Record a resume index for the entry at `slot`.
    pub fn set_checkpoint(&mut self, slot: usize, index: usize) -> Result<()> {
        let entry = self
            .urls
            .get_mut(slot)
            .with_context(|| format!("no job-store entry at slot {}", slot))?;
        *entry = encode_checkpoint(entry, index)
            .with_context(|| format!("cannot checkpoint entry at slot {}", slot))?;
        Ok(())
    }

    /// Replace all entries with `urls`, keeping the headers.
    pub fn replace_urls(&mut self, urls: impl IntoIterator<Item = String>) {
        self.urls = urls.into_iter().map(Value::String).collect();
    }
}
