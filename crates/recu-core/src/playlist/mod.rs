//! Resolved media manifest and the text transforms applied to it.

mod normalize;
mod variant;

pub use normalize::{normalize_segment_lines, url_prefix};
pub use variant::{is_variant_manifest, select_max_variant};

/// Marker of a multi-variant (adaptive bitrate) manifest.
pub const STREAM_INF: &str = "EXT-X-STREAM-INF";

/// A resolved, ready-to-mux manifest. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    segments: Vec<String>,
    raw: Vec<u8>,
    output_basename: String,
    source_url: Option<String>,
}

impl Manifest {
    /// Build from manifest text whose segment lines are already absolute.
    /// Blank lines and `#` lines are not segments.
    pub fn from_text(raw: Vec<u8>, output_basename: impl Into<String>) -> Self {
        let segments = segment_lines(&String::from_utf8_lossy(&raw));
        Self {
            segments,
            raw,
            output_basename: output_basename.into(),
            source_url: None,
        }
    }

    /// Record the URL the manifest was fetched from.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Segment URLs in download/mux order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Manifest text as persisted to `<basename>.m3u8`.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Output filename without extension.
    pub fn output_basename(&self) -> &str {
        &self.output_basename
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }
}

/// True for lines that name a segment (non-empty, not a `#` tag/comment).
pub(crate) fn is_segment_line(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.starts_with('#')
}

fn segment_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|l| is_segment_line(l))
        .map(|l| l.trim().to_string())
        .collect()
}
