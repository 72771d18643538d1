//! Variant (adaptive bitrate) manifest handling: pick the maximum quality.

use super::{is_segment_line, STREAM_INF};

/// Tag attribute the service uses to mark the best variant.
const MAX_MARKER: &str = "NAME=max";

pub fn is_variant_manifest(text: &str) -> bool {
    text.contains(STREAM_INF)
}

/// URI of the variant tagged `NAME=max` (the last one wins when several are
/// tagged). Without a tagged variant, the one with the highest `BANDWIDTH`.
/// Relative URIs are resolved against `prefix` the same way segment lines are.
pub fn select_max_variant(text: &str, prefix: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().map(str::trim).collect();

    let mut tagged = None;
    let mut best: Option<(u64, &str)> = None;
    for (i, line) in lines.iter().enumerate() {
        if !line.contains(STREAM_INF) {
            continue;
        }
        let Some(uri) = lines[i + 1..].iter().find(|l| is_segment_line(l)).copied() else {
            continue;
        };
        if line.contains(MAX_MARKER) {
            tagged = Some(uri);
        }
        let bw = bandwidth(line).unwrap_or(0);
        if best.map_or(true, |(b, _)| bw > b) {
            best = Some((bw, uri));
        }
    }

    let uri = tagged.or(best.map(|(_, u)| u))?;
    if uri.contains(prefix) {
        Some(uri.to_string())
    } else {
        Some(format!("{}{}", prefix, uri))
    }
}

fn bandwidth(tag: &str) -> Option<u64> {
    let (_, attrs) = tag.split_once(':')?;
    attrs.split(',').find_map(|kv| {
        let (k, v) = kv.split_once('=')?;
        if k.trim() == "BANDWIDTH" {
            v.trim().parse().ok()
        } else {
            None
        }
    })
}
