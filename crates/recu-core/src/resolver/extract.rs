//! Marker search in page and API bodies.

/// Finds the first `start` marker and returns its byte offset together with
/// the text between it and the next `end` marker.
pub(crate) fn search_between<'a>(
    haystack: &'a str,
    start: &str,
    end: &str,
) -> Option<(usize, &'a str)> {
    let at = haystack.find(start)?;
    let from = at + start.len();
    let len = haystack[from..].find(end)?;
    Some((at, &haystack[from..from + len]))
}
