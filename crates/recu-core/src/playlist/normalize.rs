//! Make every segment line of a manifest absolute.

use super::is_segment_line;

/// Everything up to and including the last `/` of `url`.
///
/// Query strings are ignored when looking for the separator so a signed
/// manifest URL (`.../index.m3u8?token=a/b`) still yields its directory.
pub fn url_prefix(url: &str) -> &str {
    let path_end = url.find('?').unwrap_or(url.len());
    match url[..path_end].rfind('/') {
        Some(i) => &url[..=i],
        None => "",
    }
}

/// Prepend `prefix` to every segment line that does not already contain it.
/// Tag/comment lines and blank lines are left untouched; line order is kept.
pub fn normalize_segment_lines(text: &str, prefix: &str) -> String {
    text.split('\n')
        .map(|line| {
            if is_segment_line(line) && !line.contains(prefix) {
                format!("{}{}", prefix, line.trim_start())
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://cdn.example/hl/alice/2024-01-02_03-04/";

    #[test]
    fn prefix_of_manifest_url() {
        assert_eq!(
            url_prefix("https://cdn.example/hl/alice/2024-01-02_03-04/index.m3u8"),
            PREFIX
        );
        assert_eq!(
            url_prefix("https://cdn.example/a/b.m3u8?sig=x/y"),
            "https://cdn.example/a/"
        );
        assert_eq!(url_prefix("index.m3u8"), "");
    }

    #[test]
    fn relative_lines_prefixed_once() {
        let text = "#EXTM3U\n#EXTINF:4,\nseg0.ts\n#EXTINF:4,\nseg1.ts\n";
        let out = normalize_segment_lines(text, PREFIX);
        assert_eq!(
            out,
            format!("#EXTM3U\n#EXTINF:4,\n{p}seg0.ts\n#EXTINF:4,\n{p}seg1.ts\n", p = PREFIX)
        );
        // Running again changes nothing.
        assert_eq!(normalize_segment_lines(&out, PREFIX), out);
    }

    #[test]
    fn already_prefixed_lines_untouched() {
        let text = format!("#EXTM3U\n{p}seg0.ts\n{p}seg1.ts", p = PREFIX);
        assert_eq!(normalize_segment_lines(&text, PREFIX), text);
    }

    #[test]
    fn comments_and_blank_lines_untouched() {
        let text = "#EXT-X-VERSION:3\n\n#EXT-X-ENDLIST";
        assert_eq!(normalize_segment_lines(text, PREFIX), text);
    }
}
