//! Filesystem-safe basenames.

/// Room left for the longest extension we append (`.m3u8`) plus a `(NNN)`
/// collision counter, so the final name fits Linux NAME_MAX (255 bytes).
const MAX_BASENAME: usize = 255 - 16;

/// Makes a derived basename safe to use as a file name.
///
/// - Replaces NUL, `/`, `\`, control characters and the characters other
///   filesystems reject (`: * ? " < > |`) with `_`
/// - Replaces whitespace with `_`
/// - Trims leading/trailing dots and underscores
/// - Truncates to fit NAME_MAX once an extension is appended
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let mapped: String = name
        .chars()
        .map(|c| match c {
            '\0' | '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect();

    let trimmed = mapped.trim_matches(|c| c == '.' || c == '_');

    let mut take = trimmed.len().min(MAX_BASENAME);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_names_pass_through() {
        assert_eq!(
            sanitize_filename_for_linux("CB_alice_24-01-02_03-04"),
            "CB_alice_24-01-02_03-04"
        );
    }

    #[test]
    fn separators_and_reserved_chars() {
        assert_eq!(sanitize_filename_for_linux("a/b\\c:d?e"), "a_b_c_d_e");
    }

    #[test]
    fn trims_dots_and_underscores() {
        assert_eq!(sanitize_filename_for_linux("..name_"), "name");
        assert_eq!(sanitize_filename_for_linux("./.."), "");
    }

    #[test]
    fn whitespace_and_controls() {
        assert_eq!(sanitize_filename_for_linux("a b\tc\x00d"), "a_b_c_d");
    }

    #[test]
    fn long_names_are_truncated_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_filename_for_linux(&long);
        assert!(out.len() <= MAX_BASENAME);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
