//! Basename from a structured page URL: `scheme://host/<root>/<user>/<date>/...`.

use super::NamingError;

/// `"<prefix>_<user>_<yy>-<mm>-<dd>_<hh>-<min>"` from parts 4 and 5 of the URL.
///
/// The date part may use `-` or `,` as separators and needs at least five
/// numeric fields (year, month, day, hour, minute); a 4-digit year keeps its
/// last two digits.
pub fn from_page_url(url: &str, prefix: &str) -> Result<String, NamingError> {
    let parts: Vec<&str> = url.split('/').collect();
    if parts.len() < 6 {
        return Err(NamingError::TooFewSegments(url.to_string()));
    }
    let username = parts[4];
    let date = parts[5].replace(',', "-");
    let fields: Vec<&str> = date.split('-').collect();
    if fields.len() < 5 {
        return Err(NamingError::BadDate(parts[5].to_string()));
    }
    if let Some(bad) = fields[..5]
        .iter()
        .find(|f| f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()))
    {
        return Err(NamingError::BadDate(format!("non-numeric field `{}`", bad)));
    }
    let year = if fields[0].len() == 4 {
        &fields[0][2..]
    } else {
        fields[0]
    };
    Ok(format!(
        "{}_{}_{}-{}-{}_{}-{}",
        prefix, username, year, fields[1], fields[2], fields[3], fields[4]
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashed_date() {
        assert_eq!(
            from_page_url("https://s.example/root/alice/2024-01-02-03-04/x", "CB").unwrap(),
            "CB_alice_24-01-02_03-04"
        );
    }

    #[test]
    fn comma_date_and_short_year() {
        assert_eq!(
            from_page_url("https://s.example/root/alice/24,1,2,3,4", "CB").unwrap(),
            "CB_alice_24-1-2_3-4"
        );
    }

    #[test]
    fn too_few_segments() {
        assert!(matches!(
            from_page_url("https://s.example/alice", "CB"),
            Err(NamingError::TooFewSegments(_))
        ));
    }

    #[test]
    fn too_few_date_fields() {
        assert!(matches!(
            from_page_url("https://s.example/root/alice/2024-01-02", "CB"),
            Err(NamingError::BadDate(_))
        ));
    }

    #[test]
    fn non_numeric_date() {
        assert!(matches!(
            from_page_url("https://s.example/video/12345/play", "CB"),
            Err(NamingError::BadDate(_))
        ));
    }
}
