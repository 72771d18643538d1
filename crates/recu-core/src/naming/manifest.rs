//! Basename from a media manifest URL: `.../hl/<user>/<date>/index.m3u8`.

use super::NamingError;

const START: &str = "hl/";
const END: &str = "/index";

/// Years that are shortened to two digits when found in the name.
const YEARS: std::ops::Range<u32> = 2010..2050;

/// Takes the section between `hl/` and `/index`, turns `/` and `,` into `_`,
/// prefixes it and shortens the first embedded year (2010..2049).
pub fn from_manifest_url(url: &str, prefix: &str) -> Result<String, NamingError> {
    let missing = || NamingError::MissingMarkers {
        url: url.to_string(),
        start: START,
        end: END,
    };
    let from = url.find(START).ok_or_else(missing)? + START.len();
    let len = url[from..].find(END).ok_or_else(missing)?;
    let section = &url[from..from + len];
    if section.is_empty() {
        return Err(NamingError::Empty);
    }

    let mut name = format!("{}_{}", prefix, section.replace(['/', ','], "_"));
    for year in YEARS {
        let y = year.to_string();
        if let Some(at) = name.find(&y) {
            name.replace_range(at..at + 4, &y[2..]);
            break;
        }
    }
    Ok(name)
}
