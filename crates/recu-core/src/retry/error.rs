//! Error returned when the retry budget is exhausted.

use std::fmt;

/// Longest body excerpt kept in the error message.
const BODY_EXCERPT: usize = 40;

/// A fetch that did not produce a 200 within the retry budget.
#[derive(Debug, Clone)]
pub struct FetchError {
    pub url: String,
    /// Requests issued, 429 responses included.
    pub attempts: u32,
    pub last_status: Option<u32>,
    pub last_body: Vec<u8>,
    /// Transport error message of the last attempt, when it had no status.
    pub last_transport: Option<String>,
    /// The server answered 410 (expired).
    pub expired: bool,
}

impl FetchError {
    /// Short, lossy excerpt of the last body for log lines.
    pub fn body_excerpt(&self) -> String {
        let text = String::from_utf8_lossy(&self.last_body);
        let text = text.trim();
        match text.char_indices().nth(BODY_EXCERPT) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_string(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {} failed after {} attempt(s): ", self.url, self.attempts)?;
        match (&self.last_transport, self.last_status) {
            (Some(e), _) => write!(f, "{}", e),
            (None, Some(410)) => write!(f, "HTTP 410, download expired"),
            (None, Some(code)) => write!(f, "HTTP {}, {}", code, self.body_excerpt()),
            (None, None) => write!(f, "no response"),
        }
    }
}

impl std::error::Error for FetchError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(status: Option<u32>, body: &str) -> FetchError {
        FetchError {
            url: "https://cdn.example/a.ts".into(),
            attempts: 3,
            last_status: status,
            last_body: body.as_bytes().to_vec(),
            last_transport: None,
            expired: status == Some(410),
        }
    }

    #[test]
    fn display_status_and_body() {
        let e = err(Some(403), "forbidden");
        assert_eq!(
            e.to_string(),
            "GET https://cdn.example/a.ts failed after 3 attempt(s): HTTP 403, forbidden"
        );
    }

    #[test]
    fn display_expired() {
        assert!(err(Some(410), "").to_string().ends_with("download expired"));
    }

    #[test]
    fn body_excerpt_is_shortened() {
        let e = err(Some(500), &"x".repeat(100));
        assert_eq!(e.body_excerpt().len(), 43);
    }
}
