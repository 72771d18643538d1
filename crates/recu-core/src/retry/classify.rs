//! Classify one HTTP outcome for the retry loop.

use crate::http::{HttpResponse, TransportError};

/// What a single request outcome means to the retry loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// 200: done.
    Success,
    /// 429: slow down, retry without consuming an attempt.
    Throttled,
    /// 410: the resource (signed URL) expired; give up now.
    Expired,
    /// Any other status.
    Status(u32),
    /// No usable response (timeout, connection reset, DNS...).
    Transport,
}

/// Classify an HTTP status code.
pub fn classify_status(code: u32) -> Verdict {
    match code {
        200 => Verdict::Success,
        429 => Verdict::Throttled,
        410 => Verdict::Expired,
        other => Verdict::Status(other),
    }
}

/// Classify a request result (status or transport error).
pub fn classify(result: &Result<HttpResponse, TransportError>) -> Verdict {
    match result {
        Ok(resp) => classify_status(resp.status),
        Err(_) => Verdict::Transport,
    }
}
