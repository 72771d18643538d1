//! Retry loop: issue GETs until a 200 or the policy gives up.

use crate::http::{Headers, HttpClient};

use super::classify::{classify, Verdict};
use super::error::FetchError;
use super::policy::{FetchPolicy, RetryDecision};

fn pause(d: std::time::Duration) {
    if !d.is_zero() {
        std::thread::sleep(d);
    }
}

/// GET `url` until it returns 200 or `policy` gives up. Blocks the current
/// thread (requests and pauses); call from `spawn_blocking` in async code.
pub fn fetch_with_retry(
    client: &dyn HttpClient,
    url: &str,
    headers: &Headers,
    policy: &FetchPolicy,
) -> Result<Vec<u8>, FetchError> {
    let mut state = policy.start();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        let result = client.get(url, headers, state.timeout);
        let verdict = classify(&result);
        let (last_status, last_body, last_transport) = match result {
            Ok(resp) if verdict == Verdict::Success => return Ok(resp.body),
            Ok(resp) => (Some(resp.status), resp.body, None),
            Err(e) => (None, Vec::new(), Some(e.to_string())),
        };
        if verdict == Verdict::Expired {
            tracing::warn!(url, "download expired (HTTP 410)");
        }

        match policy.decide(&mut state, verdict) {
            RetryDecision::Throttle(d) => {
                tracing::debug!(url, "rate limited (HTTP 429), backing off");
                pause(d);
            }
            RetryDecision::RetryAfter { delay, timeout } => {
                tracing::debug!(
                    url,
                    retry = state.retries,
                    status = ?last_status,
                    error = last_transport.as_deref().unwrap_or(""),
                    timeout_secs = timeout.as_secs(),
                    "request failed, retrying"
                );
                pause(delay);
            }
            RetryDecision::GiveUp => {
                return Err(FetchError {
                    url: url.to_string(),
                    attempts,
                    last_status,
                    last_body,
                    last_transport,
                    expired: verdict == Verdict::Expired,
                });
            }
        }
    }
}

/// A client paired with a policy. Holds no state across calls.
#[derive(Clone, Copy)]
pub struct RetryingFetcher<'a> {
    client: &'a dyn HttpClient,
    policy: FetchPolicy,
}

impl<'a> RetryingFetcher<'a> {
    pub fn new(client: &'a dyn HttpClient, policy: FetchPolicy) -> Self {
        Self { client, policy }
    }

    pub fn fetch(&self, url: &str, headers: &Headers) -> Result<Vec<u8>, FetchError> {
        fetch_with_retry(self.client, url, headers, &self.policy)
    }
}
