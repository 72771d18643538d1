use std::time::Duration;

use super::classify::Verdict;

/// Decision returned by the retry policy after a non-successful attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Rate limited: wait and retry; the attempt was not counted.
    Throttle(Duration),
    /// Retry after the given delay with the given request timeout.
    RetryAfter { delay: Duration, timeout: Duration },
    /// Retry budget exhausted (or resource expired).
    GiveUp,
}

/// Per-call retry bookkeeping. Starts fresh for every fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptState {
    /// Counted failures so far.
    pub retries: u32,
    /// Timeout for the next request.
    pub timeout: Duration,
}

/// Bounded retry policy with fixed delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Initial per-request timeout.
    pub timeout: Duration,
    /// Counted failures tolerated before giving up (the call fails once the
    /// counter exceeds this).
    pub max_retries: u32,
    /// Pause before an ordinary retry.
    pub retry_delay: Duration,
    /// Pause before retrying a 429; longer than `retry_delay`.
    pub throttle_delay: Duration,
    /// Added to the timeout after a transport-level failure.
    pub timeout_step: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self::segment()
    }
}

impl FetchPolicy {
    /// Page, API and manifest requests.
    pub fn resolver() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 5,
            retry_delay: Duration::from_millis(200),
            throttle_delay: Duration::from_secs(1),
            timeout_step: Duration::from_secs(30),
        }
    }

    /// Media segment requests.
    pub fn segment() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            max_retries: 10,
            retry_delay: Duration::from_millis(100),
            throttle_delay: Duration::from_secs(1),
            timeout_step: Duration::from_secs(30),
        }
    }

    /// Fresh state for one fetch.
    pub fn start(&self) -> AttemptState {
        AttemptState {
            retries: 0,
            timeout: self.timeout,
        }
    }

    /// Update `state` for a failed attempt and decide what to do next.
    pub fn decide(&self, state: &mut AttemptState, verdict: Verdict) -> RetryDecision {
        match verdict {
            Verdict::Success => return RetryDecision::GiveUp,
            Verdict::Throttled => return RetryDecision::Throttle(self.throttle_delay),
            Verdict::Expired => state.retries = self.max_retries,
            Verdict::Transport => state.timeout = state.timeout.saturating_add(self.timeout_step),
            Verdict::Status(_) => {}
        }
        state.retries = state.retries.saturating_add(1);
        if state.retries > self.max_retries {
            return RetryDecision::GiveUp;
        }
        RetryDecision::RetryAfter {
            delay: self.retry_delay,
            timeout: state.timeout,
        }
    }
}
