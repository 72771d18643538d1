//! Bounded, status-aware retry around the HTTP collaborator.
//!
//! Shared by manifest resolution (long timeout, few retries) and segment
//! download (short timeout, more retries). 429 is backpressure and never
//! consumes an attempt; 410 means the signed URL expired and fails fast.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_status, Verdict};
pub use error::FetchError;
pub use policy::{AttemptState, FetchPolicy, RetryDecision};
pub use run::{fetch_with_retry, RetryingFetcher};
