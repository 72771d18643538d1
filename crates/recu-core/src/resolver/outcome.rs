//! Result types of one manifest resolution.

use std::fmt;

use crate::naming::NamingError;
use crate::playlist::Manifest;
use crate::retry::FetchError;

/// Service-side refusal the operator can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    /// Page could not be fetched (bot challenge) or the token was rejected.
    AntiBot,
    /// The session cookie is missing or expired.
    LoginRequired,
    /// The account's daily view quota is used up.
    QuotaExceeded,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            BlockReason::AntiBot => "blocked by anti-bot protection",
            BlockReason::LoginRequired => "please log in (check the Cookie header)",
            BlockReason::QuotaExceeded => "daily view quota used",
        };
        f.write_str(msg)
    }
}

/// Resolution failed in a way that is not a service block.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid page url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("could not find `{marker}` in {context}")]
    MissingMarker {
        marker: &'static str,
        context: &'static str,
    },
    #[error("api rejected the page token (wrong_token)")]
    WrongToken,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("manifest has no segments")]
    EmptyManifest,
    #[error(transparent)]
    Naming(#[from] NamingError),
}

/// Tagged result of [`super::ManifestResolver::resolve`]. All-or-nothing:
/// nothing partial survives a failed resolution.
#[derive(Debug)]
pub enum ResolutionOutcome {
    Resolved(Manifest),
    Blocked(BlockReason),
    Fatal(ResolveError),
}

impl ResolutionOutcome {
    pub fn manifest(self) -> Option<Manifest> {
        match self {
            ResolutionOutcome::Resolved(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved(_))
    }
}
