//! Header profiles: one base credential set, tailored per request kind.
//!
//! The page is fetched like a browser navigation, the API like a same-origin
//! XHR, and manifests/segments like a cross-site media fetch. Segment hosts
//! are cross-origin, so that profile drops the session cookie and the
//! high-entropy client hints.

use super::Headers;

/// Kind of request a header set is built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderProfile {
    /// Top-level document navigation (the video page).
    Html,
    /// Same-origin API call; `referer` is the API URL itself.
    Api { referer: String },
    /// Manifest and segment fetches against the media CDN.
    Segment,
}

const COMMON: &[(&str, &str)] = &[
    ("Accept", "*/*"),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Priority", "u=1, i"),
    (
        "Sec-Ch-Ua",
        r#""Chromium";v="124", "Microsoft Edge";v="124", "Not-A.Brand";v="99""#,
    ),
    (
        "Sec-Ch-Ua-Full-Version-List",
        r#""Chromium";v="124.0.6367.201", "Microsoft Edge";v="124.0.2478.97", "Not-A.Brand";v="99.0.0.0""#,
    ),
    ("Sec-Ch-Ua-Mobile", "?0"),
    ("Sec-Ch-Ua-Platform", r#""Windows""#),
    ("Sec-Fetch-Dest", "empty"),
    ("Sec-Fetch-Mode", "cors"),
    ("Sec-Ch-Ua-Arch", r#""x86""#),
    ("Sec-Ch-Ua-Bitness", r#""64""#),
    ("Sec-Ch-Ua-Full-Version", r#""124.0.2478.97""#),
    ("Sec-Ch-Ua-Model", r#""""#),
    ("Sec-Ch-Ua-Platform-Version", r#""15.0.0""#),
];

/// Headers removed from cross-origin media requests.
const CROSS_ORIGIN_STRIPPED: &[&str] = &[
    "Cookie",
    "Sec-Ch-Ua-Full-Version-List",
    "Sec-Ch-Ua-Arch",
    "Sec-Ch-Ua-Bitness",
    "Sec-Ch-Ua-Full-Version",
    "Sec-Ch-Ua-Model",
    "Sec-Ch-Ua-Platform-Version",
];

/// Builds complete header sets from the operator's credentials.
#[derive(Debug, Clone, Default)]
pub struct HeaderProfiles {
    credentials: Headers,
    origin: Option<String>,
    user_agent_override: Option<String>,
}

impl HeaderProfiles {
    /// `credentials` is the operator-supplied base set (at least `Cookie` and
    /// `User-Agent`). It is copied into every profile before tailoring.
    pub fn new(credentials: Headers) -> Self {
        Self {
            credentials,
            origin: None,
            user_agent_override: None,
        }
    }

    /// Site origin sent as `Origin` and used as the navigation referer.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Replaces `User-Agent` on every profile except [`HeaderProfile::Html`].
    pub fn with_user_agent_override(mut self, user_agent: Option<String>) -> Self {
        self.user_agent_override = user_agent.filter(|ua| !ua.trim().is_empty());
        self
    }

    /// Origin configured for this set, if any.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Same profiles, but with `origin` replacing the configured one.
    pub fn for_origin(&self, origin: &str) -> Self {
        let mut p = self.clone();
        p.origin = Some(origin.to_string());
        p
    }

    /// Full header set for `profile`.
    pub fn build(&self, profile: &HeaderProfile) -> Headers {
        let mut h = self.credentials.clone();
        for (k, v) in COMMON {
            h.insert((*k).to_string(), (*v).to_string());
        }
        if let Some(origin) = &self.origin {
            h.insert("Origin".to_string(), origin.clone());
        }

        match profile {
            HeaderProfile::Html => {
                h.insert(
                    "Accept".to_string(),
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7".to_string(),
                );
                h.insert("Cache-Control".to_string(), "max-age=0".to_string());
                if let Some(origin) = &self.origin {
                    h.insert("Referer".to_string(), format!("{}/", origin));
                }
                h.insert("Sec-Fetch-Dest".to_string(), "document".to_string());
                h.insert("Sec-Fetch-Mode".to_string(), "navigate".to_string());
                h.insert("Sec-Fetch-Site".to_string(), "none".to_string());
                h.insert("Sec-Fetch-User".to_string(), "?1".to_string());
                h.insert("Upgrade-Insecure-Requests".to_string(), "1".to_string());
            }
            HeaderProfile::Api { referer } => {
                h.insert("Referer".to_string(), referer.clone());
                h.insert("Sec-Fetch-Site".to_string(), "same-origin".to_string());
                h.insert("X-Requested-With".to_string(), "XMLHttpRequest".to_string());
            }
            HeaderProfile::Segment => {
                h.insert("Sec-Fetch-Site".to_string(), "cross-site".to_string());
                for name in CROSS_ORIGIN_STRIPPED {
                    h.retain(|k, _| !k.eq_ignore_ascii_case(name));
                }
            }
        }

        if *profile != HeaderProfile::Html {
            if let Some(ua) = &self.user_agent_override {
                h.retain(|k, _| !k.eq_ignore_ascii_case("User-Agent"));
                h.insert("User-Agent".to_string(), ua.clone());
            }
        }
        h
    }
}
