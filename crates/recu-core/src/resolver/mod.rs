//! Page URL -> ready-to-mux [`Manifest`].
//!
//! Linear pipeline: video page -> embedded token and video id -> API call ->
//! manifest URL -> (variant selection) -> normalized segment list -> output
//! basename. Any failure ends the resolution with a tagged outcome; a
//! partially built manifest never escapes.

mod extract;
mod outcome;

pub use outcome::{BlockReason, ResolutionOutcome, ResolveError};

use crate::config::WrongTokenPolicy;
use crate::http::{HeaderProfile, HeaderProfiles, HttpClient};
use crate::naming::{derive_basename, FilenameSource, DEFAULT_PREFIX};
use crate::playlist::{
    is_variant_manifest, normalize_segment_lines, select_max_variant, url_prefix, Manifest,
};
use crate::retry::{FetchPolicy, RetryingFetcher};

use extract::search_between;

const TOKEN_MARKER: &str = "data-token=\"";
const VIDEO_ID_MARKER: &str = "data-video-id=\"";
const SOURCE_MARKER: &str = "<source src=\"";
const ATTR_END: &str = "\"";

const SENTINEL_SUBSCRIBE: &str = "shall_subscribe";
const SENTINEL_SIGNIN: &str = "shall_signin";
const SENTINEL_WRONG_TOKEN: &str = "wrong_token";

/// Resolution knobs taken from the configuration.
#[derive(Debug, Clone)]
pub struct ResolverOptions {
    pub policy: FetchPolicy,
    pub filename_source: FilenameSource,
    pub filename_prefix: String,
    pub wrong_token: WrongTokenPolicy,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            policy: FetchPolicy::resolver(),
            filename_source: FilenameSource::default(),
            filename_prefix: DEFAULT_PREFIX.to_string(),
            wrong_token: WrongTokenPolicy::default(),
        }
    }
}

impl From<&crate::config::RecuConfig> for ResolverOptions {
    fn from(cfg: &crate::config::RecuConfig) -> Self {
        Self {
            policy: cfg.resolver_policy(),
            filename_source: cfg.filename_source,
            filename_prefix: cfg.filename_prefix.clone(),
            wrong_token: cfg.wrong_token,
        }
    }
}

/// Resolves video pages into manifests. Blocking; run from `spawn_blocking`.
pub struct ManifestResolver<'a> {
    client: &'a dyn HttpClient,
    profiles: &'a HeaderProfiles,
    options: ResolverOptions,
}

impl<'a> ManifestResolver<'a> {
    pub fn new(
        client: &'a dyn HttpClient,
        profiles: &'a HeaderProfiles,
        options: ResolverOptions,
    ) -> Self {
        Self {
            client,
            profiles,
            options,
        }
    }

    pub fn resolve(&self, page_url: &str) -> ResolutionOutcome {
        match self.try_resolve(page_url) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(page_url, error = %e, "resolution failed");
                ResolutionOutcome::Fatal(e)
            }
        }
    }

    fn try_resolve(&self, page_url: &str) -> Result<ResolutionOutcome, ResolveError> {
        let origin = page_origin(page_url)?;
        let profiles = match self.profiles.origin() {
            Some(_) => self.profiles.clone(),
            None => self.profiles.for_origin(&origin),
        };
        let fetcher = RetryingFetcher::new(self.client, self.options.policy);

        let page = match fetcher.fetch(page_url, &profiles.build(&HeaderProfile::Html)) {
            Ok(body) => String::from_utf8_lossy(&body).into_owned(),
            Err(e) => {
                tracing::debug!(page_url, error = %e, "page fetch failed");
                return Ok(ResolutionOutcome::Blocked(BlockReason::AntiBot));
            }
        };
        tracing::debug!(page_url, bytes = page.len(), "page fetched");

        let (token_at, token) =
            search_between(&page, TOKEN_MARKER, ATTR_END).ok_or(ResolveError::MissingMarker {
                marker: TOKEN_MARKER,
                context: "video page",
            })?;
        let (_, video_id) = search_between(&page[token_at..], VIDEO_ID_MARKER, ATTR_END).ok_or(
            ResolveError::MissingMarker {
                marker: VIDEO_ID_MARKER,
                context: "video page",
            },
        )?;
        tracing::debug!(page_url, video_id, "found token and video id");

        let api_url = format!("{}/api/video/{}?token={}", origin, video_id, token);
        let api_headers = profiles.build(&HeaderProfile::Api {
            referer: api_url.clone(),
        });
        let api_body = fetcher.fetch(&api_url, &api_headers)?;
        let api_body = String::from_utf8_lossy(&api_body);
        match api_body.trim() {
            SENTINEL_SUBSCRIBE => return Ok(ResolutionOutcome::Blocked(BlockReason::QuotaExceeded)),
            SENTINEL_SIGNIN => return Ok(ResolutionOutcome::Blocked(BlockReason::LoginRequired)),
            SENTINEL_WRONG_TOKEN => {
                return match self.options.wrong_token {
                    WrongTokenPolicy::Fatal => Err(ResolveError::WrongToken),
                    WrongTokenPolicy::AntiBot => {
                        Ok(ResolutionOutcome::Blocked(BlockReason::AntiBot))
                    }
                }
            }
            _ => {}
        }
        let (_, src) = search_between(&api_body, SOURCE_MARKER, ATTR_END).ok_or(
            ResolveError::MissingMarker {
                marker: SOURCE_MARKER,
                context: "api response",
            },
        )?;
        let manifest_url = src.replace("amp;", "");
        tracing::debug!(page_url, manifest_url = %manifest_url, "api returned manifest url");

        let segment_headers = profiles.build(&HeaderProfile::Segment);
        let mut working_url = manifest_url.clone();
        let mut text = String::from_utf8_lossy(&fetcher.fetch(&working_url, &segment_headers)?)
            .into_owned();
        if is_variant_manifest(&text) {
            working_url = select_max_variant(&text, url_prefix(&working_url)).ok_or(
                ResolveError::MissingMarker {
                    marker: crate::playlist::STREAM_INF,
                    context: "variant manifest (no variant uri)",
                },
            )?;
            tracing::debug!(page_url, variant = %working_url, "selected max variant");
            text = String::from_utf8_lossy(&fetcher.fetch(&working_url, &segment_headers)?)
                .into_owned();
        }

        let normalized = normalize_segment_lines(&text, url_prefix(&working_url));
        let basename = derive_basename(
            self.options.filename_source,
            page_url,
            &manifest_url,
            &self.options.filename_prefix,
        )?;
        let manifest = Manifest::from_text(normalized.into_bytes(), basename)
            .with_source_url(working_url);
        if manifest.is_empty() {
            return Err(ResolveError::EmptyManifest);
        }
        tracing::debug!(
            page_url,
            segments = manifest.len(),
            basename = manifest.output_basename(),
            "manifest resolved"
        );
        Ok(ResolutionOutcome::Resolved(manifest))
    }
}

fn page_origin(page_url: &str) -> Result<String, ResolveError> {
    let parsed = url::Url::parse(page_url).map_err(|e| ResolveError::InvalidUrl {
        url: page_url.to_string(),
        reason: e.to_string(),
    })?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(ResolveError::InvalidUrl {
            url: page_url.to_string(),
            reason: "url has no origin".to_string(),
        });
    }
    Ok(origin.ascii_serialization())
}
