use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::naming::{FilenameSource, DEFAULT_PREFIX};
use crate::retry::FetchPolicy;

/// Retry/timeout parameters of one request class (optional section in
/// config.toml). Missing fields fall back to the built-in policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Initial per-request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Counted failures tolerated before giving up.
    #[serde(default)]
    pub max_retries: Option<u32>,
    /// Pause before an ordinary retry, in milliseconds.
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
    /// Pause before retrying an HTTP 429, in milliseconds.
    #[serde(default)]
    pub throttle_delay_ms: Option<u64>,
    /// Seconds added to the timeout after a transport failure.
    #[serde(default)]
    pub timeout_step_secs: Option<u64>,
}

impl FetchConfig {
    /// Overlay the configured fields onto `base`.
    pub fn apply(&self, base: FetchPolicy) -> FetchPolicy {
        FetchPolicy {
            timeout: self.timeout_secs.map_or(base.timeout, Duration::from_secs),
            max_retries: self.max_retries.unwrap_or(base.max_retries),
            retry_delay: self
                .retry_delay_ms
                .map_or(base.retry_delay, Duration::from_millis),
            throttle_delay: self
                .throttle_delay_ms
                .map_or(base.throttle_delay, Duration::from_millis),
            timeout_step: self
                .timeout_step_secs
                .map_or(base.timeout_step, Duration::from_secs),
        }
    }
}

/// What to do when the API answers `wrong_token`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WrongTokenPolicy {
    /// Report the job as a fatal resolution error.
    #[default]
    Fatal,
    /// Treat as an anti-bot block: skip the job, keep going.
    AntiBot,
}

/// Global configuration loaded from `~/.config/recu/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecuConfig {
    /// Extension of muxed output files.
    pub output_extension: String,
    /// Pause between launching parallel mux tasks, in milliseconds.
    pub launch_stagger_ms: u64,
    /// Prefix of derived output basenames.
    pub filename_prefix: String,
    /// "manifest-url" (default) or "page-url".
    #[serde(default)]
    pub filename_source: FilenameSource,
    /// "fatal" (default) or "anti-bot".
    #[serde(default)]
    pub wrong_token: WrongTokenPolicy,
    /// Page, API and manifest requests.
    #[serde(default)]
    pub resolver_fetch: Option<FetchConfig>,
    /// Segment requests.
    #[serde(default)]
    pub segment_fetch: Option<FetchConfig>,
}

impl Default for RecuConfig {
    fn default() -> Self {
        Self {
            output_extension: "ts".to_string(),
            launch_stagger_ms: 1000,
            filename_prefix: DEFAULT_PREFIX.to_string(),
            filename_source: FilenameSource::default(),
            wrong_token: WrongTokenPolicy::default(),
            resolver_fetch: None,
            segment_fetch: None,
        }
    }
}

impl RecuConfig {
    pub fn resolver_policy(&self) -> FetchPolicy {
        let base = FetchPolicy::resolver();
        self.resolver_fetch.as_ref().map_or(base, |c| c.apply(base))
    }

    pub fn segment_policy(&self) -> FetchPolicy {
        let base = FetchPolicy::segment();
        self.segment_fetch.as_ref().map_or(base, |c| c.apply(base))
    }

    pub fn launch_stagger(&self) -> Duration {
        Duration::from_millis(self.launch_stagger_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("recu")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RecuConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RecuConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: RecuConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RecuConfig::default();
        assert_eq!(cfg.output_extension, "ts");
        assert_eq!(cfg.launch_stagger(), Duration::from_secs(1));
        assert_eq!(cfg.filename_prefix, "CB");
        assert_eq!(cfg.filename_source, FilenameSource::ManifestUrl);
        assert_eq!(cfg.wrong_token, WrongTokenPolicy::Fatal);
        assert_eq!(cfg.resolver_policy(), FetchPolicy::resolver());
        assert_eq!(cfg.segment_policy(), FetchPolicy::segment());
    }

    #[test]
    fn config_toml_defaults_survive_serialization() {
        let cfg = RecuConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: RecuConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.output_extension, cfg.output_extension);
        assert_eq!(parsed.launch_stagger_ms, cfg.launch_stagger_ms);
        assert_eq!(parsed.filename_source, cfg.filename_source);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            output_extension = "mp4"
            launch_stagger_ms = 0
            filename_prefix = "REC"
            filename_source = "page-url"
            wrong_token = "anti-bot"
        "#;
        let cfg: RecuConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.output_extension, "mp4");
        assert_eq!(cfg.launch_stagger(), Duration::ZERO);
        assert_eq!(cfg.filename_prefix, "REC");
        assert_eq!(cfg.filename_source, FilenameSource::PageUrl);
        assert_eq!(cfg.wrong_token, WrongTokenPolicy::AntiBot);
        assert!(cfg.resolver_fetch.is_none());
    }

    #[test]
    fn config_toml_partial_fetch_sections() {
        let toml = r#"
            output_extension = "ts"
            launch_stagger_ms = 1000
            filename_prefix = "CB"

            [segment_fetch]
            max_retries = 3
            retry_delay_ms = 0

            [resolver_fetch]
            timeout_secs = 20
        "#;
        let cfg: RecuConfig = toml::from_str(toml).unwrap();
        let seg = cfg.segment_policy();
        assert_eq!(seg.max_retries, 3);
        assert_eq!(seg.retry_delay, Duration::ZERO);
        assert_eq!(seg.timeout, FetchPolicy::segment().timeout);
        let res = cfg.resolver_policy();
        assert_eq!(res.timeout, Duration::from_secs(20));
        assert_eq!(res.max_retries, FetchPolicy::resolver().max_retries);
    }
}
