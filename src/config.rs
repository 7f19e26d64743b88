//! Configuration management

use std::path::Path;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Dashboard API endpoints
    pub api: ApiConfig,
    /// Response cache behavior
    pub cache: CacheConfig,
}

/// Dashboard API endpoints and transport limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the analytics API
    pub base_url: String,
    /// Optional reporting host for heavy aggregate queries; falls back
    /// to `base_url` when unset
    pub report_url: Option<String>,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dashboard-api.shipdash.dev/api/".to_string(),
            report_url: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable response caching
    pub enabled: bool,
    /// Default TTL for cached responses
    #[serde(with = "humantime_serde")]
    pub default_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_ttl: crate::cache::DEFAULT_TTL,
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Values merge in order: defaults, then the YAML file (when given),
    /// then `SHIPDASH_`-prefixed environment variables
    /// (`SHIPDASH_CACHE__DEFAULT_TTL=90s` targets `cache.default_ttl`).
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist, cannot be
    /// parsed, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        figment = figment.merge(Env::prefixed("SHIPDASH_").split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate endpoint URLs
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for unparsable URLs.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api.base_url)
            .map_err(|e| Error::Config(format!("Invalid api.base_url '{}': {e}", self.api.base_url)))?;
        if let Some(report_url) = &self.api.report_url {
            Url::parse(report_url)
                .map_err(|e| Error::Config(format!("Invalid api.report_url '{report_url}': {e}")))?;
        }
        Ok(())
    }

    /// Reporting host, defaulting to the main API host
    #[must_use]
    pub fn report_url(&self) -> &str {
        self.api.report_url.as_deref().unwrap_or(&self.api.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_are_a_working_configuration() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.cache.enabled);
        assert_eq!(config.cache.default_ttl, Duration::from_millis(300_000));
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.report_url(), config.api.base_url);
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let config = Config::load(None).expect("defaults should load");
        assert_eq!(config.cache.default_ttl, Duration::from_millis(300_000));
    }

    #[test]
    fn load_reads_yaml_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shipdash.yaml");
        fs::write(
            &path,
            "api:\n  base_url: https://qa.shipdash.dev/api/\n  timeout: 10s\ncache:\n  enabled: false\n  default_ttl: 90s\n",
        )
        .expect("write config");

        let config = Config::load(Some(&path)).expect("config should parse");
        assert_eq!(config.api.base_url, "https://qa.shipdash.dev/api/");
        assert_eq!(config.api.timeout, Duration::from_secs(10));
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.default_ttl, Duration::from_secs(90));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/shipdash.yaml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err:?}");
    }

    #[test]
    fn invalid_base_url_fails_validation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shipdash.yaml");
        fs::write(&path, "api:\n  base_url: 'not a url'\n").expect("write config");

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err:?}");
    }
}
