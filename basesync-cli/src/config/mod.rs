//! Configuration management for basesync
//!
//! Settings are resolved from several layers, highest priority first:
//! - Command-line flags
//! - Environment variables (a `.env` file is loaded at startup)
//! - TOML config file (`--config` or `<config_dir>/basesync/config.toml`)
//! - Built-in defaults

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ClientConfig;

pub const ENV_API_KEY: &str = "AIRTABLE_API_KEY";
pub const ENV_WORKSPACE_ID: &str = "AIRTABLE_WORKSPACE_ID";
pub const ENV_META_URL: &str = "AIRTABLE_META_URL";
pub const ENV_REQUESTS_PER_SECOND: &str = "BASESYNC_REQUESTS_PER_SECOND";

/// One layer of optional settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub api_key: Option<String>,
    pub workspace_id: Option<String>,
    pub meta_url: Option<String>,
    pub requests_per_second: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub request_logging: Option<bool>,
}

impl ConfigLayer {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Read the layer from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the layer through a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let requests_per_second = match non_empty(ENV_REQUESTS_PER_SECOND) {
            Some(raw) => Some(raw.trim().parse::<u32>().with_context(|| {
                format!("{} must be a whole number, got '{}'", ENV_REQUESTS_PER_SECOND, raw)
            })?),
            None => None,
        };

        Ok(Self {
            api_key: non_empty(ENV_API_KEY),
            workspace_id: non_empty(ENV_WORKSPACE_ID),
            meta_url: non_empty(ENV_META_URL),
            requests_per_second,
            ..Default::default()
        })
    }

    /// Fill unset values from a lower-priority layer
    pub fn or(self, lower: ConfigLayer) -> Self {
        Self {
            api_key: self.api_key.or(lower.api_key),
            workspace_id: self.workspace_id.or(lower.workspace_id),
            meta_url: self.meta_url.or(lower.meta_url),
            requests_per_second: self.requests_per_second.or(lower.requests_per_second),
            timeout_secs: self.timeout_secs.or(lower.timeout_secs),
            request_logging: self.request_logging.or(lower.request_logging),
        }
    }
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub workspace_id: Option<String>,
    pub client: ClientConfig,
}

impl Config {
    /// Resolve configuration from flags, environment and config file
    ///
    /// # Arguments
    /// * `flags` - Values given on the command line
    /// * `config_path` - Explicit config file; it must exist when given
    pub fn load(flags: ConfigLayer, config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => ConfigLayer::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    log::debug!("Using config file: {}", path.display());
                    ConfigLayer::from_file(&path)?
                }
                _ => ConfigLayer::default(),
            },
        };

        Self::resolve(flags.or(ConfigLayer::from_env()?).or(file))
    }

    /// Apply defaults to a merged layer
    pub fn resolve(layer: ConfigLayer) -> Result<Self> {
        let api_key = layer.api_key.ok_or_else(|| {
            anyhow::anyhow!(
                "No Airtable API key configured. Set {}, pass --api-key, or add api_key to the config file",
                ENV_API_KEY
            )
        })?;

        let defaults = ClientConfig::default();
        let mut builder = ClientConfig::builder()
            .meta_url(layer.meta_url.unwrap_or(defaults.meta_url))
            .timeout(
                layer
                    .timeout_secs
                    .map(Duration::from_secs)
                    .unwrap_or(defaults.timeout),
            )
            .request_logging(
                layer
                    .request_logging
                    .unwrap_or(defaults.monitoring.request_logging),
            );
        if let Some(rps) = layer.requests_per_second {
            builder = builder.requests_per_second(rps).enable_pacing(rps > 0);
        }

        Ok(Self {
            api_key,
            workspace_id: layer.workspace_id,
            client: builder.build(),
        })
    }
}

/// Default config file location, if the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("basesync").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_file_layer() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_key = \"keyFromFile\"\nworkspace_id = \"wspFile\"\nrequests_per_second = 3\ntimeout_secs = 10"
        )
        .unwrap();

        let layer = ConfigLayer::from_file(file.path()).unwrap();

        assert_eq!(layer.api_key.as_deref(), Some("keyFromFile"));
        assert_eq!(layer.workspace_id.as_deref(), Some("wspFile"));
        assert_eq!(layer.requests_per_second, Some(3));
        assert_eq!(layer.timeout_secs, Some(10));
        assert_eq!(layer.meta_url, None);
    }

    #[test]
    fn test_unknown_file_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_kee = \"typo\"").unwrap();

        assert!(ConfigLayer::from_file(file.path()).is_err());
    }

    #[test]
    fn test_env_layer() {
        let layer = ConfigLayer::from_lookup(lookup(&[
            (ENV_API_KEY, "keyFromEnv"),
            (ENV_WORKSPACE_ID, ""),
            (ENV_REQUESTS_PER_SECOND, "4"),
        ]))
        .unwrap();

        assert_eq!(layer.api_key.as_deref(), Some("keyFromEnv"));
        assert_eq!(layer.workspace_id, None);
        assert_eq!(layer.requests_per_second, Some(4));
    }

    #[test]
    fn test_env_layer_rejects_bad_rate() {
        let result = ConfigLayer::from_lookup(lookup(&[(ENV_REQUESTS_PER_SECOND, "fast")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_precedence() {
        let flags = ConfigLayer {
            api_key: Some("keyFromFlag".to_string()),
            ..Default::default()
        };
        let env = ConfigLayer {
            api_key: Some("keyFromEnv".to_string()),
            workspace_id: Some("wspEnv".to_string()),
            ..Default::default()
        };
        let file = ConfigLayer {
            workspace_id: Some("wspFile".to_string()),
            requests_per_second: Some(2),
            ..Default::default()
        };

        let config = Config::resolve(flags.or(env).or(file)).unwrap();

        assert_eq!(config.api_key, "keyFromFlag");
        assert_eq!(config.workspace_id.as_deref(), Some("wspEnv"));
        assert_eq!(config.client.pacing.requests_per_second, 2);
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(ConfigLayer {
            api_key: Some("key".to_string()),
            ..Default::default()
        })
        .unwrap();

        let defaults = ClientConfig::default();
        assert_eq!(config.client.meta_url, defaults.meta_url);
        assert_eq!(config.client.timeout, defaults.timeout);
        assert_eq!(config.client.pacing.requests_per_second, 5);
        assert!(config.client.pacing.enabled);
    }

    #[test]
    fn test_zero_rate_disables_pacing() {
        let config = Config::resolve(ConfigLayer {
            api_key: Some("key".to_string()),
            requests_per_second: Some(0),
            ..Default::default()
        })
        .unwrap();

        assert!(!config.client.pacing.enabled);
    }

    #[test]
    fn test_missing_api_key() {
        let err = Config::resolve(ConfigLayer::default()).unwrap_err();
        assert!(err.to_string().contains(ENV_API_KEY));
    }

    #[test]
    fn test_explicit_config_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        assert!(Config::load(ConfigLayer::default(), Some(&missing)).is_err());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("basesync/config.toml"));
        }
    }
}
