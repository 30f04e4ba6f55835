//! Client configuration with builder pattern
//!
//! Provides a unified configuration for request pacing, timeouts and
//! monitoring features with sane defaults.

use std::time::Duration;

/// Root of the Airtable meta API
pub const DEFAULT_META_URL: &str = "https://api.airtable.com/v0/meta";

/// Global configuration for schema store calls
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub meta_url: String,
    pub timeout: Duration,
    pub pacing: PacingConfig,
    pub monitoring: MonitoringConfig,
}

/// Request pacing configuration
///
/// Airtable allows 5 requests per second per base; exceeding it returns 429
/// and a 30 second penalty.
#[derive(Debug, Clone)]
pub struct PacingConfig {
    pub requests_per_second: u32,
    pub enabled: bool,
}

/// Monitoring and logging configuration
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    /// Log every request and response status at debug level
    pub request_logging: bool,
}

impl PacingConfig {
    /// Minimum spacing between two consecutive requests
    pub fn min_interval(&self) -> Duration {
        if !self.enabled || self.requests_per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs(1) / self.requests_per_second
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            meta_url: DEFAULT_META_URL.to_string(),
            timeout: Duration::from_secs(30),
            pacing: PacingConfig::default(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            enabled: true,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            request_logging: true,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for ClientConfig
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for ClientConfig
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    /// Set the meta API root (useful for proxies and mock servers)
    pub fn meta_url(mut self, url: impl Into<String>) -> Self {
        self.config.meta_url = url.into();
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set requests per second limit
    pub fn requests_per_second(mut self, rps: u32) -> Self {
        self.config.pacing.requests_per_second = rps;
        self
    }

    /// Enable/disable pacing
    pub fn enable_pacing(mut self, enabled: bool) -> Self {
        self.config.pacing.enabled = enabled;
        self
    }

    /// Enable/disable request logging
    pub fn request_logging(mut self, enabled: bool) -> Self {
        self.config.monitoring.request_logging = enabled;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();

        assert_eq!(config.meta_url, DEFAULT_META_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.pacing.requests_per_second, 5);
        assert!(config.pacing.enabled);
        assert!(config.monitoring.request_logging);
        assert_eq!(config.pacing.min_interval(), Duration::from_millis(200));
    }

    #[test]
    fn test_zero_rps_means_no_pacing() {
        let pacing = PacingConfig {
            requests_per_second: 0,
            enabled: true,
        };
        assert_eq!(pacing.min_interval(), Duration::ZERO);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ClientConfig::builder()
            .meta_url("http://localhost:8080/v0/meta")
            .timeout(Duration::from_secs(5))
            .requests_per_second(10)
            .enable_pacing(true)
            .request_logging(false)
            .build();

        assert_eq!(config.meta_url, "http://localhost:8080/v0/meta");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.pacing.requests_per_second, 10);
        assert!(config.pacing.enabled);
        assert!(!config.monitoring.request_logging);
    }
}
