//! Client configuration with YAML and TOML support

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MdfeClientError, Result};

/// MDFe client configuration
///
/// Can be loaded from YAML, TOML, or constructed programmatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the NFHub API
    pub base_url: String,

    /// Timeout settings
    #[serde(default)]
    pub timeouts: TimeoutsConfig,

    /// User-Agent sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Timeout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeoutsConfig {
    /// General request timeout in milliseconds (default: 30s)
    #[serde(default = "default_request_timeout")]
    pub request_ms: u64,

    /// Connect timeout in milliseconds (default: 10s)
    #[serde(default = "default_connect_timeout")]
    pub connect_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            request_ms: default_request_timeout(),
            connect_ms: default_connect_timeout(),
        }
    }
}

impl TimeoutsConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }

    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }
}

fn default_request_timeout() -> u64 {
    30_000 // 30 seconds
}

fn default_connect_timeout() -> u64 {
    10_000 // 10 seconds
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeouts: TimeoutsConfig::default(),
            user_agent: None,
        }
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| MdfeClientError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| MdfeClientError::Config(e.to_string()))
    }

    /// Set the request timeout
    pub fn request_timeout_ms(mut self, ms: u64) -> Self {
        self.timeouts.request_ms = ms;
        self
    }

    /// Set the connect timeout
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.timeouts.connect_ms = ms;
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_yaml_parsing() {
        let yaml = r#"
base_url: "https://api.nfhub.com.br/"
timeouts:
  request_ms: 5000
"#;

        let config = ClientConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.base_url, "https://api.nfhub.com.br/");
        assert_eq!(config.timeouts.request_ms, 5000);
        assert_eq!(config.timeouts.connect_ms, 10_000);
        assert_eq!(config.user_agent, None);
    }

    #[test]
    fn test_toml_parsing() {
        let content = r#"
base_url = "http://localhost:9000"
user_agent = "mdfe-cli/0.1"
"#;

        let config = ClientConfig::from_toml(content).unwrap();
        assert_eq!(
            config,
            ClientConfig::new("http://localhost:9000").user_agent("mdfe-cli/0.1")
        );
        assert_eq!(config.timeouts.request(), Duration::from_secs(30));
    }

    #[test]
    fn test_missing_base_url() {
        let err = ClientConfig::from_yaml("timeouts: {}").unwrap_err();
        assert!(matches!(err, MdfeClientError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: http://localhost:1234").unwrap();

        let config = ClientConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.base_url, "http://localhost:1234");
    }

    #[test]
    fn test_builder_methods() {
        let config = ClientConfig::new("http://x")
            .request_timeout_ms(1000)
            .connect_timeout_ms(200);
        assert_eq!(config.timeouts.request(), Duration::from_secs(1));
        assert_eq!(config.timeouts.connect(), Duration::from_millis(200));
    }
}
