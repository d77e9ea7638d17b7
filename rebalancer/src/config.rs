//! TOML configuration loading and validation.

use std::path::{Path, PathBuf};
use std::time::Duration;

use driftbook_broker::wealthsimple::client::DEFAULT_BASE_URL;
use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration. Every section may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub broker: BrokerConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptConfig {
    /// When false, any choice that needs the user fails instead.
    #[serde(default = "default_true")]
    pub interactive: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            interactive: default_true(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_audit_file")]
    pub audit_file: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            audit_file: default_audit_file(),
            enabled: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_log_dir() -> String {
    "./logs".into()
}
fn default_audit_file() -> String {
    "audit.jsonl".into()
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// Load `path` if it exists; a missing file yields the defaults when
    /// `path` was not given explicitly.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<Self> {
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate config invariants.
    fn validate(&self) -> Result<()> {
        let url = &self.broker.base_url;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(Error::Config(format!(
                "broker.base_url must be an http(s) URL, got '{url}'"
            )));
        }
        if self.broker.timeout_secs == 0 {
            return Err(Error::Config("broker.timeout_secs must be > 0".into()));
        }
        if self.logging.enabled && self.logging.audit_file.is_empty() {
            return Err(Error::Config(
                "logging.audit_file must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.broker.timeout_secs)
    }

    /// Full path to the audit log file.
    pub fn audit_path(&self) -> PathBuf {
        Path::new(&self.logging.dir).join(&self.logging.audit_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_toml() -> &'static str {
        r#"
[broker]
base_url = "https://trade-service.wealthsimple.com"
timeout_secs = 15

[prompt]
interactive = false

[logging]
dir = "./logs"
audit_file = "audit.jsonl"
enabled = true
"#
    }

    #[test]
    fn parse_example_config() {
        let config = Config::from_toml(example_toml()).unwrap();
        assert_eq!(config.broker.timeout_secs, 15);
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert!(!config.prompt.interactive);
        assert!(config.logging.enabled);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.broker.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.broker.timeout_secs, 30);
        assert!(config.prompt.interactive);
        assert_eq!(config.logging.audit_file, "audit.jsonl");
    }

    #[test]
    fn partial_section_fills_defaults() {
        let config = Config::from_toml("[broker]\ntimeout_secs = 5\n").unwrap();
        assert_eq!(config.broker.base_url, default_base_url());
        assert_eq!(config.broker.timeout_secs, 5);
    }

    #[test]
    fn validate_catches_zero_timeout() {
        let err = Config::from_toml("[broker]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn validate_catches_bad_url() {
        let err = Config::from_toml("[broker]\nbase_url = \"ftp://x\"\n").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn validate_catches_empty_audit_file() {
        let toml = example_toml().replace("\"audit.jsonl\"", "\"\"");
        assert!(Config::from_toml(&toml).is_err());

        let toml = toml.replace("enabled = true", "enabled = false");
        assert!(Config::from_toml(&toml).is_ok());
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = Config::from_toml("[broker\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn audit_path() {
        let config = Config::from_toml(example_toml()).unwrap();
        assert_eq!(config.audit_path(), PathBuf::from("./logs/audit.jsonl"));
    }

    #[test]
    fn missing_default_file_is_ok_but_explicit_is_not() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert!(Config::load_or_default(&path, false).is_ok());
        assert!(matches!(
            Config::load_or_default(&path, true),
            Err(Error::ConfigRead { .. })
        ));
    }
}
