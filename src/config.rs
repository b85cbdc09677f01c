//! Configuration file parser for ~/.config/feedsnap/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Fetch and query settings.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Whole-request timeout in seconds, applied to every HTTP attempt.
    pub timeout_secs: u64,

    /// Maximum response body size in bytes.
    pub max_body_bytes: usize,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Days before today used as the cutoff when none is given.
    pub lookback_days: u32,

    /// Alternate paths probed when a URL yields no feed.
    pub alt_paths: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_body_bytes: 10 * 1024 * 1024, // 10MB
            user_agent: concat!("feedsnap/", env!("CARGO_PKG_VERSION")).to_string(),
            lookback_days: crate::feed::DEFAULT_LOOKBACK_DAYS,
            alt_paths: Vec::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "timeout_secs",
        "max_body_bytes",
        "user_agent",
        "lookback_days",
        "alt_paths",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        Self::parse(&content)
    }

    /// Parses TOML config content; blank content yields defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::debug!(
            timeout_secs = config.timeout_secs,
            lookback_days = config.lookback_days,
            alt_paths = config.alt_paths.len(),
            "Loaded configuration"
        );
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_body_bytes, 10 * 1024 * 1024);
        assert!(config.user_agent.starts_with("feedsnap/"));
        assert_eq!(config.lookback_days, 60);
        assert!(config.alt_paths.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/feedsnap_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("feedsnap_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "   \n  ").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let config = Config::parse("lookback_days = 14\n").unwrap();
        assert_eq!(config.lookback_days, 14);
        assert_eq!(config.timeout_secs, 30); // default
        assert!(config.alt_paths.is_empty()); // default
    }

    #[test]
    fn test_full_config() {
        let dir = std::env::temp_dir().join("feedsnap_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
timeout_secs = 5
max_body_bytes = 1024
user_agent = "test-agent"
lookback_days = 7
alt_paths = ["wod", "feed"]
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.lookback_days, 7);
        assert_eq!(config.alt_paths, vec!["wod", "feed"]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::parse("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let config = Config::parse("lookback_days = 3\ntotally_fake_key = true\n").unwrap();
        assert_eq!(config.lookback_days, 3);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        assert!(Config::parse("lookback_days = \"soon\"\n").is_err());
    }

    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("feedsnap_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "a".repeat(1_048_577)).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
