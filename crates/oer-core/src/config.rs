//! OER Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with defaults for standard extraction.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Relation extraction settings
    pub extractor: ExtractorConfig,

    /// Document splitting settings
    pub document: DocumentConfig,

    /// Batch execution settings
    pub runtime: RuntimeConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Merge with environment variables (env takes precedence).
    ///
    /// Every variable that is set wins, even when it equals the default.
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        if let Ok(value) = std::env::var("OER_INCLUDE_GENERIC") {
            self.extractor.include_generic_nouns = parse_var("OER_INCLUDE_GENERIC", value)?;
        }
        if let Ok(value) = std::env::var("OER_MAX_GAP") {
            self.extractor.max_entity_gap = parse_var("OER_MAX_GAP", value)?;
        }
        if let Ok(value) = std::env::var("OER_MAX_HOPS") {
            self.extractor.max_modifier_hops = parse_var("OER_MAX_HOPS", value)?;
        }
        if let Ok(value) = std::env::var("OER_PROVENANCE") {
            self.extractor.include_provenance = parse_var("OER_PROVENANCE", value)?;
        }
        if let Ok(value) = std::env::var("OER_WORKERS") {
            self.runtime.workers = parse_var("OER_WORKERS", value)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(self)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Relation extraction configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Admit generic nouns (`n`, `nl`) as candidate entities
    pub include_generic_nouns: bool,

    /// Maximum number of entities allowed between the two members of a pair
    pub max_entity_gap: usize,

    /// Attribute links an entity may climb to reach its syntactic role
    pub max_modifier_hops: usize,

    /// Surface forms of the genitive particle
    pub genitive_particles: Vec<String>,

    /// Keep the producing pattern on each triple in the output
    pub include_provenance: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            include_generic_nouns: true,
            max_entity_gap: 4,
            max_modifier_hops: 1,
            genitive_particles: vec!["的".to_string()],
            include_provenance: false,
        }
    }
}

/// Document splitting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Characters ending a sentence (newlines always do)
    pub sentence_delimiters: String,

    /// Fragments with fewer characters are skipped
    pub min_sentence_chars: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            sentence_delimiters: "。？！；".to_string(),
            min_sentence_chars: 6,
        }
    }
}

/// Batch execution configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Sentences processed concurrently
    pub workers: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for crate::OerError {
    fn from(err: ConfigError) -> Self {
        crate::OerError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.extractor.include_generic_nouns);
        assert_eq!(config.extractor.max_entity_gap, 4);
        assert_eq!(config.extractor.genitive_particles, vec!["的".to_string()]);
        assert_eq!(config.document.min_sentence_chars, 6);
        assert_eq!(config.runtime.workers, 4);
    }

    #[test]
    fn test_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            [extractor]
            max_entity_gap = 2
            include_generic_nouns = false

            [logging]
            json_format = true
            "#,
        )
        .unwrap();

        assert_eq!(config.extractor.max_entity_gap, 2);
        assert!(!config.extractor.include_generic_nouns);
        assert_eq!(config.extractor.max_modifier_hops, 1);
        assert!(config.logging.json_format);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.document, DocumentConfig::default());
    }

    #[test]
    fn test_from_file_missing() {
        let err = AppConfig::from_file("/nonexistent/oer.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileReadError { .. }));
    }

    #[test]
    fn test_env_overrides_file_even_at_default_values() {
        let path = std::env::temp_dir().join(format!("oer-config-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[extractor]\ninclude_generic_nouns = false\nmax_entity_gap = 2\n",
        )
        .unwrap();

        std::env::set_var("OER_INCLUDE_GENERIC", "true");
        std::env::set_var("OER_MAX_GAP", "4");
        let config = AppConfig::from_file(&path).and_then(AppConfig::with_env_override);
        std::env::remove_var("OER_INCLUDE_GENERIC");
        std::env::remove_var("OER_MAX_GAP");
        std::fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert!(config.extractor.include_generic_nouns);
        assert_eq!(config.extractor.max_entity_gap, 4);
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var::<usize>("OER_MAX_GAP", " 3 ".to_string()).unwrap(), 3);
        assert!(parse_var::<bool>("OER_PROVENANCE", "maybe".to_string()).is_err());
    }
}
