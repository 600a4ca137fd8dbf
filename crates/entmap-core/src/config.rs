//! TOML configuration for a mapping session.
//!
//! ```toml
//! [export]
//! default_format = "ordered_pairs"
//! gap_mode = "skip_gaps"
//!
//! [relations]
//! max_depth = 4
//!
//! [metrics]
//! enabled = false
//! ```

use crate::{
    entity::{ExportFormat, GapMode},
    error::{ErrorClass, ErrorKind, ErrorOrigin, InternalError},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Default bound on nested relation resolution.
pub const DEFAULT_MAX_RELATION_DEPTH: u32 = 8;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Config,
            ErrorKind::InvalidConfig,
            err.to_string(),
        )
    }
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub export: ExportConfig,
    pub relations: RelationConfig,
    pub metrics: MetricsConfig,
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, InternalError> {
        let config: Self = toml::from_str(source).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, InternalError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), InternalError> {
        if self.relations.max_depth == 0 {
            return Err(ConfigError::Invalid("relations.max_depth must be at least 1".into()).into());
        }

        Ok(())
    }
}

///
/// ExportConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub default_format: ExportFormat,
    pub gap_mode: GapMode,
}

///
/// RelationConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RelationConfig {
    pub max_depth: u32,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_RELATION_DEPTH,
        }
    }
}

///
/// MetricsConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").expect("empty config should parse");

        assert_eq!(config, Config::default());
        assert_eq!(config.export.gap_mode, GapMode::StopAtGap);
        assert_eq!(config.export.default_format, ExportFormat::Mapping);
        assert_eq!(config.relations.max_depth, DEFAULT_MAX_RELATION_DEPTH);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            [export]
            default_format = "ordered_pairs"
            gap_mode = "skip_gaps"

            [relations]
            max_depth = 2

            [metrics]
            enabled = false
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.export.default_format, ExportFormat::OrderedPairs);
        assert_eq!(config.export.gap_mode, GapMode::SkipGaps);
        assert_eq!(config.relations.max_depth, 2);
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn unknown_keys_and_values_are_rejected() {
        let err = Config::from_toml_str("[export]\nformat = \"mapping\"\n")
            .expect_err("unknown key should fail");
        assert_eq!(err.kind, ErrorKind::InvalidConfig);

        let err = Config::from_toml_str("[export]\ngap_mode = \"sometimes\"\n")
            .expect_err("unknown gap mode should fail");
        assert_eq!(err.kind, ErrorKind::InvalidConfig);
    }

    #[test]
    fn zero_depth_is_invalid() {
        let err = Config::from_toml_str("[relations]\nmax_depth = 0\n")
            .expect_err("zero depth should fail");

        assert_eq!(err.kind, ErrorKind::InvalidConfig);
        assert!(err.message.contains("max_depth"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load("/nonexistent/entmap.toml").expect_err("file does not exist");

        assert_eq!(err.kind, ErrorKind::InvalidConfig);
        assert!(err.message.contains("/nonexistent/entmap.toml"));
    }
}
