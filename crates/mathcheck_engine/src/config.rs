use crate::error::ConfigError;
use crate::sampling::DEFAULT_SAMPLE_VALUES;
use mathcheck_symbolic::CasOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Two values closer than this are the same answer.
    pub tolerance: f64,
    /// Values substituted when a difference stays symbolic.
    pub sample_values: Vec<f64>,
    /// Integer powers of sums up to this exponent are expanded.
    pub max_expand_exponent: u32,
    /// Used when no variable can be discovered in the input.
    pub default_variable: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            sample_values: DEFAULT_SAMPLE_VALUES.to_vec(),
            max_expand_exponent: 16,
            default_variable: "x".to_string(),
        }
    }
}

impl EngineConfig {
    /// Read a TOML file. A missing file yields the defaults; an unreadable or
    /// malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(target: "mathcheck::config", path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml_string()?;
        let io_error = |source: io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = fs::File::create(path).map_err(io_error)?;
        file.write_all(content.as_bytes()).map_err(io_error)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "tolerance",
                reason: format!("must be a positive finite number, got {}", self.tolerance),
            });
        }
        if self.sample_values.is_empty() {
            return Err(ConfigError::Invalid {
                field: "sample_values",
                reason: "at least one sample value is required".to_string(),
            });
        }
        if let Some(bad) = self.sample_values.iter().find(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "sample_values",
                reason: format!("{} is not finite", bad),
            });
        }
        if self.max_expand_exponent == 0 {
            return Err(ConfigError::Invalid {
                field: "max_expand_exponent",
                reason: "must be at least 1".to_string(),
            });
        }
        let mut chars = self.default_variable.chars();
        let valid_name = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_name {
            return Err(ConfigError::Invalid {
                field: "default_variable",
                reason: format!("'{}' is not a variable name", self.default_variable),
            });
        }
        Ok(())
    }

    pub fn cas_options(&self) -> CasOptions {
        CasOptions {
            max_expand_exponent: self.max_expand_exponent,
            ..CasOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.tolerance, 1e-4);
        assert_eq!(config.sample_values.len(), 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str("tolerance = 0.001\n").expect("parse");
        assert_eq!(config.tolerance, 0.001);
        assert_eq!(config.default_variable, "x");
        assert_eq!(config.max_expand_exponent, 16);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_toml_str("tolerance = -1.0"),
            Err(ConfigError::Invalid { field: "tolerance", .. })
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("sample_values = []"),
            Err(ConfigError::Invalid { field: "sample_values", .. })
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("default_variable = \"2x\""),
            Err(ConfigError::Invalid { field: "default_variable", .. })
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("tolerance = \"small\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = EngineConfig {
            tolerance: 1e-6,
            default_variable: "t".to_string(),
            ..EngineConfig::default()
        };
        let text = config.to_toml_string().expect("serialize");
        assert_eq!(EngineConfig::from_toml_str(&text).expect("parse"), config);
    }
}
