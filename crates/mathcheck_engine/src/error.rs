use crate::capability::CapabilityError;
use crate::report::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    /// The result-level classification of this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Capability(CapabilityError::Parse(_)) => ErrorKind::InvalidFormat,
            EngineError::Capability(CapabilityError::InvalidValue(_)) => ErrorKind::InvalidValue,
            EngineError::Capability(_) => ErrorKind::EvaluationFailed,
            EngineError::InvalidInput(_) => ErrorKind::InvalidFormat,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
