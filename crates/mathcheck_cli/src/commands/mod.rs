pub mod check;
pub mod config;
pub mod request_json;

use anyhow::{Context, Result};
use mathcheck_engine::{EngineConfig, VerificationEngine};
use std::path::Path;

/// Engine for this invocation, configured from `--config` when given.
pub fn load_engine(config_path: Option<&Path>) -> Result<VerificationEngine> {
    let config = load_config(config_path)?;
    Ok(VerificationEngine::from_config(config))
}

pub fn load_config(config_path: Option<&Path>) -> Result<EngineConfig> {
    match config_path {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Could not load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}
