use anyhow::Result;
use mathcheck_engine::EngineConfig;

/// The effective configuration as TOML.
pub fn render(config: &EngineConfig) -> Result<String> {
    Ok(config.to_toml_string()?)
}
