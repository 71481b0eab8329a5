use conduit_engine::StageConfig;

use crate::error::CliError;

/// Loads a [`StageConfig`] from a TOML file on disk. The on-disk shape is
/// identical to the programmatic one, so this deserializes straight into
/// it rather than through an intermediate type.
pub fn load_stage_config(
    path: &str,
    consumers_override: Option<usize>,
    chunk_size_override: Option<usize>,
) -> Result<StageConfig, CliError> {
    let text = std::fs::read_to_string(path)?;
    let mut config: StageConfig = toml::from_str(&text)?;

    if let Some(consumers) = consumers_override {
        config.consumers = consumers;
    }
    if let Some(chunk_size) = chunk_size_override {
        config.chunk_size = chunk_size;
    }

    Ok(config)
}
