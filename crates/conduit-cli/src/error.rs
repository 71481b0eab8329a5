use conduit_core::error::PipelineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("failed to read the configuration file: {0}")]
    ConfigFileRead(#[from] std::io::Error),

    #[error("failed to parse the configuration file as TOML: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("stage failed: {0}")]
    Stage(#[from] PipelineError),
}
