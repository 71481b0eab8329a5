use thiserror::Error;

/// Fatal errors raised by pipeline workers.
///
/// Every variant is terminal: there is no local retry path. The `phase`
/// tag lets callers log which side of the pipeline failed without parsing
/// the message text.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("source query failed: {0}")]
    Extract(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("target insert failed: {0}")]
    Insert(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("protocol violation: {0}")]
    Protocol(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("worker task did not complete cleanly: {0}")]
    Join(String),
}

impl PipelineError {
    /// Context tag for the phase the failure occurred in.
    pub fn phase(&self) -> &'static str {
        match self {
            PipelineError::Extract(_) => "extract",
            PipelineError::Insert(_) => "insert",
            PipelineError::Protocol(_) => "protocol",
            PipelineError::Configuration(_) => "config",
            PipelineError::Join(_) => "join",
        }
    }
}
