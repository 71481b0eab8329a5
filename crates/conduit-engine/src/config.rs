use conduit_core::error::PipelineError;
use serde::{Deserialize, Serialize};

/// Where the Extractor's rows come from: either a literal query, or a
/// `source_table`/`ignore_columns` convenience — the stage runner resolves
/// the latter into a generated `SELECT` via
/// `conduit_connectors::table_utils::build_select_query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceSpec {
    Query { query: String },
    Table {
        source_table: String,
        #[serde(default)]
        ignore_columns: Vec<String>,
    },
}

/// Programmatic entry point for configuring a stage run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageConfig {
    pub source_url: String,
    pub target_url: String,
    #[serde(flatten)]
    pub source: SourceSpec,
    pub target_table: String,
    #[serde(default = "defaults::consumers")]
    pub consumers: usize,
    #[serde(default = "defaults::chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "defaults::max_rows_buffer")]
    pub max_rows_buffer: usize,
    #[serde(default = "defaults::buffer_size")]
    pub buffer_size: usize,
    /// Condition-wait timeout in seconds. Stored but not wired into any
    /// blocking wait — see DESIGN.md for why this Open Question was
    /// resolved without synthesizing a use case for it.
    #[serde(default = "defaults::timeout_secs")]
    pub timeout_secs: u64,
}

mod defaults {
    pub fn consumers() -> usize {
        2
    }
    pub fn chunk_size() -> usize {
        20_000
    }
    pub fn max_rows_buffer() -> usize {
        100_000
    }
    pub fn buffer_size() -> usize {
        10
    }
    pub fn timeout_secs() -> u64 {
        5
    }
}

impl StageConfig {
    pub fn new(source_url: impl Into<String>, target_url: impl Into<String>, source: SourceSpec, target_table: impl Into<String>) -> Self {
        StageConfig {
            source_url: source_url.into(),
            target_url: target_url.into(),
            source,
            target_table: target_table.into(),
            consumers: defaults::consumers(),
            chunk_size: defaults::chunk_size(),
            max_rows_buffer: defaults::max_rows_buffer(),
            buffer_size: defaults::buffer_size(),
            timeout_secs: defaults::timeout_secs(),
        }
    }

    /// Rejects out-of-range values before any connection is opened.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.consumers < 1 {
            return Err(PipelineError::Configuration("consumers must be >= 1".into()));
        }
        if self.buffer_size < 1 {
            return Err(PipelineError::Configuration("buffer_size must be >= 1".into()));
        }
        if self.chunk_size < 1 {
            return Err(PipelineError::Configuration("chunk_size must be >= 1".into()));
        }
        if self.max_rows_buffer < self.chunk_size {
            return Err(PipelineError::Configuration(
                "max_rows_buffer must be >= chunk_size".into(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(PipelineError::Configuration("timeout_secs must be > 0".into()));
        }
        Ok(())
    }
}
