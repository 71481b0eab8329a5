use std::sync::Arc;
use std::time::{Duration, Instant};

use conduit_connectors::engine::MetadataHandle;
use conduit_connectors::{connect_source, connect_target, table_utils};
use conduit_core::coordinator::Coordinator;
use conduit_core::error::PipelineError;
use conduit_core::worker::Worker;
use tracing::info;

use crate::config::{SourceSpec, StageConfig};
use crate::extractor::Extractor;
use crate::loader::Loader;

/// Row/timing totals logged on clean completion.
#[derive(Debug, Clone)]
pub struct StageSummary {
    pub rows_extracted: u64,
    pub rows_loaded: u64,
    pub elapsed: Duration,
}

/// Wires one Extractor and `consumers` Loaders through a Coordinator and
/// drives the job to completion.
pub async fn run_stage(config: StageConfig) -> Result<StageSummary, PipelineError> {
    config.validate()?;
    let start = Instant::now();

    let source_connector = connect_source(&config.source_url)
        .await
        .map_err(|err| PipelineError::Configuration(err.to_string()))?;
    let target_connector = connect_target(&config.target_url)
        .await
        .map_err(|err| PipelineError::Configuration(err.to_string()))?;

    let query = match &config.source {
        SourceSpec::Query { query } => query.clone(),
        SourceSpec::Table {
            source_table,
            ignore_columns,
        } => {
            let columns = source_connector
                .table_columns(source_table)
                .await
                .map_err(|err| PipelineError::Configuration(err.to_string()))?;
            table_utils::build_select_query(source_table, &columns, ignore_columns)
        }
    };

    let mut target_metadata = MetadataHandle::connect(&config.target_url)
        .await
        .map_err(|err| PipelineError::Configuration(err.to_string()))?;
    table_utils::truncate(&mut target_metadata, &config.target_table)
        .await
        .map_err(|err| PipelineError::Configuration(err.to_string()))?;
    drop(target_metadata);

    let coordinator = Arc::new(Coordinator::new(config.buffer_size));

    let extractor = Arc::new(Extractor::new(
        coordinator.clone(),
        source_connector,
        query,
        config.chunk_size,
        config.max_rows_buffer,
        config.target_table.clone(),
    ));
    coordinator.subscribe(extractor.clone() as Arc<dyn Worker>, true).await;

    let mut loaders = Vec::with_capacity(config.consumers);
    for _ in 0..config.consumers {
        let loader = Arc::new(Loader::new(coordinator.clone(), target_connector.clone()));
        coordinator.subscribe(loader.clone() as Arc<dyn Worker>, false).await;
        loaders.push(loader);
    }

    let extractor_handle = {
        let extractor = extractor.clone();
        tokio::spawn(async move { extractor.run().await })
    };
    let loader_handles: Vec<_> = loaders
        .into_iter()
        .map(|loader| tokio::spawn(async move { loader.run().await }))
        .collect();

    let mut first_error: Option<PipelineError> = None;
    let mut rows_loaded = 0u64;

    for handle in loader_handles {
        match handle.await {
            Ok(Ok(rows)) => rows_loaded += rows,
            Ok(Err(err)) => {
                first_error.get_or_insert(err);
            }
            Err(join_err) => {
                first_error.get_or_insert(PipelineError::Join(join_err.to_string()));
            }
        }
    }

    // Completion is signaled here, after every Loader has been joined — not
    // by whichever loader happens to observe drain first.
    coordinator.signal_completion();

    let rows_extracted = match extractor_handle.await {
        Ok(Ok(rows)) => rows,
        Ok(Err(err)) => {
            first_error.get_or_insert(err);
            0
        }
        Err(join_err) => {
            first_error.get_or_insert(PipelineError::Join(join_err.to_string()));
            0
        }
    };

    coordinator.wait_for_completion().await;

    if let Some(err) = first_error {
        return Err(err);
    }

    let elapsed = start.elapsed();
    info!(rows_extracted, rows_loaded, elapsed = ?elapsed, "stage completed");
    Ok(StageSummary {
        rows_extracted,
        rows_loaded,
        elapsed,
    })
}
