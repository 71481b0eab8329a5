use std::sync::Arc;

use conduit_connectors::SourceConnector;
use conduit_core::coordinator::Coordinator;
use conduit_core::error::PipelineError;
use conduit_core::worker::{Worker, WorkerBase};
use conduit_model::{Batch, InsertTemplate};
use tracing::info;

/// The single producer of a job: owns one source connection for its entire
/// lifetime and publishes the insert template exactly once, before its
/// first `enqueue`.
pub struct Extractor {
    base: WorkerBase,
    source: Arc<dyn SourceConnector>,
    query: String,
    chunk_size: usize,
    max_rows_buffer: usize,
    target_table: String,
}

impl Extractor {
    pub fn new(
        coordinator: Arc<Coordinator>,
        source: Arc<dyn SourceConnector>,
        query: String,
        chunk_size: usize,
        max_rows_buffer: usize,
        target_table: String,
    ) -> Self {
        Extractor {
            base: WorkerBase::new(coordinator, true),
            source,
            query,
            chunk_size,
            max_rows_buffer,
            target_table,
        }
    }

    /// Runs the fetch loop to completion or to a fatal error. Returns the
    /// number of rows read on success.
    pub async fn run(self: Arc<Self>) -> Result<u64, PipelineError> {
        let coordinator = self.base.coordinator().clone();

        let mut cursor = match self.source.open_streaming(&self.query, self.max_rows_buffer).await {
            Ok(cursor) => cursor,
            Err(err) => {
                self.base.abort_job().await;
                return Err(PipelineError::Extract(Box::new(err)));
            }
        };

        let template = InsertTemplate::new(self.target_table.clone(), cursor.column_names().to_vec());
        coordinator.set_insert_template(template).await;

        let mut seq = 0u64;
        let mut rows_read = 0u64;

        loop {
            if self.base.is_stopped() {
                let _ = cursor.close().await;
                return Err(PipelineError::Protocol(
                    "extractor stopped: a fatal error elsewhere aborted the job".into(),
                ));
            }

            let rows = match cursor.fetch_chunk(self.chunk_size).await {
                Ok(rows) => rows,
                Err(err) => {
                    self.base.abort_job().await;
                    let _ = cursor.close().await;
                    return Err(PipelineError::Extract(Box::new(err)));
                }
            };

            if rows.is_empty() {
                break;
            }

            rows_read += rows.len() as u64;
            let batch = Batch::new(seq, rows);
            seq += 1;

            if !coordinator.enqueue(batch).await {
                let _ = cursor.close().await;
                return Err(PipelineError::Protocol(
                    "job aborted while the extractor was blocked on enqueue".into(),
                ));
            }
        }

        if let Err(err) = cursor.close().await {
            return Err(PipelineError::Extract(Box::new(err)));
        }

        coordinator.producer_end_process().await;
        info!(rows_read, batches = seq, "extractor finished");
        Ok(rows_read)
    }
}

impl Worker for Extractor {
    fn is_producer(&self) -> bool {
        self.base.is_producer()
    }

    fn stop(&self) {
        self.base.stop();
    }

    fn is_stopped(&self) -> bool {
        self.base.is_stopped()
    }
}
