use std::sync::Arc;

use conduit_connectors::TargetConnector;
use conduit_core::coordinator::Coordinator;
use conduit_core::error::PipelineError;
use conduit_core::worker::{Worker, WorkerBase};
use tracing::debug;

/// One of the `N` consumers of a job: owns one target connection for its
/// entire lifetime, blocks on `GetInsertTemplate` until the Extractor
/// publishes one, then drains batches until `Dequeue` returns `None`.
pub struct Loader {
    base: WorkerBase,
    target: Arc<dyn TargetConnector>,
}

impl Loader {
    pub fn new(coordinator: Arc<Coordinator>, target: Arc<dyn TargetConnector>) -> Self {
        Loader {
            base: WorkerBase::new(coordinator, false),
            target,
        }
    }

    /// Runs the drain loop to completion or to a fatal error. Returns the
    /// number of rows inserted on success, including the case where the job
    /// was aborted before a template was ever published (zero rows, not an
    /// error).
    pub async fn run(self: Arc<Self>) -> Result<u64, PipelineError> {
        let coordinator = self.base.coordinator().clone();

        let template = match coordinator.get_insert_template().await {
            Some(template) => template,
            None => return Ok(0),
        };

        let mut conn = match self.target.open_raw().await {
            Ok(conn) => conn,
            Err(err) => {
                self.base.abort_job().await;
                return Err(PipelineError::Insert(Box::new(err)));
            }
        };

        let mut rows_loaded = 0u64;
        let mut batches_loaded = 0u64;

        loop {
            if self.base.is_stopped() {
                let _ = conn.close().await;
                return Err(PipelineError::Protocol(
                    "loader stopped: a fatal error elsewhere aborted the job".into(),
                ));
            }

            let batch = match coordinator.dequeue().await {
                Some(batch) => batch,
                None => break,
            };

            rows_loaded += batch.len() as u64;
            batches_loaded += 1;

            if let Err(err) = conn.insert_batch(&template, &batch).await {
                self.base.abort_job().await;
                let _ = conn.close().await;
                return Err(PipelineError::Insert(Box::new(err)));
            }
        }

        if let Err(err) = conn.close().await {
            return Err(PipelineError::Insert(Box::new(err)));
        }

        debug!(rows_loaded, batches_loaded, "loader finished");
        Ok(rows_loaded)
    }
}

impl Worker for Loader {
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
