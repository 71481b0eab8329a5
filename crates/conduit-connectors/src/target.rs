use async_trait::async_trait;
use conduit_model::{Batch, InsertTemplate};

use crate::error::ConnectorError;

/// A raw, unshared connection to the target database, owned by exactly one
/// Loader for the job's lifetime. Connections are never shared between
/// Loaders.
#[async_trait]
pub trait RawTargetConnection: Send {
    /// Insert every row of `batch` against `template`, as a single
    /// transaction. Either all rows land or none do — a Loader never
    /// partially applies a batch.
    async fn insert_batch(
        &mut self,
        template: &InsertTemplate,
        batch: &Batch,
    ) -> Result<(), ConnectorError>;

    async fn close(self: Box<Self>) -> Result<(), ConnectorError>;
}

/// The connection-factory side of a target database: opens a dedicated raw
/// connection for one Loader.
#[async_trait]
pub trait TargetConnector: Send + Sync {
    async fn open_raw(&self) -> Result<Box<dyn RawTargetConnection>, ConnectorError>;
}
