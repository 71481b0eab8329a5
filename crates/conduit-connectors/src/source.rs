use async_trait::async_trait;
use conduit_model::Row;

use crate::error::ConnectorError;

/// A query result a producer can pull from incrementally, never materializing
/// the whole result set in memory.
///
/// `column_names` reflects the projection of the query this cursor was
/// opened with, in declaration order — it is the source for the Extractor's
/// one-time `InsertTemplate` publication.
#[async_trait]
pub trait StreamingCursor: Send {
    fn column_names(&self) -> &[String];

    /// Pull up to `chunk_size` rows. An empty (but non-final) result is not
    /// possible — returns fewer than `chunk_size` rows only at end of stream,
    /// and an empty `Vec` exactly once, at exhaustion.
    async fn fetch_chunk(&mut self, chunk_size: usize) -> Result<Vec<Row>, ConnectorError>;

    async fn close(self: Box<Self>) -> Result<(), ConnectorError>;
}

/// The connection-factory side of a source database: opens a dedicated,
/// unshared streaming cursor for a single query.
///
/// One `SourceConnector` instance is handed to exactly one Extractor; it
/// does not pool connections across workers — the Extractor owns a single
/// source connection for the job's lifetime.
#[async_trait]
pub trait SourceConnector: Send + Sync {
    async fn open_streaming(
        &self,
        query: &str,
        max_rows_buffer: usize,
    ) -> Result<Box<dyn StreamingCursor>, ConnectorError>;

    /// Column names the eventual query will return, used to build the
    /// `source_table` convenience variant's generated `SELECT`.
    async fn table_columns(&self, table: &str) -> Result<Vec<String>, ConnectorError>;
}
