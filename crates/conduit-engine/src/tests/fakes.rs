use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use conduit_connectors::source::{SourceConnector, StreamingCursor};
use conduit_connectors::target::{RawTargetConnection, TargetConnector};
use conduit_connectors::ConnectorError;
use conduit_model::{Batch, InsertTemplate, Row};

/// A source that replays a fixed sequence of pre-built chunks, ignoring
/// `chunk_size` entirely — good enough to drive the Extractor's fetch loop
/// without a real driver.
pub struct FakeSource {
    columns: Vec<String>,
    chunks: Mutex<Option<VecDeque<Vec<Row>>>>,
    fail_on_open: bool,
}

impl FakeSource {
    pub fn new(columns: Vec<String>, chunks: Vec<Vec<Row>>) -> Self {
        FakeSource {
            columns,
            chunks: Mutex::new(Some(chunks.into_iter().collect())),
            fail_on_open: false,
        }
    }

    pub fn failing() -> Self {
        FakeSource {
            columns: Vec::new(),
            chunks: Mutex::new(Some(VecDeque::new())),
            fail_on_open: true,
        }
    }
}

#[async_trait]
impl SourceConnector for FakeSource {
    async fn open_streaming(
        &self,
        _query: &str,
        _max_rows_buffer: usize,
    ) -> Result<Box<dyn StreamingCursor>, ConnectorError> {
        if self.fail_on_open {
            return Err(ConnectorError::Unsupported("fake source configured to fail".into()));
        }
        let remaining = self.chunks.lock().unwrap().take().unwrap_or_default();
        Ok(Box::new(FakeCursor {
            columns: self.columns.clone(),
            remaining,
        }))
    }

    async fn table_columns(&self, _table: &str) -> Result<Vec<String>, ConnectorError> {
        Ok(self.columns.clone())
    }
}

struct FakeCursor {
    columns: Vec<String>,
    remaining: VecDeque<Vec<Row>>,
}

#[async_trait]
impl StreamingCursor for FakeCursor {
    fn column_names(&self) -> &[String] {
        &self.columns
    }

    async fn fetch_chunk(&mut self, _chunk_size: usize) -> Result<Vec<Row>, ConnectorError> {
        Ok(self.remaining.pop_front().unwrap_or_default())
    }

    async fn close(self: Box<Self>) -> Result<(), ConnectorError> {
        Ok(())
    }
}

/// A target that appends every inserted row to a shared sink, so a test can
/// assert on what actually reached the "database".
pub struct FakeTarget {
    sink: Arc<Mutex<Vec<Row>>>,
}

impl FakeTarget {
    pub fn new() -> (Self, Arc<Mutex<Vec<Row>>>) {
        let sink = Arc::new(Mutex::new(Vec::new()));
        (FakeTarget { sink: sink.clone() }, sink)
    }
}

#[async_trait]
impl TargetConnector for FakeTarget {
    async fn open_raw(&self) -> Result<Box<dyn RawTargetConnection>, ConnectorError> {
        Ok(Box::new(FakeRawConnection {
            sink: self.sink.clone(),
        }))
    }
}

struct FakeRawConnection {
    sink: Arc<Mutex<Vec<Row>>>,
}

#[async_trait]
impl RawTargetConnection for FakeRawConnection {
    async fn insert_batch(&mut self, _template: &InsertTemplate, batch: &Batch) -> Result<(), ConnectorError> {
        self.sink.lock().unwrap().extend(batch.rows.iter().cloned());
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), ConnectorError> {
        Ok(())
    }
}
