use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use conduit_model::Row;
use futures_util::{Stream, StreamExt};
use tokio_postgres::Client;

use crate::error::ConnectorError;
use crate::postgres::row;
use crate::source::{SourceConnector, StreamingCursor};

pub struct PgSourceConnector {
    client: Arc<Client>,
}

impl PgSourceConnector {
    pub fn new(client: Arc<Client>) -> Self {
        PgSourceConnector { client }
    }
}

#[async_trait]
impl SourceConnector for PgSourceConnector {
    async fn open_streaming(
        &self,
        query: &str,
        max_rows_buffer: usize,
    ) -> Result<Box<dyn StreamingCursor>, ConnectorError> {
        // Preparing first gets the column list from the portal description,
        // so it's known even when the query returns zero rows.
        let statement = self.client.prepare(query).await?;
        let column_names = statement.columns().iter().map(|c| c.name().to_string()).collect();

        let empty_params: Vec<String> = Vec::new();
        let stream = self.client.query_raw(&statement, empty_params).await?;
        let stream: Pin<Box<dyn Stream<Item = Result<tokio_postgres::Row, tokio_postgres::Error>> + Send>> =
            Box::pin(stream);

        Ok(Box::new(PgStreamingCursor {
            stream,
            column_names,
            staged: VecDeque::new(),
            max_rows_buffer,
            exhausted: false,
        }))
    }

    async fn table_columns(&self, table: &str) -> Result<Vec<String>, ConnectorError> {
        let rows = self
            .client
            .query(
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_name = $1 ORDER BY ordinal_position",
                &[&table],
            )
            .await?;
        Ok(rows.iter().map(|r| r.get::<_, String>(0)).collect())
    }
}

struct PgStreamingCursor {
    stream: Pin<Box<dyn Stream<Item = Result<tokio_postgres::Row, tokio_postgres::Error>> + Send>>,
    column_names: Vec<String>,
    staged: VecDeque<Row>,
    max_rows_buffer: usize,
    exhausted: bool,
}

#[async_trait]
impl StreamingCursor for PgStreamingCursor {
    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    async fn fetch_chunk(&mut self, chunk_size: usize) -> Result<Vec<Row>, ConnectorError> {
        let prefetch_target = chunk_size.min(self.max_rows_buffer).max(chunk_size);
        while self.staged.len() < prefetch_target && !self.exhausted {
            match self.stream.next().await {
                Some(Ok(pg_row)) => self.staged.push_back(row::to_row(&pg_row)),
                Some(Err(err)) => return Err(ConnectorError::Postgres(err)),
                None => self.exhausted = true,
            }
        }

        let take = chunk_size.min(self.staged.len());
        Ok(self.staged.drain(..take).collect())
    }

    async fn close(self: Box<Self>) -> Result<(), ConnectorError> {
        Ok(())
    }
}
