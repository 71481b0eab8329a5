use async_trait::async_trait;
use conduit_model::Row;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Pool, Row as MySqlRow};

use crate::error::ConnectorError;
use crate::mysql::row;
use crate::source::{SourceConnector, StreamingCursor};

pub struct MySqlSourceConnector {
    pool: Pool,
}

impl MySqlSourceConnector {
    pub fn new(pool: Pool) -> Self {
        MySqlSourceConnector { pool }
    }
}

#[async_trait]
impl SourceConnector for MySqlSourceConnector {
    async fn open_streaming(
        &self,
        query: &str,
        max_rows_buffer: usize,
    ) -> Result<Box<dyn StreamingCursor>, ConnectorError> {
        let mut conn = self.pool.get_conn().await?;

        // A zero-row probe gets the result set's column metadata up front,
        // the same way `PgSourceConnector` uses `prepare` — needed so an
        // empty source still yields a usable column list.
        let probe = format!("SELECT * FROM ({query}) AS probe_source LIMIT 0");
        let probe_result = conn.query_iter(probe).await?;
        let column_names = probe_result
            .columns()
            .map(|cols| cols.iter().map(|c| c.name_str().into_owned()).collect())
            .unwrap_or_default();
        probe_result.drop_result().await?;

        Ok(Box::new(MySqlStreamingCursor {
            conn,
            base_query: query.to_string(),
            offset: 0,
            column_names,
            exhausted: false,
            max_rows_buffer,
        }))
    }

    async fn table_columns(&self, table: &str) -> Result<Vec<String>, ConnectorError> {
        let mut conn = self.pool.get_conn().await?;
        let columns: Vec<String> = conn
            .exec(
                "SELECT column_name FROM information_schema.columns \
                 WHERE table_name = ? ORDER BY ordinal_position",
                (table,),
            )
            .await?;
        Ok(columns)
    }
}

/// mysql_async's native streaming `QueryResult` borrows the connection it
/// was issued from, which doesn't fit a cursor type that owns its
/// connection outright. Pages through the source query with `LIMIT`/
/// `OFFSET` instead, each page capped at `chunk_size` (never exceeding
/// `max_rows_buffer`, though the config constraint `max_rows_buffer >=
/// chunk_size` makes that cap a no-op in practice).
struct MySqlStreamingCursor {
    conn: Conn,
    base_query: String,
    offset: u64,
    column_names: Vec<String>,
    exhausted: bool,
    max_rows_buffer: usize,
}

#[async_trait]
impl StreamingCursor for MySqlStreamingCursor {
    fn column_names(&self) -> &[String] {
        &self.column_names
    }

    async fn fetch_chunk(&mut self, chunk_size: usize) -> Result<Vec<Row>, ConnectorError> {
        if self.exhausted {
            return Ok(Vec::new());
        }

        let page_size = chunk_size.min(self.max_rows_buffer.max(1));
        let paged = format!(
            "SELECT * FROM ({}) AS paged_source LIMIT {} OFFSET {}",
            self.base_query, page_size, self.offset
        );
        let rows: Vec<MySqlRow> = self.conn.query(paged).await?;

        self.offset += rows.len() as u64;
        if rows.len() < page_size {
            self.exhausted = true;
        }

        Ok(rows.iter().map(row::to_row).collect())
    }

    async fn close(self: Box<Self>) -> Result<(), ConnectorError> {
        Ok(())
    }
}
