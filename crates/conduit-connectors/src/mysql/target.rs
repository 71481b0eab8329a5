use async_trait::async_trait;
use conduit_model::{Batch, Dialect, InsertTemplate};
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, Pool, TxOpts};

use crate::error::ConnectorError;
use crate::mysql::params;
use crate::target::{RawTargetConnection, TargetConnector};

pub struct MySqlTargetConnector {
    pool: Pool,
}

impl MySqlTargetConnector {
    pub fn new(pool: Pool) -> Self {
        MySqlTargetConnector { pool }
    }
}

#[async_trait]
impl TargetConnector for MySqlTargetConnector {
    async fn open_raw(&self) -> Result<Box<dyn RawTargetConnection>, ConnectorError> {
        let conn = self.pool.get_conn().await?;
        Ok(Box::new(MySqlRawConnection { conn }))
    }
}

pub struct MySqlRawConnection {
    conn: Conn,
}

#[async_trait]
impl RawTargetConnection for MySqlRawConnection {
    /// Binds the single-row template once and executes it for every row via
    /// `exec_batch` inside one transaction — MySQL's analogue of the
    /// executemany the glossary names, rather than Postgres's inlined
    /// multi-row `VALUES`.
    async fn insert_batch(&mut self, template: &InsertTemplate, batch: &Batch) -> Result<(), ConnectorError> {
        if batch.is_empty() {
            return Ok(());
        }

        let statement = template.render(Dialect::MySql);
        let param_sets = params::batch_params(&batch.rows);

        let mut tx = self.conn.start_transaction(TxOpts::default()).await?;
        tx.exec_batch(statement, param_sets).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), ConnectorError> {
        Ok(())
    }
}
