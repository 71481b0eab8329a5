use async_trait::async_trait;
use conduit_model::{Batch, InsertTemplate};
use tokio_postgres::Client;

use crate::error::ConnectorError;
use crate::postgres::connect::connect_client;
use crate::postgres::params::PgParamStore;
use crate::target::{RawTargetConnection, TargetConnector};

pub struct PgTargetConnector {
    url: String,
}

impl PgTargetConnector {
    pub fn new(url: String) -> Self {
        PgTargetConnector { url }
    }
}

#[async_trait]
impl TargetConnector for PgTargetConnector {
    async fn open_raw(&self) -> Result<Box<dyn RawTargetConnection>, ConnectorError> {
        let client = connect_client(&self.url).await?;
        Ok(Box::new(PgRawConnection { client }))
    }
}

pub struct PgRawConnection {
    client: Client,
}

#[async_trait]
impl RawTargetConnection for PgRawConnection {
    /// Inlines the whole batch into one multi-row `VALUES` statement and
    /// commits it as a single transaction, so a batch either fully lands or
    /// not at all.
    async fn insert_batch(&mut self, template: &InsertTemplate, batch: &Batch) -> Result<(), ConnectorError> {
        if batch.is_empty() {
            return Ok(());
        }

        let statement = template.render_multi_row_postgres(batch.len());
        let store = PgParamStore::from_rows(&batch.rows);

        let tx = self.client.transaction().await?;
        tx.execute(&statement, &store.as_refs()).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> Result<(), ConnectorError> {
        Ok(())
    }
}
