use std::sync::Arc;

use mysql_async::Pool as MySqlPool;
use tokio_postgres::Client as PgClient;

use crate::error::ConnectorError;
use crate::mysql::{MySqlSourceConnector, MySqlTargetConnector};
use crate::postgres::{self, PgSourceConnector, PgTargetConnector};
use crate::source::SourceConnector;
use crate::target::TargetConnector;

/// Which driver a connection string names. Parsed from the URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    MySql,
}

impl DbEngine {
    pub fn from_url(url: &str) -> Result<Self, ConnectorError> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DbEngine::Postgres)
        } else if url.starts_with("mysql://") {
            Ok(DbEngine::MySql)
        } else {
            Err(ConnectorError::InvalidUrl(url.to_string()))
        }
    }
}

/// Opens a dedicated source connection and wraps it as a [`SourceConnector`].
///
/// Each call returns a connector over a single, fresh connection — callers
/// (the stage runner) are responsible for opening exactly one per role;
/// connections are never shared across workers.
pub async fn connect_source(url: &str) -> Result<Arc<dyn SourceConnector>, ConnectorError> {
    match DbEngine::from_url(url)? {
        DbEngine::Postgres => {
            let client = postgres::connect_client(url).await?;
            Ok(Arc::new(PgSourceConnector::new(Arc::new(client))))
        }
        DbEngine::MySql => {
            let pool = MySqlPool::from_url(url)?;
            Ok(Arc::new(MySqlSourceConnector::new(pool)))
        }
    }
}

pub async fn connect_target(url: &str) -> Result<Arc<dyn TargetConnector>, ConnectorError> {
    match DbEngine::from_url(url)? {
        DbEngine::Postgres => Ok(Arc::new(PgTargetConnector::new(url.to_string()))),
        DbEngine::MySql => {
            let pool = MySqlPool::from_url(url)?;
            Ok(Arc::new(MySqlTargetConnector::new(pool)))
        }
    }
}

/// Handle used by the table utility (truncate / column lookup), independent
/// of the streaming source/raw target connections above — the stage runner
/// opens one of these for the setup phase only and drops it before workers
/// start.
pub enum MetadataHandle {
    Postgres(PgClient),
    MySql(MySqlPool),
}

impl MetadataHandle {
    pub async fn connect(url: &str) -> Result<Self, ConnectorError> {
        match DbEngine::from_url(url)? {
            DbEngine::Postgres => Ok(MetadataHandle::Postgres(postgres::connect_client(url).await?)),
            DbEngine::MySql => Ok(MetadataHandle::MySql(MySqlPool::from_url(url)?)),
        }
    }
}
