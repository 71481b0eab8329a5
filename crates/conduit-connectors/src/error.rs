use thiserror::Error;

/// Errors raised by the connection factory, streaming cursors, raw target
/// connections, and the table utility.
#[derive(Error, Debug)]
pub enum ConnectorError {
    #[error("invalid connection url: {0}")]
    InvalidUrl(String),

    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("postgres tls error: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("mysql error: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("unsupported operation '{0}' for this engine")]
    Unsupported(String),
}
