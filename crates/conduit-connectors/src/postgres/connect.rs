use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{Client, Config, NoTls, config::SslMode};
use tracing::{error, warn};

use crate::error::ConnectorError;

/// Opens a Postgres connection, branching on the URL's `sslmode`.
///
/// `Prefer` tries TLS first and silently falls back to a plaintext
/// connection on handshake failure, matching libpq's own semantics for that
/// mode.
pub async fn connect_client(url: &str) -> Result<Client, ConnectorError> {
    let config = url
        .parse::<Config>()
        .map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;

    match config.get_ssl_mode() {
        SslMode::Disable => connect_without_tls(config).await,
        SslMode::Require => connect_with_tls(config).await,
        SslMode::Prefer => match connect_with_tls(config.clone()).await {
            Ok(client) => Ok(client),
            Err(error) => {
                warn!(%error, "postgres TLS handshake failed, retrying without TLS");
                connect_without_tls(config).await
            }
        },
        _ => connect_with_tls(config).await,
    }
}

async fn connect_with_tls(config: Config) -> Result<Client, ConnectorError> {
    let connector = TlsConnector::builder().build()?;
    let tls = MakeTlsConnector::new(connector);
    let (client, connection) = config.connect(tls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "postgres connection task ended with an error");
        }
    });
    Ok(client)
}

async fn connect_without_tls(config: Config) -> Result<Client, ConnectorError> {
    let (client, connection) = config.connect(NoTls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "postgres connection task ended with an error");
        }
    });
    Ok(client)
}
