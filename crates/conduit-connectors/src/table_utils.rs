use mysql_async::prelude::Queryable;

use crate::engine::MetadataHandle;
use crate::error::ConnectorError;

/// `TRUNCATE TABLE <table>` against either engine. Used once, by the stage
/// runner, before any worker starts.
pub async fn truncate(handle: &mut MetadataHandle, table: &str) -> Result<(), ConnectorError> {
    match handle {
        MetadataHandle::Postgres(client) => {
            let statement = format!("TRUNCATE TABLE {}", quote_pg_identifier(table));
            client.execute(&statement, &[]).await?;
        }
        MetadataHandle::MySql(pool) => {
            let mut conn = pool.get_conn().await?;
            let statement = format!("TRUNCATE TABLE {}", quote_mysql_identifier(table));
            conn.query_drop(statement).await?;
        }
    }
    Ok(())
}

/// Builds the `SELECT` for the `source_table` convenience variant, dropping
/// any column named in `ignore_columns`. Column names come from
/// [`crate::source::SourceConnector::table_columns`], the single lookup
/// path for a table's projection.
pub fn build_select_query(table: &str, columns: &[String], ignore_columns: &[String]) -> String {
    let projection: Vec<&str> = columns
        .iter()
        .filter(|c| !ignore_columns.contains(c))
        .map(|c| c.as_str())
        .collect();
    format!("SELECT {} FROM {}", projection.join(", "), table)
}

fn quote_pg_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_mysql_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
