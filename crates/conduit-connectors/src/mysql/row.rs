use bigdecimal::BigDecimal;
use conduit_model::{Row, Value};
use mysql_async::Row as MySqlRow;
use mysql_async::consts::ColumnType;
use mysql_async::prelude::FromValue;
use tracing::warn;

pub fn to_row(row: &MySqlRow) -> Row {
    let values = (0..row.columns_ref().len())
        .map(|idx| decode(row, idx))
        .collect();
    Row::new(values)
}

fn opt<T: FromValue>(row: &MySqlRow, idx: usize) -> Option<T> {
    row.get_opt::<Option<T>, _>(idx).and_then(|res| res.ok()).flatten()
}

fn decode(row: &MySqlRow, idx: usize) -> Value {
    let column_type = row.columns_ref()[idx].column_type();
    match column_type {
        ColumnType::MYSQL_TYPE_TINY if column_is_bool(row, idx) => {
            opt::<i64>(row, idx).map(|v| Value::Boolean(v != 0))
        }
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_YEAR => opt::<i64>(row, idx).map(Value::Int),
        ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => opt::<f64>(row, idx).map(Value::Float),
        ColumnType::MYSQL_TYPE_NEWDECIMAL | ColumnType::MYSQL_TYPE_DECIMAL => {
            opt::<BigDecimal>(row, idx).map(Value::Decimal)
        }
        ColumnType::MYSQL_TYPE_JSON => opt::<serde_json::Value>(row, idx).map(Value::Json),
        ColumnType::MYSQL_TYPE_DATE => opt::<chrono::NaiveDate>(row, idx).map(Value::Date),
        ColumnType::MYSQL_TYPE_DATETIME | ColumnType::MYSQL_TYPE_TIMESTAMP => opt::<chrono::NaiveDateTime>(row, idx)
            .map(|naive| Value::Timestamp(naive.and_utc())),
        ColumnType::MYSQL_TYPE_BLOB
        | ColumnType::MYSQL_TYPE_TINY_BLOB
        | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
        | ColumnType::MYSQL_TYPE_LONG_BLOB => opt::<Vec<u8>>(row, idx).map(Value::Bytes),
        ColumnType::MYSQL_TYPE_VARCHAR
        | ColumnType::MYSQL_TYPE_VAR_STRING
        | ColumnType::MYSQL_TYPE_STRING => opt::<String>(row, idx).map(Value::String),
        other => {
            let fallback = opt::<String>(row, idx);
            if fallback.is_none() {
                warn!(?other, "unrecognized column type, treating as NULL");
            }
            fallback.map(Value::String)
        }
    }
    .unwrap_or(Value::Null)
}

/// MySQL represents `BOOLEAN` as `TINYINT(1)`; indistinguishable from a row alone.
fn column_is_bool(_row: &MySqlRow, _idx: usize) -> bool {
    false
}
