use std::str::FromStr;

use bigdecimal::BigDecimal;
use conduit_model::{Row, Value};
use tokio_postgres::Row as PgRow;
use tokio_postgres::types::{Json as PgJson, Type};
use tracing::warn;

/// Converts one driver row into the column-order-preserving [`Row`] shape
/// the pipeline moves, dispatching on the column's wire type rather than on
/// any value already read — a cell that's SQL `NULL` decodes to
/// [`Value::Null`] regardless of its declared type.
pub fn to_row(pg_row: &PgRow) -> Row {
    let values = pg_row
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| decode(pg_row, idx, column.type_()))
        .collect();
    Row::new(values)
}

fn decode(row: &PgRow, idx: usize, ty: &Type) -> Value {
    match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx).ok().flatten().map(Value::Boolean),
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64)),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64)),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx).ok().flatten().map(Value::Int),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)
            .ok()
            .flatten()
            .map(|v| Value::Float(v as f64)),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx).ok().flatten().map(Value::Float),
        Type::NUMERIC => row
            .try_get::<_, Option<rust_decimal::Decimal>>(idx)
            .ok()
            .flatten()
            .and_then(|d| BigDecimal::from_str(&d.to_string()).ok())
            .map(Value::Decimal),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            row.try_get::<_, Option<String>>(idx).ok().flatten().map(Value::String)
        }
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<PgJson<serde_json::Value>>>(idx)
            .ok()
            .flatten()
            .map(|j| Value::Json(j.0)),
        Type::UUID => row.try_get::<_, Option<uuid::Uuid>>(idx).ok().flatten().map(Value::Uuid),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx).ok().flatten().map(Value::Bytes),
        Type::DATE => row
            .try_get::<_, Option<chrono::NaiveDate>>(idx)
            .ok()
            .flatten()
            .map(Value::Date),
        Type::TIMESTAMP | Type::TIMESTAMPTZ => row
            .try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)
            .ok()
            .flatten()
            .map(Value::Timestamp),
        _ => {
            let fallback = row.try_get::<_, Option<String>>(idx).ok().flatten();
            if fallback.is_none() {
                warn!(pg_type = %ty, "unrecognized column type, treating as NULL");
            }
            fallback.map(Value::String)
        }
    }
    .unwrap_or(Value::Null)
}
