use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single column value as read from a source driver row.
///
/// Mirrors the subset of Postgres/MySQL wire types the copy pipeline needs
/// to round-trip without loss; it carries no knowledge of SQL dialects —
/// encoding to placeholders is the connector's job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Decimal(BigDecimal),
    String(String),
    Boolean(bool),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}
