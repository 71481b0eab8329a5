use std::str::FromStr;

use bigdecimal::ToPrimitive;
use conduit_model::Value;
use rust_decimal::{Decimal as RustDecimal, prelude::FromPrimitive};
use tokio_postgres::types::{Json as PgJson, ToSql};

/// Boxes one [`Value`] as a concrete `ToSql` implementation, so a batch of
/// heterogeneous column values can be bound positionally without a
/// hand-rolled `ToSql for Value` impl (which would have to special-case
/// every wire type `tokio_postgres` accepts).
pub struct PgParam(Box<dyn ToSql + Sync + Send>);

impl PgParam {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Int(v) => PgParam(Box::new(*v)),
            Value::Float(v) => PgParam(Box::new(*v)),
            Value::Decimal(v) => {
                let decimal = RustDecimal::from_str(&v.to_string())
                    .unwrap_or_else(|_| RustDecimal::from_f64(v.to_f64().unwrap_or(0.0)).unwrap_or_default());
                PgParam(Box::new(decimal))
            }
            Value::String(v) => PgParam(Box::new(v.clone())),
            Value::Boolean(v) => PgParam(Box::new(*v)),
            Value::Bytes(v) => PgParam(Box::new(v.clone())),
            Value::Json(v) => PgParam(Box::new(PgJson(v.clone()))),
            Value::Uuid(v) => PgParam(Box::new(*v)),
            Value::Date(v) => PgParam(Box::new(*v)),
            Value::Timestamp(v) => PgParam(Box::new(*v)),
            Value::Null => PgParam(Box::new(Option::<String>::None)),
        }
    }
}

impl AsRef<dyn ToSql + Sync> for PgParam {
    fn as_ref(&self) -> &(dyn ToSql + Sync + 'static) {
        &*self.0
    }
}

pub struct PgParamStore {
    params: Vec<PgParam>,
}

impl PgParamStore {
    pub fn from_rows(rows: &[conduit_model::Row]) -> Self {
        let params = rows
            .iter()
            .flat_map(|row| row.values().iter().map(PgParam::from_value))
            .collect();
        PgParamStore { params }
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p.as_ref()).collect()
    }
}
