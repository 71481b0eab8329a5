use chrono::{Datelike, Timelike};
use conduit_model::Value;
use mysql_async::Value as MySqlValue;
use mysql_common::params::Params;

fn to_mysql_value(value: &Value) -> MySqlValue {
    match value {
        Value::Int(v) => MySqlValue::Int(*v),
        Value::Float(v) => MySqlValue::Double(*v),
        Value::Decimal(v) => MySqlValue::Bytes(v.to_string().into_bytes()),
        Value::String(v) => MySqlValue::Bytes(v.clone().into_bytes()),
        Value::Boolean(v) => MySqlValue::Int(if *v { 1 } else { 0 }),
        Value::Bytes(v) => MySqlValue::Bytes(v.clone()),
        Value::Json(v) => MySqlValue::Bytes(v.to_string().into_bytes()),
        Value::Uuid(v) => MySqlValue::Bytes(v.to_string().into_bytes()),
        Value::Date(v) => MySqlValue::Date(v.year() as u16, v.month() as u8, v.day() as u8, 0, 0, 0, 0),
        Value::Timestamp(v) => {
            let naive = v.naive_utc();
            MySqlValue::Date(
                naive.year() as u16,
                naive.month() as u8,
                naive.day() as u8,
                naive.hour() as u8,
                naive.minute() as u8,
                naive.second() as u8,
                naive.and_utc().timestamp_subsec_micros(),
            )
        }
        Value::Null => MySqlValue::NULL,
    }
}

/// One parameter set per row, suitable for `exec_batch`.
pub fn batch_params(rows: &[conduit_model::Row]) -> Vec<Params> {
    rows.iter()
        .map(|row| Params::Positional(row.values().iter().map(to_mysql_value).collect()))
        .collect()
}
