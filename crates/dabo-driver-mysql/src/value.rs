use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use dabo_core::stmt::{FieldType, Value as CoreValue};
use mysql_async::{consts::ColumnType, prelude::ToValue};
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a MySQL value to a core value, guided by the column type.
    pub fn from_sql(value: mysql_async::Value, ty: FieldType) -> Self {
        use mysql_async::Value as My;

        let core_value = match value {
            My::NULL => CoreValue::Null,
            My::Int(v) => match ty {
                FieldType::Bool => CoreValue::Bool(v != 0),
                FieldType::Numeric => CoreValue::Decimal(Decimal::from(v)),
                _ => CoreValue::Int(v),
            },
            My::UInt(v) => CoreValue::Int(v as i64),
            My::Float(v) => CoreValue::Float(v as f64),
            My::Double(v) => CoreValue::Float(v),
            My::Bytes(bytes) => bytes_value(bytes, ty),
            My::Date(year, month, day, hour, minute, second, micros) => {
                let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
                match (ty, date) {
                    (FieldType::Date, Some(date)) => CoreValue::Date(date),
                    (_, Some(date)) => date
                        .and_hms_micro_opt(hour as u32, minute as u32, second as u32, micros)
                        .map(CoreValue::DateTime)
                        .unwrap_or(CoreValue::Null),
                    // Zero dates
                    (_, None) => CoreValue::Null,
                }
            }
            My::Time(negative, days, hours, minutes, seconds, _) => {
                let sign = if negative { "-" } else { "" };
                let hours = days * 24 + hours as u32;
                CoreValue::String(format!("{sign}{hours:02}:{minutes:02}:{seconds:02}"))
            }
        };

        Value(core_value)
    }
}

/// Text protocol results arrive as bytes regardless of the column type.
fn bytes_value(bytes: Vec<u8>, ty: FieldType) -> CoreValue {
    if ty == FieldType::Blob {
        return CoreValue::Bytes(bytes);
    }

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        // Left for the cursor to decode with its declared encoding
        Err(err) => return CoreValue::Bytes(err.into_bytes()),
    };

    let parsed = match ty {
        FieldType::Int => text.trim().parse().ok().map(CoreValue::Int),
        FieldType::Bool => text.trim().parse::<i64>().ok().map(|v| CoreValue::Bool(v != 0)),
        FieldType::Numeric => Decimal::from_str(text.trim()).ok().map(CoreValue::Decimal),
        FieldType::Float => text.trim().parse().ok().map(CoreValue::Float),
        _ => None,
    };

    parsed.unwrap_or(CoreValue::String(text))
}

/// Maps a MySQL column to the abstract type set.
pub fn field_type(column_type: ColumnType, length: u32, binary: bool) -> FieldType {
    use ColumnType::*;

    match column_type {
        MYSQL_TYPE_TINY if length == 1 => FieldType::Bool,
        MYSQL_TYPE_BIT if length == 1 => FieldType::Bool,
        MYSQL_TYPE_TINY | MYSQL_TYPE_SHORT | MYSQL_TYPE_LONG | MYSQL_TYPE_LONGLONG
        | MYSQL_TYPE_INT24 | MYSQL_TYPE_YEAR => FieldType::Int,
        MYSQL_TYPE_DECIMAL | MYSQL_TYPE_NEWDECIMAL => FieldType::Numeric,
        MYSQL_TYPE_FLOAT | MYSQL_TYPE_DOUBLE => FieldType::Float,
        MYSQL_TYPE_DATE | MYSQL_TYPE_NEWDATE => FieldType::Date,
        MYSQL_TYPE_DATETIME | MYSQL_TYPE_TIMESTAMP | MYSQL_TYPE_DATETIME2
        | MYSQL_TYPE_TIMESTAMP2 => FieldType::DateTime,
        MYSQL_TYPE_TINY_BLOB | MYSQL_TYPE_MEDIUM_BLOB | MYSQL_TYPE_LONG_BLOB
        | MYSQL_TYPE_BLOB => {
            if binary {
                FieldType::Blob
            } else {
                FieldType::Memo
            }
        }
        MYSQL_TYPE_VARCHAR | MYSQL_TYPE_VAR_STRING | MYSQL_TYPE_STRING | MYSQL_TYPE_ENUM
        | MYSQL_TYPE_SET => {
            if binary {
                FieldType::Blob
            } else {
                FieldType::Char
            }
        }
        MYSQL_TYPE_JSON => FieldType::Memo,
        _ => FieldType::Unknown,
    }
}

impl ToValue for Value {
    fn to_value(&self) -> mysql_async::Value {
        match &self.0 {
            CoreValue::Null => mysql_async::Value::NULL,
            CoreValue::Bool(value) => value.to_value(),
            CoreValue::Int(value) => value.to_value(),
            CoreValue::Decimal(value) => value.to_string().to_value(),
            CoreValue::Float(value) => value.to_value(),
            CoreValue::String(value) => value.to_value(),
            CoreValue::Date(value) => mysql_async::Value::Date(
                value.year() as u16,
                value.month() as u8,
                value.day() as u8,
                0,
                0,
                0,
                0,
            ),
            CoreValue::DateTime(value) => date_time_value(value),
            CoreValue::Bytes(value) => value.to_value(),
            CoreValue::List(_) => self.0.to_key_string().to_value(),
        }
    }
}

fn date_time_value(value: &NaiveDateTime) -> mysql_async::Value {
    mysql_async::Value::Date(
        value.year() as u16,
        value.month() as u8,
        value.day() as u8,
        value.hour() as u8,
        value.minute() as u8,
        value.second() as u8,
        value.nanosecond() / 1_000,
    )
}
