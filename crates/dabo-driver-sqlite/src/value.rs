use dabo_core::stmt::{self, parse_date, parse_date_time, FieldType, Value as CoreValue};
use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
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
    /// Converts this SQLite driver value into the core value.
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Converts a SQLite value to a core value, guided by the column's
    /// declared type.
    pub fn from_sql(value: ValueRef<'_>, ty: FieldType) -> Self {
        let core_value = match value {
            ValueRef::Null => stmt::Value::Null,
            ValueRef::Integer(value) => match ty {
                FieldType::Bool => stmt::Value::Bool(value != 0),
                FieldType::Numeric => stmt::Value::Decimal(Decimal::from(value)),
                FieldType::Float => stmt::Value::Float(value as f64),
                _ => stmt::Value::Int(value),
            },
            ValueRef::Real(value) => match ty {
                FieldType::Numeric => Decimal::from_f64_retain(value)
                    .map(stmt::Value::Decimal)
                    .unwrap_or(stmt::Value::Float(value)),
                _ => stmt::Value::Float(value),
            },
            ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => text_value(text, ty),
                // Left for the cursor to decode with its declared encoding
                Err(_) => stmt::Value::Bytes(bytes.to_vec()),
            },
            ValueRef::Blob(bytes) => stmt::Value::Bytes(bytes.to_vec()),
        };

        Value(core_value)
    }
}

fn text_value(text: &str, ty: FieldType) -> CoreValue {
    let parsed = match ty {
        FieldType::Date => parse_date(text).map(CoreValue::Date),
        FieldType::DateTime => parse_date_time(text).map(CoreValue::DateTime),
        FieldType::Numeric => Decimal::from_str(text.trim()).ok().map(CoreValue::Decimal),
        _ => None,
    };
    parsed.unwrap_or_else(|| CoreValue::String(text.to_string()))
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use stmt::Value;

        match &self.0 {
            Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            Value::Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            Value::Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            Value::Int(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            Value::Decimal(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(v.to_string()))),
            Value::Float(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            Value::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Date(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.format("%Y-%m-%d").to_string(),
            ))),
            Value::DateTime(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            ))),
            Value::Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            Value::List(_) => Err(rusqlite::Error::ToSqlConversionFailure(
                format!("cannot bind a composite value; value={:?}", self.0).into(),
            )),
        }
    }
}
