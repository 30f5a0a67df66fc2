use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use dabo_core::stmt::{self, parse_date, parse_date_time, FieldType, Value as CoreValue};
use postgres::{
    types::{private::BytesMut, to_sql_checked, IsNull, ToSql, Type},
    Column, Row,
};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use std::str::FromStr;

type BoxError = Box<dyn std::error::Error + Sync + Send>;

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

    /// Reads the value at `index`, converting from the column's wire type.
    pub fn from_sql(row: &Row, index: usize, column: &Column) -> Result<Self, postgres::Error> {
        let ty = column.type_();

        let value = if *ty == Type::BOOL {
            row.try_get::<_, Option<bool>>(index)?.map(CoreValue::Bool)
        } else if *ty == Type::INT2 {
            row.try_get::<_, Option<i16>>(index)?.map(CoreValue::from)
        } else if *ty == Type::INT4 {
            row.try_get::<_, Option<i32>>(index)?.map(CoreValue::from)
        } else if *ty == Type::INT8 {
            row.try_get::<_, Option<i64>>(index)?.map(CoreValue::Int)
        } else if *ty == Type::NUMERIC {
            row.try_get::<_, Option<Decimal>>(index)?
                .map(CoreValue::Decimal)
        } else if *ty == Type::FLOAT4 {
            row.try_get::<_, Option<f32>>(index)?
                .map(|v| CoreValue::Float(v as f64))
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(index)?.map(CoreValue::Float)
        } else if *ty == Type::DATE {
            row.try_get::<_, Option<NaiveDate>>(index)?
                .map(CoreValue::Date)
        } else if *ty == Type::TIMESTAMP {
            row.try_get::<_, Option<NaiveDateTime>>(index)?
                .map(CoreValue::DateTime)
        } else if *ty == Type::TIMESTAMPTZ {
            row.try_get::<_, Option<DateTime<Utc>>>(index)?
                .map(|v| CoreValue::DateTime(v.naive_utc()))
        } else if *ty == Type::BYTEA {
            row.try_get::<_, Option<Vec<u8>>>(index)?
                .map(CoreValue::Bytes)
        } else {
            // TEXT, VARCHAR, BPCHAR, NAME and anything else readable as text
            match row.try_get::<_, Option<String>>(index) {
                Ok(value) => value.map(CoreValue::String),
                Err(err) => {
                    tracing::warn!(%err, ty = %ty, "unsupported column type; reading as NULL");
                    None
                }
            }
        };

        Ok(Value(value.unwrap_or(CoreValue::Null)))
    }
}

/// Maps a PostgreSQL wire type to the abstract type set.
pub fn field_type(ty: &Type) -> FieldType {
    FieldType::from_native(ty.name())
}

fn mismatch(value: &CoreValue, ty: &Type) -> BoxError {
    format!("cannot bind {value:?} to a parameter of type {ty}").into()
}

fn text(value: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            value.to_sql(ty, out)
        }
        Type::INT2 => value.trim().parse::<i16>()?.to_sql(ty, out),
        Type::INT4 => value.trim().parse::<i32>()?.to_sql(ty, out),
        Type::INT8 => value.trim().parse::<i64>()?.to_sql(ty, out),
        Type::NUMERIC => Decimal::from_str(value.trim())?.to_sql(ty, out),
        Type::FLOAT4 => value.trim().parse::<f32>()?.to_sql(ty, out),
        Type::FLOAT8 => value.trim().parse::<f64>()?.to_sql(ty, out),
        Type::BOOL => stmt::Value::from(value)
            .convert(FieldType::Bool)?
            .as_bool()
            .ok_or_else(|| mismatch(&CoreValue::from(value), ty))?
            .to_sql(ty, out),
        Type::DATE => parse_date(value)
            .ok_or_else(|| mismatch(&CoreValue::from(value), ty))?
            .to_sql(ty, out),
        Type::TIMESTAMP => parse_date_time(value)
            .ok_or_else(|| mismatch(&CoreValue::from(value), ty))?
            .to_sql(ty, out),
        _ => Err(mismatch(&CoreValue::from(value), ty)),
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match &self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Bool(value) => match *ty {
                Type::BOOL => value.to_sql(ty, out),
                Type::INT2 => (*value as i16).to_sql(ty, out),
                Type::INT4 => (*value as i32).to_sql(ty, out),
                Type::INT8 => (*value as i64).to_sql(ty, out),
                _ => text(if *value { "true" } else { "false" }, ty, out),
            },
            CoreValue::Int(value) => match *ty {
                Type::INT2 => i16::try_from(*value)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*value)?.to_sql(ty, out),
                Type::INT8 => value.to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*value).to_sql(ty, out),
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                Type::FLOAT8 => (*value as f64).to_sql(ty, out),
                Type::BOOL => (*value != 0).to_sql(ty, out),
                _ => text(&value.to_string(), ty, out),
            },
            CoreValue::Decimal(value) => match *ty {
                Type::NUMERIC => value.to_sql(ty, out),
                Type::FLOAT8 => value
                    .to_f64()
                    .ok_or_else(|| mismatch(&self.0, ty))?
                    .to_sql(ty, out),
                Type::INT8 => value
                    .to_i64()
                    .ok_or_else(|| mismatch(&self.0, ty))?
                    .to_sql(ty, out),
                _ => text(&value.to_string(), ty, out),
            },
            CoreValue::Float(value) => match *ty {
                Type::FLOAT8 => value.to_sql(ty, out),
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                Type::NUMERIC => Decimal::from_f64_retain(*value)
                    .ok_or_else(|| mismatch(&self.0, ty))?
                    .to_sql(ty, out),
                _ => text(&value.to_string(), ty, out),
            },
            CoreValue::String(value) => text(value, ty, out),
            CoreValue::Date(value) => match *ty {
                Type::DATE => value.to_sql(ty, out),
                Type::TIMESTAMP => value.and_time(Default::default()).to_sql(ty, out),
                _ => text(&value.format("%Y-%m-%d").to_string(), ty, out),
            },
            CoreValue::DateTime(value) => match *ty {
                Type::TIMESTAMP => value.to_sql(ty, out),
                Type::TIMESTAMPTZ => value.and_utc().to_sql(ty, out),
                Type::DATE => value.date().to_sql(ty, out),
                _ => text(&value.format("%Y-%m-%d %H:%M:%S%.f").to_string(), ty, out),
            },
            CoreValue::Bytes(value) => match *ty {
                Type::BYTEA => value.as_slice().to_sql(ty, out),
                _ => Err(mismatch(&self.0, ty)),
            },
            CoreValue::List(_) => Err(mismatch(&self.0, ty)),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}
