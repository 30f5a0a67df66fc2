use super::{parse_date, parse_date_time, FieldType, Value};
use crate::{Error, Result};

use rust_decimal::{prelude::FromPrimitive, prelude::ToPrimitive, Decimal};
use std::str::FromStr;

impl Value {
    /// Converts this value to the given abstract type.
    ///
    /// `Null` converts to every type unchanged, as does any value when the
    /// target is [`FieldType::Unknown`]. Strings are parsed; numerics widen;
    /// booleans and integers convert both ways.
    pub fn convert(self, ty: FieldType) -> Result<Value> {
        if self.is_null() || ty == FieldType::Unknown || self.field_type() == ty {
            return Ok(self);
        }

        let converted = match (&self, ty) {
            // Text targets accept anything with a textual form
            (Value::String(_), FieldType::Char | FieldType::Memo) => Some(self.clone()),
            (Value::Bytes(bytes), FieldType::Char | FieldType::Memo) => {
                String::from_utf8(bytes.clone()).ok().map(Value::String)
            }
            (Value::List(_), _) => None,
            (_, FieldType::Char | FieldType::Memo) => Some(Value::String(self.to_string())),

            // Integers
            (Value::Bool(v), FieldType::Int) => Some(Value::Int(*v as i64)),
            (Value::Float(v), FieldType::Int) if v.fract() == 0.0 => Some(Value::Int(*v as i64)),
            (Value::Decimal(v), FieldType::Int) if v.fract().is_zero() => v.to_i64().map(Value::Int),
            (Value::String(v), FieldType::Int) => {
                let v = v.trim();
                if v.is_empty() {
                    Some(Value::Null)
                } else {
                    v.parse::<i64>().ok().map(Value::Int)
                }
            }

            // Booleans
            (Value::Int(v), FieldType::Bool) => Some(Value::Bool(*v != 0)),
            (Value::String(v), FieldType::Bool) => parse_bool(v).map(Value::Bool),

            // Numerics
            (Value::Int(v), FieldType::Numeric) => Some(Value::Decimal(Decimal::from(*v))),
            (Value::Float(v), FieldType::Numeric) => Decimal::from_f64(*v).map(Value::Decimal),
            (Value::String(v), FieldType::Numeric) => {
                let v = v.trim();
                if v.is_empty() {
                    Some(Value::Null)
                } else {
                    Decimal::from_str(v).ok().map(Value::Decimal)
                }
            }
            (Value::Int(v), FieldType::Float) => Some(Value::Float(*v as f64)),
            (Value::Decimal(v), FieldType::Float) => v.to_f64().map(Value::Float),
            (Value::String(v), FieldType::Float) => {
                let v = v.trim();
                if v.is_empty() {
                    Some(Value::Null)
                } else {
                    v.parse::<f64>().ok().map(Value::Float)
                }
            }

            // Temporal
            (Value::String(v), FieldType::Date) => parse_date(v)
                .or_else(|| parse_date_time(v).map(|dt| dt.date()))
                .map(Value::Date),
            (Value::String(v), FieldType::DateTime) => parse_date_time(v).map(Value::DateTime),
            (Value::DateTime(v), FieldType::Date) => Some(Value::Date(v.date())),
            (Value::Date(v), FieldType::DateTime) => v.and_hms_opt(0, 0, 0).map(Value::DateTime),

            // Binary
            (Value::String(v), FieldType::Blob) => Some(Value::Bytes(v.as_bytes().to_vec())),

            _ => None,
        };

        converted.ok_or_else(|| Error::type_conversion(self, ty))
    }
}

fn parse_bool(src: &str) -> Option<bool> {
    match src.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "n" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
