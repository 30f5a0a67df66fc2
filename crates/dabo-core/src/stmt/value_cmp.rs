use super::Value;

use rust_decimal::{prelude::FromPrimitive, prelude::ToPrimitive, Decimal};
use std::cmp::Ordering;

impl Value {
    /// Total ordering used by in-memory sort and seek.
    ///
    /// `Null` sorts lowest. Numeric variants compare numerically with each
    /// other, dates compare with date-times at midnight, and strings compare
    /// byte-wise or case-insensitively. Values of unrelated types fall back to
    /// comparing their string forms so the ordering stays total.
    pub fn sort_cmp(&self, other: &Value, case_sensitive: bool) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,

            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Int(a), Value::Decimal(b)) => Decimal::from(*a).cmp(b),
            (Value::Decimal(a), Value::Int(b)) => a.cmp(&Decimal::from(*b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)),
            (Value::Decimal(a), Value::Float(b)) => cmp_decimal_float(a, *b),
            (Value::Float(a), Value::Decimal(b)) => cmp_decimal_float(b, *a).reverse(),

            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Date(a), Value::DateTime(b)) => a
                .and_hms_opt(0, 0, 0)
                .map_or(Ordering::Less, |a| a.cmp(b)),
            (Value::DateTime(a), Value::Date(b)) => b
                .and_hms_opt(0, 0, 0)
                .map_or(Ordering::Greater, |b| a.cmp(&b)),

            (Value::String(a), Value::String(b)) => cmp_str(a, b, case_sensitive),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) => {
                for (a, b) in a.iter().zip(b) {
                    match a.sort_cmp(b, case_sensitive) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                a.len().cmp(&b.len())
            }

            (a, b) => cmp_str(&a.to_string(), &b.to_string(), case_sensitive),
        }
    }

    /// Equality as seen by seek: numeric variants compare by value and
    /// strings optionally ignore case.
    pub fn seek_eq(&self, other: &Value, case_sensitive: bool) -> bool {
        self.sort_cmp(other, case_sensitive) == Ordering::Equal
    }
}

fn cmp_str(a: &str, b: &str, case_sensitive: bool) -> Ordering {
    if case_sensitive {
        a.cmp(b)
    } else {
        a.to_lowercase().cmp(&b.to_lowercase())
    }
}

fn cmp_decimal_float(a: &Decimal, b: f64) -> Ordering {
    match Decimal::from_f64(b) {
        Some(b) => a.cmp(&b),
        None => a.to_f64().unwrap_or(f64::NAN).total_cmp(&b),
    }
}
