use super::Serializer;

use dabo_core::{driver::QuoteStyle, stmt::Value};

impl Serializer<'_> {
    /// Returns `value` as a quoted string literal, escaped for the dialect.
    pub fn esc_quote(&self, value: &str) -> String {
        let mut ret = String::with_capacity(value.len() + 2);
        ret.push('\'');
        for ch in value.chars() {
            match (ch, self.capability.quote_style) {
                ('\'', QuoteStyle::Doubled) => ret.push_str("''"),
                ('\'', QuoteStyle::Backslash) => ret.push_str("\\'"),
                ('\\', QuoteStyle::Backslash) => ret.push_str("\\\\"),
                (ch, _) => ret.push(ch),
            }
        }
        ret.push('\'');
        ret
    }

    /// Returns a date or datetime value as a dialect-legal literal. Other
    /// values are rendered as regular literals.
    pub fn format_date_time(&self, value: &Value) -> String {
        let typed = self.capability.typed_date_literals;
        match value {
            Value::Date(date) => {
                let text = date.format("%Y-%m-%d").to_string();
                if typed {
                    format!("DATE '{text}'")
                } else {
                    format!("'{text}'")
                }
            }
            Value::DateTime(date_time) => {
                let text = date_time.format("%Y-%m-%d %H:%M:%S%.f").to_string();
                if typed {
                    format!("TIMESTAMP '{text}'")
                } else {
                    format!("'{text}'")
                }
            }
            value => self.literal(value),
        }
    }

    /// Renders a value as an inline SQL literal.
    pub fn literal(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => self.capability.bool_literals.0.to_string(),
            Value::Bool(false) => self.capability.bool_literals.1.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Decimal(v) => v.to_string(),
            Value::Float(v) if v.is_finite() => v.to_string(),
            Value::Float(_) => "NULL".to_string(),
            Value::String(v) => self.esc_quote(v),
            Value::Date(_) | Value::DateTime(_) => self.format_date_time(value),
            Value::Bytes(v) => {
                let mut ret = String::with_capacity(v.len() * 2 + 3);
                ret.push_str("X'");
                for byte in v {
                    ret.push_str(&format!("{byte:02X}"));
                }
                ret.push('\'');
                ret
            }
            Value::List(items) => {
                let items: Vec<_> = items.iter().map(|item| self.literal(item)).collect();
                format!("({})", items.join(", "))
            }
        }
    }
}
