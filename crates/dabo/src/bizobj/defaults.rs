use crate::stmt::Value;

use std::sync::Arc;

/// A value put into a field of every new record.
#[derive(Clone)]
pub enum DefaultValue {
    Value(Value),

    /// Evaluated each time a record is added
    Fn(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    pub fn eval(&self) -> Value {
        match self {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Fn(f) => f(),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Value(value)
    }
}

impl std::fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
            DefaultValue::Fn(_) => f.write_str("Fn(..)"),
        }
    }
}
