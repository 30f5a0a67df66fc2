use super::Serializer;

use dabo_core::{driver::PlaceholderStyle, stmt::Value};

/// Collects statement parameters while SQL is being rendered.
pub trait Params {
    fn push(&mut self, param: &Value) -> Placeholder;
}

/// 1-based position of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl Params for Vec<Value> {
    fn push(&mut self, value: &Value) -> Placeholder {
        self.push(value.clone());
        Placeholder(self.len())
    }
}

impl Serializer<'_> {
    /// Renders the placeholder for the parameter at `placeholder`.
    pub fn placeholder(&self, placeholder: Placeholder) -> String {
        match self.capability.placeholder {
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Numbered => format!("${}", placeholder.0),
        }
    }
}
