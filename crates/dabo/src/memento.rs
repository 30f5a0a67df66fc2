use crate::Value;

use indexmap::IndexMap;
use std::collections::HashSet;

/// Snapshot of a row's values, used to answer "changed?" and to build the
/// diff written back on save.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Memento {
    values: IndexMap<String, Value>,
    skip: HashSet<String>,
}

impl Memento {
    /// Snapshots `values`, leaving out the fields named in `skip`.
    pub fn new<'a>(
        values: &IndexMap<String, Value>,
        skip: impl IntoIterator<Item = &'a String>,
    ) -> Memento {
        let skip: HashSet<String> = skip.into_iter().cloned().collect();
        let values = values
            .iter()
            .filter(|(field, _)| !skip.contains(*field))
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();
        Memento { values, skip }
    }

    /// True when any tracked field of `values` differs from the snapshot.
    pub fn is_changed(&self, values: &IndexMap<String, Value>) -> bool {
        self.changed_fields(values).next().is_some()
    }

    /// The snapshot value of `field`, or `None` when it was not captured.
    pub fn orig_val(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// The snapshot values, in field order.
    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    /// Replaces the snapshot value of a tracked field.
    pub(crate) fn rebase(&mut self, field: &str, value: Value) {
        if let Some(slot) = self.values.get_mut(field) {
            *slot = value;
        }
    }

    /// Fields to write back: every tracked field for a new record, only the
    /// changed ones otherwise.
    pub fn make_diff(&self, values: &IndexMap<String, Value>, is_new: bool) -> IndexMap<String, Value> {
        if is_new {
            return values
                .iter()
                .filter(|(field, _)| !self.skip.contains(*field))
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect();
        }

        self.changed_fields(values)
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect()
    }

    fn changed_fields<'a>(
        &'a self,
        values: &'a IndexMap<String, Value>,
    ) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
        values
            .iter()
            .filter(|(field, _)| !self.skip.contains(*field))
            .filter(|(field, value)| self.values.get(*field) != Some(*value))
    }
}
