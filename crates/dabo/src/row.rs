use crate::{Memento, Value};

use indexmap::IndexMap;

/// One row of a cursor's result set.
///
/// Besides the field values, a row carries the hidden state the cursor needs
/// for change tracking: its memento, the new-record flag and the temp PK.
#[derive(Debug, Clone, Default)]
pub struct Row {
    pub(crate) values: IndexMap<String, Value>,
    pub(crate) memento: Option<Memento>,
    pub(crate) is_new: bool,
    pub(crate) temp_pk: Option<Value>,

    /// Position in fetch/append order; sorting on it restores the unsorted
    /// order.
    pub(crate) seq: u64,
}

impl Row {
    pub(crate) fn fetched(values: IndexMap<String, Value>, seq: u64) -> Row {
        Row {
            values,
            seq,
            ..Row::default()
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn memento(&self) -> Option<&Memento> {
        self.memento.as_ref()
    }

    /// True for a row added in memory and not inserted yet.
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn temp_pk(&self) -> Option<&Value> {
        self.temp_pk.as_ref()
    }

    /// True when the values differ from the memento. A new row's memento is
    /// taken once its defaults are in place, so a new row nobody edited is
    /// unchanged and is not inserted.
    pub fn is_changed(&self) -> bool {
        match &self.memento {
            Some(memento) => memento.is_changed(&self.values),
            None => self.is_new,
        }
    }

    /// The original value of `field`, falling back to the current value when
    /// no memento was taken.
    pub fn orig_val(&self, field: &str) -> Option<&Value> {
        self.memento
            .as_ref()
            .and_then(|memento| memento.orig_val(field))
            .or_else(|| self.values.get(field))
    }

    pub(crate) fn set_memento<'a>(&mut self, skip: impl IntoIterator<Item = &'a String>) {
        self.memento = Some(Memento::new(&self.values, skip));
    }

    /// Sets `field` in both the values and the memento, so the row's changed
    /// state is left as it was.
    pub(crate) fn rebase(&mut self, field: &str, value: Value) {
        if let Some(memento) = &mut self.memento {
            memento.rebase(field, value.clone());
        }
        self.values.insert(field.to_string(), value);
    }

    /// Values to write back on save.
    pub(crate) fn diff(&self) -> IndexMap<String, Value> {
        match &self.memento {
            Some(memento) => memento.make_diff(&self.values, self.is_new),
            None => Memento::default().make_diff(&self.values, true),
        }
    }
}
