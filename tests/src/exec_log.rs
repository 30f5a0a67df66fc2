use crate::ExecOp;
use std::sync::{Arc, Mutex};

/// A wrapper around the statement log that provides a clean API for tests
#[derive(Debug, Clone)]
pub struct ExecLog {
    ops: Arc<Mutex<Vec<ExecOp>>>,
}

impl ExecLog {
    pub(crate) fn new(ops: Arc<Mutex<Vec<ExecOp>>>) -> Self {
        Self { ops }
    }

    /// Get the number of logged operations
    pub fn len(&self) -> usize {
        self.ops.lock().unwrap().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.ops.lock().unwrap().is_empty()
    }

    /// Check if any operation matches the given predicate
    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&ExecOp) -> bool,
    {
        self.ops.lock().unwrap().iter().any(predicate)
    }

    /// Count operations matching the given predicate
    pub fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&ExecOp) -> bool,
    {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter(|op| predicate(op))
            .count()
    }

    /// SQL of every logged statement, in order
    pub fn statements(&self) -> Vec<String> {
        self.ops
            .lock()
            .unwrap()
            .iter()
            .filter_map(|op| match op {
                ExecOp::Exec { sql, .. } => Some(sql.clone()),
                _ => None,
            })
            .collect()
    }

    /// Count statements starting with the given keyword
    pub fn count_sql(&self, keyword: &str) -> usize {
        self.count(|op| matches!(op, ExecOp::Exec { sql, .. } if sql.starts_with(keyword)))
    }

    pub fn has_insert(&self) -> bool {
        self.count_sql("INSERT") > 0
    }

    pub fn has_update(&self) -> bool {
        self.count_sql("UPDATE") > 0
    }

    pub fn has_delete(&self) -> bool {
        self.count_sql("DELETE") > 0
    }

    /// Every operation, transaction boundaries included, in order
    pub fn ops(&self) -> Vec<ExecOp> {
        self.ops.lock().unwrap().clone()
    }

    /// Clear the log
    pub fn clear(&self) {
        self.ops.lock().unwrap().clear();
    }

    /// Remove and return the first operation from the log
    /// Returns None if the log is empty
    pub fn pop(&self) -> Option<ExecOp> {
        let mut ops = self.ops.lock().unwrap();
        if ops.is_empty() {
            None
        } else {
            Some(ops.remove(0))
        }
    }
}
