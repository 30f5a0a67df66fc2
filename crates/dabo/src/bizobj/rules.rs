use crate::Row;

/// Business rules checked before a row is saved.
///
/// An `Err` message turns into a business-rule violation and the save does
/// not happen. Closures taking a `&Row` implement this trait.
pub trait BizRules: Send + Sync {
    fn validate_record(&self, row: &Row) -> Result<(), String>;
}

impl<F> BizRules for F
where
    F: Fn(&Row) -> Result<(), String> + Send + Sync,
{
    fn validate_record(&self, row: &Row) -> Result<(), String> {
        self(row)
    }
}

impl std::fmt::Debug for dyn BizRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BizRules")
    }
}
