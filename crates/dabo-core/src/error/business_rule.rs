use super::Error;

/// Error raised when record validation or a referential-integrity policy
/// refuses an operation.
#[derive(Debug)]
pub(super) struct BusinessRuleError {
    pub(super) message: Box<str>,
}

impl std::error::Error for BusinessRuleError {}

impl core::fmt::Display for BusinessRuleError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "business rule violation: {}", self.message)
    }
}

impl Error {
    /// Creates a business rule violation with the given message.
    pub fn business_rule(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::BusinessRule(BusinessRuleError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a business rule violation.
    pub fn is_business_rule(&self) -> bool {
        self.any_kind(|kind| matches!(kind, super::ErrorKind::BusinessRule(_)))
    }
}
