use crate::{Error, Result};

use std::str::FromStr;

/// Referential-integrity policy of a parent toward its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RiPolicy {
    /// Refuse while children have rows
    Restrict,

    /// Carry the operation over to the children
    Cascade,

    /// Leave the children alone
    #[default]
    Ignore,
}

/// The three policies of a bizobj: on delete, on key update and on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policies {
    pub delete: RiPolicy,
    pub update: RiPolicy,
    pub insert: RiPolicy,
}

impl Default for Policies {
    fn default() -> Self {
        Policies {
            delete: RiPolicy::Restrict,
            update: RiPolicy::Ignore,
            insert: RiPolicy::Ignore,
        }
    }
}

impl FromStr for RiPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<RiPolicy> {
        match s.trim().to_ascii_lowercase().as_str() {
            "restrict" => Ok(RiPolicy::Restrict),
            "cascade" => Ok(RiPolicy::Cascade),
            "ignore" => Ok(RiPolicy::Ignore),
            _ => Err(Error::invalid_configuration(format!(
                "unknown integrity policy `{s}`"
            ))),
        }
    }
}
