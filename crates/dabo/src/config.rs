//! Named connection definitions stored as TOML.
//!
//! ```toml
//! [connections.main]
//! backend = "postgresql"
//! host = "db.example.com"
//! database = "sales"
//! user = "clerk"
//! plaintext_password = "secret"
//!
//! [connections.local]
//! backend = "sqlite"
//! database = "sales.db"
//! ```

use crate::{ConnectInfo, Result};

use dabo_core::Error;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, path::Path, str::FromStr};

/// A document listing one or more named connections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionDefs {
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionDef>,
}

/// One named connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionDef {
    pub backend: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub database: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,

    /// Obfuscated password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plaintext_password: Option<String>,
}

impl ConnectionDefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load connection definitions from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        contents.parse()
    }

    /// Save the connection definitions to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_string())?;
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.connections.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&ConnectionDef> {
        self.connections.get(name)
    }

    /// Adds or replaces a definition. Passwords are stored obfuscated.
    pub fn insert(&mut self, name: impl Into<String>, info: &ConnectInfo) {
        let def = ConnectionDef {
            backend: info.backend_name().to_string(),
            host: info.host().to_string(),
            database: info.database().to_string(),
            port: info.port(),
            user: info.user().to_string(),
            password: (!info.password().is_empty()).then(|| info.password().to_string()),
            plaintext_password: None,
        };
        self.connections.insert(name.into(), def);
    }

    /// Builds the connect info for the named definition.
    pub fn connect_info(&self, name: &str) -> Result<ConnectInfo> {
        let def = self.get(name).ok_or_else(|| {
            Error::invalid_configuration(format!("no connection named `{name}`"))
        })?;
        def.to_connect_info()
            .map_err(|err| err.context(format!("connection `{name}`")))
    }
}

impl ConnectionDef {
    pub fn to_connect_info(&self) -> Result<ConnectInfo> {
        let mut info = ConnectInfo::new(&self.backend)?;
        info.set_host(&self.host);
        info.set_database(&self.database);
        info.set_port(self.port);
        info.set_user(&self.user);

        match (&self.password, &self.plaintext_password) {
            (Some(_), Some(_)) => {
                return Err(Error::invalid_configuration(
                    "both `password` and `plaintext_password` are set",
                ))
            }
            (Some(obfuscated), None) => info.set_password(obfuscated.as_str()),
            (None, Some(plaintext)) => info.set_plaintext_password(plaintext),
            (None, None) => {}
        }

        Ok(info)
    }
}

impl FromStr for ConnectionDefs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|err| {
            Error::invalid_configuration(format!("invalid connection definitions: {err}"))
        })
    }
}

impl fmt::Display for ConnectionDefs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let doc = toml::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&doc)
    }
}
