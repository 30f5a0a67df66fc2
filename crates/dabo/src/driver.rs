use crate::Result;

pub use dabo_core::driver::{Capability, ConnectParams, Driver};

use dabo_core::Error;

/// The built-in backends, selected by name.
#[derive(Debug)]
pub enum Backend {
    #[cfg(feature = "mysql")]
    MySQL(dabo_driver_mysql::MySQL),

    #[cfg(feature = "postgresql")]
    PostgreSQL(dabo_driver_postgresql::PostgreSQL),

    #[cfg(feature = "sqlite")]
    Sqlite(dabo_driver_sqlite::Sqlite),
}

impl Backend {
    /// Resolves a backend name. Names are case-insensitive; `postgres` is
    /// accepted for PostgreSQL.
    pub fn from_name(name: &str) -> Result<Backend> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mysql" => Self::mysql(),
            "postgresql" | "postgres" => Self::postgresql(),
            "sqlite" => Self::sqlite(),
            _ => Err(Error::invalid_configuration(format!(
                "unsupported backend; name={name}"
            ))),
        }
    }

    #[cfg(feature = "mysql")]
    fn mysql() -> Result<Backend> {
        Ok(Backend::MySQL(dabo_driver_mysql::MySQL::new()))
    }

    #[cfg(not(feature = "mysql"))]
    fn mysql() -> Result<Backend> {
        Err(Error::invalid_configuration("`mysql` feature not enabled"))
    }

    #[cfg(feature = "postgresql")]
    fn postgresql() -> Result<Backend> {
        Ok(Backend::PostgreSQL(
            dabo_driver_postgresql::PostgreSQL::new(),
        ))
    }

    #[cfg(not(feature = "postgresql"))]
    fn postgresql() -> Result<Backend> {
        Err(Error::invalid_configuration(
            "`postgresql` feature not enabled",
        ))
    }

    #[cfg(feature = "sqlite")]
    fn sqlite() -> Result<Backend> {
        Ok(Backend::Sqlite(dabo_driver_sqlite::Sqlite::new()))
    }

    #[cfg(not(feature = "sqlite"))]
    fn sqlite() -> Result<Backend> {
        Err(Error::invalid_configuration("`sqlite` feature not enabled"))
    }

    /// Canonical backend name.
    pub fn name(&self) -> &'static str {
        self.capability().name
    }
}

macro_rules! match_db {
    ($self:expr, $driver:pat => $e:expr) => {
        match *$self {
            #[cfg(feature = "mysql")]
            Backend::MySQL($driver) => $e,

            #[cfg(feature = "postgresql")]
            Backend::PostgreSQL($driver) => $e,

            #[cfg(feature = "sqlite")]
            Backend::Sqlite($driver) => $e,
        }
    };
}

#[dabo_core::async_trait]
impl Driver for Backend {
    fn capability(&self) -> &'static Capability {
        match_db!(self, ref driver => driver.capability())
    }

    async fn connect(&self, params: &ConnectParams) -> Result<Box<dyn dabo_core::Connection>> {
        #[allow(unused_variables)]
        let params = params;
        match_db!(self, ref driver => driver.connect(params).await)
    }
}
