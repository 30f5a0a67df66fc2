/// Plaintext connection parameters handed to a [`Driver`](super::Driver).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: String,

    /// Database name, or the file path for embedded backends (`:memory:` for
    /// an in-memory database).
    pub database: String,

    pub port: Option<u16>,

    pub user: String,

    pub password: String,
}

impl ConnectParams {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }
}
