use crate::{
    driver::{Backend, ConnectParams, Driver},
    Result,
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use dabo_core::Error;
use std::{fmt, sync::Arc};
use url::Url;

/// Key the stored password is XORed with. Obfuscation, not security.
const OBFUSCATION_KEY: &[u8] = b"dabo:connect-info";

/// Credentials and dialect selection for one connection.
///
/// The password is held in an obfuscated form: [`set_plaintext_password`]
/// obfuscates on the way in, [`reveal_password`] restores it on the way out.
///
/// [`set_plaintext_password`]: ConnectInfo::set_plaintext_password
/// [`reveal_password`]: ConnectInfo::reveal_password
#[derive(Clone, Default)]
pub struct ConnectInfo {
    backend: Option<Arc<Backend>>,
    host: String,
    database: String,
    port: Option<u16>,
    user: String,
    password: String,
}

impl ConnectInfo {
    pub fn new(backend_name: &str) -> Result<ConnectInfo> {
        let mut info = ConnectInfo::default();
        info.set_backend_name(backend_name)?;
        Ok(info)
    }

    /// Builds connect info from key/value pairs, the dictionary form of a
    /// connection definition.
    ///
    /// Recognized keys: `backend` (or `dbtype`), `host`, `database` (or `db`),
    /// `port`, `user`, `password` (obfuscated) and `plaintext_password`.
    pub fn from_map<I, K, V>(entries: I) -> Result<ConnectInfo>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut info = ConnectInfo::default();

        for (key, value) in entries {
            let value = value.as_ref();
            match key.as_ref().to_ascii_lowercase().as_str() {
                "backend" | "dbtype" => info.set_backend_name(value)?,
                "host" => info.set_host(value),
                "database" | "db" => info.set_database(value),
                "port" if value.is_empty() => info.set_port(None),
                "port" => info.set_port(Some(parse_port(value)?)),
                "user" => info.set_user(value),
                "password" => info.set_password(value),
                "plaintext_password" => info.set_plaintext_password(value),
                key => tracing::warn!(key, "ignoring unknown connection setting"),
            }
        }

        if info.backend.is_none() {
            return Err(Error::invalid_configuration(
                "connection settings do not name a backend",
            ));
        }

        Ok(info)
    }

    /// Builds connect info from a connection URL.
    ///
    /// The scheme selects the backend: `sqlite::memory:`, `sqlite:path.db`,
    /// `mysql://user:pw@host:3306/db`, `postgresql://user:pw@host/db`.
    pub fn from_url(url: &str) -> Result<ConnectInfo> {
        let parsed = Url::parse(url).map_err(|err| {
            Error::invalid_configuration(format!("invalid connection URL; url={url}; {err}"))
        })?;

        let mut info = ConnectInfo::new(parsed.scheme())?;

        if parsed.cannot_be_a_base() || parsed.host_str().map_or(true, str::is_empty) {
            // `sqlite:path` style; everything after the scheme is the database
            info.set_database(parsed.path());
            return Ok(info);
        }

        info.set_host(parsed.host_str().unwrap_or_default());
        info.set_port(parsed.port());
        info.set_user(parsed.username());
        if let Some(password) = parsed.password() {
            info.set_plaintext_password(password);
        }
        info.set_database(parsed.path().trim_start_matches('/'));

        Ok(info)
    }

    /// Name of the selected backend, empty when none is set.
    pub fn backend_name(&self) -> &str {
        self.backend.as_ref().map(|b| b.name()).unwrap_or("")
    }

    /// Selects the backend and instantiates its driver.
    pub fn set_backend_name(&mut self, name: &str) -> Result<()> {
        self.backend = Some(Arc::new(Backend::from_name(name)?));
        Ok(())
    }

    pub fn backend(&self) -> Option<&Backend> {
        self.backend.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn set_database(&mut self, database: impl Into<String>) {
        self.database = database.into();
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn set_port(&mut self, port: Option<u16>) {
        self.port = port;
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = user.into();
    }

    /// The password in its obfuscated form.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Stores an already obfuscated password.
    pub fn set_password(&mut self, obfuscated: impl Into<String>) {
        self.password = obfuscated.into();
    }

    pub fn set_plaintext_password(&mut self, plaintext: &str) {
        self.password = obfuscate(plaintext);
    }

    pub fn reveal_password(&self) -> Result<String> {
        reveal(&self.password)
    }

    /// Parameters handed to the backend driver.
    pub fn to_params(&self) -> Result<ConnectParams> {
        Ok(ConnectParams {
            host: self.host.clone(),
            database: self.database.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.reveal_password()?,
        })
    }

    /// Opens a native connection through the selected backend.
    pub async fn connect_native(&self) -> Result<Box<dyn dabo_core::Connection>> {
        let Some(backend) = &self.backend else {
            return Err(Error::invalid_configuration("no backend selected"));
        };
        backend.connect(&self.to_params()?).await
    }
}

impl fmt::Debug for ConnectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectInfo")
            .field("backend", &self.backend_name())
            .field("host", &self.host)
            .field("database", &self.database)
            .field("port", &self.port)
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::invalid_configuration(format!("invalid port; port={value}")))
}

fn xor(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .zip(OBFUSCATION_KEY.iter().cycle())
        .map(|(b, k)| b ^ k)
        .collect()
}

/// Obfuscates a plaintext password.
pub fn obfuscate(plaintext: &str) -> String {
    if plaintext.is_empty() {
        return String::new();
    }
    STANDARD.encode(xor(plaintext.as_bytes()))
}

/// Reverses [`obfuscate`].
pub fn reveal(obfuscated: &str) -> Result<String> {
    if obfuscated.is_empty() {
        return Ok(String::new());
    }

    let bytes = STANDARD
        .decode(obfuscated)
        .map_err(|_| Error::invalid_configuration("password is not in obfuscated form"))?;

    String::from_utf8(xor(&bytes))
        .map_err(|_| Error::invalid_configuration("password is not in obfuscated form"))
}
