use std::convert::TryInto;
use std::sync::Arc;
use std::time::Duration;

use crate::mysql::observability::{LoggingObserver, Observer};
use crate::url::{SslMode, Url};

/// Everything needed to open a [`crate::mysql::MySqlConnection`], either
/// parsed from a `mysql://` URL or built up through these setters.
#[derive(Clone)]
pub struct MySqlConnectOptions {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) username: String,
    pub(crate) password: Option<String>,
    pub(crate) database: Option<String>,
    pub(crate) ssl_mode: SslMode,
    pub(crate) ssl_ca: Option<String>,
    pub(crate) connect_timeout: Duration,
    pub(crate) statement_cache_capacity: usize,
    pub(crate) observer: Arc<dyn Observer>,
}

impl std::fmt::Debug for MySqlConnectOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlConnectOptions")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("connect_timeout", &self.connect_timeout)
            .field("statement_cache_capacity", &self.statement_cache_capacity)
            .finish()
    }
}

impl Default for MySqlConnectOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            username: "root".to_string(),
            password: None,
            database: None,
            ssl_mode: SslMode::default(),
            ssl_ca: None,
            connect_timeout: Duration::from_secs(10),
            statement_cache_capacity: 100,
            observer: Arc::new(LoggingObserver),
        }
    }
}

impl MySqlConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(url: &str) -> crate::Result<Self> {
        url.try_into()
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn ssl_mode(mut self, mode: SslMode) -> Self {
        self.ssl_mode = mode;
        self
    }

    pub fn ssl_ca(mut self, path: impl Into<String>) -> Self {
        self.ssl_ca = Some(path.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Maximum number of distinct SQL texts whose prepared-statement ids are
    /// cached per connection. `0` disables the statement cache: every
    /// parameterized query is prepared, executed, and closed immediately.
    pub fn statement_cache_capacity(mut self, capacity: usize) -> Self {
        self.statement_cache_capacity = capacity;
        self
    }

    /// Replaces the default logging [`Observer`] with a custom one, e.g. to
    /// feed query events into an application's own tracing pipeline.
    pub fn observer(mut self, observer: impl Observer + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }
}

impl std::convert::TryFrom<&str> for MySqlConnectOptions {
    type Error = crate::Error;

    fn try_from(s: &str) -> crate::Result<Self> {
        let url: Url = s.try_into()?;
        Ok(Self::from(url))
    }
}

impl std::convert::TryFrom<String> for MySqlConnectOptions {
    type Error = crate::Error;

    fn try_from(s: String) -> crate::Result<Self> {
        Self::try_from(s.as_str())
    }
}

impl From<Url> for MySqlConnectOptions {
    fn from(url: Url) -> Self {
        let defaults = Self::default();

        Self {
            host: url.host().to_string(),
            port: url.port(defaults.port),
            username: url.username().unwrap_or("root").to_string(),
            password: url.password().map(|pw| pw.into_owned()),
            database: url.database().map(ToOwned::to_owned),
            ssl_mode: url.ssl_mode(),
            ssl_ca: url.ssl_ca().map(ToOwned::to_owned),
            connect_timeout: url.connect_timeout().unwrap_or(defaults.connect_timeout),
            statement_cache_capacity: defaults.statement_cache_capacity,
            observer: defaults.observer,
        }
    }
}
