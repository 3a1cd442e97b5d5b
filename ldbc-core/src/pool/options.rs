//! Configuration for [`crate::pool::Pool`].

use std::convert::TryInto;
use std::time::Duration;

use crate::connection::Connect;
use crate::pool::inner::SharedPool;
use crate::pool::Pool;
use crate::url::Url;

/// Builder for a [`Pool`]'s lifecycle, validation, and sizing behavior.
///
/// Constructed with [`PoolOptions::new`] (equivalent to [`Default::default`])
/// and consumed by [`PoolOptions::connect`].
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub(crate) min_connections: u32,
    pub(crate) max_connections: u32,
    pub(crate) connect_timeout: Duration,
    pub(crate) idle_timeout: Option<Duration>,
    pub(crate) max_lifetime: Option<Duration>,
    pub(crate) keepalive_time: Option<Duration>,
    pub(crate) validation_timeout: Duration,
    pub(crate) maintenance_interval: Duration,
    pub(crate) leak_detection_threshold: Option<Duration>,
    pub(crate) alive_bypass_window: Option<Duration>,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            min_connections: 0,
            max_connections: 10,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(10 * 60)),
            max_lifetime: Some(Duration::from_secs(30 * 60)),
            keepalive_time: None,
            validation_timeout: Duration::from_secs(5),
            maintenance_interval: Duration::from_secs(30),
            leak_detection_threshold: None,
            alive_bypass_window: Some(Duration::from_millis(500)),
        }
    }
}

impl PoolOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Floor the maintenance loop keeps filled, replacing retired connections
    /// opportunistically and on each maintenance tick.
    pub fn min_connections(mut self, n: u32) -> Self {
        self.min_connections = n;
        self
    }

    /// Hard ceiling on live connections (idle + checked out).
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Maximum time [`Pool::acquire`] will wait for a connection to become available.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Retire a connection that has sat idle longer than this. `None` disables idle eviction.
    pub fn idle_timeout(mut self, timeout: impl Into<Option<Duration>>) -> Self {
        self.idle_timeout = timeout.into();
        self
    }

    /// Retire a connection once it has existed this long, regardless of use. `None` disables it.
    pub fn max_lifetime(mut self, lifetime: impl Into<Option<Duration>>) -> Self {
        self.max_lifetime = lifetime.into();
        self
    }

    /// Periodically validate idle connections older than this via the maintenance loop.
    /// `None` disables keepalive validation (connections are only checked on acquire).
    pub fn keepalive_time(mut self, interval: impl Into<Option<Duration>>) -> Self {
        self.keepalive_time = interval.into();
        self
    }

    /// Budget for a single validation probe (`COM_PING`).
    pub fn validation_timeout(mut self, timeout: Duration) -> Self {
        self.validation_timeout = timeout;
        self
    }

    /// Period of the background housekeeper task.
    pub fn maintenance_interval(mut self, interval: Duration) -> Self {
        self.maintenance_interval = interval;
        self
    }

    /// Log a warning if a checked-out connection isn't returned within this long.
    /// `None` (the default) disables leak detection.
    pub fn leak_detection_threshold(mut self, threshold: impl Into<Option<Duration>>) -> Self {
        self.leak_detection_threshold = threshold.into();
        self
    }

    /// Skip validation on acquire if the entry was validated more recently than this.
    pub fn alive_bypass_window(mut self, window: impl Into<Option<Duration>>) -> Self {
        self.alive_bypass_window = window.into();
        self
    }

    pub(crate) fn validate(&self) -> crate::Result<()> {
        if self.max_connections == 0 || self.max_connections < self.min_connections {
            return Err(crate::Error::config(format!(
                "max_connections ({}) must be >= 1 and >= min_connections ({})",
                self.max_connections, self.min_connections
            )));
        }

        if self.connect_timeout < Duration::from_millis(250) {
            return Err(crate::Error::config("connect_timeout must be at least 250ms"));
        }

        if self.validation_timeout < Duration::from_millis(250) {
            return Err(crate::Error::config("validation_timeout must be at least 250ms"));
        }

        if self.maintenance_interval < Duration::from_secs(1) {
            return Err(crate::Error::config("maintenance_interval must be at least 1s"));
        }

        if let Some(idle_timeout) = self.idle_timeout {
            if idle_timeout < Duration::from_secs(10) {
                return Err(crate::Error::config("idle_timeout must be at least 10s"));
            }
        }

        if let Some(keepalive) = self.keepalive_time {
            if keepalive < Duration::from_secs(30) {
                return Err(crate::Error::config("keepalive_time must be at least 30s"));
            }
        }

        if let Some(max_lifetime) = self.max_lifetime {
            if max_lifetime < Duration::from_secs(40) {
                return Err(crate::Error::config("max_lifetime must be at least 40s"));
            }

            if self.idle_timeout.map_or(false, |idle| idle >= max_lifetime) {
                return Err(crate::Error::config("idle_timeout must be less than max_lifetime"));
            }

            if self.keepalive_time.map_or(false, |keepalive| keepalive >= max_lifetime) {
                return Err(crate::Error::config("keepalive_time must be less than max_lifetime"));
            }
        }

        Ok(())
    }

    /// Opens a pool against `url`, eagerly establishing `min_connections` and
    /// spawning the background maintenance task.
    ///
    /// A connection failure while establishing the initial `min_connections`
    /// is fatal: the whole call fails rather than returning an under-filled pool.
    pub async fn connect<C, T>(self, url: T) -> crate::Result<Pool<C>>
    where
        C: Connect,
        T: TryInto<Url> + Send,
        crate::Error: From<T::Error>,
    {
        self.validate()?;

        let url = url.try_into()?;

        let shared = SharedPool::new(url, self);

        shared.fill_to_min().await?;
        shared.spawn_maintenance();

        Ok(Pool(shared))
    }
}
