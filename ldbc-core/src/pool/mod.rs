//! A production-grade connection pool: lifecycle, validation, eviction, leak
//! detection, and background maintenance on top of any [`Connect`]
//! implementation.
//!
//! ```no_run
//! # async fn example() -> ldbc_core::Result<()> {
//! use ldbc_core::mysql::MySqlConnection;
//! use ldbc_core::pool::PoolOptions;
//!
//! let pool = PoolOptions::new()
//!     .max_connections(10)
//!     .connect::<MySqlConnection>("mysql://root@localhost/test")
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::convert::TryInto;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::connection::Connect;
use crate::url::Url;

mod executor;
mod inner;
mod options;

pub use options::PoolOptions;

use inner::{Live, SharedPool};

/// A pool of live connections to a database, shared cheaply by cloning (it's
/// just an `Arc` underneath).
pub struct Pool<C: Connect>(Arc<SharedPool<C>>);

impl<C: Connect> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Pool(self.0.clone())
    }
}

impl<C: Connect> Pool<C> {
    /// Opens a pool with default [`PoolOptions`].
    pub async fn connect<T>(url: T) -> crate::Result<Self>
    where
        T: TryInto<Url> + Send,
        crate::Error: From<T::Error>,
    {
        PoolOptions::new().connect(url).await
    }

    /// Checks out a connection, waiting up to [`PoolOptions::connect_timeout`]
    /// for one to become available.
    pub async fn acquire(&self) -> crate::Result<PoolConnection<C>> {
        self.0.acquire().await
    }

    /// Checks out an already-idle connection without waiting or opening a new
    /// one. Returns `None` if the pool is closed or has no idle connection
    /// ready right now.
    pub async fn try_acquire(&self) -> Option<PoolConnection<C>> {
        self.0.try_acquire().await
    }

    /// Closes the pool: rejects future acquires, wakes every waiter with
    /// [`crate::Error::PoolClosed`], and closes every idle connection.
    /// Connections still checked out are closed as they're returned.
    pub async fn close(&self) {
        self.0.close().await
    }

    pub fn is_closed(&self) -> bool {
        self.0.is_closed()
    }

    /// Current number of live connections (idle + checked out).
    pub fn size(&self) -> u32 {
        self.0.size()
    }

    /// Current number of idle connections.
    pub fn num_idle(&self) -> usize {
        self.0.num_idle()
    }

    pub fn options(&self) -> &PoolOptions {
        &self.0.options
    }
}

/// An owned, checked-out connection. Returned to the pool (or closed, if
/// poisoned or lifetime-expired) when dropped.
pub struct PoolConnection<C: Connect> {
    live: Option<Live<C>>,
    pool: Arc<SharedPool<C>>,
    returned: Arc<AtomicBool>,
    checked_out_at: Instant,
}

impl<C: Connect> PoolConnection<C> {
    pub(crate) fn new(live: Live<C>, pool: Arc<SharedPool<C>>, returned: Arc<AtomicBool>) -> Self {
        Self { live: Some(live), pool, returned, checked_out_at: Instant::now() }
    }

    /// How long this connection has been checked out of the pool.
    pub fn checked_out_for(&self) -> std::time::Duration {
        self.checked_out_at.elapsed()
    }

    /// Closes this connection instead of returning it to the pool.
    pub async fn close(mut self) -> crate::Result<()> {
        self.returned.store(true, Ordering::Release);
        let live = self.live.take().expect("connection already taken");
        live.conn.close().await
    }
}

impl<C: Connect> Deref for PoolConnection<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.live.as_ref().expect("connection already taken").conn
    }
}

impl<C: Connect> DerefMut for PoolConnection<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.live.as_mut().expect("connection already taken").conn
    }
}

impl<C: Connect> Drop for PoolConnection<C> {
    fn drop(&mut self) {
        self.returned.store(true, Ordering::Release);

        if let Some(live) = self.live.take() {
            self.pool.release(live);
        }
    }
}
