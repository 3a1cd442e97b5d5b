//! Traits describing a single connection to a database.

use std::convert::TryInto;
use std::time::Duration;

use futures_core::future::BoxFuture;

use crate::database::Database;
use crate::url::Url;

/// A connection to a specific kind of database, opened from a connection URL.
pub trait Connect: Connection + Sized {
    /// Establishes a new connection, performing the handshake and any
    /// configured post-connect session setup.
    fn connect<T>(url: T) -> BoxFuture<'static, crate::Result<Self>>
    where
        T: TryInto<Url> + Send,
        crate::Error: From<T::Error>;
}

/// A single open connection to a database.
pub trait Connection: Send + 'static {
    type Database: Database<Connection = Self>;

    /// Closes this connection, sending a graceful shutdown to the server if
    /// the protocol has one.
    fn close(self) -> BoxFuture<'static, crate::Result<()>>;

    /// Checks that the connection is still alive by round-tripping a no-op
    /// command to the server.
    fn ping(&mut self) -> BoxFuture<'_, crate::Result<()>>;

    /// Returns `true` if this connection believes itself still usable: the
    /// transport hasn't been closed and the last command didn't poison it.
    ///
    /// This is a cached-flag read with no I/O, safe to call from a
    /// synchronous `Drop` impl (the pool's release path does exactly that).
    /// For a real round-trip check bounded by a timeout, see
    /// [`Connection::is_valid_within`].
    fn is_valid(&self) -> bool;

    /// `isValid(timeout)`: actually round-trips a no-op command to the
    /// server, bounded by `timeout`, rather than trusting the cached flag
    /// [`Connection::is_valid`] reads. Returns `false` on I/O error or
    /// timeout; never returns an `Err`, matching `isValid`'s
    /// "problems mean not valid" contract rather than surfacing the cause.
    fn is_valid_within(&mut self, timeout: Duration) -> BoxFuture<'_, bool>;
}
