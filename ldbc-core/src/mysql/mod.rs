//! A from-scratch client for MySQL's client/server wire protocol: framing,
//! capability negotiation, pluggable authentication (with TLS and RSA
//! fallback), and text/binary prepared statements.

mod arguments;
mod connection;
mod database;
mod net;
pub mod observability;
mod options;
mod protocol;
mod row;
mod rsa;
mod statement;
mod stream;
mod tls;
mod types;
mod util;

pub use arguments::MySqlArguments;
pub use database::{MySql, MySqlQueryResult};
pub use observability::{DbAttributes, LoggingObserver, Observer, QueryEvent};
pub use options::MySqlConnectOptions;
pub use row::MySqlRow;
pub use statement::MySqlStatement;
pub use types::MySqlTypeInfo;

#[doc(inline)]
pub use connection::MySqlConnection;

/// A connection pool of [`MySqlConnection`]s.
pub type MySqlPool = crate::pool::Pool<MySqlConnection>;

/// Convenience alias for [`crate::pool::PoolOptions`] bound to [`MySqlConnection`].
pub type MySqlPoolOptions = crate::pool::PoolOptions;
