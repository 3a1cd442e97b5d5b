//! `ldbc`: a from-scratch MySQL wire protocol client and connection pool.
//!
//! ```no_run
//! # async fn example() -> ldbc::Result<()> {
//! use ldbc::{MySqlPool, Executor};
//!
//! let pool = MySqlPool::connect("mysql://root@localhost/test").await?;
//! let rows = pool.fetch_all("select * from users", Default::default()).await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub use ldbc_core::connection::{Connect, Connection};
pub use ldbc_core::database::Database;
pub use ldbc_core::error::{Error, Result};
pub use ldbc_core::executor::{Execute, Executor};
pub use ldbc_core::mysql::{
    DbAttributes, LoggingObserver, MySql, MySqlArguments, MySqlConnectOptions, MySqlConnection,
    MySqlPool, MySqlPoolOptions, MySqlQueryResult, MySqlRow, MySqlStatement, MySqlTypeInfo, Observer,
    QueryEvent,
};
pub use ldbc_core::pool::{Pool, PoolConnection, PoolOptions};
pub use ldbc_core::query::{query, Query};
pub use ldbc_core::row::Row;
pub use ldbc_core::transaction::Transaction;
pub use ldbc_core::types::Type;
