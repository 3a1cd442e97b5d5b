//! Core of ldbc: a from-scratch MySQL wire protocol client and connection
//! pool. Not intended to be used directly; see the `ldbc` crate.

#![forbid(unsafe_code)]
#![recursion_limit = "512"]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[macro_use]
pub mod error;

#[macro_use]
mod io;

pub mod connection;
pub mod database;

#[macro_use]
pub mod executor;

pub mod transaction;
mod url;

#[doc(hidden)]
pub mod runtime;

#[macro_use]
pub mod arguments;
pub mod decode;
pub mod encode;
pub mod pool;
pub mod query;
pub mod types;

#[macro_use]
pub mod row;

pub mod mysql;

pub use error::{Error, Result};
pub use mysql::{MySql, MySqlConnectOptions, MySqlConnection, MySqlPool};

// Named Lifetimes:
//  'c: connection
//  'q: query string (and arguments)
