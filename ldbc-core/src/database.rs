use std::fmt::Display;

use crate::arguments::Arguments;
use crate::connection::Connection;
use crate::row::Row;
use crate::types::TypeInfo;

/// A database driver.
///
/// This trait encapsulates a complete driver implementation: a concrete
/// `Connection`, the `Arguments` it accepts, the `Row` it returns, and the
/// `TypeInfo` used to describe columns and bound parameters.
///
/// There is one implementation, [`crate::mysql::MySql`]; the trait stays
/// generic so the pool and executor layers do not hard-code MySQL.
pub trait Database: Sized + Send + Sync + 'static {
    /// The concrete `Connection` implementation for this database.
    type Connection: Connection<Database = Self>;

    /// The concrete `Arguments` implementation for this database.
    type Arguments: Arguments<Database = Self>;

    /// The concrete `Row` implementation for this database.
    type Row: Row<Database = Self>;

    /// The concrete `TypeInfo` implementation for this database.
    type TypeInfo: TypeInfo;

    /// The Rust type of table identifiers for this database.
    type TableId: Display + Clone;

    /// The buffer type that `Encode` impls serialize parameters into.
    type Buffer: Default + Send;

    /// What a completed `INSERT`/`UPDATE`/`DELETE` (or any statement run
    /// through [`crate::executor::Executor::execute`]) hands back: rows
    /// affected, plus whatever else the wire protocol's `OK` response
    /// carries for that database.
    type QueryResult: Send;
}
