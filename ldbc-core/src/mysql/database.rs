use crate::mysql::arguments::MySqlArguments;
use crate::mysql::connection::MySqlConnection;
use crate::mysql::row::MySqlRow;
use crate::mysql::types::MySqlTypeInfo;

/// The MySQL (and MariaDB-compatible) database driver.
#[derive(Debug)]
pub struct MySql;

impl crate::database::Database for MySql {
    type Connection = MySqlConnection;
    type Arguments = MySqlArguments;
    type Row = MySqlRow;
    type TypeInfo = MySqlTypeInfo;
    type TableId = Box<str>;
    type Buffer = Vec<u8>;
    type QueryResult = MySqlQueryResult;
}

/// What [`crate::executor::Executor::execute`] returns for MySQL: the fields
/// an `OK_Packet` carries beyond the rows themselves.
#[derive(Debug, Clone, Default)]
pub struct MySqlQueryResult {
    pub(crate) rows_affected: u64,
    pub(crate) last_insert_id: u64,
    pub(crate) warnings: u16,
}

impl MySqlQueryResult {
    /// Rows matched by an `UPDATE`/`DELETE`, or inserted by an `INSERT`.
    pub fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// The `AUTO_INCREMENT` value assigned by an `INSERT`, or 0 if the table
    /// has no auto-increment column or the statement didn't insert a row.
    pub fn last_insert_id(&self) -> u64 {
        self.last_insert_id
    }

    /// Non-fatal warnings the server raised while running the statement
    /// (truncation, implicit type coercion, ...); fetch their text with
    /// `SHOW WARNINGS`.
    pub fn warnings(&self) -> u16 {
        self.warnings
    }
}
