use crate::mysql::protocol::column::ColumnDefinition;

/// Metadata for a prepared statement: its server-assigned id plus the column
/// definitions for its parameters and result set (both empty for a statement
/// the server didn't describe, e.g. one with no result set).
///
/// This holds no reference to the [`crate::mysql::MySqlConnection`] that
/// prepared it; the statement id is only meaningful against that specific
/// connection (or, after a `COM_CHANGE_USER`/reconnect, not at all), so
/// callers always re-supply the connection to execute it. `MySqlConnection`
/// itself keeps the non-owning half of this relationship in its statement
/// cache, keyed by SQL text, so a given query string is prepared at most once
/// per connection.
#[derive(Debug, Clone)]
pub struct MySqlStatement {
    pub(crate) id: u32,
    pub(crate) params: u16,
    pub(crate) columns: std::sync::Arc<Vec<ColumnDefinition>>,
}

impl MySqlStatement {
    /// The number of `?` placeholders the server reported for this statement.
    pub fn params(&self) -> u16 {
        self.params
    }

    /// The result-set column definitions, or empty for statements that don't
    /// produce rows (e.g. `INSERT`/`UPDATE`/`DELETE`).
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }
}
