//! Transaction handles, including nested transactions implemented with
//! `SAVEPOINT`.

use futures_core::future::BoxFuture;
use futures_core::stream::BoxStream;

use crate::connection::Connection;
use crate::database::Database;
use crate::executor::Executor;

/// An open transaction, scoped to the lifetime of a borrowed connection.
///
/// Dropping a `Transaction` without calling [`commit`](Transaction::commit)
/// rolls it back the next time the connection is used; there is no `Drop`
/// impl here that talks to the network (that would require blocking in
/// `drop`), so callers that want a guaranteed rollback-on-drop should call
/// [`Transaction::rollback`] explicitly, e.g. from a `finally`-style guard.
pub struct Transaction<'c, C>
where
    C: Connection,
{
    connection: &'c mut C,
    depth: u32,
}

impl<'c, C> Transaction<'c, C>
where
    C: Connection,
    for<'e> &'e mut C: Executor<Database = C::Database>,
{
    pub(crate) async fn begin(mut connection: &'c mut C, depth: u32) -> crate::Result<Self> {
        let statement = if depth == 0 {
            "BEGIN".to_string()
        } else {
            format!("SAVEPOINT _ldbc_savepoint_{}", depth)
        };

        connection.execute(&statement, Default::default()).await?;

        Ok(Self { connection, depth })
    }

    pub async fn commit(self) -> crate::Result<()> {
        let statement = if self.depth == 0 {
            "COMMIT".to_string()
        } else {
            format!("RELEASE SAVEPOINT _ldbc_savepoint_{}", self.depth)
        };

        self.connection.execute(&statement, Default::default()).await?;

        Ok(())
    }

    pub async fn rollback(self) -> crate::Result<()> {
        let statement = if self.depth == 0 {
            "ROLLBACK".to_string()
        } else {
            format!("ROLLBACK TO SAVEPOINT _ldbc_savepoint_{}", self.depth)
        };

        self.connection.execute(&statement, Default::default()).await?;

        Ok(())
    }

    /// Opens a nested transaction using `SAVEPOINT`.
    pub async fn begin_nested(&mut self) -> crate::Result<Transaction<'_, C>> {
        Transaction::begin(self.connection, self.depth + 1).await
    }
}

impl<'c, C> Executor for Transaction<'c, C>
where
    C: Connection,
    for<'e> &'e mut C: Executor<Database = C::Database>,
{
    type Database = C::Database;

    fn execute<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxFuture<'e, crate::Result<<Self::Database as Database>::QueryResult>> {
        self.connection.execute(query, args)
    }

    fn fetch<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxStream<'e, crate::Result<<Self::Database as Database>::Row>> {
        self.connection.fetch(query, args)
    }
}
