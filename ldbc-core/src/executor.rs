//! The [`Executor`] trait, implemented by anything that can run a query:
//! a bare connection, a pooled connection, or the pool itself.

use futures_core::future::BoxFuture;
use futures_core::stream::BoxStream;
use futures_util::TryStreamExt;

use crate::database::Database;

/// Encapsulates query execution against the database.
///
/// Implemented by [`crate::mysql::MySqlConnection`], [`crate::pool::PoolConnection`],
/// and `&Pool`.
pub trait Executor: Send {
    type Database: Database;

    /// Executes `query`, returning the driver's query-result type (rows
    /// affected plus whatever else the wire protocol's `OK` response
    /// carries). Any rows produced by the query are discarded.
    fn execute<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxFuture<'e, crate::Result<<Self::Database as Database>::QueryResult>>;

    /// Executes `query`, streaming back the rows it produces.
    fn fetch<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxStream<'e, crate::Result<<Self::Database as Database>::Row>>;

    /// Executes `query` and returns at most one row.
    ///
    /// Returns [`crate::Error::RowNotFound`]... no, returns `Ok(None)` if the
    /// query produced zero rows; extra rows beyond the first are dropped
    /// without being fetched.
    fn fetch_optional<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxFuture<'e, crate::Result<Option<<Self::Database as Database>::Row>>> {
        let mut stream = self.fetch(query, args);

        Box::pin(async move { stream.try_next().await })
    }

    /// Executes `query` and returns exactly one row, or
    /// [`crate::Error::RowNotFound`] if it produced none.
    fn fetch_one<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxFuture<'e, crate::Result<<Self::Database as Database>::Row>> {
        let fut = self.fetch_optional(query, args);

        Box::pin(async move { fut.await?.ok_or(crate::Error::RowNotFound) })
    }

    /// Executes `query` and collects every row into a `Vec`.
    fn fetch_all<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxFuture<'e, crate::Result<Vec<<Self::Database as Database>::Row>>> {
        let stream = self.fetch(query, args);

        Box::pin(stream.try_collect())
    }
}

impl<'a, T> Executor for &'a mut T
where
    T: Executor + ?Sized,
{
    type Database = T::Database;

    fn execute<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxFuture<'e, crate::Result<<Self::Database as Database>::QueryResult>> {
        (**self).execute(query, args)
    }

    fn fetch<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxStream<'e, crate::Result<<Self::Database as Database>::Row>> {
        (**self).fetch(query, args)
    }
}

/// Something that can be turned into a query plus its bound arguments:
/// either a bare `&str` (no parameters) or a [`crate::query::Query`].
pub trait Execute<'q, DB: Database> {
    fn into_parts(self) -> (&'q str, DB::Arguments);
}

impl<'q, DB: Database> Execute<'q, DB> for &'q str {
    fn into_parts(self) -> (&'q str, DB::Arguments) {
        (self, Default::default())
    }
}

impl<'q, DB: Database> Execute<'q, DB> for (&'q str, DB::Arguments) {
    fn into_parts(self) -> (&'q str, DB::Arguments) {
        self
    }
}
