//! A minimal, non-macro query builder: bind parameters positionally and run.
//!
//! This intentionally stays thin; it neither parses the query string nor
//! validates placeholder counts, it just accumulates bound values and hands
//! them to an [`Executor`].

use futures_core::stream::BoxStream;

use crate::arguments::Arguments;
use crate::database::Database;
use crate::encode::Encode;
use crate::executor::Executor;
use crate::types::Type;

/// Raw SQL plus bind parameters. Returned by [`query`].
pub struct Query<'q, DB>
where
    DB: Database,
{
    query: &'q str,
    arguments: DB::Arguments,
}

/// Construct a raw SQL query that can be chained to bind parameters and executed.
pub fn query<DB>(sql: &str) -> Query<'_, DB>
where
    DB: Database,
{
    Query {
        query: sql,
        arguments: Default::default(),
    }
}

impl<'q, DB> Query<'q, DB>
where
    DB: Database,
{
    /// Binds a value for use with this SQL query.
    ///
    /// If the number of times this is called does not match the number of
    /// `?` placeholders in the query, the server returns an error when the
    /// query executes.
    pub fn bind<T>(mut self, value: T) -> Self
    where
        T: Type<DB> + Encode<DB>,
    {
        self.arguments.add(value);
        self
    }

    /// Executes the query, returning the driver's query-result type.
    pub async fn execute<E>(self, executor: &mut E) -> crate::Result<DB::QueryResult>
    where
        E: Executor<Database = DB>,
    {
        executor.execute(self.query, self.arguments).await
    }

    /// Executes the query, streaming back the rows it produces.
    pub fn fetch<'e, E>(self, executor: &'e mut E) -> BoxStream<'e, crate::Result<DB::Row>>
    where
        E: Executor<Database = DB>,
        'q: 'e,
    {
        executor.fetch(self.query, self.arguments)
    }

    pub async fn fetch_one<E>(self, executor: &mut E) -> crate::Result<DB::Row>
    where
        E: Executor<Database = DB>,
    {
        executor.fetch_one(self.query, self.arguments).await
    }

    pub async fn fetch_optional<E>(self, executor: &mut E) -> crate::Result<Option<DB::Row>>
    where
        E: Executor<Database = DB>,
    {
        executor.fetch_optional(self.query, self.arguments).await
    }

    pub async fn fetch_all<E>(self, executor: &mut E) -> crate::Result<Vec<DB::Row>>
    where
        E: Executor<Database = DB>,
    {
        executor.fetch_all(self.query, self.arguments).await
    }
}
