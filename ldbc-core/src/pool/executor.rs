use futures_core::future::BoxFuture;
use futures_core::stream::BoxStream;
use futures_util::StreamExt;

use crate::connection::Connect;
use crate::database::Database;
use crate::executor::Executor;
use crate::pool::{Pool, PoolConnection};

/// Forwards execution to the checked-out connection.
impl<C> Executor for PoolConnection<C>
where
    C: Connect + Executor,
{
    type Database = <C as Executor>::Database;

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

/// Runs each query against a freshly acquired connection, releasing it back
/// to the pool as soon as the query completes.
impl<'p, C> Executor for &'p Pool<C>
where
    C: Connect + Executor,
{
    type Database = <C as Executor>::Database;

    fn execute<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxFuture<'e, crate::Result<<Self::Database as Database>::QueryResult>> {
        let pool = (*self).clone();

        Box::pin(async move {
            let mut conn = pool.acquire().await?;
            conn.execute(query, args).await
        })
    }

    fn fetch<'e, 'q: 'e>(
        &'e mut self,
        query: &'q str,
        args: <Self::Database as Database>::Arguments,
    ) -> BoxStream<'e, crate::Result<<Self::Database as Database>::Row>> {
        let pool = (*self).clone();

        Box::pin(async_stream::try_stream! {
            let mut conn = pool.acquire().await?;
            let mut rows = conn.fetch(query, args);

            while let Some(row) = rows.next().await {
                yield row?;
            }
        })
    }
}
