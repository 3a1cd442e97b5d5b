//! Traits for collecting bound parameters for a query.

use crate::database::Database;
use crate::encode::Encode;
use crate::types::Type;

/// A tuple of arguments to be sent to the database alongside a query.
pub trait Arguments: Send + Sized + Default + 'static {
    type Database: Database + ?Sized;

    /// Returns `true` if there are no values.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of values.
    fn len(&self) -> usize;

    /// Reserves capacity for at least `len` more values (of `size_hint` bytes
    /// combined) without a reallocation.
    fn reserve(&mut self, len: usize, size_hint: usize);

    /// Adds the value to the end of the arguments.
    fn add<T>(&mut self, value: T)
    where
        T: Type<Self::Database> + Encode<Self::Database>;
}

pub trait IntoArguments<DB>
where
    DB: Database,
{
    fn into_arguments(self) -> DB::Arguments;
}

impl<A> IntoArguments<A::Database> for A
where
    A: Arguments,
    A::Database: Database<Arguments = Self>,
{
    fn into_arguments(self) -> Self {
        self
    }
}
