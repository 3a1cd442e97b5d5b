//! Traits for accessing the columns of a result-set row.

use crate::database::Database;
use crate::decode::Decode;

/// A single row of a result set.
pub trait Row: Unpin + Send {
    type Database: Database;

    /// The number of columns in this row.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decodes the value at `index`, returning an error if the index is out of
    /// bounds, the column name doesn't exist, or the value fails to decode.
    fn try_get<'r, I, T>(&'r self, index: I) -> crate::Result<T>
    where
        I: ColumnIndex<Self>,
        T: Decode<'r, Self::Database>;

    /// Like [`Row::try_get`] but panics on error. Intended for call sites that
    /// already know the column exists and is the right type.
    fn get<'r, I, T>(&'r self, index: I) -> T
    where
        I: ColumnIndex<Self>,
        T: Decode<'r, Self::Database>,
    {
        self.try_get(index).expect("failed to decode column")
    }

    /// Resolves a column name to its 0-based index.
    fn column_index(&self, name: &str) -> Option<usize>;
}

/// Something that can be used to index into a [`Row`]: a raw 0-based index or
/// a column name.
pub trait ColumnIndex<R: Row + ?Sized> {
    fn resolve(&self, row: &R) -> crate::Result<usize>;
}

impl<R: Row + ?Sized> ColumnIndex<R> for usize {
    fn resolve(&self, row: &R) -> crate::Result<usize> {
        if *self >= row.len() {
            return Err(crate::Error::ColumnIndexOutOfBounds {
                index: *self,
                len: row.len(),
            });
        }

        Ok(*self)
    }
}

impl<R: Row + ?Sized> ColumnIndex<R> for &'_ str {
    fn resolve(&self, row: &R) -> crate::Result<usize> {
        row.column_index(self)
            .ok_or_else(|| crate::Error::ColumnNotFound((*self).into()))
    }
}
