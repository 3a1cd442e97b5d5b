//! Types and traits for decoding values received from the database.

use crate::database::Database;
use crate::error::UnexpectedNullError;

/// Decode a single value that was received from the database.
///
/// `raw` is `None` when the column is SQL `NULL`; implementors that don't
/// accept `NULL` should return [`UnexpectedNullError`] in that case (this is
/// what the blanket `Option<T>` impl relies on to distinguish "no value" from
/// "decode error").
pub trait Decode<'r, DB>: Sized
where
    DB: Database,
{
    fn decode(raw: Option<&'r [u8]>, ty: &DB::TypeInfo) -> crate::Result<Self>;
}

impl<'r, T, DB> Decode<'r, DB> for Option<T>
where
    DB: Database,
    T: Decode<'r, DB>,
{
    fn decode(raw: Option<&'r [u8]>, ty: &DB::TypeInfo) -> crate::Result<Self> {
        match raw {
            Some(raw) => T::decode(Some(raw), ty).map(Some),
            None => Ok(None),
        }
    }
}

/// Helper for non-nullable `Decode` impls: turns a missing value into
/// [`UnexpectedNullError`] instead of requiring every impl to repeat the check.
pub(crate) fn require_value(raw: Option<&[u8]>) -> crate::Result<&[u8]> {
    raw.ok_or_else(|| crate::Error::decode(UnexpectedNullError))
}
