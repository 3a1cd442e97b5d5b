//! Types and traits for encoding values to the database.

use std::mem;

use crate::database::Database;
use crate::types::Type;

/// The return type of [`Encode::encode`].
pub enum IsNull {
    /// The value is null; no data was written.
    Yes,

    /// The value is not null.
    ///
    /// This does not mean that data was written.
    No,
}

/// Encode a single value to be sent to the database as a bound parameter.
pub trait Encode<DB>
where
    DB: Database + ?Sized,
{
    /// Writes the value of `self` into `buf` in the wire format the database expects.
    fn encode(&self, buf: &mut DB::Buffer);

    fn encode_nullable(&self, buf: &mut DB::Buffer) -> IsNull {
        self.encode(buf);

        IsNull::No
    }

    fn size_hint(&self) -> usize {
        mem::size_of_val(self)
    }
}

impl<T: ?Sized, DB> Encode<DB> for &'_ T
where
    DB: Database,
    T: Encode<DB> + Type<DB>,
{
    fn encode(&self, buf: &mut DB::Buffer) {
        (*self).encode(buf)
    }

    fn encode_nullable(&self, buf: &mut DB::Buffer) -> IsNull {
        (*self).encode_nullable(buf)
    }

    fn size_hint(&self) -> usize {
        (*self).size_hint()
    }
}

impl<T, DB> Encode<DB> for Option<T>
where
    DB: Database,
    T: Encode<DB> + Type<DB>,
{
    fn encode(&self, buf: &mut DB::Buffer) {
        // forward to encode_nullable and ignore the IsNull, the buffer was
        // already told whether a value was written
        let _ = self.encode_nullable(buf);
    }

    fn encode_nullable(&self, buf: &mut DB::Buffer) -> IsNull {
        if let Some(value) = self {
            value.encode(buf);

            IsNull::No
        } else {
            IsNull::Yes
        }
    }

    fn size_hint(&self) -> usize {
        self.as_ref().map_or(0, Encode::size_hint)
    }
}
