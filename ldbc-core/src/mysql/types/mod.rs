//! `Type`/`Encode`/`Decode` implementations mapping Rust types onto the MySQL
//! wire types named in `mysql/protocol/type.rs`.
//!
//! Row values are normalized to their text-protocol representation by the
//! time they reach a [`crate::row::Row`] (see `mysql/row.rs`), so every
//! `Decode` impl here parses ASCII text rather than branching on whether the
//! row came from `COM_QUERY` or `COM_STMT_EXECUTE`. `Encode` impls write the
//! real binary-protocol wire format, since bound parameters always travel
//! over `COM_STMT_EXECUTE`.

mod bytes;
mod float;
mod int;
mod string;

#[cfg(feature = "chrono")]
mod chrono;

use std::fmt;

use crate::mysql::protocol::r#type::TypeId;
use crate::types::TypeInfo;

/// Metadata for a MySQL column or bound parameter: its wire type id plus
/// whether it carries the `UNSIGNED` flag (relevant for the integer family).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlTypeInfo {
    pub(crate) id: TypeId,
    pub(crate) is_unsigned: bool,
    pub(crate) is_binary: bool,
}

impl MySqlTypeInfo {
    pub(crate) const fn new(id: TypeId) -> Self {
        Self { id, is_unsigned: false, is_binary: false }
    }

    pub(crate) const fn unsigned(id: TypeId) -> Self {
        Self { id, is_unsigned: true, is_binary: false }
    }
}

impl TypeInfo for MySqlTypeInfo {
    fn compatible(&self, other: &Self) -> bool {
        let is_integer = |id: TypeId| {
            matches!(
                id,
                TypeId::TINY | TypeId::SHORT | TypeId::INT24 | TypeId::LONG | TypeId::LONGLONG | TypeId::YEAR
            )
        };
        let is_float = |id: TypeId| {
            matches!(id, TypeId::FLOAT | TypeId::DOUBLE | TypeId::DECIMAL | TypeId::NEWDECIMAL)
        };

        match (self.id, other.id) {
            (a, b) if a == b => true,

            // any integer width is compatible with any other; Rust integer
            // types decode from the text representation regardless of the
            // server's exact column width
            (a, b) if is_integer(a) && is_integer(b) => true,

            (a, b) if is_float(a) && is_float(b) => true,

            (a, b) if a.is_length_encoded_string() && b.is_length_encoded_string() => true,

            _ => false,
        }
    }
}

impl fmt::Display for MySqlTypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id.type_name())
    }
}
