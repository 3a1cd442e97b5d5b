//! Traits linking Rust types to SQL types.

use std::fmt::{Debug, Display};

use crate::database::Database;

#[cfg(feature = "chrono")]
#[cfg_attr(docsrs, doc(cfg(feature = "chrono")))]
pub mod chrono {
    pub use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
}

/// Metadata about a SQL type as reported by the database (e.g. a MySQL column
/// definition's type/flags/collation).
pub trait TypeInfo: Debug + Display + Clone + Send + Sync {
    /// Compares type information to determine if `other` is compatible at the
    /// Rust level with `self`.
    fn compatible(&self, other: &Self) -> bool;
}

/// Indicates that a SQL type is supported for a database and describes its
/// canonical wire type.
pub trait Type<DB>
where
    DB: Database,
{
    /// Returns the canonical type information on the database for the type `T`.
    fn type_info() -> DB::TypeInfo;

    /// Determines if this Rust type is compatible with the given SQL type.
    ///
    /// Defaults to [`TypeInfo::compatible`] against [`Type::type_info`]; types
    /// that accept more than one wire representation (e.g. any integer width
    /// decoding into `i64`) override this.
    fn compatible(ty: &DB::TypeInfo) -> bool {
        Self::type_info().compatible(ty)
    }
}

impl<T: ?Sized, DB> Type<DB> for &'_ T
where
    DB: Database,
    T: Type<DB>,
{
    fn type_info() -> DB::TypeInfo {
        <T as Type<DB>>::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        <T as Type<DB>>::compatible(ty)
    }
}

impl<T, DB> Type<DB> for Option<T>
where
    DB: Database,
    T: Type<DB>,
{
    fn type_info() -> DB::TypeInfo {
        <T as Type<DB>>::type_info()
    }

    fn compatible(ty: &DB::TypeInfo) -> bool {
        <T as Type<DB>>::compatible(ty)
    }
}
