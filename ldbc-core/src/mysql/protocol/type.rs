use std::fmt::{self, Display, Formatter};

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/binary__log__types_8h.html
// https://mariadb.com/kb/en/library/resultset/#field-types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeId(pub u8);

macro_rules! type_id_consts {
    ($(
        pub const $name:ident: TypeId = TypeId($id:literal);
    )*) => (
        impl TypeId {
            $(pub const $name: TypeId = TypeId($id);)*

            #[doc(hidden)]
            pub fn type_name(&self) -> &'static str {
                match self.0 {
                    $($id => stringify!($name),)*
                    _ => "<unknown>"
                }
            }
        }
    )
}

impl Display for TypeId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} ({:#x})", self.type_name(), self.0)
    }
}

// https://dev.mysql.com/doc/dev/mysql-server/latest/field__types_8h_source.html
type_id_consts! {
    pub const DECIMAL: TypeId = TypeId(0);
    pub const TINY: TypeId = TypeId(1);
    pub const SHORT: TypeId = TypeId(2);
    pub const LONG: TypeId = TypeId(3);
    pub const FLOAT: TypeId = TypeId(4);
    pub const DOUBLE: TypeId = TypeId(5);
    pub const NULL: TypeId = TypeId(6);
    pub const TIMESTAMP: TypeId = TypeId(7);
    pub const LONGLONG: TypeId = TypeId(8);
    pub const INT24: TypeId = TypeId(9);
    pub const DATE: TypeId = TypeId(10);
    pub const TIME: TypeId = TypeId(11);
    pub const DATETIME: TypeId = TypeId(12);
    pub const YEAR: TypeId = TypeId(13);
    pub const NEWDATE: TypeId = TypeId(14);
    pub const VARCHAR: TypeId = TypeId(15);
    pub const BIT: TypeId = TypeId(16);
    pub const TIMESTAMP2: TypeId = TypeId(17);
    pub const DATETIME2: TypeId = TypeId(18);
    pub const TIME2: TypeId = TypeId(19);
    pub const JSON: TypeId = TypeId(245);
    pub const NEWDECIMAL: TypeId = TypeId(246);
    pub const ENUM: TypeId = TypeId(247);
    pub const SET: TypeId = TypeId(248);
    pub const TINY_BLOB: TypeId = TypeId(249);
    pub const MEDIUM_BLOB: TypeId = TypeId(250);
    pub const LONG_BLOB: TypeId = TypeId(251);
    pub const BLOB: TypeId = TypeId(252);
    pub const VAR_STRING: TypeId = TypeId(253);
    pub const STRING: TypeId = TypeId(254);
    pub const GEOMETRY: TypeId = TypeId(255);
}

impl TypeId {
    /// `true` for the family of types whose binary-protocol encoding is a
    /// `string<lenenc>` regardless of the declared column type (BLOB, TEXT,
    /// JSON, DECIMAL, ENUM, SET, BIT, GEOMETRY all fall back to this).
    pub fn is_length_encoded_string(&self) -> bool {
        matches!(
            *self,
            TypeId::DECIMAL
                | TypeId::NEWDECIMAL
                | TypeId::VARCHAR
                | TypeId::BIT
                | TypeId::JSON
                | TypeId::ENUM
                | TypeId::SET
                | TypeId::TINY_BLOB
                | TypeId::MEDIUM_BLOB
                | TypeId::LONG_BLOB
                | TypeId::BLOB
                | TypeId::VAR_STRING
                | TypeId::STRING
                | TypeId::GEOMETRY
        )
    }
}

impl Default for TypeId {
    fn default() -> TypeId {
        TypeId::NULL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_names_known_types() {
        assert_eq!(TypeId::LONGLONG.type_name(), "LONGLONG");
        assert_eq!(TypeId(200).type_name(), "<unknown>");
    }
}
