use byteorder::LittleEndian;

use crate::decode::{require_value, Decode};
use crate::encode::Encode;
use crate::io::BufMut;
use crate::mysql::database::MySql;
use crate::mysql::protocol::r#type::TypeId;
use crate::mysql::types::MySqlTypeInfo;
use crate::types::Type;

macro_rules! impl_int_type {
    ($ty:ty, $unsigned:ty, $type_id:expr, $put:ident) => {
        impl Type<MySql> for $ty {
            fn type_info() -> MySqlTypeInfo {
                MySqlTypeInfo::new($type_id)
            }
        }

        impl Encode<MySql> for $ty {
            fn encode(&self, buf: &mut Vec<u8>) {
                buf.$put::<LittleEndian>(*self as $unsigned);
            }
        }

        impl<'r> Decode<'r, MySql> for $ty {
            fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
                let text = std::str::from_utf8(require_value(raw)?).map_err(crate::Error::decode)?;

                text.parse().map_err(crate::Error::decode)
            }
        }
    };
}

impl Type<MySql> for i8 {
    fn type_info() -> MySqlTypeInfo {
        MySqlTypeInfo::new(TypeId::TINY)
    }
}

impl Encode<MySql> for i8 {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(*self as u8);
    }
}

impl<'r> Decode<'r, MySql> for i8 {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        let text = std::str::from_utf8(require_value(raw)?).map_err(crate::Error::decode)?;

        text.parse().map_err(crate::Error::decode)
    }
}

impl_int_type!(i16, u16, TypeId::SHORT, put_u16);
impl_int_type!(i32, u32, TypeId::LONG, put_u32);
impl_int_type!(i64, u64, TypeId::LONGLONG, put_u64);

impl Type<MySql> for u8 {
    fn type_info() -> MySqlTypeInfo {
        MySqlTypeInfo::unsigned(TypeId::TINY)
    }
}

impl Encode<MySql> for u8 {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(*self);
    }
}

impl<'r> Decode<'r, MySql> for u8 {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        let text = std::str::from_utf8(require_value(raw)?).map_err(crate::Error::decode)?;

        text.parse().map_err(crate::Error::decode)
    }
}

macro_rules! impl_uint_type {
    ($ty:ty, $type_id:expr, $put:ident) => {
        impl Type<MySql> for $ty {
            fn type_info() -> MySqlTypeInfo {
                MySqlTypeInfo::unsigned($type_id)
            }
        }

        impl Encode<MySql> for $ty {
            fn encode(&self, buf: &mut Vec<u8>) {
                buf.$put::<LittleEndian>(*self);
            }
        }

        impl<'r> Decode<'r, MySql> for $ty {
            fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
                let text = std::str::from_utf8(require_value(raw)?).map_err(crate::Error::decode)?;

                text.parse().map_err(crate::Error::decode)
            }
        }
    };
}

impl_uint_type!(u16, TypeId::SHORT, put_u16);
impl_uint_type!(u32, TypeId::LONG, put_u32);
impl_uint_type!(u64, TypeId::LONGLONG, put_u64);

impl Type<MySql> for bool {
    fn type_info() -> MySqlTypeInfo {
        MySqlTypeInfo::new(TypeId::TINY)
    }
}

impl Encode<MySql> for bool {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(*self as u8);
    }
}

impl<'r> Decode<'r, MySql> for bool {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        let bytes = require_value(raw)?;

        Ok(!matches!(bytes, b"0" | b""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_decodes_integers_from_text() {
        assert_eq!(i32::decode(Some(b"-42"), &MySqlTypeInfo::new(TypeId::LONG)).unwrap(), -42);
        assert_eq!(u64::decode(Some(b"9999999999"), &MySqlTypeInfo::unsigned(TypeId::LONGLONG)).unwrap(), 9_999_999_999);
    }

    #[test]
    fn it_decodes_bool_from_tinyint_text() {
        assert!(bool::decode(Some(b"1"), &MySqlTypeInfo::new(TypeId::TINY)).unwrap());
        assert!(!bool::decode(Some(b"0"), &MySqlTypeInfo::new(TypeId::TINY)).unwrap());
    }
}
