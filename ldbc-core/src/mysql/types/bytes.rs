use byteorder::LittleEndian;

use crate::decode::{require_value, Decode};
use crate::encode::Encode;
use crate::io::BufMut;
use crate::mysql::database::MySql;
use crate::mysql::protocol::r#type::TypeId;
use crate::mysql::types::MySqlTypeInfo;
use crate::types::Type;

impl Type<MySql> for [u8] {
    fn type_info() -> MySqlTypeInfo {
        MySqlTypeInfo { is_binary: true, ..MySqlTypeInfo::new(TypeId::BLOB) }
    }
}

impl Encode<MySql> for [u8] {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_bytes_lenenc::<LittleEndian>(self);
    }
}

impl Type<MySql> for Vec<u8> {
    fn type_info() -> MySqlTypeInfo {
        <[u8] as Type<MySql>>::type_info()
    }
}

impl Encode<MySql> for Vec<u8> {
    fn encode(&self, buf: &mut Vec<u8>) {
        <[u8] as Encode<MySql>>::encode(self, buf)
    }
}

impl<'r> Decode<'r, MySql> for Vec<u8> {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        Ok(require_value(raw)?.to_vec())
    }
}

impl<'r> Decode<'r, MySql> for &'r [u8] {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        require_value(raw)
    }
}
