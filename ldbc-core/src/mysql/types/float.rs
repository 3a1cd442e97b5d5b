use byteorder::LittleEndian;

use crate::decode::{require_value, Decode};
use crate::encode::Encode;
use crate::io::BufMut;
use crate::mysql::database::MySql;
use crate::mysql::protocol::r#type::TypeId;
use crate::mysql::types::MySqlTypeInfo;
use crate::types::Type;

impl Type<MySql> for f32 {
    fn type_info() -> MySqlTypeInfo {
        MySqlTypeInfo::new(TypeId::FLOAT)
    }
}

impl Encode<MySql> for f32 {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_f32::<LittleEndian>(*self);
    }
}

impl<'r> Decode<'r, MySql> for f32 {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        let text = std::str::from_utf8(require_value(raw)?).map_err(crate::Error::decode)?;

        text.parse().map_err(crate::Error::decode)
    }
}

impl Type<MySql> for f64 {
    fn type_info() -> MySqlTypeInfo {
        MySqlTypeInfo::new(TypeId::DOUBLE)
    }
}

impl Encode<MySql> for f64 {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_f64::<LittleEndian>(*self);
    }
}

impl<'r> Decode<'r, MySql> for f64 {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        let text = std::str::from_utf8(require_value(raw)?).map_err(crate::Error::decode)?;

        text.parse().map_err(crate::Error::decode)
    }
}
