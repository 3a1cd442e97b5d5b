use byteorder::LittleEndian;

use crate::decode::{require_value, Decode};
use crate::encode::Encode;
use crate::io::BufMut;
use crate::mysql::database::MySql;
use crate::mysql::protocol::r#type::TypeId;
use crate::mysql::types::MySqlTypeInfo;
use crate::types::Type;

impl Type<MySql> for str {
    fn type_info() -> MySqlTypeInfo {
        MySqlTypeInfo::new(TypeId::VAR_STRING)
    }
}

impl Encode<MySql> for str {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_bytes_lenenc::<LittleEndian>(self.as_bytes());
    }
}

impl Type<MySql> for String {
    fn type_info() -> MySqlTypeInfo {
        <str as Type<MySql>>::type_info()
    }
}

impl Encode<MySql> for String {
    fn encode(&self, buf: &mut Vec<u8>) {
        <str as Encode<MySql>>::encode(self, buf)
    }
}

impl<'r> Decode<'r, MySql> for String {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        let bytes = require_value(raw)?;

        std::str::from_utf8(bytes).map(ToOwned::to_owned).map_err(crate::Error::decode)
    }
}

impl<'r> Decode<'r, MySql> for &'r str {
    fn decode(raw: Option<&'r [u8]>, _ty: &MySqlTypeInfo) -> crate::Result<Self> {
        std::str::from_utf8(require_value(raw)?).map_err(crate::Error::decode)
    }
}
