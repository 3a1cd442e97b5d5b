use byteorder::LittleEndian;

use crate::io::Buf;
use crate::mysql::protocol::r#type::TypeId;

bitflags::bitflags! {
    pub struct ColumnFlags: u16 {
        const NOT_NULL = 1;
        const PRIMARY_KEY = 1 << 1;
        const UNIQUE_KEY = 1 << 2;
        const MULTIPLE_KEY = 1 << 3;
        const BLOB = 1 << 4;
        const UNSIGNED = 1 << 5;
        const ZEROFILL = 1 << 6;
        const BINARY = 1 << 7;
        const ENUM = 1 << 8;
        const AUTO_INCREMENT = 1 << 9;
        const TIMESTAMP = 1 << 10;
        const SET = 1 << 11;
    }
}

/// `ColumnDefinition41`.
///
/// <https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_query_response_text_resultset_column_definition.html>
#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub name: Box<str>,
    pub table: Box<str>,
    pub character_set: u16,
    pub column_length: u32,
    pub type_id: TypeId,
    pub flags: ColumnFlags,
    pub decimals: u8,
}

impl ColumnDefinition {
    pub fn read(mut packet: &[u8]) -> crate::Result<Self> {
        let _catalog = packet.get_str_lenenc::<LittleEndian>()?;
        let _schema = packet.get_str_lenenc::<LittleEndian>()?;
        let table = packet.get_str_lenenc::<LittleEndian>()?.unwrap_or("").to_string().into_boxed_str();
        let _org_table = packet.get_str_lenenc::<LittleEndian>()?;
        let name = packet.get_str_lenenc::<LittleEndian>()?.unwrap_or("").to_string().into_boxed_str();
        let _org_name = packet.get_str_lenenc::<LittleEndian>()?;

        let _fixed_length_fields_length = packet.get_uint_lenenc::<LittleEndian>()?;

        let character_set = packet.get_u16::<LittleEndian>()?;
        let column_length = packet.get_u32::<LittleEndian>()?;
        let type_id = TypeId(packet.get_u8()?);
        let flags = ColumnFlags::from_bits_truncate(packet.get_u16::<LittleEndian>()?);
        let decimals = packet.get_u8()?;

        Ok(Self {
            name,
            table,
            character_set,
            column_length,
            type_id,
            flags,
            decimals,
        })
    }

    pub fn is_unsigned(&self) -> bool {
        self.flags.contains(ColumnFlags::UNSIGNED)
    }

    pub fn is_binary(&self) -> bool {
        self.character_set == 63 // binary collation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::BufMut;

    #[test]
    fn it_reads_a_column_definition() {
        let mut buf = Vec::new();
        buf.put_bytes_lenenc::<LittleEndian>(b"def"); // catalog
        buf.put_bytes_lenenc::<LittleEndian>(b"ldbc"); // schema
        buf.put_bytes_lenenc::<LittleEndian>(b"users"); // table
        buf.put_bytes_lenenc::<LittleEndian>(b"users"); // org_table
        buf.put_bytes_lenenc::<LittleEndian>(b"id"); // name
        buf.put_bytes_lenenc::<LittleEndian>(b"id"); // org_name
        buf.put_uint_lenenc::<LittleEndian>(0x0c);
        buf.put_u16::<LittleEndian>(63);
        buf.put_u32::<LittleEndian>(11);
        buf.put_u8(TypeId::LONG.0);
        buf.put_u16::<LittleEndian>(ColumnFlags::NOT_NULL.bits() | ColumnFlags::UNSIGNED.bits());
        buf.put_u8(0);

        let col = ColumnDefinition::read(&buf).unwrap();

        assert_eq!(&*col.name, "id");
        assert_eq!(&*col.table, "users");
        assert_eq!(col.type_id, TypeId::LONG);
        assert!(col.is_unsigned());
    }
}
