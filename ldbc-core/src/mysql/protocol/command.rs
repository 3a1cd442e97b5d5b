use byteorder::LittleEndian;

use crate::io::BufMut;
use crate::mysql::stream::Encode;

macro_rules! command_id {
    ($name:ident = $id:literal) => {
        #[derive(Debug, Clone, Copy)]
        pub(crate) struct $name;

        impl Encode for $name {
            fn encode(&self, buf: &mut Vec<u8>) {
                buf.put_u8($id);
            }
        }
    };
}

command_id!(ComQuit = 0x01);
command_id!(ComPing = 0x0e);
command_id!(ComResetConnection = 0x1f);

/// `COM_QUERY`: run `sql` as a plain text query with no bound parameters.
pub(crate) struct ComQuery<'a> {
    pub sql: &'a str,
}

impl Encode for ComQuery<'_> {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x03);
        buf.put_bytes(self.sql.as_bytes());
    }
}

/// `COM_INIT_DB`: change the default schema for the connection.
pub(crate) struct ComInitDb<'a> {
    pub schema: &'a str,
}

impl Encode for ComInitDb<'_> {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x02);
        buf.put_bytes(self.schema.as_bytes());
    }
}

/// `COM_STMT_PREPARE`.
pub(crate) struct ComStmtPrepare<'a> {
    pub sql: &'a str,
}

impl Encode for ComStmtPrepare<'_> {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x16);
        buf.put_bytes(self.sql.as_bytes());
    }
}

/// `COM_STMT_CLOSE`: no response is sent by the server for this command.
pub(crate) struct ComStmtClose {
    pub statement_id: u32,
}

impl Encode for ComStmtClose {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x19);
        buf.put_u32::<LittleEndian>(self.statement_id);
    }
}

/// `COM_STMT_RESET`: clears bound long-data and server-side cursor state
/// without deallocating the statement.
pub(crate) struct ComStmtReset {
    pub statement_id: u32,
}

impl Encode for ComStmtReset {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x1a);
        buf.put_u32::<LittleEndian>(self.statement_id);
    }
}

/// `COM_STMT_SEND_LONG_DATA`: stream a parameter's value across possibly many
/// packets ahead of `COM_STMT_EXECUTE`, for BLOB/TEXT values too large to
/// bind inline.
pub(crate) struct ComStmtSendLongData<'a> {
    pub statement_id: u32,
    pub param_index: u16,
    pub data: &'a [u8],
}

impl Encode for ComStmtSendLongData<'_> {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x18);
        buf.put_u32::<LittleEndian>(self.statement_id);
        buf.put_u16::<LittleEndian>(self.param_index);
        buf.put_bytes(self.data);
    }
}

/// One bound parameter for `COM_STMT_EXECUTE`'s binary payload: the MySQL
/// type id, whether it's unsigned, and its already-encoded value bytes (or
/// `None` for a NULL carried only in the NULL bitmap).
pub(crate) struct BinaryParam {
    pub type_id: u8,
    pub unsigned: bool,
    pub value: Option<Vec<u8>>,
}

/// `COM_STMT_EXECUTE`.
pub(crate) struct ComStmtExecute<'a> {
    pub statement_id: u32,
    pub params: &'a [BinaryParam],
}

const CURSOR_TYPE_NO_CURSOR: u8 = 0x00;

impl Encode for ComStmtExecute<'_> {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x17);
        buf.put_u32::<LittleEndian>(self.statement_id);
        buf.put_u8(CURSOR_TYPE_NO_CURSOR);
        buf.put_u32::<LittleEndian>(1); // iteration-count, always 1

        if self.params.is_empty() {
            return;
        }

        // NULL bitmap: one bit per parameter, packed LSB-first
        let bitmap_len = (self.params.len() + 7) / 8;
        let mut bitmap = vec![0u8; bitmap_len];

        for (i, param) in self.params.iter().enumerate() {
            if param.value.is_none() {
                bitmap[i / 8] |= 1 << (i % 8);
            }
        }

        buf.put_bytes(&bitmap);
        buf.put_u8(1); // new-params-bound-flag

        for param in self.params {
            buf.put_u8(param.type_id);
            buf.put_u8(if param.unsigned { 0x80 } else { 0x00 });
        }

        for param in self.params {
            if let Some(value) = &param.value {
                buf.put_bytes(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_encodes_com_query() {
        let mut buf = Vec::new();
        ComQuery { sql: "SELECT 1" }.encode(&mut buf);

        assert_eq!(buf[0], 0x03);
        assert_eq!(&buf[1..], b"SELECT 1");
    }

    #[test]
    fn it_sets_null_bitmap_bits() {
        let params = vec![
            BinaryParam { type_id: 0x08, unsigned: false, value: Some(vec![1, 0, 0, 0, 0, 0, 0, 0]) },
            BinaryParam { type_id: 0x06, unsigned: false, value: None },
        ];

        let mut buf = Vec::new();
        ComStmtExecute { statement_id: 1, params: &params }.encode(&mut buf);

        // header(1) + statement_id(4) + cursor(1) + iterations(4) = 10, then the bitmap byte
        assert_eq!(buf[10], 0b0000_0010);
    }
}
