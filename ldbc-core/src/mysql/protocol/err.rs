use byteorder::LittleEndian;

use crate::error::DatabaseError;
use crate::io::Buf;
use crate::mysql::protocol::capabilities::Capabilities;

/// `ERR_Packet`.
///
/// <https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_basic_err_packet.html>
#[derive(Debug, Clone)]
pub struct ErrPacket {
    pub code: u16,
    pub sql_state: Option<[u8; 5]>,
    pub message: Box<str>,
}

impl ErrPacket {
    pub fn read(mut packet: &[u8], capabilities: Capabilities) -> crate::Result<Self> {
        let header = packet.get_u8()?;

        if header != 0xFF {
            return Err(protocol_err!("expected ERR_Packet (0xff), found 0x{:x}", header).into());
        }

        let code = packet.get_u16::<LittleEndian>()?;

        let sql_state = if capabilities.contains(Capabilities::PROTOCOL_41) {
            let marker = packet.get_u8()?;

            if marker != b'#' {
                return Err(protocol_err!("expected SQL state marker '#', found {:?}", marker as char).into());
            }

            let state = packet.get_bytes(5)?;
            let mut out = [0u8; 5];
            out.copy_from_slice(state);

            Some(out)
        } else {
            None
        };

        let message = packet.get_str_eof()?.to_string().into_boxed_str();

        Ok(Self {
            code,
            sql_state,
            message,
        })
    }
}

impl DatabaseError for ErrPacket {
    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> Option<&str> {
        self.sql_state
            .as_ref()
            .map(|s| std::str::from_utf8(s).unwrap_or("HY000"))
    }

    fn number(&self) -> Option<u16> {
        Some(self.code)
    }
}

impl_fmt_error!(ErrPacket);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reads_an_err_packet() {
        let mut packet = vec![0xFF];
        packet.extend_from_slice(&1045u16.to_le_bytes());
        packet.push(b'#');
        packet.extend_from_slice(b"28000");
        packet.extend_from_slice(b"Access denied for user 'root'@'localhost'");

        let err = ErrPacket::read(&packet, Capabilities::PROTOCOL_41).unwrap();

        assert_eq!(err.code, 1045);
        assert_eq!(err.code(), Some("28000"));
        assert_eq!(err.message(), "Access denied for user 'root'@'localhost'");
    }
}
