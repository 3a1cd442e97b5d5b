use byteorder::LittleEndian;

use crate::io::Buf;
use crate::mysql::protocol::capabilities::Capabilities;

/// `OK_Packet`.
///
/// <https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_basic_ok_packet.html>
#[derive(Debug, Clone, Default)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status: u16,
    pub warnings: u16,
    pub info: Box<str>,
}

impl OkPacket {
    pub fn read(mut packet: &[u8], capabilities: Capabilities) -> crate::Result<Self> {
        let header = packet.get_u8()?;

        if header != 0x00 && header != 0xFE {
            return Err(protocol_err!("expected OK_Packet (0x00 or 0xfe), found 0x{:x}", header).into());
        }

        let affected_rows = packet.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0);
        let last_insert_id = packet.get_uint_lenenc::<LittleEndian>()?.unwrap_or(0);

        let (status, warnings) = if capabilities.contains(Capabilities::PROTOCOL_41) {
            (packet.get_u16::<LittleEndian>()?, packet.get_u16::<LittleEndian>()?)
        } else if capabilities.contains(Capabilities::TRANSACTIONS) {
            (packet.get_u16::<LittleEndian>()?, 0)
        } else {
            (0, 0)
        };

        let info = if !packet.is_empty() {
            packet.get_str_eof()?.to_string().into_boxed_str()
        } else {
            "".to_string().into_boxed_str()
        };

        Ok(Self {
            affected_rows,
            last_insert_id,
            status,
            warnings,
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reads_an_ok_packet() {
        let mut packet = vec![0x00, 0x02, 0x01]; // header, 2 affected rows, last_insert_id=1
        packet.extend_from_slice(&2u16.to_le_bytes()); // status
        packet.extend_from_slice(&0u16.to_le_bytes()); // warnings

        let ok = OkPacket::read(&packet, Capabilities::PROTOCOL_41).unwrap();

        assert_eq!(ok.affected_rows, 2);
        assert_eq!(ok.last_insert_id, 1);
        assert_eq!(ok.status, 2);
    }
}
