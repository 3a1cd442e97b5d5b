use byteorder::LittleEndian;

use crate::io::{Buf, BufMut};
use crate::mysql::protocol::auth::AuthPlugin;
use crate::mysql::protocol::capabilities::Capabilities;

/// `HandshakeV10`, sent by the server as the first packet of a new connection.
///
/// <https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_connection_phase_packets_protocol_handshake_v10.html>
pub struct Handshake {
    pub protocol_version: u8,
    pub server_version: Box<str>,
    pub connection_id: u32,
    pub server_capabilities: Capabilities,
    pub server_default_collation: u8,
    pub status: u16,
    pub auth_plugin: AuthPlugin,
    pub auth_plugin_data: Vec<u8>,
}

impl Handshake {
    pub fn read(mut packet: &[u8]) -> crate::Result<Self> {
        let protocol_version = packet.get_u8()?;

        if protocol_version != 10 {
            return Err(protocol_err!(
                "server sent unsupported handshake protocol version {}; only protocol 10 is supported",
                protocol_version
            )
            .into());
        }

        let server_version = packet.get_str_nul()?.to_string().into_boxed_str();
        let connection_id = packet.get_u32::<LittleEndian>()?;

        let mut auth_plugin_data = packet.get_bytes(8)?.to_vec();
        let _filler = packet.get_u8()?;

        let capabilities_lo = packet.get_u16::<LittleEndian>()? as u32;

        let server_default_collation = packet.get_u8()?;
        let status = packet.get_u16::<LittleEndian>()?;

        let capabilities_hi = packet.get_u16::<LittleEndian>()? as u32;
        let server_capabilities =
            Capabilities::from_bits_truncate(((capabilities_hi << 16) | capabilities_lo) as u64);

        let auth_plugin_data_len = packet.get_u8()?;
        let _reserved = packet.get_bytes(10)?;

        if server_capabilities.contains(Capabilities::SECURE_CONNECTION) {
            let len = (auth_plugin_data_len as usize).saturating_sub(8).max(13);
            let rest = packet.get_bytes(len)?;

            auth_plugin_data.extend_from_slice(rest);
            // strip the trailing NUL from the combined nonce
            if auth_plugin_data.last() == Some(&0) {
                auth_plugin_data.pop();
            }
        }

        let auth_plugin = if server_capabilities.contains(Capabilities::PLUGIN_AUTH) {
            AuthPlugin::from_name(packet.get_str_nul().unwrap_or("mysql_native_password"))?
        } else {
            AuthPlugin::MySqlNativePassword
        };

        Ok(Self {
            protocol_version,
            server_version,
            connection_id,
            server_capabilities,
            server_default_collation,
            status,
            auth_plugin,
            auth_plugin_data,
        })
    }
}

/// `HandshakeResponse41`, sent by the client in reply to [`Handshake`].
pub struct HandshakeResponse<'a> {
    pub client_collation: u8,
    pub max_packet_size: u32,
    pub username: &'a str,
    pub database: Option<&'a str>,
    pub auth_plugin: AuthPlugin,
    pub auth_response: &'a [u8],
}

impl HandshakeResponse<'_> {
    pub fn encode(&self, capabilities: Capabilities, buf: &mut Vec<u8>) {
        buf.put_u32::<LittleEndian>(capabilities.bits() as u32);
        buf.put_u32::<LittleEndian>(self.max_packet_size);
        buf.put_u8(self.client_collation);
        buf.put_bytes(&[0u8; 23]);

        buf.put_str_nul(self.username);

        if capabilities.contains(Capabilities::PLUGIN_AUTH_LENENC_CLIENT_DATA) {
            buf.put_bytes_lenenc::<LittleEndian>(self.auth_response);
        } else {
            buf.put_u8(self.auth_response.len() as u8);
            buf.put_bytes(self.auth_response);
        }

        if capabilities.contains(Capabilities::CONNECT_WITH_DB) {
            buf.put_str_nul(self.database.unwrap_or(""));
        }

        if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            buf.put_str_nul(self.auth_plugin.name());
        }

        if capabilities.contains(Capabilities::CONNECT_ATTRS) {
            // no connect attributes are sent; an empty length-encoded map
            buf.put_uint_lenenc::<LittleEndian>(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // built field-by-field in protocol order rather than pasted from a capture,
    // so the test documents the wire layout `Handshake::read` expects.
    fn build_handshake_v10(caps: Capabilities, plugin: &str, nonce_part2: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();

        buf.put_u8(10); // protocol_version
        buf.put_str_nul("8.0.18"); // server_version
        buf.put_u32::<LittleEndian>(10); // connection_id
        buf.put_bytes(b"AAAAAAAA"); // auth_plugin_data part 1 (8 bytes)
        buf.put_u8(0); // filler

        buf.put_u16::<LittleEndian>((caps.bits() & 0xFFFF) as u16); // capabilities lo
        buf.put_u8(0xff); // server_default_collation
        buf.put_u16::<LittleEndian>(2); // status flags
        buf.put_u16::<LittleEndian>((caps.bits() >> 16) as u16); // capabilities hi

        buf.put_u8(21); // auth_plugin_data_len (13 + 8)
        buf.put_bytes(&[0u8; 10]); // reserved

        buf.put_bytes(nonce_part2); // 12 bytes + trailing NUL
        buf.put_u8(0);

        buf.put_str_nul(plugin);

        buf
    }

    #[test]
    fn it_parses_a_handshake_v10() {
        let caps = Capabilities::default() | Capabilities::PLUGIN_AUTH | Capabilities::SECURE_CONNECTION;
        let packet = build_handshake_v10(caps, "caching_sha2_password", b"BBBBBBBBBBBB");

        let handshake = Handshake::read(&packet).unwrap();

        assert_eq!(handshake.protocol_version, 10);
        assert_eq!(&*handshake.server_version, "8.0.18");
        assert_eq!(handshake.connection_id, 10);
        assert_eq!(handshake.auth_plugin, AuthPlugin::CachingSha2Password);
        assert_eq!(handshake.auth_plugin_data, b"AAAAAAAABBBBBBBBBBBB");
        assert!(handshake.server_capabilities.contains(Capabilities::PROTOCOL_41));
        assert!(handshake.server_capabilities.contains(Capabilities::PLUGIN_AUTH));
    }

    #[test]
    fn it_rejects_unsupported_protocol_version() {
        let mut packet = Vec::new();
        packet.put_u8(9);

        assert!(Handshake::read(&packet).is_err());
    }
}
