use crate::io::{BufMut, BufStream};
use crate::mysql::net::Socket;
use crate::mysql::protocol::capabilities::Capabilities;
use crate::mysql::protocol::err::ErrPacket;
use crate::mysql::protocol::packet::{PacketHeader, MAX_PAYLOAD_LEN};
use crate::runtime::connect_tcp;

/// The session state machine: owns the buffered socket, the negotiated
/// capability set, and the packet sequence id.
///
/// One command is in flight at a time; [`MySqlStream::send`] resets the
/// sequence id to 0 at the start of every new command, per the protocol's
/// "sequence id restarts at the first packet of each command" rule.
pub struct MySqlStream {
    stream: BufStream<Socket>,
    pub(crate) capabilities: Capabilities,
    sequence_id: u8,
}

impl MySqlStream {
    pub(crate) async fn new(host: &str, port: u16) -> crate::Result<Self> {
        let socket = connect_tcp(host, port).await?;

        Ok(Self {
            stream: BufStream::new(Socket::Plain(socket)),
            capabilities: Capabilities::default(),
            sequence_id: 0,
        })
    }

    pub(crate) fn is_tls(&self) -> bool {
        self.stream.stream.is_tls()
    }

    #[cfg(feature = "tls")]
    pub(crate) fn into_parts(self) -> (Socket, Capabilities, u8) {
        (self.stream.stream, self.capabilities, self.sequence_id)
    }

    #[cfg(feature = "tls")]
    pub(crate) fn from_parts(socket: Socket, capabilities: Capabilities, sequence_id: u8) -> Self {
        Self {
            stream: BufStream::new(socket),
            capabilities,
            sequence_id,
        }
    }

    /// Sends a command or sub-packet. `reset_sequence` should be `true` for
    /// the first packet of a new command (`COM_*`), `false` for continuation
    /// packets (auth responses, long-data segments) that keep the sequence id
    /// running from the packet that provoked them.
    pub(crate) async fn send(&mut self, payload: impl Encode, reset_sequence: bool) -> crate::Result<()> {
        if reset_sequence {
            self.sequence_id = 0;
        }

        let mut buf = Vec::new();
        payload.encode(&mut buf);

        self.write_packet(&buf).await?;
        self.stream.flush().await
    }

    async fn write_packet(&mut self, payload: &[u8]) -> crate::Result<()> {
        let mut chunks = payload.chunks(MAX_PAYLOAD_LEN).peekable();

        if chunks.peek().is_none() {
            // an empty payload is still a valid (empty) packet
            self.write_one_packet(&[]).await?;
            return Ok(());
        }

        while let Some(chunk) = chunks.next() {
            self.write_one_packet(chunk).await?;

            // a chunk exactly MAX_PAYLOAD_LEN long must be followed by a
            // zero-length packet so the server knows the payload ended there
            if chunk.len() == MAX_PAYLOAD_LEN && chunks.peek().is_none() {
                self.write_one_packet(&[]).await?;
            }
        }

        Ok(())
    }

    async fn write_one_packet(&mut self, payload: &[u8]) -> crate::Result<()> {
        let header = PacketHeader {
            length: payload.len(),
            sequence_id: self.sequence_id,
        };

        let mut header_bytes = [0u8; PacketHeader::SIZE];
        header.encode(&mut header_bytes);

        self.stream.write(&header_bytes);
        self.stream.write(payload);

        self.sequence_id = self.sequence_id.wrapping_add(1);

        Ok(())
    }

    /// Receives one logical packet, reassembling split packets (payloads of
    /// exactly [`MAX_PAYLOAD_LEN`] followed by more packets with the same
    /// growing sequence id) into a single contiguous buffer.
    pub(crate) async fn receive(&mut self) -> crate::Result<Vec<u8>> {
        let mut payload = Vec::new();

        loop {
            if !self.stream.read_async(0, PacketHeader::SIZE).await? {
                return Err(crate::Error::ConnectionClosed);
            }

            let header = PacketHeader::decode(self.stream.get(0, PacketHeader::SIZE));
            self.stream.consume(PacketHeader::SIZE);

            if header.sequence_id != self.sequence_id {
                return Err(protocol_err!(
                    "packet sequence id out of order: expected {}, found {}",
                    self.sequence_id,
                    header.sequence_id
                )
                .into());
            }

            self.sequence_id = self.sequence_id.wrapping_add(1);

            let chunk = self.stream.take(header.length).await?;
            let is_full_chunk = chunk.len() == MAX_PAYLOAD_LEN;
            payload.extend(chunk);

            if !is_full_chunk {
                break;
            }
        }

        Ok(payload)
    }

    /// Maps the current packet (assumed to be an `ERR_Packet`) to a `Result::Err`.
    pub(crate) fn handle_err<T>(&self, packet: &[u8]) -> crate::Result<T> {
        Err(ErrPacket::read(packet, self.capabilities)?.into())
    }

    pub(crate) fn handle_unexpected<T>(&self, packet: &[u8]) -> crate::Result<T> {
        Err(protocol_err!(
            "unexpected packet from the server: header byte 0x{:x}",
            packet.first().copied().unwrap_or(0)
        )
        .into())
    }

    pub(crate) async fn flush(&mut self) -> crate::Result<()> {
        self.stream.flush().await
    }

    pub(crate) fn shutdown(self) -> crate::Result<()> {
        // the socket is dropped here, which closes the TCP connection; MySQL
        // has no dedicated "goodbye" packet beyond COM_QUIT, which callers
        // send explicitly before reaching this point.
        drop(self);
        Ok(())
    }
}

/// Implemented by anything that can serialize itself as a command payload:
/// `&[u8]` for raw bytes (auth responses, long-data chunks) and the `Com*`
/// command structs.
pub(crate) trait Encode {
    fn encode(&self, buf: &mut Vec<u8>);
}

impl Encode for &[u8] {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_bytes(self);
    }
}

impl Encode for Vec<u8> {
    fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_bytes(self);
    }
}
