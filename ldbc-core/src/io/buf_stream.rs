use futures_util::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A buffered wrapper around an async socket that understands offsets into its
/// read buffer instead of forcing callers to copy out each packet as it's read.
///
/// Packet framing (in `mysql::stream`) needs to peek at the 4-byte packet
/// header before it knows how many more bytes to wait for, then needs the
/// payload contiguous to decode out of with [`crate::io::Buf`]. `BufStream`
/// keeps a single growable buffer and a read cursor (`rbuf_offset`) so it can
/// satisfy both without reallocating on every partial read.
pub struct BufStream<S> {
    pub(crate) stream: S,

    wbuf: Vec<u8>,

    rbuf: Vec<u8>,
    rbuf_offset: usize,
}

impl<S> BufStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            wbuf: Vec::with_capacity(1024),
            rbuf: Vec::with_capacity(4096),
            rbuf_offset: 0,
        }
    }

    /// The portion of the read buffer that has been filled but not yet consumed.
    #[inline]
    pub fn buffer(&self) -> &[u8] {
        &self.rbuf[self.rbuf_offset..]
    }

    /// Appends `buf` to the outgoing write buffer without touching the socket.
    pub fn write(&mut self, buf: &[u8]) {
        self.wbuf.extend_from_slice(buf);
    }

    /// Flushes the outgoing write buffer to the socket.
    pub async fn flush(&mut self) -> crate::Result<()> {
        if !self.wbuf.is_empty() {
            self.stream.write_all(&self.wbuf).await?;
            self.wbuf.clear();
        }

        self.stream.flush().await?;

        Ok(())
    }

    /// Ensures at least `offset + len` bytes are available in [`Self::buffer`],
    /// reading more from the socket as needed. Returns `Ok(false)` on a clean
    /// EOF with no bytes read (used by callers to detect a closed connection
    /// between packets); any other short read is an error.
    pub async fn read_async(&mut self, offset: usize, len: usize) -> crate::Result<bool> {
        let needed = offset + len;

        self.reclaim_if_empty();

        while self.buffer().len() < needed {
            let read_from = self.rbuf_offset + self.buffer().len();

            if self.rbuf.len() < self.rbuf_offset + needed {
                self.rbuf.resize(self.rbuf_offset + needed, 0);
            }

            let n = self.stream.read(&mut self.rbuf[read_from..]).await?;

            if n == 0 {
                if read_from == self.rbuf_offset {
                    return Ok(false);
                }

                return Err(protocol_err!(
                    "connection closed mid-packet: expected {} more bytes, found {}",
                    needed,
                    self.buffer().len()
                )
                .into());
            }

            self.rbuf.truncate(read_from + n);
        }

        Ok(true)
    }

    /// Returns `len` bytes starting at `offset` within the currently buffered data.
    /// Callers must have already called [`Self::read_async`] for this range.
    #[inline]
    pub fn get(&self, offset: usize, len: usize) -> &[u8] {
        &self.buffer()[offset..offset + len]
    }

    /// Consumes `n` bytes from the front of the read buffer.
    pub fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.buffer().len());

        self.rbuf_offset += n;
        self.reclaim_if_empty();
    }

    /// Reads and consumes exactly `len` bytes, copying them out as an owned
    /// buffer so the caller can hold on to them across further reads.
    pub async fn take(&mut self, len: usize) -> crate::Result<Vec<u8>> {
        self.read_async(0, len).await?;

        let bytes = self.get(0, len).to_vec();
        self.consume(len);

        Ok(bytes)
    }

    // once everything has been consumed, reset the cursor so we stop growing
    // the buffer on every packet.
    fn reclaim_if_empty(&mut self) {
        if self.rbuf_offset == self.rbuf.len() {
            self.rbuf.clear();
            self.rbuf_offset = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::io::Cursor;

    #[async_std::test]
    async fn it_reads_in_two_passes() {
        let mut stream = BufStream::new(Cursor::new(b"hello world".to_vec()));

        assert!(stream.read_async(0, 5).await.unwrap());
        assert_eq!(stream.get(0, 5), b"hello");

        stream.consume(5);

        assert!(stream.read_async(0, 6).await.unwrap());
        assert_eq!(stream.get(0, 6), b" world");
    }

    #[async_std::test]
    async fn it_reports_clean_eof() {
        let mut stream = BufStream::new(Cursor::new(Vec::<u8>::new()));

        assert!(!stream.read_async(0, 4).await.unwrap());
    }

    #[async_std::test]
    async fn it_errors_on_mid_packet_eof() {
        let mut stream = BufStream::new(Cursor::new(b"ab".to_vec()));

        assert!(stream.read_async(0, 4).await.is_err());
    }
}
