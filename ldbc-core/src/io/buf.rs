use byteorder::ByteOrder;
use memchr::memchr;

/// Extension trait for reading the primitive wire types out of a `&[u8]`.
///
/// Every method advances `self` past the bytes it consumed. Callers drive
/// decoding by repeatedly calling these methods against the remaining slice;
/// `Self` *is* the cursor, there is no separate position to track.
///
/// All getters fail with [`crate::Error::Protocol`] (via `protocol_err!`) when
/// there are not enough bytes left, rather than panicking, since a short read
/// here means the server sent a malformed or truncated packet.
pub trait Buf<'a> {
    fn advance(&mut self, cnt: usize);

    fn get_u8(&mut self) -> crate::Result<u8>;

    fn get_i8(&mut self) -> crate::Result<i8>;

    fn get_u16<T: ByteOrder>(&mut self) -> crate::Result<u16>;

    fn get_i16<T: ByteOrder>(&mut self) -> crate::Result<i16>;

    fn get_u24<T: ByteOrder>(&mut self) -> crate::Result<u32>;

    fn get_u32<T: ByteOrder>(&mut self) -> crate::Result<u32>;

    fn get_i32<T: ByteOrder>(&mut self) -> crate::Result<i32>;

    fn get_u64<T: ByteOrder>(&mut self) -> crate::Result<u64>;

    fn get_i64<T: ByteOrder>(&mut self) -> crate::Result<i64>;

    fn get_f32<T: ByteOrder>(&mut self) -> crate::Result<f32>;

    fn get_f64<T: ByteOrder>(&mut self) -> crate::Result<f64>;

    /// `int<lenenc>`: 1, 3, 4, or 9 bytes depending on the leading byte.
    fn get_uint_lenenc<T: ByteOrder>(&mut self) -> crate::Result<Option<u64>>;

    /// `string<lenenc>`: a `int<lenenc>` length prefix followed by that many bytes.
    fn get_bytes_lenenc<T: ByteOrder>(&mut self) -> crate::Result<Option<&'a [u8]>>;

    fn get_str_lenenc<T: ByteOrder>(&mut self) -> crate::Result<Option<&'a str>>;

    /// `string<NUL>`: bytes up to (and consuming) the first `0x00`.
    fn get_bytes_nul(&mut self) -> crate::Result<&'a [u8]>;

    fn get_str_nul(&mut self) -> crate::Result<&'a str>;

    /// `string<n>`: exactly `n` bytes.
    fn get_bytes(&mut self, n: usize) -> crate::Result<&'a [u8]>;

    fn get_str(&mut self, n: usize) -> crate::Result<&'a str>;

    /// The remainder of the buffer, consuming it (`string<EOF>`).
    fn get_bytes_eof(&mut self) -> &'a [u8];

    fn get_str_eof(&mut self) -> crate::Result<&'a str>;
}

impl<'a> Buf<'a> for &'a [u8] {
    #[inline]
    fn advance(&mut self, cnt: usize) {
        *self = &self[cnt..];
    }

    fn get_u8(&mut self) -> crate::Result<u8> {
        if self.is_empty() {
            return Err(protocol_err!("expected 1 more byte, found none").into());
        }

        let val = self[0];
        self.advance(1);

        Ok(val)
    }

    fn get_i8(&mut self) -> crate::Result<i8> {
        self.get_u8().map(|v| v as i8)
    }

    fn get_u16<T: ByteOrder>(&mut self) -> crate::Result<u16> {
        if self.len() < 2 {
            return Err(protocol_err!("expected 2 more bytes, found {}", self.len()).into());
        }

        let val = T::read_u16(self);
        self.advance(2);

        Ok(val)
    }

    fn get_i16<T: ByteOrder>(&mut self) -> crate::Result<i16> {
        self.get_u16::<T>().map(|v| v as i16)
    }

    fn get_u24<T: ByteOrder>(&mut self) -> crate::Result<u32> {
        if self.len() < 3 {
            return Err(protocol_err!("expected 3 more bytes, found {}", self.len()).into());
        }

        let val = T::read_u24(self);
        self.advance(3);

        Ok(val)
    }

    fn get_u32<T: ByteOrder>(&mut self) -> crate::Result<u32> {
        if self.len() < 4 {
            return Err(protocol_err!("expected 4 more bytes, found {}", self.len()).into());
        }

        let val = T::read_u32(self);
        self.advance(4);

        Ok(val)
    }

    fn get_i32<T: ByteOrder>(&mut self) -> crate::Result<i32> {
        self.get_u32::<T>().map(|v| v as i32)
    }

    fn get_u64<T: ByteOrder>(&mut self) -> crate::Result<u64> {
        if self.len() < 8 {
            return Err(protocol_err!("expected 8 more bytes, found {}", self.len()).into());
        }

        let val = T::read_u64(self);
        self.advance(8);

        Ok(val)
    }

    fn get_i64<T: ByteOrder>(&mut self) -> crate::Result<i64> {
        self.get_u64::<T>().map(|v| v as i64)
    }

    fn get_f32<T: ByteOrder>(&mut self) -> crate::Result<f32> {
        if self.len() < 4 {
            return Err(protocol_err!("expected 4 more bytes, found {}", self.len()).into());
        }

        let val = T::read_f32(self);
        self.advance(4);

        Ok(val)
    }

    fn get_f64<T: ByteOrder>(&mut self) -> crate::Result<f64> {
        if self.len() < 8 {
            return Err(protocol_err!("expected 8 more bytes, found {}", self.len()).into());
        }

        let val = T::read_f64(self);
        self.advance(8);

        Ok(val)
    }

    fn get_uint_lenenc<T: ByteOrder>(&mut self) -> crate::Result<Option<u64>> {
        let n = self.get_u8()?;

        Ok(match n {
            0xFB => None,
            0xFC => Some(self.get_u16::<T>()? as u64),
            0xFD => Some(self.get_u24::<T>()? as u64),
            0xFE => Some(self.get_u64::<T>()?),
            _ => Some(n as u64),
        })
    }

    fn get_bytes_lenenc<T: ByteOrder>(&mut self) -> crate::Result<Option<&'a [u8]>> {
        match self.get_uint_lenenc::<T>()? {
            Some(len) => self.get_bytes(len as usize).map(Some),
            None => Ok(None),
        }
    }

    fn get_str_lenenc<T: ByteOrder>(&mut self) -> crate::Result<Option<&'a str>> {
        match self.get_bytes_lenenc::<T>()? {
            Some(bytes) => std::str::from_utf8(bytes)
                .map(Some)
                .map_err(|err| protocol_err!("column value is not valid UTF-8: {}", err).into()),
            None => Ok(None),
        }
    }

    fn get_bytes_nul(&mut self) -> crate::Result<&'a [u8]> {
        let nul = memchr(b'\0', self)
            .ok_or_else(|| protocol_err!("expected a NUL-terminated string, found none"))?;

        let bytes = &self[..nul];
        self.advance(nul + 1);

        Ok(bytes)
    }

    fn get_str_nul(&mut self) -> crate::Result<&'a str> {
        let bytes = self.get_bytes_nul()?;

        std::str::from_utf8(bytes)
            .map_err(|err| protocol_err!("expected a NUL-terminated string to be valid UTF-8: {}", err).into())
    }

    fn get_bytes(&mut self, n: usize) -> crate::Result<&'a [u8]> {
        if self.len() < n {
            return Err(protocol_err!("expected {} more bytes, found {}", n, self.len()).into());
        }

        let bytes = &self[..n];
        self.advance(n);

        Ok(bytes)
    }

    fn get_str(&mut self, n: usize) -> crate::Result<&'a str> {
        let bytes = self.get_bytes(n)?;

        std::str::from_utf8(bytes)
            .map_err(|err| protocol_err!("expected a fixed-length string to be valid UTF-8: {}", err).into())
    }

    fn get_bytes_eof(&mut self) -> &'a [u8] {
        let bytes = &self[..];
        self.advance(self.len());

        bytes
    }

    fn get_str_eof(&mut self) -> crate::Result<&'a str> {
        let bytes = self.get_bytes_eof();

        std::str::from_utf8(bytes)
            .map_err(|err| protocol_err!("expected the rest of the packet to be valid UTF-8: {}", err).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::LittleEndian;

    #[test]
    fn it_reads_lenenc_uint_single_byte() {
        let mut buf: &[u8] = &[0x05];
        assert_eq!(buf.get_uint_lenenc::<LittleEndian>().unwrap(), Some(5));
    }

    #[test]
    fn it_reads_lenenc_uint_null() {
        let mut buf: &[u8] = &[0xFB];
        assert_eq!(buf.get_uint_lenenc::<LittleEndian>().unwrap(), None);
    }

    #[test]
    fn it_reads_lenenc_uint_u16() {
        let mut buf: &[u8] = &[0xFC, 0x2C, 0x01];
        assert_eq!(buf.get_uint_lenenc::<LittleEndian>().unwrap(), Some(0x012C));
    }

    #[test]
    fn it_reads_lenenc_uint_u64_boundary() {
        let mut buf: &[u8] = &[0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        assert_eq!(buf.get_uint_lenenc::<LittleEndian>().unwrap(), Some(u64::max_value()));
    }

    #[test]
    fn it_reads_str_nul() {
        let mut buf: &[u8] = b"root\0rest";
        assert_eq!(buf.get_str_nul().unwrap(), "root");
        assert_eq!(buf, b"rest");
    }

    #[test]
    fn it_fails_on_short_fixed_int() {
        let mut buf: &[u8] = &[0x01];
        assert!(buf.get_u32::<LittleEndian>().is_err());
    }
}
