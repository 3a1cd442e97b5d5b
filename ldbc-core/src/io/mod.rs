//! Low level helpers for encoding and decoding the primitive types used by
//! wire protocols: buffered I/O over an async socket, and `Buf`/`BufMut`
//! extension traits for the integer/string encodings the MySQL protocol
//! layers on top of raw bytes.

mod buf;
mod buf_mut;
mod buf_stream;

pub use buf::Buf;
pub use buf_mut::BufMut;
pub use buf_stream::BufStream;
