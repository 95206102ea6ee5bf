//! The append-only output sink.
//!
//! A [`ByteSink`] is a growable buffer with exactly the write operations the
//! wire format needs: fixed-width little-endian integers, base-128 varints,
//! length-prefixed strings and raw byte runs. There is deliberately no way to
//! read back, seek or truncate. One sink belongs to one encode pass; if that
//! pass fails, drop the sink.

use bytes::{BufMut, Bytes, BytesMut};

/// Initial capacity for a fresh sink. A typical single-operation transaction
/// is well under this.
const DEFAULT_CAPACITY: usize = 256;

/// Growable, append-only byte buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteSink {
    buf: BytesMut,
}

impl ByteSink {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buf.put_i8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn write_i16(&mut self, value: i16) {
        self.buf.put_i16_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32_le(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64_le(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    /// Base-128 varint: seven payload bits per byte, least significant group
    /// first, high bit set on every byte except the last.
    pub fn write_varint32(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.buf.put_u8((value as u8 & 0x7F) | 0x80);
            value >>= 7;
        }
        self.buf.put_u8(value as u8);
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Finalizes the sink into an immutable, cheaply clonable buffer.
    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.buf)
    }
}

/// Number of bytes `value` occupies as a varint32.
pub fn varint_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}
