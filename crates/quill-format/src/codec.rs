//! Primitive codec: fixed-width integers, varuints, strings and byte blocks.
//!
//! All fixed-width integers are little-endian. Varuints are unsigned LEB128
//! capped at [`MAX_VARINT_LEN`] bytes. Strings and byte blocks carry a varuint
//! byte-count prefix.
//!
//! The reader never allocates based on a declared length before checking that
//! the input actually holds that many bytes.

use crate::constants::MAX_VARINT_LEN;
use crate::error::DecodeError;

/// Append-only byte buffer.
#[derive(Clone, Debug, Default)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    pub fn write_u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.bytes.extend_from_slice(&v.to_le_bytes());
    }

    /// Append an unsigned LEB128 integer.
    pub fn write_varuint(&mut self, mut v: u64) {
        loop {
            let byte = (v & 0x7f) as u8;
            v >>= 7;
            if v == 0 {
                self.bytes.push(byte);
                return;
            }
            self.bytes.push(byte | 0x80);
        }
    }

    /// Append a `usize` length or count as a varuint.
    pub fn write_len(&mut self, len: usize) {
        self.write_varuint(len as u64);
    }

    /// Append a length-prefixed UTF-8 string.
    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Append a length-prefixed byte block.
    pub fn write_bytes(&mut self, b: &[u8]) {
        self.write_len(b.len());
        self.bytes.extend_from_slice(b);
    }

    /// Append raw bytes with no prefix.
    pub fn write_raw(&mut self, b: &[u8]) {
        self.bytes.extend_from_slice(b);
    }
}

/// Bounds-checked cursor over an input buffer.
///
/// Offsets reported in errors are absolute: a reader produced by
/// [`sub_reader`](Self::sub_reader) remembers where its window starts.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: 0,
            base: 0,
        }
    }

    /// Absolute offset of the cursor.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    /// Bytes left in this reader's window.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(DecodeError::TruncatedInput {
                offset: self.offset() + remaining,
                needed: (len - remaining) as u64,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut arr = [0u8; N];
        arr.copy_from_slice(self.take(N)?);
        Ok(arr)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    /// Read an unsigned LEB128 integer.
    ///
    /// Fails with `MalformedVarint` if the encoding does not terminate within
    /// [`MAX_VARINT_LEN`] bytes or overflows 64 bits, and with `TruncatedInput`
    /// if the input ends mid-encoding.
    pub fn read_varuint(&mut self) -> Result<u64, DecodeError> {
        let start = self.offset();
        let mut value: u64 = 0;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.read_u8()?;
            let low = u64::from(byte & 0x7f);
            // The tenth byte holds bit 63 only.
            if i == MAX_VARINT_LEN - 1 && (low > 1 || byte & 0x80 != 0) {
                return Err(DecodeError::MalformedVarint { offset: start });
            }
            value |= low << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(DecodeError::MalformedVarint { offset: start })
    }

    /// Read a varuint that must fit in `u32`.
    pub fn read_varuint_u32(&mut self) -> Result<u32, DecodeError> {
        let start = self.offset();
        let v = self.read_varuint()?;
        u32::try_from(v).map_err(|_| DecodeError::MalformedVarint { offset: start })
    }

    /// Read a length prefix and check it against the remaining input.
    pub fn read_len(&mut self) -> Result<usize, DecodeError> {
        let v = self.read_varuint()?;
        let remaining = self.remaining();
        if v > remaining as u64 {
            return Err(DecodeError::TruncatedInput {
                offset: self.offset() + remaining,
                needed: v - remaining as u64,
            });
        }
        Ok(v as usize)
    }

    /// Read an element count.
    ///
    /// Counts are not checked against the remaining input (elements may be
    /// wider than one byte); callers should clamp any preallocation with
    /// [`capacity_hint`](Self::capacity_hint).
    pub fn read_count(&mut self) -> Result<usize, DecodeError> {
        let start = self.offset();
        let v = self.read_varuint()?;
        usize::try_from(v).map_err(|_| DecodeError::MalformedVarint { offset: start })
    }

    /// Preallocation size for `count` elements of at least one byte each.
    pub fn capacity_hint(&self, count: usize) -> usize {
        count.min(self.remaining())
    }

    /// Read `len` raw bytes with no prefix.
    pub fn read_raw(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.take(len)
    }

    /// Read a length-prefixed byte block.
    pub fn read_bytes(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_len()?;
        self.take(len)
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_str(&mut self) -> Result<&'a str, DecodeError> {
        let len = self.read_len()?;
        let offset = self.offset();
        let b = self.take(len)?;
        std::str::from_utf8(b).map_err(|e| DecodeError::InvalidUtf8 {
            offset: offset + e.valid_up_to(),
        })
    }

    /// Split off a reader over the next `len` bytes and advance past them.
    pub fn sub_reader(&mut self, len: usize) -> Result<ByteReader<'a>, DecodeError> {
        let base = self.offset();
        let bytes = self.take(len)?;
        Ok(ByteReader { bytes, pos: 0, base })
    }

    /// Remaining bytes of the window, consuming them.
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        rest
    }
}

/// Types with a fixed wire encoding inside a section payload.
pub trait Encode {
    fn encode(&self, w: &mut ByteWriter);
}

/// Types decodable from a section payload.
pub trait Decode: Sized {
    fn decode(r: &mut ByteReader<'_>) -> Result<Self, DecodeError>;
}

/// Write a varuint count followed by each element.
pub fn encode_list<T: Encode>(w: &mut ByteWriter, items: &[T]) {
    w.write_len(items.len());
    for item in items {
        item.encode(w);
    }
}

/// Read a varuint count followed by that many elements.
pub fn decode_list<T: Decode>(r: &mut ByteReader<'_>) -> Result<Vec<T>, DecodeError> {
    let count = r.read_count()?;
    let mut out = Vec::with_capacity(r.capacity_hint(count));
    for _ in 0..count {
        out.push(T::decode(r)?);
    }
    Ok(out)
}
