// Read cursor over an encoded byte slice.
//
// Fixed-width big-endian reads with a monotonically increasing position.
// Every read is bounds-checked; running past the end yields `Truncated`
// and leaves the position where it was.

use byteorder::{BigEndian, ByteOrder};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// A read would run past the end of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("read of {needed} bytes at offset {offset} runs past end of input ({available} available)")]
pub struct Truncated {
    pub offset: usize,
    pub needed: usize,
    pub available: usize,
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The unread suffix.
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Borrow the next `len` bytes and advance past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Truncated> {
        if len > self.remaining() {
            return Err(Truncated {
                offset: self.pos,
                needed: len,
                available: self.remaining(),
            });
        }
        let out = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    /// Advance without reading, e.g. past a payload consumed elsewhere.
    pub fn skip(&mut self, len: usize) -> Result<(), Truncated> {
        self.read_bytes(len).map(|_| ())
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Result<u8, Truncated> {
        self.data.get(self.pos).copied().ok_or(Truncated {
            offset: self.pos,
            needed: 1,
            available: 0,
        })
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, Truncated> {
        let b = self.peek_u8()?;
        self.pos += 1;
        Ok(b)
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8, Truncated> {
        self.read_u8().map(|b| b as i8)
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, Truncated> {
        self.read_bytes(2).map(BigEndian::read_u16)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, Truncated> {
        self.read_bytes(4).map(BigEndian::read_u32)
    }

    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, Truncated> {
        self.read_bytes(4).map(BigEndian::read_i32)
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, Truncated> {
        self.read_bytes(8).map(BigEndian::read_f64)
    }

    /// Read `len` bytes that must be UTF-8.
    ///
    /// The outer error is truncation; the inner one is the offset of the
    /// invalid payload.
    pub fn read_utf8(&mut self, len: usize) -> Result<Result<&'a str, usize>, Truncated> {
        let start = self.pos;
        let bytes = self.read_bytes(len)?;
        Ok(std::str::from_utf8(bytes).map_err(|_| start))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
