// Growable output buffer for the encoder.
//
// A contiguous byte arena plus a separate write cursor. The arena is
// zero-filled up front; `offset` is the logical length. When a write would
// overflow, the arena grows to the larger of twice its size or the next
// `CHUNK` multiple that fits the write. Already written bytes and offsets
// handed out by `placeholder_u32` stay valid across growth.

use byteorder::{BigEndian, ByteOrder};

/// Initial arena size.
pub const DEFAULT_CAPACITY: usize = 2048;

/// Growth granularity.
const CHUNK: usize = 2048;

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Append-only big-endian writer.
#[derive(Debug, Clone)]
pub struct Writer {
    buf: Vec<u8>,
    offset: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity.max(1)],
            offset: 0,
        }
    }

    /// Bytes written so far.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Current arena size (always >= `offset`).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The written prefix.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.offset]
    }

    /// Consume the writer, returning exactly the written prefix.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buf.truncate(self.offset);
        self.buf
    }

    /// Make room for `additional` bytes past the cursor.
    fn grow(&mut self, additional: usize) {
        let needed = self.offset + additional;
        if needed <= self.buf.len() {
            return;
        }
        let doubled = self.buf.len().saturating_mul(2);
        let rounded = needed.div_ceil(CHUNK) * CHUNK;
        let new_len = doubled.max(rounded);
        log::trace!("writer grow {} -> {new_len} bytes", self.buf.len());
        self.buf.resize(new_len, 0);
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.grow(1);
        self.buf[self.offset] = value;
        self.offset += 1;
    }

    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.grow(2);
        BigEndian::write_u16(&mut self.buf[self.offset..], value);
        self.offset += 2;
    }

    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.grow(4);
        BigEndian::write_u32(&mut self.buf[self.offset..], value);
        self.offset += 4;
    }

    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.grow(4);
        BigEndian::write_i32(&mut self.buf[self.offset..], value);
        self.offset += 4;
    }

    #[inline]
    pub fn write_f64(&mut self, value: f64) {
        self.grow(8);
        BigEndian::write_f64(&mut self.buf[self.offset..], value);
        self.offset += 8;
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.grow(data.len());
        self.buf[self.offset..self.offset + data.len()].copy_from_slice(data);
        self.offset += data.len();
    }

    /// Skip four bytes to be filled in later by `patch_u32`.
    /// Returns the offset of the placeholder.
    pub fn placeholder_u32(&mut self) -> usize {
        self.grow(4);
        let at = self.offset;
        self.offset += 4;
        at
    }

    /// Overwrite a previously reserved 4-byte slot.
    ///
    /// # Panics
    ///
    /// Panics if `at + 4` is past the written prefix.
    pub fn patch_u32(&mut self, at: usize, value: u32) {
        assert!(at + 4 <= self.offset, "patch outside written region");
        BigEndian::write_u32(&mut self.buf[at..at + 4], value);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_are_big_endian() {
        let mut w = Writer::new();
        w.write_u8(0xAB);
        w.write_u16(0x0102);
        w.write_u32(0x0304_0506);
        w.write_i32(-2);
        assert_eq!(
            w.as_slice(),
            &[0xAB, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xFF, 0xFF, 0xFF, 0xFE]
        );
    }

    #[test]
    fn float_layout() {
        let mut w = Writer::new();
        w.write_f64(1.5);
        assert_eq!(w.as_slice(), &1.5f64.to_be_bytes());
    }

    #[test]
    fn output_is_prefix_not_capacity() {
        let mut w = Writer::new();
        w.write_bytes(b"abc");
        assert_eq!(w.capacity(), DEFAULT_CAPACITY);
        assert_eq!(w.into_vec(), b"abc");
    }

    #[test]
    fn growth_preserves_contents() {
        let mut w = Writer::with_capacity(4);
        let data: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        for chunk in data.chunks(7) {
            w.write_bytes(chunk);
        }
        assert!(w.capacity() >= 5000);
        assert_eq!(w.capacity() % CHUNK, 0);
        assert_eq!(w.into_vec(), data);
    }

    #[test]
    fn growth_doubles_when_larger_than_chunk() {
        let mut w = Writer::with_capacity(8192);
        w.write_bytes(&[0; 8192]);
        w.write_u8(1);
        assert_eq!(w.capacity(), 16384);
    }

    #[test]
    fn placeholder_patch_survives_growth() {
        let mut w = Writer::with_capacity(8);
        w.write_u8(7);
        let at = w.placeholder_u32();
        w.write_bytes(&[0xEE; 3000]);
        w.patch_u32(at, 3000);
        let out = w.into_vec();
        assert_eq!(out[0], 7);
        assert_eq!(&out[1..5], &[0x00, 0x00, 0x0B, 0xB8]);
        assert_eq!(out.len(), 3005);
    }

    #[test]
    #[should_panic(expected = "patch outside written region")]
    fn patch_past_end_panics() {
        let mut w = Writer::new();
        w.write_u8(0);
        w.patch_u32(0, 1);
    }
}
