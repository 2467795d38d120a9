//! Single-byte bit-range helpers.
//!
//! Bit ranges are inclusive `[lo, hi]` with `0 <= lo <= hi <= 7`, bit `0` being the least
//! significant. Multi-byte buffers are addressed least significant bit first: bit position `p`
//! lives in byte `p / 8` at bit `p % 8`.
//!
//! Nothing in here knows about ring positions; [`BitReader`] and [`BitWriter`] walk a plain
//! linear buffer.

/// Mask with the low `len` bits set. `len` must be in `0..=8`.
#[inline]
pub const fn low_mask(len: u32) -> u8 {
    debug_assert!(len <= 8);
    if len >= 8 { 0xFF } else { (1u8 << len) - 1 }
}

/// Mask covering bits `lo..=hi`.
#[inline]
pub const fn range_mask(lo: u32, hi: u32) -> u8 {
    debug_assert!(lo <= hi && hi < 8);
    low_mask(hi - lo + 1) << lo
}

/// Extract bits `lo..=hi` of `byte`, shifted down to bit `0`.
#[inline]
pub const fn get_bits(byte: u8, lo: u32, hi: u32) -> u8 {
    (byte & range_mask(lo, hi)) >> lo
}

/// Clear bits `lo..=hi` of `byte`.
#[inline]
pub const fn clear_bits(byte: u8, lo: u32, hi: u32) -> u8 {
    byte & !range_mask(lo, hi)
}

/// Replace bits `lo..=hi` of `byte` with the low bits of `value`.
/// Bits of `value` that do not fit the range are ignored.
#[inline]
pub const fn set_bits(byte: u8, lo: u32, hi: u32, value: u8) -> u8 {
    clear_bits(byte, lo, hi) | ((value << lo) & range_mask(lo, hi))
}

/// Sequential bit reader over a linear byte buffer.
#[derive(Debug)]
pub struct BitReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    #[inline]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Reader that starts `pos` bits into `buf`.
    #[inline]
    pub const fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Read up to 8 bits, returned in the low bits of the result.
    ///
    /// # Panics
    /// Panics if `num_bits > 8` or the read runs past the end of the buffer.
    pub fn read(&mut self, num_bits: u32) -> u8 {
        assert!(num_bits <= 8, "BitReader::read takes at most 8 bits");
        let mut out = 0u8;
        let mut done = 0u32;
        while done < num_bits {
            let lo = (self.pos % 8) as u32;
            let len = (num_bits - done).min(8 - lo);
            let v = get_bits(self.buf[self.pos / 8], lo, lo + len - 1);
            out |= v << done;
            done += len;
            self.pos += len as usize;
        }
        out
    }
}

/// Sequential bit writer over a linear byte buffer.
///
/// Only the bits it covers are modified; neighbouring bits in partially written bytes keep
/// their previous value.
#[derive(Debug)]
pub struct BitWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> BitWriter<'a> {
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Append the low `num_bits` bits of `value`.
    ///
    /// # Panics
    /// Panics if `num_bits > 8` or the write runs past the end of the buffer.
    pub fn write(&mut self, value: u8, num_bits: u32) {
        assert!(num_bits <= 8, "BitWriter::write takes at most 8 bits");
        let mut value = u32::from(value);
        let mut left = num_bits;
        while left > 0 {
            let idx = self.pos / 8;
            let lo = (self.pos % 8) as u32;
            let len = left.min(8 - lo);
            self.buf[idx] = set_bits(self.buf[idx], lo, lo + len - 1, value as u8);
            value >>= len;
            left -= len;
            self.pos += len as usize;
        }
    }
}
