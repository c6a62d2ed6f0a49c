//! Bit-granular reader over a shared byte buffer.
//!
//! A cursor only ever moves forward and never reads more than its limit. A
//! sub-cursor is carved out of the parent's budget up front, so a group of
//! packets bounded by length cannot spill into whatever follows it.

use bitvec::prelude::*;

use crate::error::DecodeError;

#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    bits: &'a BitSlice<u8, Msb0>,
    /// Absolute bit position of the next read.
    offset: usize,
    limit: usize,
    consumed: usize,
}

impl<'a> BitCursor<'a> {
    /// Root cursor spanning every bit of `bits`.
    pub fn new(bits: &'a BitSlice<u8, Msb0>) -> Self {
        Self {limit: bits.len(), bits, offset: 0, consumed: 0}
    }

    pub fn remaining(&self) -> usize {self.limit - self.consumed}
    pub fn consumed(&self) -> usize {self.consumed}
    pub fn offset(&self) -> usize {self.offset}

    fn consume(&mut self, n: usize) -> Result<usize, DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError::OutOfBits {requested: n, available: self.remaining()});
        }
        let start = self.offset;
        self.consumed += n;
        self.offset += n;
        Ok(start)
    }

    /// Reads the next `n` bits as a big-endian unsigned integer.
    pub fn read_bits(&mut self, n: usize) -> Result<u64, DecodeError> {
        if n > 64 {return Err(DecodeError::BitWidth {width: n})};
        if n == 0 {return Ok(0)};
        let start = self.consume(n)?;
        Ok(self.bits[start .. start + n].load_be::<u64>())
    }

    pub fn read_flag(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_bits(1)? == 1)
    }

    /// Takes `n` bits out of this cursor's budget and hands them back as a
    /// cursor of their own.
    pub fn read_sub_cursor(&mut self, n: usize) -> Result<BitCursor<'a>, DecodeError> {
        let start = self.consume(n)?;
        Ok(BitCursor {bits: self.bits, offset: start, limit: n, consumed: 0})
    }
}
