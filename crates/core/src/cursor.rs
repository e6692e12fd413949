// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::config::Endianness;
use crate::{DecodeError, DecodeResult};

/// Source of instruction bytes. Reads are relative to the current position and
/// do not move it; the dispatcher calls `advance` once a decode has succeeded, so a
/// failed decode leaves the source where it was.
pub trait CodeReader {
    /// Bytes still available from the current position.
    fn remaining(&self) -> usize;

    /// Byte at `offset` from the current position.
    fn peek_u8(&self, offset: usize) -> DecodeResult<u8>;

    /// Moves the position forward by `count` bytes.
    fn advance(&mut self, count: usize);

    fn peek_u16(&self, offset: usize, endianness: Endianness) -> DecodeResult<u16> {
        self.require(offset + 2)?;
        let b0 = self.peek_u8(offset)? as u16;
        let b1 = self.peek_u8(offset + 1)? as u16;
        Ok(match endianness {
            Endianness::Little => b0 | (b1 << 8),
            Endianness::Big => (b0 << 8) | b1,
        })
    }

    fn peek_u32(&self, offset: usize, endianness: Endianness) -> DecodeResult<u32> {
        self.require(offset + 4)?;
        let b0 = self.peek_u8(offset)? as u32;
        let b1 = self.peek_u8(offset + 1)? as u32;
        let b2 = self.peek_u8(offset + 2)? as u32;
        let b3 = self.peek_u8(offset + 3)? as u32;
        Ok(match endianness {
            Endianness::Little => b0 | (b1 << 8) | (b2 << 16) | (b3 << 24),
            Endianness::Big => (b0 << 24) | (b1 << 16) | (b2 << 8) | b3,
        })
    }

    fn require(&self, needed: usize) -> DecodeResult<()> {
        let available = self.remaining();
        if available < needed {
            return Err(DecodeError::InsufficientData { needed, available });
        }
        Ok(())
    }
}

/// Cursor over an in-memory code buffer.
#[derive(Debug, Clone)]
pub struct CodeCursor<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> CodeCursor<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.bytes.len());
    }

    pub fn is_empty(&self) -> bool {
        self.position >= self.bytes.len()
    }

    /// Bytes from the current position onward.
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.position..]
    }
}

impl CodeReader for CodeCursor<'_> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn peek_u8(&self, offset: usize) -> DecodeResult<u8> {
        self.bytes
            .get(self.position + offset)
            .copied()
            .ok_or(DecodeError::InsufficientData {
                needed: offset + 1,
                available: self.remaining(),
            })
    }

    fn advance(&mut self, count: usize) {
        self.position = (self.position + count).min(self.bytes.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_little_and_big_endian() {
        let cursor = CodeCursor::new(&[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(cursor.peek_u16(0, Endianness::Little).unwrap(), 0x0201);
        assert_eq!(cursor.peek_u16(0, Endianness::Big).unwrap(), 0x0102);
        assert_eq!(cursor.peek_u32(0, Endianness::Little).unwrap(), 0x0403_0201);
        assert_eq!(cursor.peek_u32(0, Endianness::Big).unwrap(), 0x0102_0304);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_underrun_reports_needed_and_available() {
        let cursor = CodeCursor::new(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(
            cursor.peek_u32(0, Endianness::Little),
            Err(DecodeError::InsufficientData {
                needed: 4,
                available: 3
            })
        );
        assert_eq!(
            cursor.peek_u16(2, Endianness::Little),
            Err(DecodeError::InsufficientData {
                needed: 4,
                available: 3
            })
        );
    }

    #[test]
    fn test_advance_clamps_to_end() {
        let mut cursor = CodeCursor::new(&[0; 6]);
        cursor.advance(4);
        assert_eq!(cursor.remaining(), 2);
        cursor.advance(10);
        assert!(cursor.is_empty());
    }
}
