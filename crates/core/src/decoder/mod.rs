// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Instruction decode dispatch.
//!
//! `decode` reads one instruction from a `CodeReader`, picks the ARM, Thumb or
//! Thumb-2 table by mode and opcode prefix, and returns its text together with
//! the control-flow descriptor a stepping engine needs. All decode state lives
//! in a `DecodeState` on the caller's stack; nothing is kept between calls.

pub mod arm;
pub mod bits;
pub mod operand;
pub mod simd;
pub mod table;
pub mod thumb;
pub mod thumb2;

use crate::config::{ArchVersion, DecodeConfig, InstructionSet};
use crate::cursor::{CodeCursor, CodeReader};
use crate::DecodeResult;
use bits::Reg;
use operand::Mnemonic;
use serde::Serialize;

/// Text produced for an encoding that matches no table entry, or one that is
/// not available at the configured architecture version.
pub const INVALID_OPCODE: &str = "<invalid opcode>";

/// Where a control transfer goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JumpDestination {
    Address(u32),
    /// Register-indirect. The host resolves the register against live state.
    Register(u8),
}

impl JumpDestination {
    /// The link register, used for returns and for `pc`-writing data instructions.
    pub const LINK_REGISTER: JumpDestination = JumpDestination::Register(14);

    /// Register name for register-indirect targets.
    pub fn expression(&self) -> Option<&'static str> {
        match self {
            JumpDestination::Address(_) => None,
            JumpDestination::Register(n) => Some(bits::register_name(*n as u32)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JumpTarget {
    pub destination: JumpDestination,
    /// No fall-through path exists.
    pub is_sole_destination: bool,
    /// The transfer also writes the link register.
    pub is_subroutine_call: bool,
}

impl JumpTarget {
    pub fn address(address: u32, sole: bool, call: bool) -> Self {
        Self {
            destination: JumpDestination::Address(address),
            is_sole_destination: sole,
            is_subroutine_call: call,
        }
    }

    pub fn register(reg: Reg, sole: bool, call: bool) -> Self {
        Self {
            destination: JumpDestination::Register(reg.number()),
            is_sole_destination: sole,
            is_subroutine_call: call,
        }
    }

    /// Return-style transfer through the link register.
    pub fn link_register(sole: bool) -> Self {
        Self {
            destination: JumpDestination::LINK_REGISTER,
            is_sole_destination: sole,
            is_subroutine_call: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedInstruction {
    pub address: u32,
    /// Bytes consumed: 2 or 4.
    pub size: usize,
    /// Opcode word. Thumb-2 words are `(hw1 << 16) | hw2`.
    pub opcode: u32,
    /// Raw bytes in stream order.
    pub bytes: Vec<u8>,
    /// Mnemonic, a tab, then the operand list.
    pub text: String,
    pub jump_target: Option<JumpTarget>,
}

impl DecodedInstruction {
    pub fn is_invalid(&self) -> bool {
        self.text == INVALID_OPCODE
    }

    pub fn mnemonic(&self) -> &str {
        self.text.split('\t').next().unwrap_or("")
    }

    pub fn operands(&self) -> &str {
        self.text.split_once('\t').map(|(_, ops)| ops).unwrap_or("")
    }

    /// Address of the next sequential instruction.
    pub fn next_address(&self) -> u32 {
        self.address.wrapping_add(self.size as u32)
    }
}

/// Per-call decode state threaded from the dispatcher into the formatters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DecodeState {
    pub address: u32,
    pub word: u32,
    pub arch: ArchVersion,
}

impl DecodeState {
    pub fn new(address: u32, word: u32, arch: ArchVersion) -> Self {
        Self {
            address,
            word,
            arch,
        }
    }

    /// Same state with a different opcode word (ARM-form normalisation).
    pub fn with_word(self, word: u32) -> Self {
        Self { word, ..self }
    }
}

/// Formatter output: rendered mnemonic and optional jump descriptor.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Formatted {
    pub text: Mnemonic,
    pub jump: Option<JumpTarget>,
}

impl Formatted {
    pub fn jump(text: Mnemonic, jump: JumpTarget) -> Self {
        Self {
            text,
            jump: Some(jump),
        }
    }

    pub fn jump_if(text: Mnemonic, jump: Option<JumpTarget>) -> Self {
        Self { text, jump }
    }
}

impl From<Mnemonic> for Formatted {
    fn from(text: Mnemonic) -> Self {
        Self { text, jump: None }
    }
}

/// Leading halfwords `11101`, `11110` and `11111` start a 32-bit Thumb-2 instruction.
pub fn is_thumb32_prefix(halfword: u16) -> bool {
    (halfword >> 11) >= 0b11101
}

/// Decode one instruction at the reader's position.
///
/// The reader only advances when decoding succeeds. Unrecognised encodings are
/// not errors; they produce `INVALID_OPCODE` with the size that was read.
pub fn decode<R: CodeReader + ?Sized>(
    reader: &mut R,
    address: u32,
    config: &DecodeConfig,
) -> DecodeResult<DecodedInstruction> {
    let endianness = config.endianness;
    let (size, opcode, formatted) = match config.mode {
        InstructionSet::Arm => {
            let word = reader.peek_u32(0, endianness)?;
            let state = DecodeState::new(address, word, config.arch);
            (4, word, arm::decode(&state))
        }
        InstructionSet::Thumb => {
            let hw1 = reader.peek_u16(0, endianness)?;
            if is_thumb32_prefix(hw1) {
                let hw2 = reader.peek_u16(2, endianness)?;
                let word = ((hw1 as u32) << 16) | hw2 as u32;
                let state = DecodeState::new(address, word, config.arch);
                (4, word, thumb2::decode(&state))
            } else {
                let state = DecodeState::new(address, hw1 as u32, config.arch);
                (2, hw1 as u32, thumb::decode(&state))
            }
        }
        InstructionSet::Thumb2 => {
            let hw1 = reader.peek_u16(0, endianness)?;
            let hw2 = reader.peek_u16(2, endianness)?;
            let word = ((hw1 as u32) << 16) | hw2 as u32;
            let state = DecodeState::new(address, word, config.arch);
            (4, word, thumb2::decode(&state))
        }
    };

    let mut bytes = Vec::with_capacity(size);
    for offset in 0..size {
        bytes.push(reader.peek_u8(offset)?);
    }
    reader.advance(size);

    let (text, jump_target) = match formatted {
        Some(f) => (f.text.render(), f.jump),
        None => (INVALID_OPCODE.to_string(), None),
    };
    tracing::trace!("{:#010x}: {:#x} {}", address, opcode, text);

    Ok(DecodedInstruction {
        address,
        size,
        opcode,
        bytes,
        text,
        jump_target,
    })
}

/// Convenience wrapper owning a configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disassembler {
    config: DecodeConfig,
}

impl Disassembler {
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    pub fn decode_at<R: CodeReader + ?Sized>(
        &self,
        reader: &mut R,
        address: u32,
    ) -> DecodeResult<DecodedInstruction> {
        decode(reader, address, &self.config)
    }

    /// Decodes `bytes` back to back starting at `address`. The iterator ends
    /// with the buffer, or after yielding the first error.
    pub fn instructions<'a>(&self, bytes: &'a [u8], address: u32) -> Instructions<'a> {
        Instructions {
            cursor: CodeCursor::new(bytes),
            address,
            config: self.config,
            done: false,
        }
    }
}

pub struct Instructions<'a> {
    cursor: CodeCursor<'a>,
    address: u32,
    config: DecodeConfig,
    done: bool,
}

impl Iterator for Instructions<'_> {
    type Item = DecodeResult<DecodedInstruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cursor.is_empty() {
            return None;
        }
        match decode(&mut self.cursor, self.address, &self.config) {
            Ok(insn) => {
                self.address = insn.next_address();
                Some(Ok(insn))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endianness;
    use crate::DecodeError;

    fn arm_config() -> DecodeConfig {
        DecodeConfig::new(ArchVersion::V7, InstructionSet::Arm)
    }

    #[test]
    fn test_arm_bl_end_to_end() {
        // BL with imm24 = 0x000010 at 0x1000: 0x1000 + 8 + (0x10 << 2)
        let bytes = 0xEB00_0010u32.to_le_bytes();
        let mut cursor = CodeCursor::new(&bytes);
        let insn = decode(&mut cursor, 0x1000, &arm_config()).unwrap();
        assert_eq!(insn.size, 4);
        assert_eq!(insn.text, "bl\t0x1048");
        assert_eq!(
            insn.jump_target,
            Some(JumpTarget {
                destination: JumpDestination::Address(0x1048),
                is_sole_destination: true,
                is_subroutine_call: true,
            })
        );
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_arm_bl_negative_offset() {
        // BL with imm24 = 0xFFFFFE (-2 words) at 0x1000: 0x1000 + 8 - 8
        let bytes = 0xEBFF_FFFEu32.to_le_bytes();
        let mut cursor = CodeCursor::new(&bytes);
        let insn = decode(&mut cursor, 0x1000, &arm_config()).unwrap();
        assert_eq!(insn.text, "bl\t0x1000");
    }

    #[test]
    fn test_big_endian_byte_order() {
        // mov r0, #1 as big-endian bytes
        let bytes = [0xE3, 0xA0, 0x00, 0x01];
        let config = arm_config().with_endianness(Endianness::Big);
        let mut cursor = CodeCursor::new(&bytes);
        let insn = decode(&mut cursor, 0, &config).unwrap();
        assert_eq!(insn.opcode, 0xE3A0_0001);
        assert_eq!(insn.text, "mov\tr0, #1");
        assert_eq!(insn.bytes, bytes.to_vec());
    }

    #[test]
    fn test_underrun_is_error_and_cursor_stays() {
        let config = arm_config();
        let mut cursor = CodeCursor::new(&[0x00, 0x00, 0xA0]);
        assert_eq!(
            decode(&mut cursor, 0, &config),
            Err(DecodeError::InsufficientData {
                needed: 4,
                available: 3
            })
        );
        assert_eq!(cursor.position(), 0);

        let thumb = DecodeConfig::new(ArchVersion::V7, InstructionSet::Thumb);
        let mut cursor = CodeCursor::new(&[0x00]);
        assert!(matches!(
            decode(&mut cursor, 0, &thumb),
            Err(DecodeError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_thumb_prefix_needs_second_halfword() {
        // First half of a BL with no second halfword
        let thumb = DecodeConfig::new(ArchVersion::V7, InstructionSet::Thumb);
        let mut cursor = CodeCursor::new(&[0x00, 0xF0]);
        assert_eq!(
            decode(&mut cursor, 0, &thumb),
            Err(DecodeError::InsufficientData {
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn test_size_matches_width() {
        let thumb = DecodeConfig::new(ArchVersion::V7, InstructionSet::Thumb);
        // movs r0, #1 then bl +4
        let bytes = [0x01, 0x20, 0x00, 0xF0, 0x02, 0xF8];
        let sizes: Vec<usize> = Disassembler::new(thumb)
            .instructions(&bytes, 0x100)
            .map(|r| r.unwrap().size)
            .collect();
        assert_eq!(sizes, vec![2, 4]);

        let thumb2 = DecodeConfig::new(ArchVersion::V7, InstructionSet::Thumb2);
        let insn = decode(&mut CodeCursor::new(&[0x00, 0xF0, 0x02, 0xF8]), 0, &thumb2).unwrap();
        assert_eq!(insn.size, 4);
        assert_eq!(insn.opcode, 0xF000_F802);
    }

    #[test]
    fn test_invalid_opcode_consumes_width() {
        // Permanently undefined unconditional space in ARM state
        let bytes = 0xFFFF_FFFFu32.to_le_bytes();
        let mut cursor = CodeCursor::new(&bytes);
        let insn = decode(&mut cursor, 0, &arm_config()).unwrap();
        assert!(insn.is_invalid());
        assert_eq!(insn.size, 4);
        assert_eq!(insn.jump_target, None);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn test_iterator_stops_after_underrun() {
        let arm = Disassembler::new(arm_config());
        // nop, then two stray bytes
        let bytes = [0x00, 0xF0, 0x20, 0xE3, 0x00, 0x00];
        let results: Vec<_> = arm.instructions(&bytes, 0x8000).collect();
        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.text, "nop");
        assert_eq!(first.address, 0x8000);
        assert!(results[1].is_err());
    }

    #[test]
    fn test_mnemonic_and_operands_split() {
        let thumb = Disassembler::new(DecodeConfig::new(ArchVersion::V7, InstructionSet::Thumb));
        let insn = thumb
            .decode_at(&mut CodeCursor::new(&[0x48, 0x68]), 0)
            .unwrap();
        assert_eq!(insn.text, "ldr\tr0, [r1, #4]");
        assert_eq!(insn.mnemonic(), "ldr");
        assert_eq!(insn.operands(), "r0, [r1, #4]");
        assert_eq!(insn.next_address(), 2);
    }

    #[test]
    fn test_link_register_expression() {
        assert_eq!(JumpDestination::LINK_REGISTER.expression(), Some("lr"));
        assert_eq!(JumpDestination::Register(3).expression(), Some("r3"));
        assert_eq!(JumpDestination::Address(0x10).expression(), None);
    }

    #[test]
    fn test_decoder_is_shareable_across_threads() {
        let disassembler = Disassembler::new(arm_config());
        let handles: Vec<_> = (0..4u32)
            .map(|i| {
                std::thread::spawn(move || {
                    let word = 0xEA00_0000u32 | i;
                    let bytes = word.to_le_bytes();
                    disassembler
                        .decode_at(&mut CodeCursor::new(&bytes), 0)
                        .unwrap()
                        .text
                })
            })
            .collect();
        let texts: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(texts, vec!["b\t0x8", "b\t0xc", "b\t0x10", "b\t0x14"]);
    }
}
