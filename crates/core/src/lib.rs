// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod config;
pub mod cursor;
pub mod decoder;

pub use config::{ArchVersion, DecodeConfig, Endianness, InstructionSet};
pub use cursor::{CodeCursor, CodeReader};
pub use decoder::{
    decode, DecodedInstruction, Disassembler, JumpDestination, JumpTarget, INVALID_OPCODE,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The code buffer ended before the instruction did. Distinct from an
    /// unrecognised encoding, which decodes successfully to `INVALID_OPCODE`.
    #[error("Insufficient data: instruction needs {needed} bytes, {available} available")]
    InsufficientData { needed: usize, available: usize },
}

pub type DecodeResult<T> = Result<T, DecodeError>;
