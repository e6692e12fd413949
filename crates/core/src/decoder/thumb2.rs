// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! 32-bit Thumb-2 encodings. The word is `hw1 << 16 | hw2`.
//!
//! Coprocessor, VFP and Advanced SIMD encodings share their field layout with
//! the ARM forms, so they are rewritten into an ARM word and handed to the ARM
//! table.

use super::arm;
use super::bits::{
    bit, bits, cond_suffix, reg_at, register_list, thumb2_branch_offset, thumb2_imm12,
    thumb2_imm16, thumb2_imm_shift, thumb_expand_imm, Reg, ShiftKind, ShifterOperand,
};
use super::operand::{Indexing, Memory, Mnemonic, Operand};
use super::table::{op, EncodingTable, Entry, Lookup};
use super::{DecodeState, Formatted, JumpTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Thumb2Tag {
    Undefined,
    NeonDataProcessing,
    NeonLoadStore,
    Coprocessor,
    StoreReturnState,
    ReturnFromException,
    LoadStoreMultiple,
    StoreExclusive,
    LoadExclusive,
    TableBranch,
    LoadStoreDual,
    ShiftedRegister,
    Pack,
    ModifiedImmediate,
    WideImmediate,
    MoveWide,
    Saturate,
    Saturate16,
    BitfieldExtract,
    BitfieldInsert,
    Msr,
    Mrs,
    Hint,
    DebugHint,
    Cps,
    Clrex,
    Barrier,
    BranchExchangeJazelle,
    ExceptionReturn,
    SecureMonitorCall,
    PermanentlyUndefined,
    ConditionalBranch,
    Branch,
    BranchLinkExchange,
    BranchLink,
    LoadStoreImm12,
    LoadStoreImm8,
    LoadStoreUnprivileged,
    LoadStoreRegister,
    LoadLiteral,
    PreloadImm12,
    PreloadImm8,
    PreloadRegister,
    PreloadLiteral,
    RegisterShift,
    ExtendAdd,
    ParallelAddSub,
    SaturatingArith,
    Reverse,
    Select,
    CountLeadingZeros,
    Multiply,
    MultiplyHalfword,
    DualMultiply,
    MultiplyWordHalf,
    MostSignificantMultiply,
    SumAbsoluteDifference,
    MultiplyLong,
    MultiplyLongHalfword,
    DualMultiplyLong,
    Divide,
}

use Thumb2Tag::*;

static THUMB2_ENTRIES: &[Entry<Thumb2Tag>] = &[
    // ARM-form spaces
    op!(b"111u_1111_xxxx_xxxx_xxxx_xxxx_xxxx_xxxx", "", NeonDataProcessing, V6T2),
    op!(b"1111_1001_xxx0_xxxx_xxxx_xxxx_xxxx_xxxx", "", NeonLoadStore, V6T2),
    op!(b"111x_11xx_xxxx_xxxx_xxxx_xxxx_xxxx_xxxx", "", Coprocessor, V6T2),
    // load/store multiple, srs, rfe
    op!(b"1110_1000_00w0_1101_1100_0000_000m_mmmm", "srsdb", StoreReturnState, V6T2),
    op!(b"1110_1001_10w0_1101_1100_0000_000m_mmmm", "srsia", StoreReturnState, V6T2),
    op!(b"1110_1000_00w1_nnnn_1100_0000_0000_0000", "rfedb", ReturnFromException, V6T2),
    op!(b"1110_1001_10w1_nnnn_1100_0000_0000_0000", "rfeia", ReturnFromException, V6T2),
    op!(b"1110_1000_10w0_nnnn_rrrr_rrrr_rrrr_rrrr", "stm", LoadStoreMultiple, V6T2),
    op!(b"1110_1000_10w1_nnnn_rrrr_rrrr_rrrr_rrrr", "ldm", LoadStoreMultiple, V6T2),
    op!(b"1110_1001_00w0_nnnn_rrrr_rrrr_rrrr_rrrr", "stmdb", LoadStoreMultiple, V6T2),
    op!(b"1110_1001_00w1_nnnn_rrrr_rrrr_rrrr_rrrr", "ldmdb", LoadStoreMultiple, V6T2),
    // exclusives and table branch
    op!(b"1110_1000_0100_nnnn_tttt_dddd_iiii_iiii", "strex", StoreExclusive, V6T2),
    op!(b"1110_1000_0101_nnnn_tttt_1111_iiii_iiii", "ldrex", LoadExclusive, V6T2),
    op!(b"1110_1000_1101_nnnn_1111_0000_0000_mmmm", "tbb", TableBranch, V6T2),
    op!(b"1110_1000_1101_nnnn_1111_0000_0001_mmmm", "tbh", TableBranch, V6T2),
    op!(b"1110_1000_1100_nnnn_tttt_1111_0100_dddd", "strexb", StoreExclusive, V7),
    op!(b"1110_1000_1100_nnnn_tttt_1111_0101_dddd", "strexh", StoreExclusive, V7),
    op!(b"1110_1000_1100_nnnn_tttt_ssss_0111_dddd", "strexd", StoreExclusive, V7),
    op!(b"1110_1000_1101_nnnn_tttt_1111_0100_1111", "ldrexb", LoadExclusive, V7),
    op!(b"1110_1000_1101_nnnn_tttt_1111_0101_1111", "ldrexh", LoadExclusive, V7),
    op!(b"1110_1000_1101_nnnn_tttt_ssss_0111_1111", "ldrexd", LoadExclusive, V7),
    op!(b"1110_1000_x10x_xxxx_xxxx_xxxx_xxxx_xxxx", "", Undefined),
    op!(b"1110_100p_u1w0_nnnn_tttt_ssss_iiii_iiii", "strd", LoadStoreDual, V6T2),
    op!(b"1110_100p_u1w1_nnnn_tttt_ssss_iiii_iiii", "ldrd", LoadStoreDual, V6T2),
    // data processing, shifted register
    op!(b"1110_1010_0001_nnnn_0iii_1111_iitt_mmmm", "tst", ShiftedRegister, V6T2),
    op!(b"1110_1010_000s_nnnn_0iii_dddd_iitt_mmmm", "and", ShiftedRegister, V6T2),
    op!(b"1110_1010_001s_nnnn_0iii_dddd_iitt_mmmm", "bic", ShiftedRegister, V6T2),
    op!(b"1110_1010_010s_1111_0iii_dddd_iitt_mmmm", "mov", ShiftedRegister, V6T2),
    op!(b"1110_1010_010s_nnnn_0iii_dddd_iitt_mmmm", "orr", ShiftedRegister, V6T2),
    op!(b"1110_1010_011s_1111_0iii_dddd_iitt_mmmm", "mvn", ShiftedRegister, V6T2),
    op!(b"1110_1010_011s_nnnn_0iii_dddd_iitt_mmmm", "orn", ShiftedRegister, V6T2),
    op!(b"1110_1010_1001_nnnn_0iii_1111_iitt_mmmm", "teq", ShiftedRegister, V6T2),
    op!(b"1110_1010_100s_nnnn_0iii_dddd_iitt_mmmm", "eor", ShiftedRegister, V6T2),
    op!(b"1110_1010_1100_nnnn_0iii_dddd_ii00_mmmm", "pkhbt", Pack, V6T2),
    op!(b"1110_1010_1100_nnnn_0iii_dddd_ii10_mmmm", "pkhtb", Pack, V6T2),
    op!(b"1110_1011_0001_nnnn_0iii_1111_iitt_mmmm", "cmn", ShiftedRegister, V6T2),
    op!(b"1110_1011_000s_nnnn_0iii_dddd_iitt_mmmm", "add", ShiftedRegister, V6T2),
    op!(b"1110_1011_010s_nnnn_0iii_dddd_iitt_mmmm", "adc", ShiftedRegister, V6T2),
    op!(b"1110_1011_011s_nnnn_0iii_dddd_iitt_mmmm", "sbc", ShiftedRegister, V6T2),
    op!(b"1110_1011_1011_nnnn_0iii_1111_iitt_mmmm", "cmp", ShiftedRegister, V6T2),
    op!(b"1110_1011_101s_nnnn_0iii_dddd_iitt_mmmm", "sub", ShiftedRegister, V6T2),
    op!(b"1110_1011_110s_nnnn_0iii_dddd_iitt_mmmm", "rsb", ShiftedRegister, V6T2),
    // data processing, modified immediate
    op!(b"1111_0i00_0001_nnnn_0iii_1111_iiii_iiii", "tst", ModifiedImmediate, V6T2),
    op!(b"1111_0i00_000s_nnnn_0iii_dddd_iiii_iiii", "and", ModifiedImmediate, V6T2),
    op!(b"1111_0i00_001s_nnnn_0iii_dddd_iiii_iiii", "bic", ModifiedImmediate, V6T2),
    op!(b"1111_0i00_010s_1111_0iii_dddd_iiii_iiii", "mov", ModifiedImmediate, V6T2),
    op!(b"1111_0i00_010s_nnnn_0iii_dddd_iiii_iiii", "orr", ModifiedImmediate, V6T2),
    op!(b"1111_0i00_011s_1111_0iii_dddd_iiii_iiii", "mvn", ModifiedImmediate, V6T2),
    op!(b"1111_0i00_011s_nnnn_0iii_dddd_iiii_iiii", "orn", ModifiedImmediate, V6T2),
    op!(b"1111_0i00_1001_nnnn_0iii_1111_iiii_iiii", "teq", ModifiedImmediate, V6T2),
    op!(b"1111_0i00_100s_nnnn_0iii_dddd_iiii_iiii", "eor", ModifiedImmediate, V6T2),
    op!(b"1111_0i01_0001_nnnn_0iii_1111_iiii_iiii", "cmn", ModifiedImmediate, V6T2),
    op!(b"1111_0i01_000s_nnnn_0iii_dddd_iiii_iiii", "add", ModifiedImmediate, V6T2),
    op!(b"1111_0i01_010s_nnnn_0iii_dddd_iiii_iiii", "adc", ModifiedImmediate, V6T2),
    op!(b"1111_0i01_011s_nnnn_0iii_dddd_iiii_iiii", "sbc", ModifiedImmediate, V6T2),
    op!(b"1111_0i01_1011_nnnn_0iii_1111_iiii_iiii", "cmp", ModifiedImmediate, V6T2),
    op!(b"1111_0i01_101s_nnnn_0iii_dddd_iiii_iiii", "sub", ModifiedImmediate, V6T2),
    op!(b"1111_0i01_110s_nnnn_0iii_dddd_iiii_iiii", "rsb", ModifiedImmediate, V6T2),
    // data processing, plain binary immediate
    op!(b"1111_0i10_0000_nnnn_0iii_dddd_iiii_iiii", "addw", WideImmediate, V6T2),
    op!(b"1111_0i10_1010_nnnn_0iii_dddd_iiii_iiii", "subw", WideImmediate, V6T2),
    op!(b"1111_0i10_0100_iiii_0iii_dddd_iiii_iiii", "movw", MoveWide, V6T2),
    op!(b"1111_0i10_1100_iiii_0iii_dddd_iiii_iiii", "movt", MoveWide, V6T2),
    op!(b"1111_0011_0010_nnnn_0000_dddd_0000_iiii", "ssat16", Saturate16, V6T2),
    op!(b"1111_0011_00h0_nnnn_0iii_dddd_ii0i_iiii", "ssat", Saturate, V6T2),
    op!(b"1111_0011_0100_nnnn_0iii_dddd_ii0w_wwww", "sbfx", BitfieldExtract, V6T2),
    op!(b"1111_0011_0110_nnnn_0iii_dddd_ii0m_mmmm", "bfi", BitfieldInsert, V6T2),
    op!(b"1111_0011_1010_nnnn_0000_dddd_0000_iiii", "usat16", Saturate16, V6T2),
    op!(b"1111_0011_10h0_nnnn_0iii_dddd_ii0i_iiii", "usat", Saturate, V6T2),
    op!(b"1111_0011_1100_nnnn_0iii_dddd_ii0w_wwww", "ubfx", BitfieldExtract, V6T2),
    // branches and miscellaneous control
    op!(b"1111_0011_100r_nnnn_1000_mmmm_0000_0000", "msr", Msr, V6T2),
    op!(b"1111_0011_1010_1111_1000_0000_0000_0000", "nop", Hint, V6T2),
    op!(b"1111_0011_1010_1111_1000_0000_0000_0001", "yield", Hint, hint V7, V6T2),
    op!(b"1111_0011_1010_1111_1000_0000_0000_0010", "wfe", Hint, hint V7, V6T2),
    op!(b"1111_0011_1010_1111_1000_0000_0000_0011", "wfi", Hint, hint V7, V6T2),
    op!(b"1111_0011_1010_1111_1000_0000_0000_0100", "sev", Hint, hint V7, V6T2),
    op!(b"1111_0011_1010_1111_1000_0000_1111_oooo", "dbg", DebugHint, hint V7, V6T2),
    op!(b"1111_0011_1010_1111_1000_0000_xxxx_xxxx", "nop", Hint, V6T2),
    op!(b"1111_0011_1010_1111_1000_0iim_aifm_mmmm", "cps", Cps, V6T2),
    op!(b"1111_0011_1011_1111_1000_1111_0010_1111", "clrex", Clrex, V7),
    op!(b"1111_0011_1011_1111_1000_1111_0100_oooo", "dsb", Barrier, V7),
    op!(b"1111_0011_1011_1111_1000_1111_0101_oooo", "dmb", Barrier, V7),
    op!(b"1111_0011_1011_1111_1000_1111_0110_oooo", "isb", Barrier, V7),
    op!(b"1111_0011_1100_mmmm_1000_1111_0000_0000", "bxj", BranchExchangeJazelle, V6T2),
    op!(b"1111_0011_1101_1110_1000_1111_iiii_iiii", "subs", ExceptionReturn, V6T2),
    op!(b"1111_0011_111r_1111_1000_dddd_0000_0000", "mrs", Mrs, V6T2),
    op!(b"1111_0111_1111_iiii_1000_0000_0000_0000", "smc", SecureMonitorCall, V7),
    op!(b"1111_0111_1111_iiii_1010_iiii_iiii_iiii", "udf", PermanentlyUndefined, V6T2),
    op!(b"1111_0x11_1xxx_xxxx_10x0_xxxx_xxxx_xxxx", "", Undefined),
    op!(b"1111_0scc_ccii_iiii_10j0_jiii_iiii_iiii", "b", ConditionalBranch, V6T2),
    op!(b"1111_0sii_iiii_iiii_10j1_jiii_iiii_iiii", "b", Branch, V6T2),
    op!(b"1111_0sii_iiii_iiii_11j0_jiii_iiii_iiii", "blx", BranchLinkExchange, V5),
    op!(b"1111_0sii_iiii_iiii_11j1_jiii_iiii_iiii", "bl", BranchLink, V4T),
    // store single
    op!(b"1111_1000_1000_nnnn_tttt_iiii_iiii_iiii", "strb", LoadStoreImm12, V6T2),
    op!(b"1111_1000_1010_nnnn_tttt_iiii_iiii_iiii", "strh", LoadStoreImm12, V6T2),
    op!(b"1111_1000_1100_nnnn_tttt_iiii_iiii_iiii", "str", LoadStoreImm12, V6T2),
    op!(b"1111_1000_0000_nnnn_tttt_1110_iiii_iiii", "strbt", LoadStoreUnprivileged, V6T2),
    op!(b"1111_1000_0010_nnnn_tttt_1110_iiii_iiii", "strht", LoadStoreUnprivileged, V6T2),
    op!(b"1111_1000_0100_nnnn_tttt_1110_iiii_iiii", "strt", LoadStoreUnprivileged, V6T2),
    op!(b"1111_1000_0000_nnnn_tttt_1puw_iiii_iiii", "strb", LoadStoreImm8, V6T2),
    op!(b"1111_1000_0010_nnnn_tttt_1puw_iiii_iiii", "strh", LoadStoreImm8, V6T2),
    op!(b"1111_1000_0100_nnnn_tttt_1puw_iiii_iiii", "str", LoadStoreImm8, V6T2),
    op!(b"1111_1000_0000_nnnn_tttt_0000_00ii_mmmm", "strb", LoadStoreRegister, V6T2),
    op!(b"1111_1000_0010_nnnn_tttt_0000_00ii_mmmm", "strh", LoadStoreRegister, V6T2),
    op!(b"1111_1000_0100_nnnn_tttt_0000_00ii_mmmm", "str", LoadStoreRegister, V6T2),
    // memory hints
    op!(b"1111_1000_u001_1111_1111_iiii_iiii_iiii", "pld", PreloadLiteral, V6T2),
    op!(b"1111_1000_1001_nnnn_1111_iiii_iiii_iiii", "pld", PreloadImm12, V6T2),
    op!(b"1111_1000_0001_nnnn_1111_1100_iiii_iiii", "pld", PreloadImm8, V6T2),
    op!(b"1111_1000_0001_nnnn_1111_0000_00ii_mmmm", "pld", PreloadRegister, V6T2),
    op!(b"1111_1000_1011_nnnn_1111_iiii_iiii_iiii", "pldw", PreloadImm12, V7),
    op!(b"1111_1000_0011_nnnn_1111_1100_iiii_iiii", "pldw", PreloadImm8, V7),
    op!(b"1111_1000_0011_nnnn_1111_0000_00ii_mmmm", "pldw", PreloadRegister, V7),
    op!(b"1111_1001_u001_1111_1111_iiii_iiii_iiii", "pli", PreloadLiteral, V7),
    op!(b"1111_1001_1001_nnnn_1111_iiii_iiii_iiii", "pli", PreloadImm12, V7),
    op!(b"1111_1001_0001_nnnn_1111_1100_iiii_iiii", "pli", PreloadImm8, V7),
    op!(b"1111_1001_0001_nnnn_1111_0000_00ii_mmmm", "pli", PreloadRegister, V7),
    op!(b"1111_100x_x011_xxxx_1111_xxxx_xxxx_xxxx", "nop", Hint, V6T2),
    // load single
    op!(b"1111_1000_u001_1111_tttt_iiii_iiii_iiii", "ldrb", LoadLiteral, V6T2),
    op!(b"1111_1000_1001_nnnn_tttt_iiii_iiii_iiii", "ldrb", LoadStoreImm12, V6T2),
    op!(b"1111_1000_0001_nnnn_tttt_1110_iiii_iiii", "ldrbt", LoadStoreUnprivileged, V6T2),
    op!(b"1111_1000_0001_nnnn_tttt_1puw_iiii_iiii", "ldrb", LoadStoreImm8, V6T2),
    op!(b"1111_1000_0001_nnnn_tttt_0000_00ii_mmmm", "ldrb", LoadStoreRegister, V6T2),
    op!(b"1111_1001_u001_1111_tttt_iiii_iiii_iiii", "ldrsb", LoadLiteral, V6T2),
    op!(b"1111_1001_1001_nnnn_tttt_iiii_iiii_iiii", "ldrsb", LoadStoreImm12, V6T2),
    op!(b"1111_1001_0001_nnnn_tttt_1110_iiii_iiii", "ldrsbt", LoadStoreUnprivileged, V6T2),
    op!(b"1111_1001_0001_nnnn_tttt_1puw_iiii_iiii", "ldrsb", LoadStoreImm8, V6T2),
    op!(b"1111_1001_0001_nnnn_tttt_0000_00ii_mmmm", "ldrsb", LoadStoreRegister, V6T2),
    op!(b"1111_1000_u011_1111_tttt_iiii_iiii_iiii", "ldrh", LoadLiteral, V6T2),
    op!(b"1111_1000_1011_nnnn_tttt_iiii_iiii_iiii", "ldrh", LoadStoreImm12, V6T2),
    op!(b"1111_1000_0011_nnnn_tttt_1110_iiii_iiii", "ldrht", LoadStoreUnprivileged, V6T2),
    op!(b"1111_1000_0011_nnnn_tttt_1puw_iiii_iiii", "ldrh", LoadStoreImm8, V6T2),
    op!(b"1111_1000_0011_nnnn_tttt_0000_00ii_mmmm", "ldrh", LoadStoreRegister, V6T2),
    op!(b"1111_1001_u011_1111_tttt_iiii_iiii_iiii", "ldrsh", LoadLiteral, V6T2),
    op!(b"1111_1001_1011_nnnn_tttt_iiii_iiii_iiii", "ldrsh", LoadStoreImm12, V6T2),
    op!(b"1111_1001_0011_nnnn_tttt_1110_iiii_iiii", "ldrsht", LoadStoreUnprivileged, V6T2),
    op!(b"1111_1001_0011_nnnn_tttt_1puw_iiii_iiii", "ldrsh", LoadStoreImm8, V6T2),
    op!(b"1111_1001_0011_nnnn_tttt_0000_00ii_mmmm", "ldrsh", LoadStoreRegister, V6T2),
    op!(b"1111_1000_u101_1111_tttt_iiii_iiii_iiii", "ldr", LoadLiteral, V6T2),
    op!(b"1111_1000_1101_nnnn_tttt_iiii_iiii_iiii", "ldr", LoadStoreImm12, V6T2),
    op!(b"1111_1000_0101_nnnn_tttt_1110_iiii_iiii", "ldrt", LoadStoreUnprivileged, V6T2),
    op!(b"1111_1000_0101_nnnn_tttt_1puw_iiii_iiii", "ldr", LoadStoreImm8, V6T2),
    op!(b"1111_1000_0101_nnnn_tttt_0000_00ii_mmmm", "ldr", LoadStoreRegister, V6T2),
    // data processing, register
    op!(b"1111_1010_0tts_nnnn_1111_dddd_0000_mmmm", "", RegisterShift, V6T2),
    op!(b"1111_1010_0000_nnnn_1111_dddd_10rr_mmmm", "sxtah", ExtendAdd, V6T2),
    op!(b"1111_1010_0001_nnnn_1111_dddd_10rr_mmmm", "uxtah", ExtendAdd, V6T2),
    op!(b"1111_1010_0010_nnnn_1111_dddd_10rr_mmmm", "sxtab16", ExtendAdd, V6T2),
    op!(b"1111_1010_0011_nnnn_1111_dddd_10rr_mmmm", "uxtab16", ExtendAdd, V6T2),
    op!(b"1111_1010_0100_nnnn_1111_dddd_10rr_mmmm", "sxtab", ExtendAdd, V6T2),
    op!(b"1111_1010_0101_nnnn_1111_dddd_10rr_mmmm", "uxtab", ExtendAdd, V6T2),
    op!(b"1111_1010_1ooo_nnnn_1111_dddd_0000_mmmm", "s", ParallelAddSub, V6T2),
    op!(b"1111_1010_1ooo_nnnn_1111_dddd_0001_mmmm", "q", ParallelAddSub, V6T2),
    op!(b"1111_1010_1ooo_nnnn_1111_dddd_0010_mmmm", "sh", ParallelAddSub, V6T2),
    op!(b"1111_1010_1ooo_nnnn_1111_dddd_0100_mmmm", "u", ParallelAddSub, V6T2),
    op!(b"1111_1010_1ooo_nnnn_1111_dddd_0101_mmmm", "uq", ParallelAddSub, V6T2),
    op!(b"1111_1010_1ooo_nnnn_1111_dddd_0110_mmmm", "uh", ParallelAddSub, V6T2),
    op!(b"1111_1010_1000_nnnn_1111_dddd_1000_mmmm", "qadd", SaturatingArith, V6T2),
    op!(b"1111_1010_1000_nnnn_1111_dddd_1001_mmmm", "qdadd", SaturatingArith, V6T2),
    op!(b"1111_1010_1000_nnnn_1111_dddd_1010_mmmm", "qsub", SaturatingArith, V6T2),
    op!(b"1111_1010_1000_nnnn_1111_dddd_1011_mmmm", "qdsub", SaturatingArith, V6T2),
    op!(b"1111_1010_1001_xxxx_1111_dddd_1000_mmmm", "rev", Reverse, V6T2),
    op!(b"1111_1010_1001_xxxx_1111_dddd_1001_mmmm", "rev16", Reverse, V6T2),
    op!(b"1111_1010_1001_xxxx_1111_dddd_1010_mmmm", "rbit", Reverse, V6T2),
    op!(b"1111_1010_1001_xxxx_1111_dddd_1011_mmmm", "revsh", Reverse, V6T2),
    op!(b"1111_1010_1010_nnnn_1111_dddd_1000_mmmm", "sel", Select, V6T2),
    op!(b"1111_1010_1011_xxxx_1111_dddd_1000_mmmm", "clz", CountLeadingZeros, V6T2),
    // multiply
    op!(b"1111_1011_0000_nnnn_1111_dddd_0000_mmmm", "mul", Multiply, V6T2),
    op!(b"1111_1011_0000_nnnn_aaaa_dddd_0000_mmmm", "mla", Multiply, V6T2),
    op!(b"1111_1011_0000_nnnn_aaaa_dddd_0001_mmmm", "mls", Multiply, V6T2),
    op!(b"1111_1011_0001_nnnn_aaaa_dddd_00nm_mmmm", "smla", MultiplyHalfword, V6T2),
    op!(b"1111_1011_0010_nnnn_aaaa_dddd_000x_mmmm", "smlad", DualMultiply, V6T2),
    op!(b"1111_1011_0011_nnnn_aaaa_dddd_000m_mmmm", "smlaw", MultiplyWordHalf, V6T2),
    op!(b"1111_1011_0100_nnnn_aaaa_dddd_000x_mmmm", "smlsd", DualMultiply, V6T2),
    op!(b"1111_1011_0101_nnnn_aaaa_dddd_000r_mmmm", "smmla", MostSignificantMultiply, V6T2),
    op!(b"1111_1011_0110_nnnn_aaaa_dddd_000r_mmmm", "smmls", MostSignificantMultiply, V6T2),
    op!(b"1111_1011_0111_nnnn_aaaa_dddd_0000_mmmm", "usada8", SumAbsoluteDifference, V6T2),
    op!(b"1111_1011_1000_nnnn_llll_hhhh_0000_mmmm", "smull", MultiplyLong, V6T2),
    op!(b"1111_1011_1001_nnnn_1111_dddd_1111_mmmm", "sdiv", Divide, V7),
    op!(b"1111_1011_1010_nnnn_llll_hhhh_0000_mmmm", "umull", MultiplyLong, V6T2),
    op!(b"1111_1011_1011_nnnn_1111_dddd_1111_mmmm", "udiv", Divide, V7),
    op!(b"1111_1011_1100_nnnn_llll_hhhh_0000_mmmm", "smlal", MultiplyLong, V6T2),
    op!(b"1111_1011_1100_nnnn_llll_hhhh_10nm_mmmm", "smlal", MultiplyLongHalfword, V6T2),
    op!(b"1111_1011_1100_nnnn_llll_hhhh_110x_mmmm", "smlald", DualMultiplyLong, V6T2),
    op!(b"1111_1011_1101_nnnn_llll_hhhh_110x_mmmm", "smlsld", DualMultiplyLong, V6T2),
    op!(b"1111_1011_1110_nnnn_llll_hhhh_0000_mmmm", "umlal", MultiplyLong, V6T2),
    op!(b"1111_1011_1110_nnnn_llll_hhhh_0110_mmmm", "umaal", MultiplyLong, V6T2),
];

/// The Thumb-2 encoding table in priority order.
pub fn table() -> EncodingTable<'static, Thumb2Tag> {
    EncodingTable::new(THUMB2_ENTRIES)
}

pub(crate) fn decode(state: &DecodeState) -> Option<Formatted> {
    match table().lookup(state.word, state.arch) {
        Lookup::Found(entry) => format(entry.tag, entry.stem, state),
        Lookup::Nop(_) => Some(Mnemonic::new("nop").suffix(".w").into()),
        Lookup::Gated(_) | Lookup::Undefined => None,
    }
}

fn rd(w: u32) -> Reg {
    reg_at(w, 8)
}

fn rn(w: u32) -> Reg {
    reg_at(w, 16)
}

fn rt(w: u32) -> Reg {
    reg_at(w, 12)
}

fn rm(w: u32) -> Reg {
    reg_at(w, 0)
}

/// Rewrites a coprocessor or Advanced SIMD word into its ARM layout.
fn arm_form(tag: Thumb2Tag, w: u32) -> u32 {
    match tag {
        NeonDataProcessing => (w & 0x00FF_FFFF) | 0xF200_0000 | (bits(w, 28, 28) << 24),
        NeonLoadStore => (w & 0x00FF_FFFF) | 0xF400_0000,
        _ if bit(w, 28) => (w & 0x0FFF_FFFF) | 0xF000_0000,
        _ => (w & 0x0FFF_FFFF) | 0xE000_0000,
    }
}

fn format(tag: Thumb2Tag, stem: &'static str, state: &DecodeState) -> Option<Formatted> {
    let w = state.word;
    let m = match tag {
        Undefined => return None,
        NeonDataProcessing | NeonLoadStore | Coprocessor => {
            return arm::decode(&state.with_word(arm_form(tag, w)));
        }
        StoreReturnState => {
            let base = if bit(w, 21) {
                Operand::Writeback(Reg::SP)
            } else {
                Operand::Reg(Reg::SP)
            };
            Mnemonic::new(stem)
                .with(base)
                .with(Operand::SignedImm(bits(w, 4, 0) as i32))
        }
        ReturnFromException => {
            let base = if bit(w, 21) {
                Operand::Writeback(rn(w))
            } else {
                Operand::Reg(rn(w))
            };
            return Some(Formatted::jump(
                Mnemonic::new(stem).with(base),
                JumpTarget::link_register(true),
            ));
        }
        LoadStoreMultiple => return load_store_multiple(stem, w),
        StoreExclusive => match stem {
            "strex" => Mnemonic::new(stem)
                .reg(rd(w))
                .reg(rt(w))
                .mem(Memory::imm(rn(w), bits(w, 7, 0) * 4, true, Indexing::Offset)),
            "strexd" => Mnemonic::new(stem)
                .reg(rm(w))
                .reg(rt(w))
                .reg(rd(w))
                .mem(Memory::base(rn(w))),
            _ => Mnemonic::new(stem)
                .reg(rm(w))
                .reg(rt(w))
                .mem(Memory::base(rn(w))),
        },
        LoadExclusive => match stem {
            "ldrex" => Mnemonic::new(stem)
                .reg(rt(w))
                .mem(Memory::imm(rn(w), bits(w, 7, 0) * 4, true, Indexing::Offset)),
            "ldrexd" => Mnemonic::new(stem)
                .reg(rt(w))
                .reg(rd(w))
                .mem(Memory::base(rn(w))),
            _ => Mnemonic::new(stem).reg(rt(w)).mem(Memory::base(rn(w))),
        },
        TableBranch => {
            let shift = bit(w, 4).then_some((ShiftKind::Lsl, 1));
            Mnemonic::new(stem).mem(Memory::reg(rn(w), rm(w), true, shift, Indexing::Offset))
        }
        LoadStoreDual => {
            let indexing = Memory::indexing_from(bit(w, 24), bit(w, 21));
            Mnemonic::new(stem)
                .reg(rt(w))
                .reg(rd(w))
                .mem(Memory::imm(rn(w), bits(w, 7, 0) * 4, bit(w, 23), indexing))
        }
        ShiftedRegister => shifted_register(stem, w),
        Pack => {
            let (shift, amount) = thumb2_imm_shift(w);
            let m = Mnemonic::new(stem).reg(rd(w)).reg(rn(w)).reg(rm(w));
            if amount == 0 && shift == ShiftKind::Lsl {
                m
            } else {
                m.with(Operand::Shift(shift, amount))
            }
        }
        ModifiedImmediate => {
            let set_flags = bit(w, 20);
            let value = thumb_expand_imm(thumb2_imm12(w));
            match stem {
                "tst" | "teq" | "cmp" | "cmn" => {
                    Mnemonic::new(stem).suffix(".w").reg(rn(w)).imm(value)
                }
                "mov" | "mvn" => Mnemonic::conditional(stem, set_flags, "")
                    .suffix(".w")
                    .reg(rd(w))
                    .imm(value),
                _ => Mnemonic::conditional(stem, set_flags, "")
                    .suffix(".w")
                    .reg(rd(w))
                    .reg(rn(w))
                    .imm(value),
            }
        }
        WideImmediate => {
            let imm = thumb2_imm12(w);
            if rn(w).is_pc() {
                let base = state.address.wrapping_add(4) & !3;
                let target = if stem == "subw" {
                    base.wrapping_sub(imm)
                } else {
                    base.wrapping_add(imm)
                };
                Mnemonic::new("adr")
                    .reg(rd(w))
                    .with(Operand::Address(target))
            } else {
                Mnemonic::new(stem).reg(rd(w)).reg(rn(w)).imm(imm)
            }
        }
        MoveWide => Mnemonic::new(stem).reg(rd(w)).imm(thumb2_imm16(w)),
        Saturate => {
            let sat = bits(w, 4, 0) + if stem == "ssat" { 1 } else { 0 };
            let imm5 = (bits(w, 14, 12) << 2) | bits(w, 7, 6);
            let m = Mnemonic::new(stem)
                .reg(rd(w))
                .with(Operand::SignedImm(sat as i32))
                .reg(rn(w));
            match arm::imm_shift(bits(w, 21, 21) << 1, imm5) {
                Some((shift, amount)) => m.with(Operand::Shift(shift, amount)),
                None => m,
            }
        }
        Saturate16 => {
            let sat = bits(w, 3, 0) + if stem == "ssat16" { 1 } else { 0 };
            Mnemonic::new(stem)
                .reg(rd(w))
                .with(Operand::SignedImm(sat as i32))
                .reg(rn(w))
        }
        BitfieldExtract => {
            let lsb = (bits(w, 14, 12) << 2) | bits(w, 7, 6);
            let width = bits(w, 4, 0) + 1;
            if lsb + width > 32 {
                return None;
            }
            Mnemonic::new(stem)
                .reg(rd(w))
                .reg(rn(w))
                .with(Operand::SignedImm(lsb as i32))
                .with(Operand::SignedImm(width as i32))
        }
        BitfieldInsert => {
            let lsb = (bits(w, 14, 12) << 2) | bits(w, 7, 6);
            let msb = bits(w, 4, 0);
            if msb < lsb {
                return None;
            }
            let m = if rn(w).is_pc() {
                Mnemonic::new("bfc").reg(rd(w))
            } else {
                Mnemonic::new(stem).reg(rd(w)).reg(rn(w))
            };
            m.with(Operand::SignedImm(lsb as i32))
                .with(Operand::SignedImm((msb - lsb + 1) as i32))
        }
        Msr => {
            let fields = arm::psr_fields((bits(w, 20, 20) << 22) | (bits(w, 11, 8) << 16))?;
            Mnemonic::new(stem).text(fields).reg(rn(w))
        }
        Mrs => Mnemonic::new(stem)
            .reg(rd(w))
            .text(if bit(w, 20) { "spsr" } else { "cpsr" }),
        Hint => Mnemonic::new(stem).suffix(".w"),
        DebugHint => Mnemonic::new(stem).with(Operand::SignedImm(bits(w, 3, 0) as i32)),
        Cps => {
            // same fields as the ARM encoding, at different positions
            let arm_word = (bits(w, 10, 9) << 18)
                | (bits(w, 8, 8) << 17)
                | (bits(w, 7, 5) << 6)
                | bits(w, 4, 0);
            return arm::cps(arm_word);
        }
        Clrex => Mnemonic::new(stem),
        Barrier => arm::barrier(stem, bits(w, 3, 0)),
        BranchExchangeJazelle => {
            return Some(Formatted::jump(
                Mnemonic::new(stem).reg(rn(w)),
                JumpTarget::register(rn(w), true, false),
            ));
        }
        ExceptionReturn => {
            return Some(Formatted::jump(
                Mnemonic::new(stem)
                    .reg(Reg::PC)
                    .reg(Reg::LR)
                    .imm(bits(w, 7, 0)),
                JumpTarget::link_register(true),
            ));
        }
        SecureMonitorCall => Mnemonic::new(stem).imm(bits(w, 19, 16)),
        PermanentlyUndefined => Mnemonic::new(stem)
            .suffix(".w")
            .imm((bits(w, 19, 16) << 12) | bits(w, 11, 0)),
        ConditionalBranch => {
            let target = state
                .address
                .wrapping_add(4)
                .wrapping_add(thumb2_branch_offset(w, false) as u32);
            return Some(Formatted::jump(
                Mnemonic::conditional(stem, false, cond_suffix(bits(w, 25, 22)))
                    .suffix(".w")
                    .with(Operand::Address(target)),
                JumpTarget::address(target, false, false),
            ));
        }
        Branch | BranchLink => {
            let target = state
                .address
                .wrapping_add(4)
                .wrapping_add(thumb2_branch_offset(w, true) as u32);
            let m = if tag == Branch {
                Mnemonic::new(stem).suffix(".w")
            } else {
                Mnemonic::new(stem)
            };
            return Some(Formatted::jump(
                m.with(Operand::Address(target)),
                JumpTarget::address(target, true, tag == BranchLink),
            ));
        }
        BranchLinkExchange => {
            if bit(w, 0) {
                return None;
            }
            let base = state.address.wrapping_add(4) & !3;
            let target = base.wrapping_add(thumb2_branch_offset(w, true) as u32);
            return Some(Formatted::jump(
                Mnemonic::new(stem).with(Operand::Address(target)),
                JumpTarget::address(target, true, true),
            ));
        }
        LoadStoreImm12 | LoadStoreImm8 | LoadStoreUnprivileged | LoadStoreRegister
        | LoadLiteral => return load_store(tag, stem, w),
        PreloadImm12 => Mnemonic::new(stem).mem(Memory::imm(
            rn(w),
            bits(w, 11, 0),
            true,
            Indexing::Offset,
        )),
        PreloadImm8 => Mnemonic::new(stem).mem(Memory::imm(
            rn(w),
            bits(w, 7, 0),
            false,
            Indexing::Offset,
        )),
        PreloadRegister => Mnemonic::new(stem).mem(register_offset(w)),
        PreloadLiteral => Mnemonic::new(stem).mem(Memory::imm(
            Reg::PC,
            bits(w, 11, 0),
            bit(w, 23),
            Indexing::Offset,
        )),
        RegisterShift => {
            let shift = ShiftKind::from_type(bits(w, 22, 21));
            Mnemonic::conditional(shift.name(), bit(w, 20), "")
                .suffix(".w")
                .reg(rd(w))
                .reg(rn(w))
                .reg(rm(w))
        }
        ExtendAdd => arm::extend(stem, "", [rd(w), rn(w), rm(w)], bits(w, 5, 4)),
        ParallelAddSub => {
            let op = match bits(w, 22, 20) {
                0b000 => "add8",
                0b001 => "add16",
                0b010 => "asx",
                0b100 => "sub8",
                0b101 => "sub16",
                0b110 => "sax",
                _ => return None,
            };
            Mnemonic::new(format!("{}{}", stem, op))
                .reg(rd(w))
                .reg(rn(w))
                .reg(rm(w))
        }
        SaturatingArith => Mnemonic::new(stem).reg(rd(w)).reg(rm(w)).reg(rn(w)),
        Reverse | CountLeadingZeros => Mnemonic::new(stem).reg(rd(w)).reg(rm(w)),
        Select | Divide => Mnemonic::new(stem).reg(rd(w)).reg(rn(w)).reg(rm(w)),
        Multiply => {
            let m = Mnemonic::new(stem).reg(rd(w)).reg(rn(w)).reg(rm(w));
            if stem == "mul" {
                m
            } else {
                m.reg(rt(w))
            }
        }
        MultiplyHalfword => {
            let name = format!("{}{}", stem, halves(w));
            accumulate(&name, &name.replacen("smla", "smul", 1), w)
        }
        DualMultiply => {
            let x = if bit(w, 4) { "x" } else { "" };
            let multiply_only = if stem == "smlad" { "smuad" } else { "smusd" };
            accumulate(
                &format!("{}{}", stem, x),
                &format!("{}{}", multiply_only, x),
                w,
            )
        }
        MultiplyWordHalf => {
            let y = if bit(w, 4) { "t" } else { "b" };
            accumulate(&format!("smlaw{}", y), &format!("smulw{}", y), w)
        }
        MostSignificantMultiply => {
            let r = if bit(w, 4) { "r" } else { "" };
            let name = format!("{}{}", stem, r);
            if stem == "smmla" {
                accumulate(&name, &format!("smmul{}", r), w)
            } else {
                Mnemonic::new(name)
                    .reg(rd(w))
                    .reg(rn(w))
                    .reg(rm(w))
                    .reg(rt(w))
            }
        }
        SumAbsoluteDifference => accumulate(stem, "usad8", w),
        MultiplyLong => long_multiply(stem, w),
        MultiplyLongHalfword => long_multiply(&format!("{}{}", stem, halves(w)), w),
        DualMultiplyLong => {
            let x = if bit(w, 4) { "x" } else { "" };
            long_multiply(&format!("{}{}", stem, x), w)
        }
    };
    Some(m.into())
}

/// `bb`/`bt`/`tb`/`tt` from the N and M bits.
fn halves(w: u32) -> String {
    let pick = |n| if bit(w, n) { 't' } else { 'b' };
    [pick(5), pick(4)].iter().collect()
}

/// Accumulating multiply; `ra = pc` selects the plain multiply form.
fn accumulate(name: &str, multiply_only: &str, w: u32) -> Mnemonic {
    let ra = rt(w);
    if ra.is_pc() {
        Mnemonic::new(multiply_only).reg(rd(w)).reg(rn(w)).reg(rm(w))
    } else {
        Mnemonic::new(name)
            .reg(rd(w))
            .reg(rn(w))
            .reg(rm(w))
            .reg(ra)
    }
}

fn long_multiply(name: &str, w: u32) -> Mnemonic {
    Mnemonic::new(name)
        .reg(rt(w))
        .reg(rd(w))
        .reg(rn(w))
        .reg(rm(w))
}

fn shifted_register(stem: &str, w: u32) -> Mnemonic {
    let set_flags = bit(w, 20);
    let (shift, amount) = thumb2_imm_shift(w);
    let operand = if shift == ShiftKind::Lsl && amount == 0 {
        ShifterOperand::Register(rm(w))
    } else {
        ShifterOperand::ImmediateShift {
            rm: rm(w),
            shift,
            amount,
        }
    };
    match stem {
        "tst" | "teq" | "cmp" | "cmn" => {
            arm::push_shifter(Mnemonic::new(stem).suffix(".w").reg(rn(w)), operand)
        }
        "mov" => match operand {
            ShifterOperand::ImmediateShift {
                shift: ShiftKind::Rrx,
                ..
            } => Mnemonic::conditional("rrx", set_flags, "")
                .reg(rd(w))
                .reg(rm(w)),
            ShifterOperand::ImmediateShift { shift, amount, .. } => {
                Mnemonic::conditional(shift.name(), set_flags, "")
                    .suffix(".w")
                    .reg(rd(w))
                    .reg(rm(w))
                    .with(Operand::SignedImm(amount as i32))
            }
            _ => Mnemonic::conditional(stem, set_flags, "")
                .suffix(".w")
                .reg(rd(w))
                .reg(rm(w)),
        },
        "mvn" => arm::push_shifter(
            Mnemonic::conditional(stem, set_flags, "")
                .suffix(".w")
                .reg(rd(w)),
            operand,
        ),
        _ => arm::push_shifter(
            Mnemonic::conditional(stem, set_flags, "")
                .suffix(".w")
                .reg(rd(w))
                .reg(rn(w)),
            operand,
        ),
    }
}

fn register_offset(w: u32) -> Memory {
    let amount = bits(w, 5, 4);
    let shift = (amount != 0).then_some((ShiftKind::Lsl, amount));
    Memory::reg(rn(w), rm(w), true, shift, Indexing::Offset)
}

fn load_store(tag: Thumb2Tag, stem: &str, w: u32) -> Option<Formatted> {
    let target = rt(w);
    let base = rn(w);
    if base.is_pc() && stem.starts_with("str") {
        return None;
    }
    let mem = match tag {
        LoadStoreImm12 => Memory::imm(base, bits(w, 11, 0), true, Indexing::Offset),
        LoadStoreUnprivileged => Memory::imm(base, bits(w, 7, 0), true, Indexing::Offset),
        LoadStoreRegister => register_offset(w),
        LoadLiteral => Memory::imm(Reg::PC, bits(w, 11, 0), bit(w, 23), Indexing::Offset),
        _ => {
            let (pre, add, writeback) = (bit(w, 10), bit(w, 9), bit(w, 8));
            if !pre && !writeback {
                return None;
            }
            let imm8 = bits(w, 7, 0);
            let single = Operand::RegList {
                regs: vec![target],
                user: false,
            };
            if base == Reg::SP && imm8 == 4 && writeback {
                if stem == "str" && pre && !add {
                    return Some(Mnemonic::new("push").suffix(".w").with(single).into());
                }
                if stem == "ldr" && !pre && add {
                    let jump = target.is_pc().then(|| JumpTarget::link_register(true));
                    return Some(Formatted::jump_if(
                        Mnemonic::new("pop").suffix(".w").with(single),
                        jump,
                    ));
                }
            }
            Memory::imm(base, imm8, add, Memory::indexing_from(pre, writeback))
        }
    };
    let text = Mnemonic::new(stem).suffix(".w").reg(target).mem(mem);
    let jump = (stem == "ldr" && target.is_pc()).then(|| JumpTarget::link_register(true));
    Some(Formatted::jump_if(text, jump))
}

fn load_store_multiple(stem: &str, w: u32) -> Option<Formatted> {
    let list = bits(w, 15, 0);
    let load = stem.starts_with("ldm");
    // sp is never transferred; pc only by a load
    let forbidden = if load { 1 << 13 } else { (1 << 13) | (1 << 15) };
    if list == 0 || list & forbidden != 0 {
        return None;
    }
    let base = rn(w);
    let writeback = bit(w, 21);
    let regs = Operand::RegList {
        regs: register_list(list),
        user: false,
    };
    let text = match stem {
        "stmdb" if base == Reg::SP && writeback => Mnemonic::new("push").suffix(".w").with(regs),
        "ldm" if base == Reg::SP && writeback => Mnemonic::new("pop").suffix(".w").with(regs),
        _ => {
            let base = if writeback {
                Operand::Writeback(base)
            } else {
                Operand::Reg(base)
            };
            let name = if stem.ends_with("db") {
                Mnemonic::new(stem)
            } else {
                Mnemonic::new(stem).suffix(".w")
            };
            name.with(base).with(regs)
        }
    };
    let jump = (load && bit(list, 15)).then(|| JumpTarget::link_register(true));
    Some(Formatted::jump_if(text, jump))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArchVersion;
    use crate::decoder::JumpDestination;

    fn decode_at(word: u32, address: u32, arch: ArchVersion) -> Option<Formatted> {
        decode(&DecodeState::new(address, word, arch))
    }

    fn text(word: u32) -> String {
        decode_at(word, 0, ArchVersion::V7)
            .map(|f| f.text.render())
            .unwrap_or_else(|| "<invalid>".to_string())
    }

    #[test]
    fn test_wide_branches() {
        // BL +4 -> F000 F802
        let bl = decode_at(0xF000_F802, 0x1000, ArchVersion::V4T).unwrap();
        assert_eq!(bl.text.render(), "bl\t0x1008");
        let jump = bl.jump.unwrap();
        assert_eq!(jump.destination, JumpDestination::Address(0x1008));
        assert!(jump.is_subroutine_call);

        // B.W +0 -> F000 B800
        let b = decode_at(0xF000_B800, 0x1000, ArchVersion::V7).unwrap();
        assert_eq!(b.text.render(), "b.w\t0x1004");
        assert!(b.jump.unwrap().is_sole_destination);

        // BEQ.W +4 -> F000 8002
        let beq = decode_at(0xF000_8002, 0x1000, ArchVersion::V7).unwrap();
        assert_eq!(beq.text.render(), "beq.w\t0x1008");
        assert!(!beq.jump.unwrap().is_sole_destination);

        // BLX aligns the pc: (0x1006 & ~3) + 0
        let blx = decode_at(0xF000_E800, 0x1002, ArchVersion::V7).unwrap();
        assert_eq!(blx.text.render(), "blx\t0x1004");
        // odd H bit is undefined for BLX -> F000 E801
        assert!(decode_at(0xF000_E801, 0, ArchVersion::V7).is_none());

        // backwards BL: S=1, all ones -> F7FF FFFE is bl to self
        let back = decode_at(0xF7FF_FFFE, 0x2000, ArchVersion::V7).unwrap();
        assert_eq!(back.text.render(), "bl\t0x2000");
    }

    #[test]
    fn test_version_gating() {
        // B.W needs Thumb-2
        assert!(decode_at(0xF000_B800, 0, ArchVersion::V6).is_none());
        // SDIV R0, R1, R2 -> FB91 F0F2
        assert!(decode_at(0xFB91_F0F2, 0, ArchVersion::V6T2).is_none());
        assert_eq!(text(0xFB91_F0F2), "sdiv\tr0, r1, r2");
        // DMB SY -> F3BF 8F5F
        assert!(decode_at(0xF3BF_8F5F, 0, ArchVersion::V6T2).is_none());
        assert_eq!(text(0xF3BF_8F5F), "dmb\tsy");
        assert_eq!(text(0xF3BF_8F4F), "dsb\tsy");
    }

    #[test]
    fn test_hints() {
        // NOP.W -> F3AF 8000
        assert_eq!(text(0xF3AF_8000), "nop.w");
        // WFI.W -> F3AF 8003, a nop before v7
        assert_eq!(text(0xF3AF_8003), "wfi.w");
        let early = decode_at(0xF3AF_8003, 0, ArchVersion::V6T2).unwrap();
        assert_eq!(early.text.render(), "nop.w");
        // CPSID I -> F3AF 8640
        assert_eq!(text(0xF3AF_8640), "cpsid\ti");
    }

    #[test]
    fn test_data_processing() {
        // MOV.W R0, #1 -> F04F 0001
        assert_eq!(text(0xF04F_0001), "mov.w\tr0, #1");
        // ORR R0, R1, #0x00FF00FF -> F041 10FF
        assert_eq!(text(0xF041_10FF), "orr.w\tr0, r1, #0xff00ff");
        // CMP R3, #0x10 -> F1B3 0F10
        assert_eq!(text(0xF1B3_0F10), "cmp.w\tr3, #0x10");
        // ADDS.W R0, R1, R2, LSL #2 -> EB11 0082
        assert_eq!(text(0xEB11_0082), "adds.w\tr0, r1, r2, lsl #2");
        // MOV.W R0, R1, LSR #3 prints as LSR.W -> EA4F 00D1
        assert_eq!(text(0xEA4F_00D1), "lsr.w\tr0, r1, #3");
        // MOVW R0, #0x1234 -> F241 2034
        assert_eq!(text(0xF241_2034), "movw\tr0, #0x1234");
        // ADDW R0, R1, #0xFFF -> F601 70FF
        assert_eq!(text(0xF601_70FF), "addw\tr0, r1, #0xfff");
        // ADR R0, +8 at 0x1002 -> F20F 0008
        let adr = decode_at(0xF20F_0008, 0x1002, ArchVersion::V7).unwrap();
        assert_eq!(adr.text.render(), "adr\tr0, 0x100c");
        // UBFX R0, R1, #4, #8 -> F3C1 1007
        assert_eq!(text(0xF3C1_1007), "ubfx\tr0, r1, #4, #8");
        // BFC R0, #0, #8 -> F36F 0007
        assert_eq!(text(0xF36F_0007), "bfc\tr0, #0, #8");
        // LSLS.W R0, R1, R2 -> FA11 F002
        assert_eq!(text(0xFA11_F002), "lsls.w\tr0, r1, r2");
        // UXTB R0, R1 -> FA5F F081
        assert_eq!(text(0xFA5F_F081), "uxtb\tr0, r1");
        // UADD8 R0, R1, R2 -> FA81 F042
        assert_eq!(text(0xFA81_F042), "uadd8\tr0, r1, r2");
        // CLZ R0, R1 -> FAB1 F081
        assert_eq!(text(0xFAB1_F081), "clz\tr0, r1");
    }

    #[test]
    fn test_multiplies() {
        // MUL R0, R1, R2 -> FB01 F002
        assert_eq!(text(0xFB01_F002), "mul\tr0, r1, r2");
        // MLA R0, R1, R2, R3 -> FB01 3002
        assert_eq!(text(0xFB01_3002), "mla\tr0, r1, r2, r3");
        // SMULBB R0, R1, R2 -> FB11 F002
        assert_eq!(text(0xFB11_F002), "smulbb\tr0, r1, r2");
        // UMULL R0, R1, R2, R3 -> FBA2 0103
        assert_eq!(text(0xFBA2_0103), "umull\tr0, r1, r2, r3");
    }

    #[test]
    fn test_loads_and_stores() {
        // LDR.W R0, [R1, #8] -> F8D1 0008
        assert_eq!(text(0xF8D1_0008), "ldr.w\tr0, [r1, #8]");
        // LDR.W R0, [PC, #8] -> F8DF 0008
        assert_eq!(text(0xF8DF_0008), "ldr.w\tr0, [pc, #8]");
        // STR.W R0, [R1, #-4]! -> F841 0D04
        assert_eq!(text(0xF841_0D04), "str.w\tr0, [r1, #-4]!");
        // LDRB.W R0, [R1, R2, LSL #1] -> F811 0012
        assert_eq!(text(0xF811_0012), "ldrb.w\tr0, [r1, r2, lsl #1]");
        // LDRD R0, R1, [SP, #8] -> E9DD 0102
        assert_eq!(text(0xE9DD_0102), "ldrd\tr0, r1, [sp, #8]");
        // LDREX R0, [R1] -> E851 0F00
        assert_eq!(text(0xE851_0F00), "ldrex\tr0, [r1]");
        // STREX R2, R0, [R1] -> E841 0200
        assert_eq!(text(0xE841_0200), "strex\tr2, r0, [r1]");
        // stores never address from pc
        assert_eq!(text(0xF8CF_A04D), "<invalid>");
        assert_eq!(text(0xF84F_0D04), "<invalid>");
        assert_eq!(text(0xF80F_0002), "<invalid>");
        // PLD [R0, #64] -> F890 F040
        assert_eq!(text(0xF890_F040), "pld\t[r0, #64]");
        // P=0, W=0 in the 8-bit immediate form is undefined -> F851 0804
        assert_eq!(text(0xF851_0804), "<invalid>");
    }

    #[test]
    fn test_stack_and_multiple() {
        // PUSH.W {R4-R11, LR} -> E92D 4FF0
        assert_eq!(
            text(0xE92D_4FF0),
            "push.w\t{r4, r5, r6, r7, r8, r9, r10, r11, lr}"
        );
        // POP.W {R4, PC} -> E8BD 8010
        let pop = decode_at(0xE8BD_8010, 0, ArchVersion::V7).unwrap();
        assert_eq!(pop.text.render(), "pop.w\t{r4, pc}");
        assert_eq!(pop.jump, Some(JumpTarget::link_register(true)));
        // LDR PC, [SP], #4 -> F85D FB04
        let single = decode_at(0xF85D_FB04, 0, ArchVersion::V7).unwrap();
        assert_eq!(single.text.render(), "pop.w\t{pc}");
        assert_eq!(single.jump, Some(JumpTarget::link_register(true)));
        // STMDB R0!, {R1, R2} -> E920 0006
        assert_eq!(text(0xE920_0006), "stmdb\tr0!, {r1, r2}");
        // LDM.W R0, {R1, R2} -> E890 0006
        assert_eq!(text(0xE890_0006), "ldm.w\tr0, {r1, r2}");
        // empty register list -> E890 0000
        assert_eq!(text(0xE890_0000), "<invalid>");
        // stmdb r5!, {r0, r6, r7, r8, r10, r11, pc}
        assert_eq!(text(0xE925_8DC1), "<invalid>");
        // stm.w r0, {r1, sp}
        assert_eq!(text(0xE880_2002), "<invalid>");
        // ldm.w r0, {r1, sp}
        assert_eq!(text(0xE890_2002), "<invalid>");
    }

    #[test]
    fn test_table_branch_and_exception_return() {
        // TBB [R0, R1] -> E8D0 F001
        let tbb = decode_at(0xE8D0_F001, 0, ArchVersion::V7).unwrap();
        assert_eq!(tbb.text.render(), "tbb\t[r0, r1]");
        assert!(tbb.jump.is_none());
        // TBH [R0, R1, LSL #1] -> E8D0 F011
        assert_eq!(text(0xE8D0_F011), "tbh\t[r0, r1, lsl #1]");
        // SUBS PC, LR, #4 -> F3DE 8F04
        let eret = decode_at(0xF3DE_8F04, 0, ArchVersion::V7).unwrap();
        assert_eq!(eret.text.render(), "subs\tpc, lr, #4");
        assert_eq!(eret.jump, Some(JumpTarget::link_register(true)));
    }

    #[test]
    fn test_system_registers() {
        // MRS R0, CPSR -> F3EF 8000
        assert_eq!(text(0xF3EF_8000), "mrs\tr0, cpsr");
        // MSR CPSR_fc, R0 -> F380 8900
        assert_eq!(text(0xF380_8900), "msr\tcpsr_fc, r0");
        // UDF.W #0x1234 -> F7F1 A234
        assert_eq!(text(0xF7F1_A234), "udf.w\t#0x1234");
    }

    #[test]
    fn test_arm_form_spaces() {
        // VADD.F32 S0, S1, S2 -> EE30 0A81
        assert_eq!(text(0xEE30_0A81), "vadd.f32\ts0, s1, s2");
        // MRC P15, #0, R0, C1, C0, #0 -> EE11 0F10
        assert_eq!(text(0xEE11_0F10), "mrc\tp15, #0, r0, c1, c0, #0");
        // VADD.I32 Q0, Q1, Q2 -> EF22 0844
        assert_eq!(text(0xEF22_0844), "vadd.i32\tq0, q1, q2");
        // VEOR D0, D1, D2 -> FF01 0112
        assert_eq!(text(0xFF01_0112), "veor\td0, d1, d2");
        // ldc2l and cdp2 naming p10/p11 have no unconditional form
        assert_eq!(text(0xFDFD_51BA), "<invalid>");
        assert_eq!(text(0xFEAA_1B2D), "<invalid>");
    }
}
