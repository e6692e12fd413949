// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! ARM (A32) encoding table and formatters.
//!
//! The table follows the ARMv7 encoding index: the unconditional `1111` space
//! first (closed off by a catch-all), then hints and status moves, the
//! miscellaneous and multiply spaces, data processing, load/store, media,
//! branches and block transfers, and finally VFP ahead of the generic
//! coprocessor forms. Thumb-2 coprocessor, VFP and Advanced SIMD words are
//! rewritten into this form and decoded here as well.

use super::bits::{
    arm_branch_offset, arm_expand_imm, arm_imm16, arm_shifter_operand, bit, bits, cond_suffix, decode_imm_shift,
    is_unconditional, reg_at, register_list, split_imm8, Reg, ShiftKind, ShifterOperand,
};
use super::operand::{Indexing, Memory, Mnemonic, Operand};
use super::simd::{self, NeonTag, VfpTag};
use super::table::{op, EncodingTable, Entry, Lookup};
use super::{DecodeState, Formatted, JumpTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmTag {
    Undefined,
    Cps,
    Setend,
    Preload,
    PreloadReg,
    Clrex,
    Barrier,
    ReturnFromException,
    StoreReturnState,
    BranchLinkExchangeImm,
    Hint,
    DebugHint,
    MsrImm,
    MoveWide,
    Mrs,
    MsrReg,
    BranchExchange,
    CountLeadingZeros,
    SaturatingArith,
    Breakpoint,
    SecureMonitorCall,
    MultiplyHalfword,
    Multiply,
    Swap,
    StoreExclusive,
    LoadExclusive,
    ExtraLoadStore,
    DataProcessing,
    LoadStore,
    LoadStoreReg,
    ParallelAddSub,
    Pack,
    Saturate,
    Saturate16,
    ExtendAdd,
    Select,
    Reverse,
    DualMultiply,
    DualMultiplyLong,
    MostSignificantMultiply,
    Divide,
    SumAbsoluteDifference,
    BitfieldExtract,
    BitfieldInsert,
    PermanentlyUndefined,
    Branch,
    LoadStoreMultiple,
    SupervisorCall,
    CoprocData,
    CoprocMove,
    CoprocMoveDouble,
    CoprocLoadStore,
    Vfp(VfpTag),
    Neon(NeonTag),
}

use ArmTag::*;

static ARM_ENTRIES: &[Entry<ArmTag>] = &[
    // Unconditional space
    op!(b"1111_0001_0000_iim0_0000_000a_if0m_mmmm", "cps", Cps, V6),
    op!(b"1111_0001_0000_0001_0000_00e0_0000_0000", "setend", Setend, V6),
    op!(b"1111_0100_u101_nnnn_1111_iiii_iiii_iiii", "pli", Preload, V7),
    op!(b"1111_0101_u101_nnnn_1111_iiii_iiii_iiii", "pld", Preload, V5TE),
    op!(b"1111_0101_u001_nnnn_1111_iiii_iiii_iiii", "pldw", Preload, V7),
    op!(b"1111_0110_u101_nnnn_1111_iiii_itt0_mmmm", "pli", PreloadReg, V7),
    op!(b"1111_0111_u101_nnnn_1111_iiii_itt0_mmmm", "pld", PreloadReg, V5TE),
    op!(b"1111_0111_u001_nnnn_1111_iiii_itt0_mmmm", "pldw", PreloadReg, V7),
    op!(b"1111_0101_0111_1111_1111_0000_0001_1111", "clrex", Clrex, V6K),
    op!(b"1111_0101_0111_1111_1111_0000_0100_oooo", "dsb", Barrier, V7),
    op!(b"1111_0101_0111_1111_1111_0000_0101_oooo", "dmb", Barrier, V7),
    op!(b"1111_0101_0111_1111_1111_0000_0110_oooo", "isb", Barrier, V7),
    op!(b"1111_001u_1d00_0iii_dddd_cccc_0qo1_iiii", "vmov", Neon(NeonTag::ModifiedImmediate), V7),
    op!(b"1111_001u_1dii_iiii_dddd_oooo_lqm1_mmmm", "vshr", Neon(NeonTag::ShiftImmediate), V7),
    op!(b"1111_0010_1d11_nnnn_dddd_iiii_nqm0_mmmm", "vext", Neon(NeonTag::Extract), V7),
    op!(b"1111_0011_1d11_ssoo_dddd_0ooo_oqm0_mmmm", "vrev", Neon(NeonTag::TwoRegMisc), V7),
    op!(b"1111_0011_1d11_nnnn_dddd_10ll_nxm0_mmmm", "vtbl", Neon(NeonTag::TableLookup), V7),
    op!(b"1111_0011_1d11_iiii_dddd_1100_0qm0_mmmm", "vdup", Neon(NeonTag::DupScalar), V7),
    op!(b"1111_0011_1x11_xxxx_xxxx_xxxx_xxx0_xxxx", "", Undefined),
    op!(b"1111_001u_1dss_nnnn_dddd_oooo_n0m0_mmmm", "vaddl", Neon(NeonTag::ThreeRegDiff), V7),
    op!(b"1111_001u_1dss_nnnn_dddd_oooo_n1m0_mmmm", "vmla", Neon(NeonTag::TwoRegScalar), V7),
    op!(b"1111_001u_0dss_nnnn_dddd_oooo_nqmo_mmmm", "vadd", Neon(NeonTag::ThreeRegSame), V7),
    op!(b"1111_0100_0dl0_nnnn_dddd_tttt_ssaa_mmmm", "vld", Neon(NeonTag::LoadStoreMultiple), V7),
    op!(b"1111_0100_1dl0_nnnn_dddd_ssnn_aaaa_mmmm", "vld", Neon(NeonTag::LoadStoreLane), V7),
    op!(b"1111_100p_u1w0_1101_0000_0101_000m_mmmm", "srs", StoreReturnState, V6),
    op!(b"1111_100p_u0w1_nnnn_0000_1010_0000_0000", "rfe", ReturnFromException, V6),
    op!(b"1111_101h_iiii_iiii_iiii_iiii_iiii_iiii", "blx", BranchLinkExchangeImm, V5),
    // p10/p11 belong to the floating-point space, which has no unconditional forms
    op!(b"1111_110x_xxxx_xxxx_xxxx_101x_xxxx_xxxx", "", Undefined),
    op!(b"1111_1110_xxxx_xxxx_xxxx_101x_xxxx_xxxx", "", Undefined),
    op!(b"1111_1100_0100_tttt_tttt_pppp_oooo_mmmm", "mcrr2", CoprocMoveDouble, V6),
    op!(b"1111_1100_0101_tttt_tttt_pppp_oooo_mmmm", "mrrc2", CoprocMoveDouble, V6),
    op!(b"1111_110p_udw0_nnnn_dddd_pppp_iiii_iiii", "stc2", CoprocLoadStore, V5),
    op!(b"1111_110p_udw1_nnnn_dddd_pppp_iiii_iiii", "ldc2", CoprocLoadStore, V5),
    op!(b"1111_1110_oooo_nnnn_dddd_pppp_ooo0_mmmm", "cdp2", CoprocData, V5),
    op!(b"1111_1110_ooo0_nnnn_tttt_pppp_ooo1_mmmm", "mcr2", CoprocMove, V5),
    op!(b"1111_1110_ooo1_nnnn_tttt_pppp_ooo1_mmmm", "mrc2", CoprocMove, V5),
    op!(b"1111_xxxx_xxxx_xxxx_xxxx_xxxx_xxxx_xxxx", "", Undefined),
    // Hints, then MSR (immediate) and the 16-bit immediate moves
    op!(b"cccc_0011_0010_0000_1111_0000_0000_0000", "nop", Hint, hint V6K, V4),
    op!(b"cccc_0011_0010_0000_1111_0000_0000_0001", "yield", Hint, hint V6K, V4),
    op!(b"cccc_0011_0010_0000_1111_0000_0000_0010", "wfe", Hint, hint V6K, V4),
    op!(b"cccc_0011_0010_0000_1111_0000_0000_0011", "wfi", Hint, hint V6K, V4),
    op!(b"cccc_0011_0010_0000_1111_0000_0000_0100", "sev", Hint, hint V6K, V4),
    op!(b"cccc_0011_0010_0000_1111_0000_1111_oooo", "dbg", DebugHint, hint V7, V4),
    op!(b"cccc_0011_0010_0000_1111_0000_xxxx_xxxx", "nop", Hint, hint V6K, V4),
    op!(b"cccc_0011_0r10_mmmm_1111_iiii_iiii_iiii", "msr", MsrImm),
    op!(b"cccc_0011_0000_iiii_dddd_iiii_iiii_iiii", "movw", MoveWide, V6T2),
    op!(b"cccc_0011_0100_iiii_dddd_iiii_iiii_iiii", "movt", MoveWide, V6T2),
    // Miscellaneous
    op!(b"cccc_0001_0r00_1111_dddd_0000_0000_0000", "mrs", Mrs),
    op!(b"cccc_0001_0r10_mmmm_1111_0000_0000_nnnn", "msr", MsrReg),
    op!(b"cccc_0001_0010_1111_1111_1111_0001_mmmm", "bx", BranchExchange, V4T),
    op!(b"cccc_0001_0010_1111_1111_1111_0010_mmmm", "bxj", BranchExchange, V5TE),
    op!(b"cccc_0001_0010_1111_1111_1111_0011_mmmm", "blx", BranchExchange, V5),
    op!(b"cccc_0001_0110_1111_dddd_1111_0001_mmmm", "clz", CountLeadingZeros, V5),
    op!(b"cccc_0001_0000_nnnn_dddd_0000_0101_mmmm", "qadd", SaturatingArith, V5TE),
    op!(b"cccc_0001_0010_nnnn_dddd_0000_0101_mmmm", "qsub", SaturatingArith, V5TE),
    op!(b"cccc_0001_0100_nnnn_dddd_0000_0101_mmmm", "qdadd", SaturatingArith, V5TE),
    op!(b"cccc_0001_0110_nnnn_dddd_0000_0101_mmmm", "qdsub", SaturatingArith, V5TE),
    op!(b"1110_0001_0010_iiii_iiii_iiii_0111_iiii", "bkpt", Breakpoint, V5),
    op!(b"cccc_0001_0110_0000_0000_0000_0111_iiii", "smc", SecureMonitorCall, V6K),
    op!(b"cccc_0001_0000_dddd_aaaa_mmmm_1yx0_nnnn", "smla", MultiplyHalfword, V5TE),
    op!(b"cccc_0001_0010_dddd_aaaa_mmmm_1y00_nnnn", "smlaw", MultiplyHalfword, V5TE),
    op!(b"cccc_0001_0010_dddd_0000_mmmm_1y10_nnnn", "smulw", MultiplyHalfword, V5TE),
    op!(b"cccc_0001_0100_hhhh_llll_mmmm_1yx0_nnnn", "smlal", MultiplyHalfword, V5TE),
    op!(b"cccc_0001_0110_dddd_0000_mmmm_1yx0_nnnn", "smul", MultiplyHalfword, V5TE),
    // Multiply and synchronization primitives
    op!(b"cccc_0000_000s_dddd_0000_mmmm_1001_nnnn", "mul", Multiply),
    op!(b"cccc_0000_001s_dddd_aaaa_mmmm_1001_nnnn", "mla", Multiply),
    op!(b"cccc_0000_0100_hhhh_llll_mmmm_1001_nnnn", "umaal", Multiply, V6),
    op!(b"cccc_0000_0110_dddd_aaaa_mmmm_1001_nnnn", "mls", Multiply, V6T2),
    op!(b"cccc_0000_100s_hhhh_llll_mmmm_1001_nnnn", "umull", Multiply),
    op!(b"cccc_0000_101s_hhhh_llll_mmmm_1001_nnnn", "umlal", Multiply),
    op!(b"cccc_0000_110s_hhhh_llll_mmmm_1001_nnnn", "smull", Multiply),
    op!(b"cccc_0000_111s_hhhh_llll_mmmm_1001_nnnn", "smlal", Multiply),
    op!(b"cccc_0001_0000_nnnn_tttt_0000_1001_mmmm", "swp", Swap),
    op!(b"cccc_0001_0100_nnnn_tttt_0000_1001_mmmm", "swpb", Swap),
    op!(b"cccc_0001_1000_nnnn_dddd_1111_1001_tttt", "strex", StoreExclusive, V6),
    op!(b"cccc_0001_1001_nnnn_tttt_1111_1001_1111", "ldrex", LoadExclusive, V6),
    op!(b"cccc_0001_1010_nnnn_dddd_1111_1001_tttt", "strexd", StoreExclusive, V6K),
    op!(b"cccc_0001_1011_nnnn_tttt_1111_1001_1111", "ldrexd", LoadExclusive, V6K),
    op!(b"cccc_0001_1100_nnnn_dddd_1111_1001_tttt", "strexb", StoreExclusive, V6K),
    op!(b"cccc_0001_1101_nnnn_tttt_1111_1001_1111", "ldrexb", LoadExclusive, V6K),
    op!(b"cccc_0001_1110_nnnn_dddd_1111_1001_tttt", "strexh", StoreExclusive, V6K),
    op!(b"cccc_0001_1111_nnnn_tttt_1111_1001_1111", "ldrexh", LoadExclusive, V6K),
    // Extra load/store: unprivileged forms ahead of the general ones
    op!(b"cccc_0000_ui10_nnnn_tttt_iiii_1011_mmmm", "strht", ExtraLoadStore, V6T2),
    op!(b"cccc_0000_ui11_nnnn_tttt_iiii_1011_mmmm", "ldrht", ExtraLoadStore, V6T2),
    op!(b"cccc_0000_ui11_nnnn_tttt_iiii_1101_mmmm", "ldrsbt", ExtraLoadStore, V6T2),
    op!(b"cccc_0000_ui11_nnnn_tttt_iiii_1111_mmmm", "ldrsht", ExtraLoadStore, V6T2),
    op!(b"cccc_000p_uiw0_nnnn_tttt_iiii_1011_mmmm", "strh", ExtraLoadStore),
    op!(b"cccc_000p_uiw1_nnnn_tttt_iiii_1011_mmmm", "ldrh", ExtraLoadStore),
    op!(b"cccc_000p_uiw0_nnnn_tttt_iiii_1101_mmmm", "ldrd", ExtraLoadStore, V5TE),
    op!(b"cccc_000p_uiw1_nnnn_tttt_iiii_1101_mmmm", "ldrsb", ExtraLoadStore),
    op!(b"cccc_000p_uiw0_nnnn_tttt_iiii_1111_mmmm", "strd", ExtraLoadStore, V5TE),
    op!(b"cccc_000p_uiw1_nnnn_tttt_iiii_1111_mmmm", "ldrsh", ExtraLoadStore),
    // Data processing (immediate)
    op!(b"cccc_0010_000s_nnnn_dddd_iiii_iiii_iiii", "and", DataProcessing),
    op!(b"cccc_0010_001s_nnnn_dddd_iiii_iiii_iiii", "eor", DataProcessing),
    op!(b"cccc_0010_010s_nnnn_dddd_iiii_iiii_iiii", "sub", DataProcessing),
    op!(b"cccc_0010_011s_nnnn_dddd_iiii_iiii_iiii", "rsb", DataProcessing),
    op!(b"cccc_0010_100s_nnnn_dddd_iiii_iiii_iiii", "add", DataProcessing),
    op!(b"cccc_0010_101s_nnnn_dddd_iiii_iiii_iiii", "adc", DataProcessing),
    op!(b"cccc_0010_110s_nnnn_dddd_iiii_iiii_iiii", "sbc", DataProcessing),
    op!(b"cccc_0010_111s_nnnn_dddd_iiii_iiii_iiii", "rsc", DataProcessing),
    op!(b"cccc_0011_0001_nnnn_0000_iiii_iiii_iiii", "tst", DataProcessing),
    op!(b"cccc_0011_0011_nnnn_0000_iiii_iiii_iiii", "teq", DataProcessing),
    op!(b"cccc_0011_0101_nnnn_0000_iiii_iiii_iiii", "cmp", DataProcessing),
    op!(b"cccc_0011_0111_nnnn_0000_iiii_iiii_iiii", "cmn", DataProcessing),
    op!(b"cccc_0011_100s_nnnn_dddd_iiii_iiii_iiii", "orr", DataProcessing),
    op!(b"cccc_0011_101s_0000_dddd_iiii_iiii_iiii", "mov", DataProcessing),
    op!(b"cccc_0011_110s_nnnn_dddd_iiii_iiii_iiii", "bic", DataProcessing),
    op!(b"cccc_0011_111s_0000_dddd_iiii_iiii_iiii", "mvn", DataProcessing),
    // Data processing (register)
    op!(b"cccc_0000_000s_nnnn_dddd_iiii_itt0_mmmm", "and", DataProcessing),
    op!(b"cccc_0000_001s_nnnn_dddd_iiii_itt0_mmmm", "eor", DataProcessing),
    op!(b"cccc_0000_010s_nnnn_dddd_iiii_itt0_mmmm", "sub", DataProcessing),
    op!(b"cccc_0000_011s_nnnn_dddd_iiii_itt0_mmmm", "rsb", DataProcessing),
    op!(b"cccc_0000_100s_nnnn_dddd_iiii_itt0_mmmm", "add", DataProcessing),
    op!(b"cccc_0000_101s_nnnn_dddd_iiii_itt0_mmmm", "adc", DataProcessing),
    op!(b"cccc_0000_110s_nnnn_dddd_iiii_itt0_mmmm", "sbc", DataProcessing),
    op!(b"cccc_0000_111s_nnnn_dddd_iiii_itt0_mmmm", "rsc", DataProcessing),
    op!(b"cccc_0001_0001_nnnn_0000_iiii_itt0_mmmm", "tst", DataProcessing),
    op!(b"cccc_0001_0011_nnnn_0000_iiii_itt0_mmmm", "teq", DataProcessing),
    op!(b"cccc_0001_0101_nnnn_0000_iiii_itt0_mmmm", "cmp", DataProcessing),
    op!(b"cccc_0001_0111_nnnn_0000_iiii_itt0_mmmm", "cmn", DataProcessing),
    op!(b"cccc_0001_100s_nnnn_dddd_iiii_itt0_mmmm", "orr", DataProcessing),
    op!(b"cccc_0001_101s_0000_dddd_iiii_itt0_mmmm", "mov", DataProcessing),
    op!(b"cccc_0001_110s_nnnn_dddd_iiii_itt0_mmmm", "bic", DataProcessing),
    op!(b"cccc_0001_111s_0000_dddd_iiii_itt0_mmmm", "mvn", DataProcessing),
    // Data processing (register-shifted register)
    op!(b"cccc_0000_000s_nnnn_dddd_ssss_0tt1_mmmm", "and", DataProcessing),
    op!(b"cccc_0000_001s_nnnn_dddd_ssss_0tt1_mmmm", "eor", DataProcessing),
    op!(b"cccc_0000_010s_nnnn_dddd_ssss_0tt1_mmmm", "sub", DataProcessing),
    op!(b"cccc_0000_011s_nnnn_dddd_ssss_0tt1_mmmm", "rsb", DataProcessing),
    op!(b"cccc_0000_100s_nnnn_dddd_ssss_0tt1_mmmm", "add", DataProcessing),
    op!(b"cccc_0000_101s_nnnn_dddd_ssss_0tt1_mmmm", "adc", DataProcessing),
    op!(b"cccc_0000_110s_nnnn_dddd_ssss_0tt1_mmmm", "sbc", DataProcessing),
    op!(b"cccc_0000_111s_nnnn_dddd_ssss_0tt1_mmmm", "rsc", DataProcessing),
    op!(b"cccc_0001_0001_nnnn_0000_ssss_0tt1_mmmm", "tst", DataProcessing),
    op!(b"cccc_0001_0011_nnnn_0000_ssss_0tt1_mmmm", "teq", DataProcessing),
    op!(b"cccc_0001_0101_nnnn_0000_ssss_0tt1_mmmm", "cmp", DataProcessing),
    op!(b"cccc_0001_0111_nnnn_0000_ssss_0tt1_mmmm", "cmn", DataProcessing),
    op!(b"cccc_0001_100s_nnnn_dddd_ssss_0tt1_mmmm", "orr", DataProcessing),
    op!(b"cccc_0001_101s_0000_dddd_ssss_0tt1_mmmm", "mov", DataProcessing),
    op!(b"cccc_0001_110s_nnnn_dddd_ssss_0tt1_mmmm", "bic", DataProcessing),
    op!(b"cccc_0001_111s_0000_dddd_ssss_0tt1_mmmm", "mvn", DataProcessing),
    // Load/store word and unsigned byte
    op!(b"cccc_0100_u010_nnnn_tttt_iiii_iiii_iiii", "strt", LoadStore),
    op!(b"cccc_0100_u011_nnnn_tttt_iiii_iiii_iiii", "ldrt", LoadStore),
    op!(b"cccc_0100_u110_nnnn_tttt_iiii_iiii_iiii", "strbt", LoadStore),
    op!(b"cccc_0100_u111_nnnn_tttt_iiii_iiii_iiii", "ldrbt", LoadStore),
    op!(b"cccc_010p_u0w0_nnnn_tttt_iiii_iiii_iiii", "str", LoadStore),
    op!(b"cccc_010p_u0w1_nnnn_tttt_iiii_iiii_iiii", "ldr", LoadStore),
    op!(b"cccc_010p_u1w0_nnnn_tttt_iiii_iiii_iiii", "strb", LoadStore),
    op!(b"cccc_010p_u1w1_nnnn_tttt_iiii_iiii_iiii", "ldrb", LoadStore),
    op!(b"cccc_0110_u010_nnnn_tttt_iiii_itt0_mmmm", "strt", LoadStoreReg),
    op!(b"cccc_0110_u011_nnnn_tttt_iiii_itt0_mmmm", "ldrt", LoadStoreReg),
    op!(b"cccc_0110_u110_nnnn_tttt_iiii_itt0_mmmm", "strbt", LoadStoreReg),
    op!(b"cccc_0110_u111_nnnn_tttt_iiii_itt0_mmmm", "ldrbt", LoadStoreReg),
    op!(b"cccc_011p_u0w0_nnnn_tttt_iiii_itt0_mmmm", "str", LoadStoreReg),
    op!(b"cccc_011p_u0w1_nnnn_tttt_iiii_itt0_mmmm", "ldr", LoadStoreReg),
    op!(b"cccc_011p_u1w0_nnnn_tttt_iiii_itt0_mmmm", "strb", LoadStoreReg),
    op!(b"cccc_011p_u1w1_nnnn_tttt_iiii_itt0_mmmm", "ldrb", LoadStoreReg),
    // Media
    op!(b"cccc_0110_0001_nnnn_dddd_1111_ooo1_mmmm", "s", ParallelAddSub, V6),
    op!(b"cccc_0110_0010_nnnn_dddd_1111_ooo1_mmmm", "q", ParallelAddSub, V6),
    op!(b"cccc_0110_0011_nnnn_dddd_1111_ooo1_mmmm", "sh", ParallelAddSub, V6),
    op!(b"cccc_0110_0101_nnnn_dddd_1111_ooo1_mmmm", "u", ParallelAddSub, V6),
    op!(b"cccc_0110_0110_nnnn_dddd_1111_ooo1_mmmm", "uq", ParallelAddSub, V6),
    op!(b"cccc_0110_0111_nnnn_dddd_1111_ooo1_mmmm", "uh", ParallelAddSub, V6),
    op!(b"cccc_0110_1000_nnnn_dddd_iiii_i001_mmmm", "pkhbt", Pack, V6),
    op!(b"cccc_0110_1000_nnnn_dddd_iiii_i101_mmmm", "pkhtb", Pack, V6),
    op!(b"cccc_0110_1000_nnnn_dddd_rr00_0111_mmmm", "sxtab16", ExtendAdd, V6),
    op!(b"cccc_0110_1010_nnnn_dddd_rr00_0111_mmmm", "sxtab", ExtendAdd, V6),
    op!(b"cccc_0110_1011_nnnn_dddd_rr00_0111_mmmm", "sxtah", ExtendAdd, V6),
    op!(b"cccc_0110_1100_nnnn_dddd_rr00_0111_mmmm", "uxtab16", ExtendAdd, V6),
    op!(b"cccc_0110_1110_nnnn_dddd_rr00_0111_mmmm", "uxtab", ExtendAdd, V6),
    op!(b"cccc_0110_1111_nnnn_dddd_rr00_0111_mmmm", "uxtah", ExtendAdd, V6),
    op!(b"cccc_0110_1000_nnnn_dddd_1111_1011_mmmm", "sel", Select, V6),
    op!(b"cccc_0110_1010_ssss_dddd_1111_0011_nnnn", "ssat16", Saturate16, V6),
    op!(b"cccc_0110_1110_ssss_dddd_1111_0011_nnnn", "usat16", Saturate16, V6),
    op!(b"cccc_0110_1011_1111_dddd_1111_0011_mmmm", "rev", Reverse, V6),
    op!(b"cccc_0110_1011_1111_dddd_1111_1011_mmmm", "rev16", Reverse, V6),
    op!(b"cccc_0110_1111_1111_dddd_1111_0011_mmmm", "rbit", Reverse, V6T2),
    op!(b"cccc_0110_1111_1111_dddd_1111_1011_mmmm", "revsh", Reverse, V6),
    op!(b"cccc_0110_101s_ssss_dddd_iiii_ih01_nnnn", "ssat", Saturate, V6),
    op!(b"cccc_0110_111s_ssss_dddd_iiii_ih01_nnnn", "usat", Saturate, V6),
    op!(b"cccc_0111_0000_dddd_aaaa_mmmm_00x1_nnnn", "smlad", DualMultiply, V6),
    op!(b"cccc_0111_0000_dddd_aaaa_mmmm_01x1_nnnn", "smlsd", DualMultiply, V6),
    op!(b"cccc_0111_0001_dddd_1111_mmmm_0001_nnnn", "sdiv", Divide, V7),
    op!(b"cccc_0111_0011_dddd_1111_mmmm_0001_nnnn", "udiv", Divide, V7),
    op!(b"cccc_0111_0100_hhhh_llll_mmmm_00x1_nnnn", "smlald", DualMultiplyLong, V6),
    op!(b"cccc_0111_0100_hhhh_llll_mmmm_01x1_nnnn", "smlsld", DualMultiplyLong, V6),
    op!(b"cccc_0111_0101_dddd_aaaa_mmmm_00r1_nnnn", "smmla", MostSignificantMultiply, V6),
    op!(b"cccc_0111_0101_dddd_aaaa_mmmm_11r1_nnnn", "smmls", MostSignificantMultiply, V6),
    op!(b"cccc_0111_1000_dddd_aaaa_mmmm_0001_nnnn", "usada8", SumAbsoluteDifference, V6),
    op!(b"cccc_0111_101w_wwww_dddd_llll_l101_nnnn", "sbfx", BitfieldExtract, V6T2),
    op!(b"cccc_0111_111w_wwww_dddd_llll_l101_nnnn", "ubfx", BitfieldExtract, V6T2),
    op!(b"cccc_0111_110m_mmmm_dddd_llll_l001_nnnn", "bfi", BitfieldInsert, V6T2),
    op!(b"1110_0111_1111_iiii_iiii_iiii_1111_iiii", "udf", PermanentlyUndefined),
    // Branches, block transfer, supervisor call
    op!(b"cccc_1010_iiii_iiii_iiii_iiii_iiii_iiii", "b", Branch),
    op!(b"cccc_1011_iiii_iiii_iiii_iiii_iiii_iiii", "bl", Branch),
    op!(b"cccc_100p_usw0_nnnn_rrrr_rrrr_rrrr_rrrr", "stm", LoadStoreMultiple),
    op!(b"cccc_100p_usw1_nnnn_rrrr_rrrr_rrrr_rrrr", "ldm", LoadStoreMultiple),
    op!(b"cccc_1111_iiii_iiii_iiii_iiii_iiii_iiii", "svc", SupervisorCall),
    // VFP
    op!(b"cccc_1110_0d00_nnnn_dddd_101s_n0m0_mmmm", "vmla", Vfp(VfpTag::Arith), V5TE),
    op!(b"cccc_1110_0d00_nnnn_dddd_101s_n1m0_mmmm", "vmls", Vfp(VfpTag::Arith), V5TE),
    op!(b"cccc_1110_0d01_nnnn_dddd_101s_n0m0_mmmm", "vnmls", Vfp(VfpTag::Arith), V5TE),
    op!(b"cccc_1110_0d01_nnnn_dddd_101s_n1m0_mmmm", "vnmla", Vfp(VfpTag::Arith), V5TE),
    op!(b"cccc_1110_0d10_nnnn_dddd_101s_n0m0_mmmm", "vmul", Vfp(VfpTag::Arith), V5TE),
    op!(b"cccc_1110_0d10_nnnn_dddd_101s_n1m0_mmmm", "vnmul", Vfp(VfpTag::Arith), V5TE),
    op!(b"cccc_1110_0d11_nnnn_dddd_101s_n0m0_mmmm", "vadd", Vfp(VfpTag::Arith), V5TE),
    op!(b"cccc_1110_0d11_nnnn_dddd_101s_n1m0_mmmm", "vsub", Vfp(VfpTag::Arith), V5TE),
    op!(b"cccc_1110_1d00_nnnn_dddd_101s_n0m0_mmmm", "vdiv", Vfp(VfpTag::Arith), V5TE),
    op!(b"cccc_1110_1d01_nnnn_dddd_101s_n0m0_mmmm", "vfnms", Vfp(VfpTag::Arith), V7),
    op!(b"cccc_1110_1d01_nnnn_dddd_101s_n1m0_mmmm", "vfnma", Vfp(VfpTag::Arith), V7),
    op!(b"cccc_1110_1d10_nnnn_dddd_101s_n0m0_mmmm", "vfma", Vfp(VfpTag::Arith), V7),
    op!(b"cccc_1110_1d10_nnnn_dddd_101s_n1m0_mmmm", "vfms", Vfp(VfpTag::Arith), V7),
    op!(b"cccc_1110_1d11_iiii_dddd_101s_0000_iiii", "vmov", Vfp(VfpTag::MoveImmediate), V7),
    op!(b"cccc_1110_1d11_0000_dddd_101s_01m0_mmmm", "vmov", Vfp(VfpTag::Unary), V5TE),
    op!(b"cccc_1110_1d11_0000_dddd_101s_11m0_mmmm", "vabs", Vfp(VfpTag::Unary), V5TE),
    op!(b"cccc_1110_1d11_0001_dddd_101s_01m0_mmmm", "vneg", Vfp(VfpTag::Unary), V5TE),
    op!(b"cccc_1110_1d11_0001_dddd_101s_11m0_mmmm", "vsqrt", Vfp(VfpTag::Unary), V5TE),
    op!(b"cccc_1110_1d11_001o_dddd_1010_t1m0_mmmm", "vcvt", Vfp(VfpTag::ConvertHalf), V7),
    op!(b"cccc_1110_1d11_0100_dddd_101s_e1m0_mmmm", "vcmp", Vfp(VfpTag::Compare), V5TE),
    op!(b"cccc_1110_1d11_0101_dddd_101s_e100_0000", "vcmp", Vfp(VfpTag::CompareZero), V5TE),
    op!(b"cccc_1110_1d11_0111_dddd_101s_11m0_mmmm", "vcvt", Vfp(VfpTag::ConvertPrecision), V5TE),
    op!(b"cccc_1110_1d11_1000_dddd_101s_o1m0_mmmm", "vcvt", Vfp(VfpTag::ConvertFromInt), V5TE),
    op!(b"cccc_1110_1d11_110u_dddd_101s_r1m0_mmmm", "vcvt", Vfp(VfpTag::ConvertToInt), V5TE),
    op!(b"cccc_1110_1d11_1o1u_dddd_101s_x1i0_iiii", "vcvt", Vfp(VfpTag::ConvertFixed), V7),
    op!(b"cccc_1110_000o_nnnn_tttt_1010_n001_0000", "vmov", Vfp(VfpTag::MoveSingle), V5TE),
    op!(b"cccc_1110_1111_rrrr_tttt_1010_0001_0000", "vmrs", Vfp(VfpTag::SystemRegister), V5TE),
    op!(b"cccc_1110_1110_rrrr_tttt_1010_0001_0000", "vmsr", Vfp(VfpTag::SystemRegister), V5TE),
    op!(b"cccc_1110_0oo0_dddd_tttt_1011_doo1_0000", "vmov", Vfp(VfpTag::MoveToScalar), V5TE),
    op!(b"cccc_1110_uoo1_nnnn_tttt_1011_noo1_0000", "vmov", Vfp(VfpTag::MoveFromScalar), V5TE),
    op!(b"cccc_1110_1bq0_dddd_tttt_1011_d0e1_0000", "vdup", Vfp(VfpTag::DupCore), V7),
    op!(b"cccc_1100_010o_tttt_tttt_101s_00m1_mmmm", "vmov", Vfp(VfpTag::MoveDouble), V5TE),
    op!(b"cccc_1101_ud00_nnnn_dddd_101s_iiii_iiii", "vstr", Vfp(VfpTag::LoadStore), V5TE),
    op!(b"cccc_1101_ud01_nnnn_dddd_101s_iiii_iiii", "vldr", Vfp(VfpTag::LoadStore), V5TE),
    op!(b"cccc_110p_udw0_nnnn_dddd_101s_iiii_iiii", "vstm", Vfp(VfpTag::LoadStoreMultiple), V5TE),
    op!(b"cccc_110p_udw1_nnnn_dddd_101s_iiii_iiii", "vldm", Vfp(VfpTag::LoadStoreMultiple), V5TE),
    op!(b"cccc_110x_xxxx_xxxx_xxxx_101x_xxxx_xxxx", "", Undefined),
    op!(b"cccc_1110_xxxx_xxxx_xxxx_101x_xxxx_xxxx", "", Undefined),
    // Generic coprocessor
    op!(b"cccc_1100_0100_tttt_tttt_pppp_oooo_mmmm", "mcrr", CoprocMoveDouble, V5TE),
    op!(b"cccc_1100_0101_tttt_tttt_pppp_oooo_mmmm", "mrrc", CoprocMoveDouble, V5TE),
    op!(b"cccc_110p_udw0_nnnn_dddd_pppp_iiii_iiii", "stc", CoprocLoadStore),
    op!(b"cccc_110p_udw1_nnnn_dddd_pppp_iiii_iiii", "ldc", CoprocLoadStore),
    op!(b"cccc_1110_oooo_nnnn_dddd_pppp_ooo0_mmmm", "cdp", CoprocData),
    op!(b"cccc_1110_ooo0_nnnn_tttt_pppp_ooo1_mmmm", "mcr", CoprocMove),
    op!(b"cccc_1110_ooo1_nnnn_tttt_pppp_ooo1_mmmm", "mrc", CoprocMove),
];

/// The ARM encoding table in priority order.
pub fn table() -> EncodingTable<'static, ArmTag> {
    EncodingTable::new(ARM_ENTRIES)
}

pub(crate) fn decode(state: &DecodeState) -> Option<Formatted> {
    match table().lookup(state.word, state.arch) {
        Lookup::Found(entry) => format(entry.tag, entry.stem, state),
        Lookup::Nop(_) => Some(Mnemonic::conditional("nop", false, cond(state.word)).into()),
        Lookup::Gated(_) | Lookup::Undefined => None,
    }
}

#[inline]
fn cond(word: u32) -> &'static str {
    cond_suffix(bits(word, 31, 28))
}

#[inline]
fn always(word: u32) -> bool {
    is_unconditional(bits(word, 31, 28))
}

fn format(tag: ArmTag, stem: &'static str, state: &DecodeState) -> Option<Formatted> {
    let w = state.word;
    match tag {
        Undefined => None,
        Cps => cps(w),
        Setend => Some(
            Mnemonic::new("setend")
                .text(if bit(w, 9) { "be" } else { "le" })
                .into(),
        ),
        Preload => {
            let mem = Memory::imm(reg_at(w, 16), bits(w, 11, 0), bit(w, 23), Indexing::Offset);
            Some(Mnemonic::new(stem).mem(mem).into())
        }
        PreloadReg => {
            let mem = Memory::reg(
                reg_at(w, 16),
                reg_at(w, 0),
                bit(w, 23),
                imm_shift(bits(w, 6, 5), bits(w, 11, 7)),
                Indexing::Offset,
            );
            Some(Mnemonic::new(stem).mem(mem).into())
        }
        Clrex => Some(Mnemonic::new(stem).into()),
        Barrier => Some(barrier(stem, bits(w, 3, 0)).into()),
        StoreReturnState => {
            let name = format!("{}{}", stem, block_mode(bit(w, 24), bit(w, 23)));
            let sp = if bit(w, 21) {
                Operand::Writeback(Reg::SP)
            } else {
                Operand::Reg(Reg::SP)
            };
            Some(
                Mnemonic::new(name)
                    .with(sp)
                    .with(Operand::SignedImm(bits(w, 4, 0) as i32))
                    .into(),
            )
        }
        ReturnFromException => {
            let name = format!("{}{}", stem, block_mode(bit(w, 24), bit(w, 23)));
            let rn = reg_at(w, 16);
            let base = if bit(w, 21) {
                Operand::Writeback(rn)
            } else {
                Operand::Reg(rn)
            };
            Some(Formatted::jump(
                Mnemonic::new(name).with(base),
                JumpTarget::link_register(true),
            ))
        }
        BranchLinkExchangeImm => {
            let offset = arm_branch_offset(w) | ((bit(w, 24) as i32) << 1);
            let target = state.address.wrapping_add(8).wrapping_add(offset as u32);
            Some(Formatted::jump(
                Mnemonic::new(stem).with(Operand::Address(target)),
                JumpTarget::address(target, true, true),
            ))
        }
        Hint => Some(Mnemonic::conditional(stem, false, cond(w)).into()),
        DebugHint => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .with(Operand::SignedImm(bits(w, 3, 0) as i32))
                .into(),
        ),
        MsrImm => {
            let fields = psr_fields(w)?;
            Some(
                Mnemonic::conditional(stem, false, cond(w))
                    .text(fields)
                    .imm(arm_expand_imm(bits(w, 11, 0)))
                    .into(),
            )
        }
        MoveWide => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .reg(reg_at(w, 12))
                .imm(arm_imm16(w))
                .into(),
        ),
        Mrs => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .reg(reg_at(w, 12))
                .text(if bit(w, 22) { "spsr" } else { "cpsr" })
                .into(),
        ),
        MsrReg => {
            let fields = psr_fields(w)?;
            Some(
                Mnemonic::conditional(stem, false, cond(w))
                    .text(fields)
                    .reg(reg_at(w, 0))
                    .into(),
            )
        }
        BranchExchange => {
            let rm = reg_at(w, 0);
            Some(Formatted::jump(
                Mnemonic::conditional(stem, false, cond(w)).reg(rm),
                JumpTarget::register(rm, always(w), stem == "blx"),
            ))
        }
        CountLeadingZeros | Reverse => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .reg(reg_at(w, 12))
                .reg(reg_at(w, 0))
                .into(),
        ),
        SaturatingArith => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .reg(reg_at(w, 12))
                .reg(reg_at(w, 0))
                .reg(reg_at(w, 16))
                .into(),
        ),
        Breakpoint | PermanentlyUndefined => {
            let imm16 = (bits(w, 19, 8) << 4) | bits(w, 3, 0);
            Some(Mnemonic::new(stem).imm(imm16).into())
        }
        SecureMonitorCall => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .imm(bits(w, 3, 0))
                .into(),
        ),
        MultiplyHalfword => multiply_halfword(stem, w),
        Multiply => multiply(stem, w),
        Swap => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .reg(reg_at(w, 12))
                .reg(reg_at(w, 0))
                .mem(Memory::base(reg_at(w, 16)))
                .into(),
        ),
        StoreExclusive => {
            let rt = reg_at(w, 0);
            let mut m = Mnemonic::conditional(stem, false, cond(w))
                .reg(reg_at(w, 12))
                .reg(rt);
            if stem == "strexd" {
                m = m.reg(pair_of(rt)?);
            }
            Some(m.mem(Memory::base(reg_at(w, 16))).into())
        }
        LoadExclusive => {
            let rt = reg_at(w, 12);
            let mut m = Mnemonic::conditional(stem, false, cond(w)).reg(rt);
            if stem == "ldrexd" {
                m = m.reg(pair_of(rt)?);
            }
            Some(m.mem(Memory::base(reg_at(w, 16))).into())
        }
        ExtraLoadStore => extra_load_store(stem, w),
        DataProcessing => Some(data_processing(stem, state)),
        LoadStore => load_store(stem, w, false),
        LoadStoreReg => load_store(stem, w, true),
        ParallelAddSub => {
            let op = match bits(w, 7, 5) {
                0b000 => "add16",
                0b001 => "asx",
                0b010 => "sax",
                0b011 => "sub16",
                0b100 => "add8",
                0b111 => "sub8",
                _ => return None,
            };
            Some(
                Mnemonic::conditional(&format!("{}{}", stem, op), false, cond(w))
                    .reg(reg_at(w, 12))
                    .reg(reg_at(w, 16))
                    .reg(reg_at(w, 0))
                    .into(),
            )
        }
        Pack => {
            let imm5 = bits(w, 11, 7);
            let m = Mnemonic::conditional(stem, false, cond(w))
                .reg(reg_at(w, 12))
                .reg(reg_at(w, 16))
                .reg(reg_at(w, 0));
            let m = if stem == "pkhtb" {
                m.with(Operand::Shift(ShiftKind::Asr, if imm5 == 0 { 32 } else { imm5 }))
            } else if imm5 != 0 {
                m.with(Operand::Shift(ShiftKind::Lsl, imm5))
            } else {
                m
            };
            Some(m.into())
        }
        Saturate => {
            let sat = bits(w, 20, 16) + if stem == "ssat" { 1 } else { 0 };
            let imm5 = bits(w, 11, 7);
            let m = Mnemonic::conditional(stem, false, cond(w))
                .reg(reg_at(w, 12))
                .with(Operand::SignedImm(sat as i32))
                .reg(reg_at(w, 0));
            let m = if bit(w, 6) {
                m.with(Operand::Shift(ShiftKind::Asr, if imm5 == 0 { 32 } else { imm5 }))
            } else if imm5 != 0 {
                m.with(Operand::Shift(ShiftKind::Lsl, imm5))
            } else {
                m
            };
            Some(m.into())
        }
        Saturate16 => {
            let sat = bits(w, 19, 16) + if stem == "ssat16" { 1 } else { 0 };
            Some(
                Mnemonic::conditional(stem, false, cond(w))
                    .reg(reg_at(w, 12))
                    .with(Operand::SignedImm(sat as i32))
                    .reg(reg_at(w, 0))
                    .into(),
            )
        }
        ExtendAdd => Some(
            extend(
                stem,
                cond(w),
                [reg_at(w, 12), reg_at(w, 16), reg_at(w, 0)],
                bits(w, 11, 10),
            )
            .into(),
        ),
        Select => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .reg(reg_at(w, 12))
                .reg(reg_at(w, 16))
                .reg(reg_at(w, 0))
                .into(),
        ),
        DualMultiply => {
            let swap = if bit(w, 5) { "x" } else { "" };
            let ra = reg_at(w, 12);
            let (rd, rn, rm) = (reg_at(w, 16), reg_at(w, 0), reg_at(w, 8));
            if ra.is_pc() {
                let name = format!("smu{}{}", &stem[3..], swap);
                Some(Mnemonic::conditional(&name, false, cond(w)).reg(rd).reg(rn).reg(rm).into())
            } else {
                let name = format!("{}{}", stem, swap);
                Some(
                    Mnemonic::conditional(&name, false, cond(w))
                        .reg(rd)
                        .reg(rn)
                        .reg(rm)
                        .reg(ra)
                        .into(),
                )
            }
        }
        DualMultiplyLong => {
            let name = format!("{}{}", stem, if bit(w, 5) { "x" } else { "" });
            Some(
                Mnemonic::conditional(&name, false, cond(w))
                    .reg(reg_at(w, 12))
                    .reg(reg_at(w, 16))
                    .reg(reg_at(w, 0))
                    .reg(reg_at(w, 8))
                    .into(),
            )
        }
        MostSignificantMultiply => {
            let round = if bit(w, 5) { "r" } else { "" };
            let ra = reg_at(w, 12);
            let (rd, rn, rm) = (reg_at(w, 16), reg_at(w, 0), reg_at(w, 8));
            if stem == "smmla" && ra.is_pc() {
                let name = format!("smmul{}", round);
                Some(Mnemonic::conditional(&name, false, cond(w)).reg(rd).reg(rn).reg(rm).into())
            } else {
                let name = format!("{}{}", stem, round);
                Some(
                    Mnemonic::conditional(&name, false, cond(w))
                        .reg(rd)
                        .reg(rn)
                        .reg(rm)
                        .reg(ra)
                        .into(),
                )
            }
        }
        Divide => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .reg(reg_at(w, 16))
                .reg(reg_at(w, 0))
                .reg(reg_at(w, 8))
                .into(),
        ),
        SumAbsoluteDifference => {
            let ra = reg_at(w, 12);
            let name = if ra.is_pc() { "usad8" } else { stem };
            let mut m = Mnemonic::conditional(name, false, cond(w))
                .reg(reg_at(w, 16))
                .reg(reg_at(w, 0))
                .reg(reg_at(w, 8));
            if !ra.is_pc() {
                m = m.reg(ra);
            }
            Some(m.into())
        }
        BitfieldExtract => {
            let lsb = bits(w, 11, 7);
            let width = bits(w, 20, 16) + 1;
            if lsb + width > 32 {
                return None;
            }
            Some(
                Mnemonic::conditional(stem, false, cond(w))
                    .reg(reg_at(w, 12))
                    .reg(reg_at(w, 0))
                    .with(Operand::SignedImm(lsb as i32))
                    .with(Operand::SignedImm(width as i32))
                    .into(),
            )
        }
        BitfieldInsert => {
            let lsb = bits(w, 11, 7);
            let msb = bits(w, 20, 16);
            if msb < lsb {
                return None;
            }
            let rn = reg_at(w, 0);
            let name = if rn.is_pc() { "bfc" } else { stem };
            let mut m = Mnemonic::conditional(name, false, cond(w)).reg(reg_at(w, 12));
            if !rn.is_pc() {
                m = m.reg(rn);
            }
            Some(
                m.with(Operand::SignedImm(lsb as i32))
                    .with(Operand::SignedImm((msb - lsb + 1) as i32))
                    .into(),
            )
        }
        Branch => {
            let target = state
                .address
                .wrapping_add(8)
                .wrapping_add(arm_branch_offset(w) as u32);
            Some(Formatted::jump(
                Mnemonic::conditional(stem, false, cond(w)).with(Operand::Address(target)),
                JumpTarget::address(target, always(w), stem == "bl"),
            ))
        }
        LoadStoreMultiple => load_store_multiple(stem, w),
        SupervisorCall => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .imm(bits(w, 23, 0))
                .into(),
        ),
        CoprocData => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .text(format!("p{}", bits(w, 11, 8)))
                .imm(bits(w, 23, 20))
                .text(format!("c{}", bits(w, 15, 12)))
                .text(format!("c{}", bits(w, 19, 16)))
                .text(format!("c{}", bits(w, 3, 0)))
                .imm(bits(w, 7, 5))
                .into(),
        ),
        CoprocMove => {
            let rt = reg_at(w, 12);
            let rt_operand = if rt.is_pc() && stem.starts_with("mrc") {
                Operand::text("apsr_nzcv")
            } else {
                Operand::Reg(rt)
            };
            Some(
                Mnemonic::conditional(stem, false, cond(w))
                    .text(format!("p{}", bits(w, 11, 8)))
                    .imm(bits(w, 23, 21))
                    .with(rt_operand)
                    .text(format!("c{}", bits(w, 19, 16)))
                    .text(format!("c{}", bits(w, 3, 0)))
                    .imm(bits(w, 7, 5))
                    .into(),
            )
        }
        CoprocMoveDouble => Some(
            Mnemonic::conditional(stem, false, cond(w))
                .text(format!("p{}", bits(w, 11, 8)))
                .imm(bits(w, 7, 4))
                .reg(reg_at(w, 12))
                .reg(reg_at(w, 16))
                .text(format!("c{}", bits(w, 3, 0)))
                .into(),
        ),
        CoprocLoadStore => coproc_load_store(stem, w),
        Vfp(tag) => simd::format_vfp(tag, stem, w),
        Neon(tag) => simd::format_neon(tag, w),
    }
}

pub(crate) fn cps(w: u32) -> Option<Formatted> {
    let imod = bits(w, 19, 18);
    let change_mode = bit(w, 17);
    let mode = Operand::SignedImm(bits(w, 4, 0) as i32);
    let flags: String = [(8, 'a'), (7, 'i'), (6, 'f')]
        .iter()
        .filter(|(n, _)| bit(w, *n))
        .map(|(_, c)| *c)
        .collect();
    let m = match imod {
        0b10 | 0b11 => {
            if flags.is_empty() {
                return None;
            }
            let name = if imod == 0b10 { "cpsie" } else { "cpsid" };
            let m = Mnemonic::new(name).text(flags);
            if change_mode {
                m.with(mode)
            } else {
                m
            }
        }
        0b00 if change_mode => Mnemonic::new("cps").with(mode),
        _ => return None,
    };
    Some(m.into())
}

/// `dmb`/`dsb`/`isb` with their option name.
pub(crate) fn barrier(stem: &str, option: u32) -> Mnemonic {
    let name = match option {
        0b1111 => "sy",
        0b1110 => "st",
        0b1011 => "ish",
        0b1010 => "ishst",
        0b0111 => "nsh",
        0b0110 => "nshst",
        0b0011 => "osh",
        0b0010 => "oshst",
        _ => return Mnemonic::new(stem).imm(option),
    };
    Mnemonic::new(stem).text(name)
}

/// Addressing-mode suffix for block transfers from `P`/`U`.
pub(crate) fn block_mode(pre: bool, up: bool) -> &'static str {
    match (pre, up) {
        (false, false) => "da",
        (false, true) => "ia",
        (true, false) => "db",
        (true, true) => "ib",
    }
}

pub(crate) fn psr_fields(w: u32) -> Option<String> {
    let mask = bits(w, 19, 16);
    if mask == 0 {
        return None;
    }
    let mut fields = String::from(if bit(w, 22) { "spsr_" } else { "cpsr_" });
    for (n, c) in [(3, 'f'), (2, 's'), (1, 'x'), (0, 'c')] {
        if bit(mask, n) {
            fields.push(c);
        }
    }
    Some(fields)
}

/// Shift applied to an index register; a zero LSL means no shift.
pub(crate) fn imm_shift(type_bits: u32, imm5: u32) -> Option<(ShiftKind, u32)> {
    let (shift, amount) = decode_imm_shift(type_bits, imm5);
    if shift == ShiftKind::Lsl && amount == 0 {
        None
    } else {
        Some((shift, amount))
    }
}

/// Second register of an even/odd doubleword pair.
fn pair_of(rt: Reg) -> Option<Reg> {
    if rt.number() % 2 == 1 || rt == Reg::LR {
        None
    } else {
        Some(Reg(rt.number() + 1))
    }
}

pub(crate) fn push_shifter(m: Mnemonic, operand: ShifterOperand) -> Mnemonic {
    match operand {
        ShifterOperand::Immediate(value) => m.imm(value),
        ShifterOperand::Register(rm) => m.reg(rm),
        ShifterOperand::ImmediateShift { rm, shift, amount } => {
            m.reg(rm).with(Operand::Shift(shift, amount))
        }
        ShifterOperand::RegisterShift { rm, shift, rs } => {
            m.reg(rm).with(Operand::RegShift(shift, rs))
        }
    }
}

fn data_processing(stem: &str, state: &DecodeState) -> Formatted {
    let w = state.word;
    let opcode = bits(w, 24, 21);
    let set_flags = bit(w, 20);
    let rn = reg_at(w, 16);
    let rd = reg_at(w, 12);
    let c = cond(w);
    let operand2 = arm_shifter_operand(w);
    let is_compare = (0x8..=0xB).contains(&opcode);

    let text = match opcode {
        0x8..=0xB => push_shifter(Mnemonic::conditional(stem, false, c).reg(rn), operand2),
        0xD => match operand2 {
            ShifterOperand::ImmediateShift {
                rm,
                shift: ShiftKind::Rrx,
                ..
            } => Mnemonic::conditional("rrx", set_flags, c).reg(rd).reg(rm),
            ShifterOperand::ImmediateShift { rm, shift, amount } => {
                Mnemonic::conditional(shift.name(), set_flags, c)
                    .reg(rd)
                    .reg(rm)
                    .with(Operand::SignedImm(amount as i32))
            }
            ShifterOperand::RegisterShift { rm, shift, rs } => {
                Mnemonic::conditional(shift.name(), set_flags, c)
                    .reg(rd)
                    .reg(rm)
                    .reg(rs)
            }
            other => push_shifter(Mnemonic::conditional(stem, set_flags, c).reg(rd), other),
        },
        0xF => push_shifter(Mnemonic::conditional(stem, set_flags, c).reg(rd), operand2),
        0x2 | 0x4 if rn.is_pc() && !set_flags => match operand2 {
            ShifterOperand::Immediate(imm) => {
                let base = state.address.wrapping_add(8) & !3;
                let target = if opcode == 0x4 {
                    base.wrapping_add(imm)
                } else {
                    base.wrapping_sub(imm)
                };
                Mnemonic::conditional("adr", false, c)
                    .reg(rd)
                    .with(Operand::Address(target))
            }
            other => push_shifter(
                Mnemonic::conditional(stem, set_flags, c).reg(rd).reg(rn),
                other,
            ),
        },
        _ => push_shifter(
            Mnemonic::conditional(stem, set_flags, c).reg(rd).reg(rn),
            operand2,
        ),
    };

    let jump = (rd.is_pc() && !is_compare).then(|| JumpTarget::link_register(always(w)));
    Formatted::jump_if(text, jump)
}

fn load_store(stem: &str, w: u32, register: bool) -> Option<Formatted> {
    let pre = bit(w, 24);
    let add = bit(w, 23);
    let writeback = bit(w, 21);
    let rn = reg_at(w, 16);
    let rt = reg_at(w, 12);
    let c = cond(w);
    let indexing = if stem.ends_with('t') {
        Indexing::PostIndexed
    } else {
        Memory::indexing_from(pre, writeback)
    };
    let loads_pc = stem == "ldr" && rt.is_pc();
    let jump = loads_pc.then(|| JumpTarget::link_register(always(w)));

    let mem = if register {
        Memory::reg(
            rn,
            reg_at(w, 0),
            add,
            imm_shift(bits(w, 6, 5), bits(w, 11, 7)),
            indexing,
        )
    } else {
        let imm = bits(w, 11, 0);
        if rn == Reg::SP && imm == 4 {
            let single = Operand::RegList {
                regs: vec![rt],
                user: false,
            };
            if stem == "str" && pre && !add && writeback {
                return Some(Mnemonic::conditional("push", false, c).with(single).into());
            }
            if stem == "ldr" && !pre && add && !writeback {
                return Some(Formatted::jump_if(
                    Mnemonic::conditional("pop", false, c).with(single),
                    jump,
                ));
            }
        }
        Memory::imm(rn, imm, add, indexing)
    };

    Some(Formatted::jump_if(
        Mnemonic::conditional(stem, false, c).reg(rt).mem(mem),
        jump,
    ))
}

fn extra_load_store(stem: &str, w: u32) -> Option<Formatted> {
    let pre = bit(w, 24);
    let add = bit(w, 23);
    let immediate = bit(w, 22);
    let writeback = bit(w, 21);
    let rn = reg_at(w, 16);
    let rt = reg_at(w, 12);
    let unprivileged = stem.ends_with('t');
    let indexing = if unprivileged {
        Indexing::PostIndexed
    } else {
        Memory::indexing_from(pre, writeback)
    };
    let mem = if immediate {
        Memory::imm(rn, split_imm8(w), add, indexing)
    } else {
        Memory::reg(rn, reg_at(w, 0), add, None, indexing)
    };

    let mut m = Mnemonic::conditional(stem, false, cond(w)).reg(rt);
    if stem == "ldrd" || stem == "strd" {
        if !pre && writeback {
            return None;
        }
        m = m.reg(pair_of(rt)?);
    }
    Some(m.mem(mem).into())
}

fn load_store_multiple(stem: &str, w: u32) -> Option<Formatted> {
    let pre = bit(w, 24);
    let up = bit(w, 23);
    let user = bit(w, 22);
    let writeback = bit(w, 21);
    let rn = reg_at(w, 16);
    let list = bits(w, 15, 0);
    if list == 0 {
        return None;
    }
    let regs = register_list(list);
    let load = stem == "ldm";
    let c = cond(w);
    let jump = (load && bit(list, 15)).then(|| JumpTarget::link_register(always(w)));

    if !user && writeback && rn == Reg::SP && regs.len() > 1 {
        let alias = match (load, pre, up) {
            (true, false, true) => Some("pop"),
            (false, true, false) => Some("push"),
            _ => None,
        };
        if let Some(alias) = alias {
            return Some(Formatted::jump_if(
                Mnemonic::conditional(alias, false, c).with(Operand::RegList { regs, user }),
                jump,
            ));
        }
    }

    let mode = match block_mode(pre, up) {
        "ia" => "",
        other => other,
    };
    let base = if writeback {
        Operand::Writeback(rn)
    } else {
        Operand::Reg(rn)
    };
    Some(Formatted::jump_if(
        Mnemonic::conditional(&format!("{}{}", stem, mode), false, c)
            .with(base)
            .with(Operand::RegList { regs, user }),
        jump,
    ))
}

fn multiply_halfword(stem: &str, w: u32) -> Option<Formatted> {
    let half = |top: bool| if top { "t" } else { "b" };
    let x = half(bit(w, 5));
    let y = half(bit(w, 6));
    let (hi, lo, rm, rn) = (reg_at(w, 16), reg_at(w, 12), reg_at(w, 8), reg_at(w, 0));
    let c = cond(w);
    let m = match stem {
        "smla" => Mnemonic::conditional(&format!("smla{}{}", x, y), false, c)
            .reg(hi)
            .reg(rn)
            .reg(rm)
            .reg(lo),
        "smlaw" => Mnemonic::conditional(&format!("smlaw{}", y), false, c)
            .reg(hi)
            .reg(rn)
            .reg(rm)
            .reg(lo),
        "smulw" => Mnemonic::conditional(&format!("smulw{}", y), false, c)
            .reg(hi)
            .reg(rn)
            .reg(rm),
        "smlal" => Mnemonic::conditional(&format!("smlal{}{}", x, y), false, c)
            .reg(lo)
            .reg(hi)
            .reg(rn)
            .reg(rm),
        _ => Mnemonic::conditional(&format!("smul{}{}", x, y), false, c)
            .reg(hi)
            .reg(rn)
            .reg(rm),
    };
    Some(m.into())
}

fn multiply(stem: &str, w: u32) -> Option<Formatted> {
    let set_flags = bit(w, 20);
    let (hi, lo, rm, rn) = (reg_at(w, 16), reg_at(w, 12), reg_at(w, 8), reg_at(w, 0));
    let m = Mnemonic::conditional(stem, set_flags, cond(w));
    let m = match stem {
        "mul" => m.reg(hi).reg(rn).reg(rm),
        "mla" | "mls" => m.reg(hi).reg(rn).reg(rm).reg(lo),
        _ => m.reg(lo).reg(hi).reg(rn).reg(rm),
    };
    Some(m.into())
}

/// `sxtab`-family text; with `rn == pc` the accumulate form becomes `sxtb` and friends.
pub(crate) fn extend(stem: &str, c: &str, [rd, rn, rm]: [Reg; 3], rotate: u32) -> Mnemonic {
    let m = if rn.is_pc() {
        Mnemonic::conditional(&stem.replacen("xta", "xt", 1), false, c)
            .reg(rd)
            .reg(rm)
    } else {
        Mnemonic::conditional(stem, false, c).reg(rd).reg(rn).reg(rm)
    };
    if rotate != 0 {
        m.with(Operand::Shift(ShiftKind::Ror, rotate * 8))
    } else {
        m
    }
}

fn coproc_load_store(stem: &str, w: u32) -> Option<Formatted> {
    let pre = bit(w, 24);
    let add = bit(w, 23);
    let writeback = bit(w, 21);
    let rn = reg_at(w, 16);
    let imm8 = bits(w, 7, 0);
    let name = format!("{}{}", stem, if bit(w, 22) { "l" } else { "" });

    let address = if !pre && !writeback {
        if !add {
            return None;
        }
        Operand::text(format!("[{}], {{{}}}", rn, imm8))
    } else {
        Operand::Memory(Memory::imm(
            rn,
            imm8 * 4,
            add,
            Memory::indexing_from(pre, writeback),
        ))
    };
    Some(
        Mnemonic::conditional(&name, false, cond(w))
            .text(format!("p{}", bits(w, 11, 8)))
            .text(format!("c{}", bits(w, 15, 12)))
            .with(address)
            .into(),
    )
}
