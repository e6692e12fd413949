// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Field extractors shared by the ARM, Thumb and Thumb-2 formatters.
//!
//! Everything here is a pure function of the opcode word. Thumb-2 words are
//! `(hw1 << 16) | hw2`, so a field documented as "hw2 bits 11:8" lives at word
//! bits 11:8 and "hw1 bits 3:0" at word bits 19:16.

use serde::Serialize;
use std::fmt;

#[inline]
pub fn bit(word: u32, n: u32) -> bool {
    (word >> n) & 1 != 0
}

/// Inclusive bit range `hi..=lo`, right-aligned.
#[inline]
pub fn bits(word: u32, hi: u32, lo: u32) -> u32 {
    let width = hi - lo + 1;
    if width >= 32 {
        word >> lo
    } else {
        (word >> lo) & ((1 << width) - 1)
    }
}

/// Sign-extends the low `width` bits of `value`.
#[inline]
pub fn sign_extend(value: u32, width: u32) -> i32 {
    let shift = 32 - width;
    ((value << shift) as i32) >> shift
}

/// A core register number (0-15).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reg(pub u8);

impl Reg {
    pub const SP: Reg = Reg(13);
    pub const LR: Reg = Reg(14);
    pub const PC: Reg = Reg(15);

    pub fn new(n: u32) -> Self {
        Reg((n & 0xF) as u8)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        register_name(self.0 as u32)
    }

    pub fn is_pc(self) -> bool {
        self == Reg::PC
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Reg {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

const REGISTER_NAMES: [&str; 16] = [
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "sp", "lr",
    "pc",
];

pub fn register_name(n: u32) -> &'static str {
    REGISTER_NAMES[(n & 0xF) as usize]
}

/// 4-bit register field starting at `lsb`.
#[inline]
pub fn reg_at(word: u32, lsb: u32) -> Reg {
    Reg::new(word >> lsb)
}

/// 3-bit low-register field starting at `lsb` (Thumb16).
#[inline]
pub fn low_reg_at(word: u32, lsb: u32) -> Reg {
    Reg::new((word >> lsb) & 0x7)
}

/// Condition code to UAL suffix. AL (14) and the unconditional space (15) are empty.
pub const CONDITION_SUFFIXES: [&str; 16] = [
    "eq", "ne", "cs", "cc", "mi", "pl", "vs", "vc", "hi", "ls", "ge", "lt", "gt", "le", "", "",
];

pub const COND_AL: u32 = 0xE;

pub fn cond_suffix(cond: u32) -> &'static str {
    CONDITION_SUFFIXES[(cond & 0xF) as usize]
}

/// Whether a condition field means "always executes".
pub fn is_unconditional(cond: u32) -> bool {
    cond & 0xF >= COND_AL
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftKind {
    Lsl,
    Lsr,
    Asr,
    Ror,
    Rrx,
}

impl ShiftKind {
    /// The two-bit `type` field as used by register-shifted forms (no RRX).
    pub fn from_type(type_bits: u32) -> Self {
        match type_bits & 3 {
            0 => ShiftKind::Lsl,
            1 => ShiftKind::Lsr,
            2 => ShiftKind::Asr,
            _ => ShiftKind::Ror,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShiftKind::Lsl => "lsl",
            ShiftKind::Lsr => "lsr",
            ShiftKind::Asr => "asr",
            ShiftKind::Ror => "ror",
            ShiftKind::Rrx => "rrx",
        }
    }
}

/// DecodeImmShift: a zero amount means 32 for LSR/ASR and RRX for ROR.
pub fn decode_imm_shift(type_bits: u32, imm5: u32) -> (ShiftKind, u32) {
    match type_bits & 3 {
        0 => (ShiftKind::Lsl, imm5),
        1 => (ShiftKind::Lsr, if imm5 == 0 { 32 } else { imm5 }),
        2 => (ShiftKind::Asr, if imm5 == 0 { 32 } else { imm5 }),
        _ if imm5 == 0 => (ShiftKind::Rrx, 1),
        _ => (ShiftKind::Ror, imm5),
    }
}

/// ARM data-processing immediate: 8-bit value rotated right by twice the
/// 4-bit rotate field.
pub fn arm_expand_imm(imm12: u32) -> u32 {
    let imm8 = imm12 & 0xFF;
    let rotate = (imm12 >> 8) & 0xF;
    imm8.rotate_right(rotate * 2)
}

/// Thumb-2 modified immediate (ThumbExpandImm).
pub fn thumb_expand_imm(imm12: u32) -> u32 {
    let imm12 = imm12 & 0xFFF;
    let imm8 = imm12 & 0xFF;
    if imm12 >> 10 == 0 {
        match (imm12 >> 8) & 3 {
            0 => imm8,
            1 => (imm8 << 16) | imm8,
            2 => (imm8 << 24) | (imm8 << 8),
            _ => (imm8 << 24) | (imm8 << 16) | (imm8 << 8) | imm8,
        }
    } else {
        let unrotated = 0x80 | (imm12 & 0x7F);
        unrotated.rotate_right(imm12 >> 7)
    }
}

/// Second operand of an ARM data-processing instruction (bits 25 and 11:0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShifterOperand {
    Immediate(u32),
    Register(Reg),
    ImmediateShift {
        rm: Reg,
        shift: ShiftKind,
        amount: u32,
    },
    RegisterShift {
        rm: Reg,
        shift: ShiftKind,
        rs: Reg,
    },
}

pub fn arm_shifter_operand(word: u32) -> ShifterOperand {
    if bit(word, 25) {
        return ShifterOperand::Immediate(arm_expand_imm(word & 0xFFF));
    }
    let rm = reg_at(word, 0);
    let type_bits = bits(word, 6, 5);
    if bit(word, 4) {
        return ShifterOperand::RegisterShift {
            rm,
            shift: ShiftKind::from_type(type_bits),
            rs: reg_at(word, 8),
        };
    }
    let (shift, amount) = decode_imm_shift(type_bits, bits(word, 11, 7));
    if shift == ShiftKind::Lsl && amount == 0 {
        ShifterOperand::Register(rm)
    } else {
        ShifterOperand::ImmediateShift { rm, shift, amount }
    }
}

/// Thumb-2 shifted-register operand: type at hw2 5:4, imm3:imm2 at hw2 14:12, 7:6.
pub fn thumb2_imm_shift(word: u32) -> (ShiftKind, u32) {
    let imm5 = (bits(word, 14, 12) << 2) | bits(word, 7, 6);
    decode_imm_shift(bits(word, 5, 4), imm5)
}

/// ARM B/BL offset: imm24 sign-extended and scaled by 4.
pub fn arm_branch_offset(word: u32) -> i32 {
    sign_extend(word & 0x00FF_FFFF, 24) << 2
}

/// Thumb-2 branch offset assembly.
///
/// Unconditional forms (B T4, BL, BLX) use S:I1:I2:imm10:imm11 where
/// `I = NOT(J XOR S)`; the conditional form (B T3) uses S:J2:J1:imm6:imm11.
pub fn thumb2_branch_offset(word: u32, unconditional: bool) -> i32 {
    let s = bits(word, 26, 26);
    let j1 = bits(word, 13, 13);
    let j2 = bits(word, 11, 11);
    let imm11 = bits(word, 10, 0);
    if unconditional {
        let i1 = !(j1 ^ s) & 1;
        let i2 = !(j2 ^ s) & 1;
        let imm10 = bits(word, 25, 16);
        let raw = (s << 24) | (i1 << 23) | (i2 << 22) | (imm10 << 12) | (imm11 << 1);
        sign_extend(raw, 25)
    } else {
        let imm6 = bits(word, 21, 16);
        let raw = (s << 20) | (j2 << 19) | (j1 << 18) | (imm6 << 12) | (imm11 << 1);
        sign_extend(raw, 21)
    }
}

/// Thumb-2 `i:imm3:imm8` (12 bits).
pub fn thumb2_imm12(word: u32) -> u32 {
    (bits(word, 26, 26) << 11) | (bits(word, 14, 12) << 8) | bits(word, 7, 0)
}

/// Thumb-2 `imm4:i:imm3:imm8` (MOVW/MOVT).
pub fn thumb2_imm16(word: u32) -> u32 {
    (bits(word, 19, 16) << 12) | thumb2_imm12(word)
}

/// ARM `imm4:imm12` (MOVW/MOVT).
pub fn arm_imm16(word: u32) -> u32 {
    (bits(word, 19, 16) << 12) | bits(word, 11, 0)
}

/// ARM extra load/store split immediate `imm4H:imm4L`.
pub fn split_imm8(word: u32) -> u32 {
    (bits(word, 11, 8) << 4) | bits(word, 3, 0)
}

/// Registers named by a bit mask, lowest first.
pub fn register_list(mask: u32) -> Vec<Reg> {
    (0..16).filter(|&n| bit(mask, n)).map(Reg::new).collect()
}

/// Floating-point / SIMD register bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VKind {
    Single,
    Double,
    Quad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VReg {
    pub kind: VKind,
    pub number: u8,
}

impl VReg {
    pub fn single(number: u32) -> Self {
        VReg {
            kind: VKind::Single,
            number: (number & 0x1F) as u8,
        }
    }

    pub fn double(number: u32) -> Self {
        VReg {
            kind: VKind::Double,
            number: (number & 0x1F) as u8,
        }
    }

    pub fn quad(number: u32) -> Self {
        VReg {
            kind: VKind::Quad,
            number: (number & 0xF) as u8,
        }
    }
}

impl fmt::Display for VReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            VKind::Single => 's',
            VKind::Double => 'd',
            VKind::Quad => 'q',
        };
        write!(f, "{}{}", prefix, self.number)
    }
}

/// VFP register from a 4-bit field at `lsb` plus the extra bit at `extra`.
/// Singles are `field:extra`, doubles are `extra:field`.
pub fn vfp_reg(word: u32, lsb: u32, extra: u32, double: bool) -> VReg {
    let field = bits(word, lsb + 3, lsb);
    let x = bits(word, extra, extra);
    if double {
        VReg::double((x << 4) | field)
    } else {
        VReg::single((field << 1) | x)
    }
}

/// Advanced SIMD register: `extra:field` selects one of 32 doublewords; a quad
/// names the even/odd doubleword pair, so its number is half the doubleword number.
/// An odd doubleword number in a quad position is undefined.
pub fn neon_reg(word: u32, lsb: u32, extra: u32, quad: bool) -> Option<VReg> {
    let d = (bits(word, extra, extra) << 4) | bits(word, lsb + 3, lsb);
    match (quad, d & 1) {
        (true, 1) => None,
        (true, _) => Some(VReg::quad(d >> 1)),
        (false, _) => Some(VReg::double(d)),
    }
}

/// VFPExpandImm for an 8-bit `abcdefgh` immediate.
pub fn vfp_expand_imm(imm8: u32, double: bool) -> f64 {
    let a = (imm8 >> 7) & 1;
    let b = (imm8 >> 6) & 1;
    let cdefgh = imm8 & 0x3F;
    if double {
        let exp = ((b ^ 1) << 10) | (if b == 1 { 0xFF } else { 0 } << 2) | ((cdefgh >> 4) & 3);
        let frac = ((cdefgh & 0xF) as u64) << 48;
        f64::from_bits(((a as u64) << 63) | ((exp as u64) << 52) | frac)
    } else {
        let exp = ((b ^ 1) << 7) | (if b == 1 { 0x1F } else { 0 } << 2) | ((cdefgh >> 4) & 3);
        let frac = (cdefgh & 0xF) << 19;
        f32::from_bits((a << 31) | (exp << 23) | frac) as f64
    }
}

/// AdvSIMDExpandImm. Returns `None` for the reserved `op=1, cmode=1111` form.
pub fn adv_simd_expand_imm(op: u32, cmode: u32, imm8: u32) -> Option<u64> {
    let imm8 = (imm8 & 0xFF) as u64;
    let rep2 = |v: u64| (v << 32) | v;
    let rep4 = |v: u64| (v << 48) | (v << 32) | (v << 16) | v;
    let value = match (cmode >> 1) & 7 {
        0b000 => rep2(imm8),
        0b001 => rep2(imm8 << 8),
        0b010 => rep2(imm8 << 16),
        0b011 => rep2(imm8 << 24),
        0b100 => rep4(imm8),
        0b101 => rep4(imm8 << 8),
        0b110 => {
            if cmode & 1 == 0 {
                rep2((imm8 << 8) | 0xFF)
            } else {
                rep2((imm8 << 16) | 0xFFFF)
            }
        }
        _ => match (cmode & 1, op & 1) {
            (0, 0) => imm8 * 0x0101_0101_0101_0101,
            (0, _) => (0..8).fold(0u64, |acc, i| {
                if (imm8 >> i) & 1 != 0 {
                    acc | (0xFF << (i * 8))
                } else {
                    acc
                }
            }),
            (_, 0) => {
                let single = (vfp_expand_imm(imm8 as u32, false) as f32).to_bits() as u64;
                rep2(single)
            }
            _ => return None,
        },
    };
    Some(value)
}
