// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! VFP and Advanced SIMD formatters.
//!
//! Both work on the ARM form of the word; Thumb-2 encodings are rewritten to
//! that form before they get here.

use super::bits::{
    adv_simd_expand_imm, bit, bits, cond_suffix, neon_reg, reg_at, vfp_expand_imm, vfp_reg, Reg,
    VReg,
};
use super::operand::{Indexing, Memory, Mnemonic, Operand};
use super::Formatted;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VfpTag {
    Arith,
    MoveImmediate,
    Unary,
    ConvertHalf,
    Compare,
    CompareZero,
    ConvertPrecision,
    ConvertFromInt,
    ConvertToInt,
    ConvertFixed,
    MoveSingle,
    SystemRegister,
    MoveToScalar,
    MoveFromScalar,
    DupCore,
    MoveDouble,
    LoadStore,
    LoadStoreMultiple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeonTag {
    ThreeRegSame,
    ThreeRegDiff,
    TwoRegScalar,
    ShiftImmediate,
    TwoRegMisc,
    ModifiedImmediate,
    Extract,
    TableLookup,
    DupScalar,
    LoadStoreMultiple,
    LoadStoreLane,
}

fn cond(w: u32) -> &'static str {
    cond_suffix(bits(w, 31, 28))
}

fn precision(double: bool) -> &'static str {
    if double {
        ".f64"
    } else {
        ".f32"
    }
}

fn vd(w: u32, double: bool) -> VReg {
    vfp_reg(w, 12, 22, double)
}

fn vn(w: u32, double: bool) -> VReg {
    vfp_reg(w, 16, 7, double)
}

fn vm(w: u32, double: bool) -> VReg {
    vfp_reg(w, 0, 5, double)
}

/// `{d0-d3}` style consecutive list used by `vldm`/`vstm`/`vpush`/`vpop`.
fn vfp_range(first: VReg, count: u32) -> Option<String> {
    let last = first.number as u32 + count - 1;
    if last > 31 {
        return None;
    }
    let last = VReg {
        number: last as u8,
        ..first
    };
    if count == 1 {
        Some(format!("{{{}}}", first))
    } else {
        Some(format!("{{{}-{}}}", first, last))
    }
}

/// Size and lane index for the core/scalar moves, from `opc1:opc2`.
fn scalar_lane(opc1: u32, opc2: u32) -> Option<(u32, u32)> {
    if opc1 & 0b10 != 0 {
        Some((8, ((opc1 & 1) << 2) | opc2))
    } else if opc2 & 1 != 0 {
        Some((16, ((opc1 & 1) << 1) | (opc2 >> 1)))
    } else if opc2 == 0 {
        Some((32, opc1 & 1))
    } else {
        None
    }
}

pub(crate) fn format_vfp(tag: VfpTag, stem: &str, w: u32) -> Option<Formatted> {
    let double = bit(w, 8);
    let c = cond(w);
    let m = match tag {
        VfpTag::Arith => Mnemonic::conditional(stem, false, c)
            .suffix(precision(double))
            .vreg(vd(w, double))
            .vreg(vn(w, double))
            .vreg(vm(w, double)),
        VfpTag::MoveImmediate => {
            let imm8 = (bits(w, 19, 16) << 4) | bits(w, 3, 0);
            Mnemonic::conditional(stem, false, c)
                .suffix(precision(double))
                .vreg(vd(w, double))
                .with(Operand::Float(vfp_expand_imm(imm8, double)))
        }
        VfpTag::Unary => Mnemonic::conditional(stem, false, c)
            .suffix(precision(double))
            .vreg(vd(w, double))
            .vreg(vm(w, double)),
        VfpTag::ConvertHalf => {
            let top = if bit(w, 7) { "t" } else { "b" };
            let types = if bit(w, 16) { ".f16.f32" } else { ".f32.f16" };
            Mnemonic::conditional(&format!("{}{}", stem, top), false, c)
                .suffix(types)
                .vreg(vd(w, false))
                .vreg(vm(w, false))
        }
        VfpTag::Compare | VfpTag::CompareZero => {
            let name = if bit(w, 7) { "vcmpe" } else { "vcmp" };
            let m = Mnemonic::conditional(name, false, c)
                .suffix(precision(double))
                .vreg(vd(w, double));
            if tag == VfpTag::CompareZero {
                m.with(Operand::Float(0.0))
            } else {
                m.vreg(vm(w, double))
            }
        }
        VfpTag::ConvertPrecision => {
            let types = if double { ".f32.f64" } else { ".f64.f32" };
            Mnemonic::conditional(stem, false, c)
                .suffix(types)
                .vreg(vd(w, !double))
                .vreg(vm(w, double))
        }
        VfpTag::ConvertFromInt => {
            let source = if bit(w, 7) { ".s32" } else { ".u32" };
            Mnemonic::conditional(stem, false, c)
                .suffix(precision(double))
                .suffix(source)
                .vreg(vd(w, double))
                .vreg(vm(w, false))
        }
        VfpTag::ConvertToInt => {
            let name = if bit(w, 7) { "vcvt" } else { "vcvtr" };
            let target = if bit(w, 16) { ".s32" } else { ".u32" };
            Mnemonic::conditional(name, false, c)
                .suffix(target)
                .suffix(precision(double))
                .vreg(vd(w, false))
                .vreg(vm(w, double))
        }
        VfpTag::ConvertFixed => {
            let size = if bit(w, 7) { 32 } else { 16 };
            let imm = (bits(w, 3, 0) << 1) | bits(w, 5, 5);
            if imm > size {
                return None;
            }
            let fixed = format!(".{}{}", if bit(w, 16) { "u" } else { "s" }, size);
            let m = Mnemonic::conditional(stem, false, c);
            let m = if bit(w, 18) {
                m.suffix(&fixed).suffix(precision(double))
            } else {
                m.suffix(precision(double)).suffix(&fixed)
            };
            m.vreg(vd(w, double))
                .vreg(vd(w, double))
                .with(Operand::SignedImm((size - imm) as i32))
        }
        VfpTag::MoveSingle => {
            let sn = vn(w, false);
            let rt = reg_at(w, 12);
            let m = Mnemonic::conditional(stem, false, c);
            if bit(w, 20) {
                m.reg(rt).vreg(sn)
            } else {
                m.vreg(sn).reg(rt)
            }
        }
        VfpTag::SystemRegister => {
            let sysreg = match bits(w, 19, 16) {
                0b0000 => "fpsid",
                0b0001 => "fpscr",
                0b0110 => "mvfr1",
                0b0111 => "mvfr0",
                0b1000 => "fpexc",
                _ => return None,
            };
            let rt = reg_at(w, 12);
            let m = Mnemonic::conditional(stem, false, c);
            if stem == "vmrs" {
                let rt = if rt.is_pc() {
                    if sysreg != "fpscr" {
                        return None;
                    }
                    Operand::text("apsr_nzcv")
                } else {
                    Operand::Reg(rt)
                };
                m.with(rt).text(sysreg)
            } else {
                m.text(sysreg).reg(rt)
            }
        }
        VfpTag::MoveToScalar => {
            let (size, index) = scalar_lane(bits(w, 22, 21), bits(w, 6, 5))?;
            let dd = neon_reg(w, 16, 7, false)?;
            Mnemonic::conditional(stem, false, c)
                .suffix(&format!(".{}", size))
                .with(Operand::Scalar(dd, index))
                .reg(reg_at(w, 12))
        }
        VfpTag::MoveFromScalar => {
            let (size, index) = scalar_lane(bits(w, 22, 21), bits(w, 6, 5))?;
            let unsigned = bit(w, 23);
            let dt = match (size, unsigned) {
                (32, false) => ".32".to_string(),
                (32, true) => return None,
                (size, true) => format!(".u{}", size),
                (size, false) => format!(".s{}", size),
            };
            let dn = neon_reg(w, 16, 7, false)?;
            Mnemonic::conditional(stem, false, c)
                .suffix(&dt)
                .reg(reg_at(w, 12))
                .with(Operand::Scalar(dn, index))
        }
        VfpTag::DupCore => {
            let size = match (bit(w, 22), bit(w, 5)) {
                (false, false) => 32,
                (false, true) => 16,
                (true, false) => 8,
                (true, true) => return None,
            };
            Mnemonic::conditional(stem, false, c)
                .suffix(&format!(".{}", size))
                .vreg(neon_reg(w, 16, 7, bit(w, 21))?)
                .reg(reg_at(w, 12))
        }
        VfpTag::MoveDouble => {
            let rt = reg_at(w, 12);
            let rt2 = reg_at(w, 16);
            let to_core = bit(w, 20);
            let m = Mnemonic::conditional(stem, false, c);
            if double {
                let dm = vm(w, true);
                if to_core {
                    m.reg(rt).reg(rt2).vreg(dm)
                } else {
                    m.vreg(dm).reg(rt).reg(rt2)
                }
            } else {
                let sm = vm(w, false);
                if sm.number == 31 {
                    return None;
                }
                let sm1 = VReg::single(sm.number as u32 + 1);
                if to_core {
                    m.reg(rt).reg(rt2).vreg(sm).vreg(sm1)
                } else {
                    m.vreg(sm).vreg(sm1).reg(rt).reg(rt2)
                }
            }
        }
        VfpTag::LoadStore => {
            let mem = Memory::imm(reg_at(w, 16), bits(w, 7, 0) * 4, bit(w, 23), Indexing::Offset);
            Mnemonic::conditional(stem, false, c)
                .vreg(vd(w, double))
                .mem(mem)
        }
        VfpTag::LoadStoreMultiple => return vfp_load_store_multiple(stem, w),
    };
    Some(m.into())
}

fn vfp_load_store_multiple(stem: &str, w: u32) -> Option<Formatted> {
    let pre = bit(w, 24);
    let add = bit(w, 23);
    let writeback = bit(w, 21);
    let double = bit(w, 8);
    let rn = reg_at(w, 16);
    let imm8 = bits(w, 7, 0);
    // FLDMX/FSTMX use an odd word count with doubles; the list is the same
    let count = if double { imm8 / 2 } else { imm8 };
    if count == 0 {
        return None;
    }
    let mode = match (pre, add, writeback) {
        (false, true, _) => "ia",
        (true, false, true) => "db",
        _ => return None,
    };
    let list = vfp_range(vd(w, double), count)?;
    let c = cond(w);

    if rn == Reg::SP && writeback {
        let alias = match (stem, mode) {
            ("vstm", "db") => Some("vpush"),
            ("vldm", "ia") => Some("vpop"),
            _ => None,
        };
        if let Some(alias) = alias {
            return Some(Mnemonic::conditional(alias, false, c).text(list).into());
        }
    }
    let base = if writeback {
        Operand::Writeback(rn)
    } else {
        Operand::Reg(rn)
    };
    Some(
        Mnemonic::conditional(&format!("{}{}", stem, mode), false, c)
            .with(base)
            .text(list)
            .into(),
    )
}

pub(crate) fn format_neon(tag: NeonTag, w: u32) -> Option<Formatted> {
    let m = match tag {
        NeonTag::ThreeRegSame => three_reg_same(w)?,
        NeonTag::ThreeRegDiff => three_reg_diff(w)?,
        NeonTag::TwoRegScalar => two_reg_scalar(w)?,
        NeonTag::ShiftImmediate => shift_immediate(w)?,
        NeonTag::TwoRegMisc => two_reg_misc(w)?,
        NeonTag::ModifiedImmediate => modified_immediate(w)?,
        NeonTag::Extract => {
            let q = bit(w, 6);
            let imm4 = bits(w, 11, 8);
            if !q && imm4 > 7 {
                return None;
            }
            let (d, n, m) = regs3(w, q)?;
            Mnemonic::new("vext.8")
                .vreg(d)
                .vreg(n)
                .vreg(m)
                .with(Operand::SignedImm(imm4 as i32))
        }
        NeonTag::TableLookup => {
            let name = if bit(w, 6) { "vtbx.8" } else { "vtbl.8" };
            let first = neon_reg(w, 16, 7, false)?;
            let list = neon_list(first, bits(w, 9, 8) + 1, 1, "")?;
            Mnemonic::new(name)
                .vreg(neon_reg(w, 12, 22, false)?)
                .text(list)
                .vreg(neon_reg(w, 0, 5, false)?)
        }
        NeonTag::DupScalar => {
            let imm4 = bits(w, 19, 16);
            let (size, index) = if imm4 & 1 != 0 {
                (8, imm4 >> 1)
            } else if imm4 & 2 != 0 {
                (16, imm4 >> 2)
            } else if imm4 & 4 != 0 {
                (32, imm4 >> 3)
            } else {
                return None;
            };
            Mnemonic::new(format!("vdup.{}", size))
                .vreg(neon_reg(w, 12, 22, bit(w, 6))?)
                .with(Operand::Scalar(neon_reg(w, 0, 5, false)?, index))
        }
        NeonTag::LoadStoreMultiple => element_load_store(w)?,
        NeonTag::LoadStoreLane => lane_load_store(w)?,
    };
    Some(m.into())
}

fn regs3(w: u32, q: bool) -> Option<(VReg, VReg, VReg)> {
    Some((
        neon_reg(w, 12, 22, q)?,
        neon_reg(w, 16, 7, q)?,
        neon_reg(w, 0, 5, q)?,
    ))
}

fn signed_type(unsigned: bool, size: u32) -> String {
    format!(".{}{}", if unsigned { "u" } else { "s" }, size)
}

fn three(name: &str, dt: &str, (d, n, m): (VReg, VReg, VReg)) -> Mnemonic {
    Mnemonic::new(format!("{}{}", name, dt))
        .vreg(d)
        .vreg(n)
        .vreg(m)
}

fn three_reg_same(w: u32) -> Option<Mnemonic> {
    let a = bits(w, 11, 8);
    let b = bit(w, 4);
    let u = bit(w, 24);
    let size = bits(w, 21, 20);
    let q = bit(w, 6);
    let esize = 8 << size;
    let regs = regs3(w, q)?;
    let (d, n, m) = regs;
    let sx = signed_type(u, esize);
    let ix = format!(".i{}", esize);
    // float forms use bit 20 as sz and bit 21 as an op selector
    let float = size & 1 == 0;
    let op_hi = bit(w, 21);

    let text = match (a, b) {
        (0b0000, false) => three("vhadd", &sx, regs),
        (0b0000, true) => three("vqadd", &sx, regs),
        (0b0001, false) => three("vrhadd", &sx, regs),
        (0b0001, true) => {
            let name = match (u, size) {
                (false, 0) => "vand",
                (false, 1) => "vbic",
                (false, 2) if n == m => return Some(Mnemonic::new("vmov").vreg(d).vreg(m)),
                (false, 2) => "vorr",
                (false, _) => "vorn",
                (true, 0) => "veor",
                (true, 1) => "vbsl",
                (true, 2) => "vbit",
                (true, _) => "vbif",
            };
            three(name, "", regs)
        }
        (0b0010, false) => three("vhsub", &sx, regs),
        (0b0010, true) => three("vqsub", &sx, regs),
        (0b0011, false) => three("vcgt", &sx, regs),
        (0b0011, true) => three("vcge", &sx, regs),
        (0b0100, _) | (0b0101, _) => {
            let name = match (a, b) {
                (0b0100, false) => "vshl",
                (0b0100, true) => "vqshl",
                (_, false) => "vrshl",
                (_, true) => "vqrshl",
            };
            three(name, &sx, (d, m, n))
        }
        (0b0110, false) => three("vmax", &sx, regs),
        (0b0110, true) => three("vmin", &sx, regs),
        (0b0111, false) => three("vabd", &sx, regs),
        (0b0111, true) => three("vaba", &sx, regs),
        (0b1000, false) => three(if u { "vsub" } else { "vadd" }, &ix, regs),
        (0b1000, true) if u => three("vceq", &ix, regs),
        (0b1000, true) => three("vtst", &format!(".{}", esize), regs),
        (0b1001, false) => three(if u { "vmls" } else { "vmla" }, &ix, regs),
        (0b1001, true) if u => {
            if size != 0 {
                return None;
            }
            three("vmul", ".p8", regs)
        }
        (0b1001, true) => three("vmul", &ix, regs),
        (0b1010, _) if !q => three(if b { "vpmin" } else { "vpmax" }, &sx, regs),
        (0b1011, false) if size == 1 || size == 2 => {
            three(if u { "vqrdmulh" } else { "vqdmulh" }, &format!(".s{}", esize), regs)
        }
        (0b1011, true) if !u && !q => three("vpadd", &ix, regs),
        (0b1100, true) if !u && float => three(if op_hi { "vfms" } else { "vfma" }, ".f32", regs),
        (0b1101, false) if float => {
            let name = match (u, op_hi) {
                (false, false) => "vadd",
                (false, true) => "vsub",
                (true, false) => "vpadd",
                (true, true) => "vabd",
            };
            three(name, ".f32", regs)
        }
        (0b1101, true) if float => match (u, op_hi) {
            (false, false) => three("vmla", ".f32", regs),
            (false, true) => three("vmls", ".f32", regs),
            (true, false) => three("vmul", ".f32", regs),
            (true, true) => return None,
        },
        (0b1110, false) if float => match (u, op_hi) {
            (false, false) => three("vceq", ".f32", regs),
            (false, true) => return None,
            (true, false) => three("vcge", ".f32", regs),
            (true, true) => three("vcgt", ".f32", regs),
        },
        (0b1110, true) if float && u => {
            three(if op_hi { "vacgt" } else { "vacge" }, ".f32", regs)
        }
        (0b1111, false) if float => {
            let name = match (u, op_hi) {
                (false, false) => "vmax",
                (false, true) => "vmin",
                (true, false) => "vpmax",
                (true, true) => "vpmin",
            };
            three(name, ".f32", regs)
        }
        (0b1111, true) if float && !u => {
            three(if op_hi { "vrsqrts" } else { "vrecps" }, ".f32", regs)
        }
        _ => return None,
    };
    Some(text)
}

fn three_reg_diff(w: u32) -> Option<Mnemonic> {
    let a = bits(w, 11, 8);
    let u = bit(w, 24);
    let esize = 8 << bits(w, 21, 20);
    let sx = signed_type(u, esize);
    // each shape names a different set of quad operands
    let shape = |qd: bool, qn: bool, qm: bool| {
        Some((
            neon_reg(w, 12, 22, qd)?,
            neon_reg(w, 16, 7, qn)?,
            neon_reg(w, 0, 5, qm)?,
        ))
    };
    let long = || shape(true, false, false);
    let wide = || shape(true, true, false);
    let narrow = || shape(false, true, true);
    let text = match a {
        0b0000 => three("vaddl", &sx, long()?),
        0b0001 => three("vaddw", &sx, wide()?),
        0b0010 => three("vsubl", &sx, long()?),
        0b0011 => three("vsubw", &sx, wide()?),
        0b0100 => three(
            if u { "vraddhn" } else { "vaddhn" },
            &format!(".i{}", esize * 2),
            narrow()?,
        ),
        0b0101 => three("vabal", &sx, long()?),
        0b0110 => three(
            if u { "vrsubhn" } else { "vsubhn" },
            &format!(".i{}", esize * 2),
            narrow()?,
        ),
        0b0111 => three("vabdl", &sx, long()?),
        0b1000 => three("vmlal", &sx, long()?),
        0b1010 => three("vmlsl", &sx, long()?),
        0b1001 if !u => three("vqdmlal", &format!(".s{}", esize), long()?),
        0b1011 if !u => three("vqdmlsl", &format!(".s{}", esize), long()?),
        0b1100 => three("vmull", &sx, long()?),
        0b1101 if !u => three("vqdmull", &format!(".s{}", esize), long()?),
        0b1110 if !u && esize == 8 => three("vmull", ".p8", long()?),
        _ => return None,
    };
    Some(text)
}

fn two_reg_scalar(w: u32) -> Option<Mnemonic> {
    let a = bits(w, 11, 8);
    let u = bit(w, 24);
    let size = bits(w, 21, 20);
    if size == 0 {
        return None;
    }
    let esize = 8 << size;
    let scalar = if size == 1 {
        Operand::Scalar(
            VReg::double(bits(w, 2, 0)),
            (bits(w, 5, 5) << 1) | bits(w, 3, 3),
        )
    } else {
        Operand::Scalar(VReg::double(bits(w, 3, 0)), bits(w, 5, 5))
    };
    let same = |name: &str, dt: &str| {
        Some(
            Mnemonic::new(format!("{}{}", name, dt))
                .vreg(neon_reg(w, 12, 22, u)?)
                .vreg(neon_reg(w, 16, 7, u)?)
                .with(scalar.clone()),
        )
    };
    let long = |name: &str, dt: &str| {
        Some(
            Mnemonic::new(format!("{}{}", name, dt))
                .vreg(neon_reg(w, 12, 22, true)?)
                .vreg(neon_reg(w, 16, 7, false)?)
                .with(scalar.clone()),
        )
    };
    let ix = format!(".i{}", esize);
    let sx = signed_type(u, esize);
    let qs = format!(".s{}", esize);
    let text = match a {
        0b0000 => same("vmla", &ix)?,
        0b0001 => same("vmla", ".f32")?,
        0b0100 => same("vmls", &ix)?,
        0b0101 => same("vmls", ".f32")?,
        0b1000 => same("vmul", &ix)?,
        0b1001 => same("vmul", ".f32")?,
        0b1100 => same("vqdmulh", &qs)?,
        0b1101 => same("vqrdmulh", &qs)?,
        0b0010 => long("vmlal", &sx)?,
        0b0110 => long("vmlsl", &sx)?,
        0b1010 => long("vmull", &sx)?,
        0b0011 if !u => long("vqdmlal", &qs)?,
        0b0111 if !u => long("vqdmlsl", &qs)?,
        0b1011 if !u => long("vqdmull", &qs)?,
        _ => return None,
    };
    Some(text)
}

fn shift_immediate(w: u32) -> Option<Mnemonic> {
    let a = bits(w, 11, 8);
    let u = bit(w, 24);
    let l = bit(w, 7);
    let q = bit(w, 6);
    let imm6 = bits(w, 21, 16);
    let esize = if l {
        64
    } else if imm6 & 0x20 != 0 {
        32
    } else if imm6 & 0x10 != 0 {
        16
    } else if imm6 & 0x08 != 0 {
        8
    } else {
        return None;
    };
    let right = if l { 64 - imm6 } else { 2 * esize - imm6 };
    let left = if l { imm6 } else { imm6 - esize };
    let sx = signed_type(u, esize);
    // bit 6 is Q except in the narrowing forms, where it selects rounding
    let shifted = |name: &str, dt: &str, amount: u32| {
        Some(
            Mnemonic::new(format!("{}{}", name, dt))
                .vreg(neon_reg(w, 12, 22, q)?)
                .vreg(neon_reg(w, 0, 5, q)?)
                .with(Operand::SignedImm(amount as i32)),
        )
    };

    let text = match a {
        0b0000 => shifted("vshr", &sx, right)?,
        0b0001 => shifted("vsra", &sx, right)?,
        0b0010 => shifted("vrshr", &sx, right)?,
        0b0011 => shifted("vrsra", &sx, right)?,
        0b0100 if u => shifted("vsri", &format!(".{}", esize), right)?,
        0b0101 if u => shifted("vsli", &format!(".{}", esize), left)?,
        0b0101 => shifted("vshl", &format!(".i{}", esize), left)?,
        0b0110 if u => shifted("vqshlu", &format!(".s{}", esize), left)?,
        0b0111 => shifted("vqshl", &sx, left)?,
        0b1000 | 0b1001 if !l => {
            let round = bit(w, 6);
            let name = match (a, u, round) {
                (0b1000, false, false) => format!("vshrn.i{}", esize * 2),
                (0b1000, false, true) => format!("vrshrn.i{}", esize * 2),
                (0b1000, true, false) => format!("vqshrun.s{}", esize * 2),
                (0b1000, true, true) => format!("vqrshrun.s{}", esize * 2),
                (_, _, false) => format!("vqshrn{}", signed_type(u, esize * 2)),
                (_, _, true) => format!("vqrshrn{}", signed_type(u, esize * 2)),
            };
            Mnemonic::new(name)
                .vreg(neon_reg(w, 12, 22, false)?)
                .vreg(neon_reg(w, 0, 5, true)?)
                .with(Operand::SignedImm(right as i32))
        }
        0b1010 if !l && !q => {
            let qd = neon_reg(w, 12, 22, true)?;
            let dm = neon_reg(w, 0, 5, false)?;
            if left == 0 {
                Mnemonic::new(format!("vmovl{}", sx)).vreg(qd).vreg(dm)
            } else {
                Mnemonic::new(format!("vshll{}", sx))
                    .vreg(qd)
                    .vreg(dm)
                    .with(Operand::SignedImm(left as i32))
            }
        }
        0b1110 | 0b1111 if !l && imm6 & 0x20 != 0 => {
            let fixed = signed_type(u, 32);
            let name = if a & 1 != 0 {
                format!("vcvt{}.f32", fixed)
            } else {
                format!("vcvt.f32{}", fixed)
            };
            shifted(&name, "", 64 - imm6)?
        }
        _ => return None,
    };
    Some(text)
}

fn two_reg_misc(w: u32) -> Option<Mnemonic> {
    let a = bits(w, 17, 16);
    let b = bits(w, 10, 7);
    let op6 = bit(w, 6);
    let size = bits(w, 19, 18);
    let esize = 8 << size;
    let q = op6;
    let pair = |name: &str, dt: &str| {
        Some(
            Mnemonic::new(format!("{}{}", name, dt))
                .vreg(neon_reg(w, 12, 22, q)?)
                .vreg(neon_reg(w, 0, 5, q)?),
        )
    };
    let bare = format!(".{}", esize);
    let signed = format!(".s{}", esize);

    let text = match (a, b) {
        (0b00, 0b0000) => pair("vrev64", &bare)?,
        (0b00, 0b0001) => pair("vrev32", &bare)?,
        (0b00, 0b0010) => pair("vrev16", &bare)?,
        (0b00, 0b0100) | (0b00, 0b0101) => pair("vpaddl", &signed_type(b & 1 != 0, esize))?,
        (0b00, 0b1000) => pair("vcls", &signed)?,
        (0b00, 0b1001) => pair("vclz", &format!(".i{}", esize))?,
        (0b00, 0b1010) => pair("vcnt", ".8")?,
        (0b00, 0b1011) => pair("vmvn", "")?,
        (0b00, 0b1100) | (0b00, 0b1101) => pair("vpadal", &signed_type(b & 1 != 0, esize))?,
        (0b00, 0b1110) => pair("vqabs", &signed)?,
        (0b00, 0b1111) => pair("vqneg", &signed)?,
        (0b01, _) => {
            let float = b & 0b1000 != 0;
            let (name, compare) = match b & 0b111 {
                0b000 => ("vcgt", true),
                0b001 => ("vcge", true),
                0b010 => ("vceq", true),
                0b011 => ("vcle", true),
                0b100 => ("vclt", true),
                0b110 => ("vabs", false),
                0b111 => ("vneg", false),
                _ => return None,
            };
            let dt = if float {
                ".f32".to_string()
            } else if name == "vceq" {
                format!(".i{}", esize)
            } else {
                signed.clone()
            };
            let text = pair(name, &dt)?;
            match (compare, float) {
                (true, true) => text.with(Operand::Float(0.0)),
                (true, false) => text.imm(0),
                _ => text,
            }
        }
        (0b10, 0b0000) => pair("vswp", "")?,
        (0b10, 0b0001) => pair("vtrn", &bare)?,
        (0b10, 0b0010) => pair("vuzp", &bare)?,
        (0b10, 0b0011) => pair("vzip", &bare)?,
        (0b10, 0b0100) | (0b10, 0b0101) => {
            let name = match (b, op6) {
                (0b0100, false) => format!("vmovn.i{}", esize * 2),
                (0b0100, true) => format!("vqmovun.s{}", esize * 2),
                (_, unsigned) => format!("vqmovn{}", signed_type(unsigned, esize * 2)),
            };
            Mnemonic::new(name)
                .vreg(neon_reg(w, 12, 22, false)?)
                .vreg(neon_reg(w, 0, 5, true)?)
        }
        (0b10, 0b0110) if !op6 => Mnemonic::new(format!("vshll.i{}", esize))
            .vreg(neon_reg(w, 12, 22, true)?)
            .vreg(neon_reg(w, 0, 5, false)?)
            .with(Operand::SignedImm(esize as i32)),
        (0b10, 0b1100) if !op6 && size == 1 => Mnemonic::new("vcvt.f16.f32")
            .vreg(neon_reg(w, 12, 22, false)?)
            .vreg(neon_reg(w, 0, 5, true)?),
        (0b10, 0b1110) if !op6 && size == 1 => Mnemonic::new("vcvt.f32.f16")
            .vreg(neon_reg(w, 12, 22, true)?)
            .vreg(neon_reg(w, 0, 5, false)?),
        (0b11, 0b1000) | (0b11, 0b1010) => {
            pair("vrecpe", if b & 0b10 != 0 { ".f32" } else { ".u32" })?
        }
        (0b11, 0b1001) | (0b11, 0b1011) => {
            pair("vrsqrte", if b & 0b10 != 0 { ".f32" } else { ".u32" })?
        }
        (0b11, 0b1100..=0b1111) => {
            let dt = match b & 0b11 {
                0b00 => ".f32.s32",
                0b01 => ".f32.u32",
                0b10 => ".s32.f32",
                _ => ".u32.f32",
            };
            pair("vcvt", dt)?
        }
        _ => return None,
    };
    Some(text)
}

fn modified_immediate(w: u32) -> Option<Mnemonic> {
    let op = bits(w, 5, 5);
    let cmode = bits(w, 11, 8);
    let imm8 = (bits(w, 24, 24) << 7) | (bits(w, 18, 16) << 4) | bits(w, 3, 0);
    let value = adv_simd_expand_imm(op, cmode, imm8)?;
    let d = neon_reg(w, 12, 22, bit(w, 6))?;

    let orr_bic = cmode & 1 == 1 && cmode < 0b1100;
    let name = match (op, orr_bic, cmode) {
        (0, true, _) => "vorr",
        (_, true, _) => "vbic",
        (0, false, _) | (_, false, 0b1110) => "vmov",
        _ => "vmvn",
    };
    let (dt, operand) = match (cmode, op) {
        (0b1111, _) => (".f32", Operand::Float(vfp_expand_imm(imm8, false))),
        (0b1110, 0) => (".i8", Operand::Imm(imm8)),
        (0b1110, _) => (".i64", Operand::text(format!("#{:#018x}", value))),
        (0b1000..=0b1011, _) => (".i16", Operand::Imm(value as u16 as u32)),
        _ => (".i32", Operand::Imm(value as u32)),
    };
    Some(Mnemonic::new(format!("{}{}", name, dt)).vreg(d).with(operand))
}

/// `{d0, d1}` or lane forms like `{d0[1], d2[1]}`.
fn neon_list(first: VReg, count: u32, step: u32, lane: &str) -> Option<String> {
    let mut out = String::from("{");
    for i in 0..count {
        let n = first.number as u32 + i * step;
        if n > 31 {
            return None;
        }
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&format!("{}{}", VReg::double(n), lane));
    }
    out.push('}');
    Some(out)
}

/// Address operand shared by the element and structure forms: `rm == pc` is
/// no writeback, `rm == sp` writes back by the transfer size.
fn neon_address(rn: Reg, rm: u32, align: Option<u32>) -> Memory {
    let mut mem = match rm {
        15 => Memory::base(rn),
        13 => {
            let mut mem = Memory::base(rn);
            mem.indexing = Indexing::PreIndexed;
            mem
        }
        _ => Memory::reg(rn, Reg::new(rm), true, None, Indexing::PostIndexed),
    };
    mem.align = align;
    mem
}

fn element_load_store(w: u32) -> Option<Mnemonic> {
    let load = bit(w, 21);
    let size = bits(w, 7, 6);
    let align = bits(w, 5, 4);
    let (structure, count, step) = match bits(w, 11, 8) {
        0b0111 => (1, 1, 1),
        0b1010 => (1, 2, 1),
        0b0110 => (1, 3, 1),
        0b0010 => (1, 4, 1),
        0b1000 => (2, 2, 1),
        0b1001 => (2, 2, 2),
        0b0011 => (2, 4, 1),
        0b0100 => (3, 3, 1),
        0b0101 => (3, 3, 2),
        0b0000 => (4, 4, 1),
        0b0001 => (4, 4, 2),
        _ => return None,
    };
    if structure > 1 && size == 3 {
        return None;
    }
    let list = neon_list(neon_reg(w, 12, 22, false)?, count, step, "")?;
    let align = match align {
        0 => None,
        a => Some(32 << a),
    };
    let name = format!(
        "v{}{}.{}",
        if load { "ld" } else { "st" },
        structure,
        8 << size
    );
    Some(
        Mnemonic::new(name)
            .text(list)
            .mem(neon_address(reg_at(w, 16), bits(w, 3, 0), align)),
    )
}

fn lane_load_store(w: u32) -> Option<Mnemonic> {
    let load = bit(w, 21);
    let size = bits(w, 11, 10);
    let structure = bits(w, 9, 8) + 1;
    let first = neon_reg(w, 12, 22, false)?;
    let direction = if load { "ld" } else { "st" };

    let (esize, list, align) = if size == 0b11 {
        // load to all lanes
        if !load {
            return None;
        }
        let sz = bits(w, 7, 6);
        let t = bit(w, 5);
        let aligned = bit(w, 4);
        if sz == 3 && (structure != 4 || !aligned) {
            return None;
        }
        let esize = if sz == 3 { 32 } else { 8 << sz };
        let (count, step) = match (structure, t) {
            (1, t) => (if t { 2 } else { 1 }, 1),
            (n, t) => (n, if t { 2 } else { 1 }),
        };
        let align = match (aligned, structure) {
            (false, _) => None,
            (true, 1) if sz == 0 => return None,
            (true, 1) => Some(esize),
            (true, 2) => Some(esize * 2),
            (true, 3) => return None,
            (true, _) => Some(match sz {
                0 => 32,
                1 | 2 => 64,
                _ => 128,
            }),
        };
        (esize, neon_list(first, count, step, "[]")?, align)
    } else {
        let index_align = bits(w, 7, 4);
        let undefined = match (structure, size) {
            (1, 0) => index_align & 0b1 != 0,
            (1, 1) => index_align & 0b10 != 0,
            (1, _) => index_align & 0b100 != 0 || matches!(index_align & 0b11, 0b01 | 0b10),
            (2, 2) => index_align & 0b10 != 0,
            (3, 2) => index_align & 0b11 != 0,
            (3, _) => index_align & 0b1 != 0,
            (4, 2) => index_align & 0b11 == 0b11,
            _ => false,
        };
        if undefined {
            return None;
        }
        let esize = 8 << size;
        let index = index_align >> (size + 1);
        let step = match size {
            0 => 1,
            1 if index_align & 0b10 != 0 => 2,
            2 if index_align & 0b100 != 0 => 2,
            _ => 1,
        };
        let align = match (structure, size) {
            (1, 1) if index_align & 1 != 0 => Some(16),
            (1, 2) if index_align & 0b11 == 0b11 => Some(32),
            (2, _) if index_align & 1 != 0 => Some(esize * 2),
            (4, 0) if index_align & 1 != 0 => Some(32),
            (4, 1) if index_align & 1 != 0 => Some(64),
            (4, 2) if index_align & 0b11 != 0 => Some(32 << (index_align & 0b11)),
            _ => None,
        };
        let count = structure;
        (
            esize,
            neon_list(first, count, step, &format!("[{}]", index))?,
            align,
        )
    };
    let name = format!("v{}{}.{}", direction, structure, esize);
    Some(
        Mnemonic::new(name)
            .text(list)
            .mem(neon_address(reg_at(w, 16), bits(w, 3, 0), align)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArchVersion;
    use crate::decoder::{arm, DecodeState};

    fn text(word: u32) -> String {
        arm::decode(&DecodeState::new(0, word, ArchVersion::V7))
            .map(|f| f.text.render())
            .unwrap_or_else(|| "<invalid>".to_string())
    }

    #[test]
    fn test_vfp_arithmetic() {
        // vadd.f32 s0, s1, s2
        assert_eq!(text(0xEE30_0A81), "vadd.f32\ts0, s1, s2");
        // vadd.f64 d0, d1, d2
        assert_eq!(text(0xEE31_0B02), "vadd.f64\td0, d1, d2");
        // vmul.f32 s4, s5, s6 conditional on ne
        assert_eq!(text(0x1E22_2A83), "vmulne.f32\ts4, s5, s6");
        // vsqrt.f64 d1, d2
        assert_eq!(text(0xEEB1_1BC2), "vsqrt.f64\td1, d2");
    }

    #[test]
    fn test_vfp_immediates_and_compare() {
        // vmov.f32 s0, #1.0
        assert_eq!(text(0xEEB7_0A00), "vmov.f32\ts0, #1.0");
        // vcmp.f32 s0, #0.0
        assert_eq!(text(0xEEB5_0A40), "vcmp.f32\ts0, #0.0");
        // vcmpe.f64 d0, d1
        assert_eq!(text(0xEEB4_0BC1), "vcmpe.f64\td0, d1");
        // vmrs APSR_nzcv, fpscr
        assert_eq!(text(0xEEF1_FA10), "vmrs\tapsr_nzcv, fpscr");
    }

    #[test]
    fn test_vfp_conversions() {
        // vcvt.f64.f32 d0, s1
        assert_eq!(text(0xEEB7_0AE0), "vcvt.f64.f32\td0, s1");
        // vcvt.s32.f32 s0, s1
        assert_eq!(text(0xEEBD_0AE0), "vcvt.s32.f32\ts0, s1");
        // vcvt.f32.s32 s0, s1
        assert_eq!(text(0xEEB8_0AE0), "vcvt.f32.s32\ts0, s1");
    }

    #[test]
    fn test_vfp_transfers() {
        // vldr d0, [r0, #8]
        assert_eq!(text(0xED90_0B02), "vldr\td0, [r0, #8]");
        // vstr s1, [sp, #-4]
        assert_eq!(text(0xED4D_0A01), "vstr\ts1, [sp, #-4]");
        // vpush {d8-d15}
        assert_eq!(text(0xED2D_8B10), "vpush\t{d8-d15}");
        // vpop {s0}
        assert_eq!(text(0xECBD_0A01), "vpop\t{s0}");
        // vldmia r1!, {d0-d1}
        assert_eq!(text(0xECB1_0B04), "vldmia\tr1!, {d0-d1}");
        // vmov r0, s1
        assert_eq!(text(0xEE10_0A90), "vmov\tr0, s1");
        // vmov d0, r0, r1
        assert_eq!(text(0xEC41_0B10), "vmov\td0, r0, r1");
    }

    #[test]
    fn test_vfp_fused_needs_v7() {
        // vfma.f32 s0, s1, s2
        let word = 0xEEA0_0A81;
        assert_eq!(text(word), "vfma.f32\ts0, s1, s2");
        assert!(arm::decode(&DecodeState::new(0, word, ArchVersion::V6T2)).is_none());
    }

    #[test]
    fn test_quad_operands_need_even_registers() {
        // vadd.i32 with Vd = 1 and Q = 1
        assert_eq!(text(0xF222_1844), "<invalid>");
        assert_eq!(text(0xF3B5_3254), "<invalid>");
        // bit 6 selects rounding in the narrowing shifts, so d1 stays legal
        assert_eq!(text(0xF298_1812), "vshrn.i32\td1, q1, #8");
        assert_eq!(text(0xF298_1852), "vrshrn.i32\td1, q1, #8");
    }

    #[test]
    fn test_neon_data_processing() {
        // vadd.i32 q0, q1, q2
        assert_eq!(text(0xF222_0844), "vadd.i32\tq0, q1, q2");
        // veor d0, d1, d2
        assert_eq!(text(0xF301_0112), "veor\td0, d1, d2");
        // vorr d0, d1, d1 is vmov
        assert_eq!(text(0xF221_0111), "vmov\td0, d1");
        // vshr.u32 d0, d1, #8
        assert_eq!(text(0xF3B8_0011), "vshr.u32\td0, d1, #8");
        // vmovl.s16 q0, d1
        assert_eq!(text(0xF290_0A11), "vmovl.s16\tq0, d1");
        // vmov.i32 d0, #0
        assert_eq!(text(0xF280_0010), "vmov.i32\td0, #0");
        // vdup.32 q0, d1[1]
        assert_eq!(text(0xF3BC_0C41), "vdup.32\tq0, d1[1]");
        // vrev64.8 d0, d1
        assert_eq!(text(0xF3B0_0001), "vrev64.8\td0, d1");
        // vext.8 d0, d1, d2, #3
        assert_eq!(text(0xF2B1_0302), "vext.8\td0, d1, d2, #3");
    }

    #[test]
    fn test_neon_load_store() {
        // vld1.32 {d0, d1}, [r0]!
        assert_eq!(text(0xF420_0A8D), "vld1.32\t{d0, d1}, [r0]!");
        // vst1.8 {d0}, [r1:64], r2
        assert_eq!(text(0xF401_0712), "vst1.8\t{d0}, [r1:64], r2");
        // vld1.32 {d0[1]}, [r0]
        assert_eq!(text(0xF4A0_088F), "vld1.32\t{d0[1]}, [r0]");
        // vld1.16 {d0[]}, [r0]
        assert_eq!(text(0xF4A0_0C4F), "vld1.16\t{d0[]}, [r0]");
    }

    #[test]
    fn test_lane_index_align_must_be_consistent() {
        // vld1.32 {d0[0]}, [r0:32]
        assert_eq!(text(0xF4A0_083F), "vld1.32\t{d0[0]}, [r0:32]");
        // one-lane 32-bit store with index_align<2> set
        assert_eq!(text(0xF485_0873), "<invalid>");
        // three-lane 32-bit load with index_align<1:0> = 01
        assert_eq!(text(0xF4C6_5ADD), "<invalid>");
        // one-lane 8-bit load with index_align<0> set
        assert_eq!(text(0xF4A0_001F), "<invalid>");
    }

    #[test]
    fn test_neon_requires_v7() {
        assert!(arm::decode(&DecodeState::new(0, 0xF222_0844, ArchVersion::V6K)).is_none());
    }
}
