// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Typed operand tokens. Formatters build a `Mnemonic` out of these and the
//! text is produced in one place by `Mnemonic::render`.

use super::bits::{Reg, ShiftKind, VReg};
use std::fmt::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indexing {
    Offset,
    PreIndexed,
    PostIndexed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    None,
    Imm { value: u32, add: bool },
    Reg {
        rm: Reg,
        add: bool,
        shift: Option<(ShiftKind, u32)>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Memory {
    pub base: Reg,
    pub offset: Offset,
    pub indexing: Indexing,
    /// Alignment qualifier in bits (`[r0:64]`).
    pub align: Option<u32>,
}

impl Memory {
    pub fn base(base: Reg) -> Self {
        Self {
            base,
            offset: Offset::None,
            indexing: Indexing::Offset,
            align: None,
        }
    }

    pub fn imm(base: Reg, value: u32, add: bool, indexing: Indexing) -> Self {
        Self {
            base,
            offset: Offset::Imm { value, add },
            indexing,
            align: None,
        }
    }

    pub fn reg(
        base: Reg,
        rm: Reg,
        add: bool,
        shift: Option<(ShiftKind, u32)>,
        indexing: Indexing,
    ) -> Self {
        Self {
            base,
            offset: Offset::Reg { rm, add, shift },
            indexing,
            align: None,
        }
    }

    /// ARM/Thumb-2 `P`/`W` bits to an indexing mode.
    pub fn indexing_from(pre: bool, writeback: bool) -> Indexing {
        match (pre, writeback) {
            (false, _) => Indexing::PostIndexed,
            (true, true) => Indexing::PreIndexed,
            (true, false) => Indexing::Offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Reg(Reg),
    /// Base register with writeback, as in `ldm r0!, {...}`.
    Writeback(Reg),
    VReg(VReg),
    /// Vector element `d0[1]`.
    Scalar(VReg, u32),
    Imm(u32),
    /// Always rendered as signed decimal.
    SignedImm(i32),
    Float(f64),
    /// Absolute code address (branch targets, `adr`).
    Address(u32),
    Shift(ShiftKind, u32),
    RegShift(ShiftKind, Reg),
    Memory(Memory),
    RegList { regs: Vec<Reg>, user: bool },
    /// Preformatted token: system register names, coprocessor names, vector lists.
    Text(String),
}

impl Operand {
    pub fn text(s: impl Into<String>) -> Self {
        Operand::Text(s.into())
    }
}

fn write_imm(f: &mut impl Write, value: u32) -> fmt::Result {
    if value < 10 {
        write!(f, "#{}", value)
    } else {
        write!(f, "#{:#x}", value)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(r) => write!(f, "{}", r),
            Operand::Writeback(r) => write!(f, "{}!", r),
            Operand::VReg(v) => write!(f, "{}", v),
            Operand::Scalar(v, index) => write!(f, "{}[{}]", v, index),
            Operand::Imm(value) => write_imm(f, *value),
            Operand::SignedImm(value) => write!(f, "#{}", value),
            Operand::Float(value) => write!(f, "#{:?}", value),
            Operand::Address(addr) => write!(f, "{:#x}", addr),
            Operand::Shift(ShiftKind::Rrx, _) => f.write_str("rrx"),
            Operand::Shift(kind, amount) => write!(f, "{} #{}", kind.name(), amount),
            Operand::RegShift(kind, rs) => write!(f, "{} {}", kind.name(), rs),
            Operand::Memory(mem) => write!(f, "{}", mem),
            Operand::RegList { regs, user } => {
                f.write_str("{")?;
                for (i, r) in regs.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", r)?;
                }
                f.write_str("}")?;
                if *user {
                    f.write_str("^")?;
                }
                Ok(())
            }
            Operand::Text(s) => f.write_str(s),
        }
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::None => Ok(()),
            Offset::Imm { value, add } => {
                let sign = if *add { "" } else { "-" };
                write!(f, "#{}{}", sign, value)
            }
            Offset::Reg { rm, add, shift } => {
                let sign = if *add { "" } else { "-" };
                write!(f, "{}{}", sign, rm)?;
                if let Some((kind, amount)) = shift {
                    write!(f, ", {}", Operand::Shift(*kind, *amount))?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.base)?;
        if let Some(align) = self.align {
            write!(f, ":{}", align)?;
        }
        let has_offset = match self.offset {
            Offset::None => false,
            // `[r0]` rather than `[r0, #0]` for a plain zero offset
            Offset::Imm { value: 0, add: true } => self.indexing != Indexing::Offset,
            _ => true,
        };
        match self.indexing {
            Indexing::Offset | Indexing::PreIndexed => {
                if has_offset {
                    write!(f, ", {}", self.offset)?;
                }
                f.write_str("]")?;
                if self.indexing == Indexing::PreIndexed {
                    f.write_str("!")?;
                }
            }
            Indexing::PostIndexed => {
                f.write_str("]")?;
                if has_offset {
                    write!(f, ", {}", self.offset)?;
                }
            }
        }
        Ok(())
    }
}

/// Mnemonic plus operand list.
#[derive(Debug, Clone, PartialEq)]
pub struct Mnemonic {
    pub name: String,
    pub operands: Vec<Operand>,
}

impl Mnemonic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operands: Vec::new(),
        }
    }

    /// `stem{s}{cond}`, the UAL order for flag and condition suffixes.
    pub fn conditional(stem: &str, set_flags: bool, cond: &str) -> Self {
        let mut name = String::with_capacity(stem.len() + 3);
        name.push_str(stem);
        if set_flags {
            name.push('s');
        }
        name.push_str(cond);
        Self::new(name)
    }

    pub fn with(mut self, operand: Operand) -> Self {
        self.operands.push(operand);
        self
    }

    pub fn reg(self, r: Reg) -> Self {
        self.with(Operand::Reg(r))
    }

    pub fn vreg(self, v: VReg) -> Self {
        self.with(Operand::VReg(v))
    }

    pub fn imm(self, value: u32) -> Self {
        self.with(Operand::Imm(value))
    }

    pub fn mem(self, mem: Memory) -> Self {
        self.with(Operand::Memory(mem))
    }

    pub fn text(self, s: impl Into<String>) -> Self {
        self.with(Operand::Text(s.into()))
    }

    pub fn push(&mut self, operand: Operand) {
        self.operands.push(operand);
    }

    /// Appends a qualifier to the mnemonic (`.w`, `.f32`).
    pub fn suffix(mut self, suffix: &str) -> Self {
        self.name.push_str(suffix);
        self
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (i, operand) in self.operands.iter().enumerate() {
            f.write_str(if i == 0 { "\t" } else { ", " })?;
            write!(f, "{}", operand)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_rendering() {
        assert_eq!(Operand::Imm(7).to_string(), "#7");
        assert_eq!(Operand::Imm(16).to_string(), "#0x10");
        assert_eq!(Operand::SignedImm(-12).to_string(), "#-12");
        assert_eq!(Operand::Float(1.0).to_string(), "#1.0");
        assert_eq!(Operand::Address(0x8004).to_string(), "0x8004");
    }

    #[test]
    fn test_memory_forms() {
        let r0 = Reg(0);
        assert_eq!(Memory::base(r0).to_string(), "[r0]");
        assert_eq!(
            Memory::imm(r0, 0, true, Indexing::Offset).to_string(),
            "[r0]"
        );
        assert_eq!(
            Memory::imm(r0, 4, false, Indexing::Offset).to_string(),
            "[r0, #-4]"
        );
        assert_eq!(
            Memory::imm(Reg::SP, 8, true, Indexing::PreIndexed).to_string(),
            "[sp, #8]!"
        );
        assert_eq!(
            Memory::imm(r0, 4, true, Indexing::PostIndexed).to_string(),
            "[r0], #4"
        );
        assert_eq!(
            Memory::reg(r0, Reg(1), true, Some((ShiftKind::Lsl, 2)), Indexing::Offset).to_string(),
            "[r0, r1, lsl #2]"
        );
        assert_eq!(
            Memory::reg(r0, Reg(2), false, None, Indexing::PostIndexed).to_string(),
            "[r0], -r2"
        );
        let mut aligned = Memory::base(Reg(3));
        aligned.align = Some(64);
        aligned.indexing = Indexing::PreIndexed;
        assert_eq!(aligned.to_string(), "[r3:64]!");
    }

    #[test]
    fn test_mnemonic_layout() {
        let text = Mnemonic::conditional("add", true, "eq")
            .reg(Reg(0))
            .reg(Reg(1))
            .with(Operand::Shift(ShiftKind::Lsl, 3))
            .render();
        assert_eq!(text, "addseq\tr0, r1, lsl #3");
        assert_eq!(Mnemonic::new("nop").render(), "nop");
        let list = Operand::RegList {
            regs: vec![Reg(4), Reg::LR],
            user: false,
        };
        assert_eq!(Mnemonic::new("push").with(list).render(), "push\t{r4, lr}");
    }
}
