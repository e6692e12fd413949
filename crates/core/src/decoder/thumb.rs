// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! 16-bit Thumb encoding table and formatters.
//!
//! Flag-setting instructions always print their `s` form: the decoder keeps no
//! IT state, so it cannot tell when the flags are left alone.

use super::bits::{bit, bits, cond_suffix, low_reg_at, register_list, sign_extend, Reg};
use super::operand::{Indexing, Memory, Mnemonic, Operand};
use super::table::{op, EncodingTable, Entry, Lookup};
use super::{DecodeState, Formatted, JumpTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbTag {
    ShiftImmediate,
    AddSubRegister,
    AddSubImmediate3,
    MoveCompareImmediate,
    AddSubImmediate8,
    Alu,
    HighRegister,
    BranchExchange,
    LoadLiteral,
    LoadStoreRegister,
    LoadStoreImmediate,
    LoadStoreStack,
    Adr,
    AddSpImmediate,
    AdjustSp,
    CompareBranch,
    Extend,
    Push,
    Pop,
    Setend,
    Cps,
    Reverse,
    Breakpoint,
    Hint,
    IfThen,
    StoreMultiple,
    LoadMultiple,
    PermanentlyUndefined,
    SupervisorCall,
    ConditionalBranch,
    Branch,
}

use ThumbTag::*;

static THUMB_ENTRIES: &[Entry<ThumbTag>] = &[
    op!(b"0000_0iii_iimm_mddd", "lsl", ShiftImmediate),
    op!(b"0000_1iii_iimm_mddd", "lsr", ShiftImmediate),
    op!(b"0001_0iii_iimm_mddd", "asr", ShiftImmediate),
    op!(b"0001_100m_mmnn_nddd", "add", AddSubRegister),
    op!(b"0001_101m_mmnn_nddd", "sub", AddSubRegister),
    op!(b"0001_110i_iinn_nddd", "add", AddSubImmediate3),
    op!(b"0001_111i_iinn_nddd", "sub", AddSubImmediate3),
    op!(b"0010_0ddd_iiii_iiii", "mov", MoveCompareImmediate),
    op!(b"0010_1nnn_iiii_iiii", "cmp", MoveCompareImmediate),
    op!(b"0011_0ddd_iiii_iiii", "add", AddSubImmediate8),
    op!(b"0011_1ddd_iiii_iiii", "sub", AddSubImmediate8),
    op!(b"0100_00oo_oomm_mddd", "and", Alu),
    op!(b"0100_0100_dmmm_mddd", "add", HighRegister),
    op!(b"0100_0101_nmmm_mnnn", "cmp", HighRegister),
    op!(b"0100_0110_dmmm_mddd", "mov", HighRegister),
    op!(b"0100_0111_0mmm_m000", "bx", BranchExchange, V4T),
    op!(b"0100_0111_1mmm_m000", "blx", BranchExchange, V5),
    op!(b"0100_1ttt_iiii_iiii", "ldr", LoadLiteral),
    op!(b"0101_000m_mmnn_nttt", "str", LoadStoreRegister),
    op!(b"0101_001m_mmnn_nttt", "strh", LoadStoreRegister),
    op!(b"0101_010m_mmnn_nttt", "strb", LoadStoreRegister),
    op!(b"0101_011m_mmnn_nttt", "ldrsb", LoadStoreRegister),
    op!(b"0101_100m_mmnn_nttt", "ldr", LoadStoreRegister),
    op!(b"0101_101m_mmnn_nttt", "ldrh", LoadStoreRegister),
    op!(b"0101_110m_mmnn_nttt", "ldrb", LoadStoreRegister),
    op!(b"0101_111m_mmnn_nttt", "ldrsh", LoadStoreRegister),
    op!(b"0110_0iii_iinn_nttt", "str", LoadStoreImmediate),
    op!(b"0110_1iii_iinn_nttt", "ldr", LoadStoreImmediate),
    op!(b"0111_0iii_iinn_nttt", "strb", LoadStoreImmediate),
    op!(b"0111_1iii_iinn_nttt", "ldrb", LoadStoreImmediate),
    op!(b"1000_0iii_iinn_nttt", "strh", LoadStoreImmediate),
    op!(b"1000_1iii_iinn_nttt", "ldrh", LoadStoreImmediate),
    op!(b"1001_0ttt_iiii_iiii", "str", LoadStoreStack),
    op!(b"1001_1ttt_iiii_iiii", "ldr", LoadStoreStack),
    op!(b"1010_0ddd_iiii_iiii", "adr", Adr),
    op!(b"1010_1ddd_iiii_iiii", "add", AddSpImmediate),
    op!(b"1011_0000_0iii_iiii", "add", AdjustSp),
    op!(b"1011_0000_1iii_iiii", "sub", AdjustSp),
    op!(b"1011_0001_iiii_innn", "cbz", CompareBranch, V6T2),
    op!(b"1011_0011_iiii_innn", "cbz", CompareBranch, V6T2),
    op!(b"1011_1001_iiii_innn", "cbnz", CompareBranch, V6T2),
    op!(b"1011_1011_iiii_innn", "cbnz", CompareBranch, V6T2),
    op!(b"1011_0010_00mm_mddd", "sxth", Extend, V6),
    op!(b"1011_0010_01mm_mddd", "sxtb", Extend, V6),
    op!(b"1011_0010_10mm_mddd", "uxth", Extend, V6),
    op!(b"1011_0010_11mm_mddd", "uxtb", Extend, V6),
    op!(b"1011_010r_rrrr_rrrr", "push", Push),
    op!(b"1011_0110_0101_e000", "setend", Setend, V6),
    op!(b"1011_0110_011m_0aif", "cps", Cps, V6),
    op!(b"1011_1010_00mm_mddd", "rev", Reverse, V6),
    op!(b"1011_1010_01mm_mddd", "rev16", Reverse, V6),
    op!(b"1011_1010_11mm_mddd", "revsh", Reverse, V6),
    op!(b"1011_110r_rrrr_rrrr", "pop", Pop),
    op!(b"1011_1110_iiii_iiii", "bkpt", Breakpoint, V5),
    op!(b"1011_1111_0000_0000", "nop", Hint, V6T2),
    op!(b"1011_1111_0001_0000", "yield", Hint, hint V7, V6T2),
    op!(b"1011_1111_0010_0000", "wfe", Hint, hint V7, V6T2),
    op!(b"1011_1111_0011_0000", "wfi", Hint, hint V7, V6T2),
    op!(b"1011_1111_0100_0000", "sev", Hint, hint V7, V6T2),
    op!(b"1011_1111_oooo_0000", "nop", Hint, V6T2),
    op!(b"1011_1111_cccc_mmmm", "it", IfThen, V6T2),
    op!(b"1100_0nnn_rrrr_rrrr", "stm", StoreMultiple),
    op!(b"1100_1nnn_rrrr_rrrr", "ldm", LoadMultiple),
    op!(b"1101_1110_iiii_iiii", "udf", PermanentlyUndefined),
    op!(b"1101_1111_iiii_iiii", "svc", SupervisorCall),
    op!(b"1101_cccc_iiii_iiii", "b", ConditionalBranch),
    op!(b"1110_0iii_iiii_iiii", "b", Branch),
];

/// The Thumb16 encoding table in priority order.
pub fn table() -> EncodingTable<'static, ThumbTag> {
    EncodingTable::new(THUMB_ENTRIES)
}

pub(crate) fn decode(state: &DecodeState) -> Option<Formatted> {
    match table().lookup(state.word, state.arch) {
        Lookup::Found(entry) => format(entry.tag, entry.stem, state),
        Lookup::Nop(_) => Some(Mnemonic::new("nop").into()),
        Lookup::Gated(_) | Lookup::Undefined => None,
    }
}

const ALU_OPS: [&str; 16] = [
    "and", "eor", "lsl", "lsr", "asr", "adc", "sbc", "ror", "tst", "rsb", "cmp", "cmn", "orr",
    "mul", "bic", "mvn",
];

fn format(tag: ThumbTag, stem: &'static str, state: &DecodeState) -> Option<Formatted> {
    let hw = state.word;
    let rd = low_reg_at(hw, 0);
    let rn = low_reg_at(hw, 3);
    let m = match tag {
        ShiftImmediate => {
            let imm5 = bits(hw, 10, 6);
            if stem == "lsl" && imm5 == 0 {
                Mnemonic::new("movs").reg(rd).reg(rn)
            } else {
                let amount = if imm5 == 0 { 32 } else { imm5 };
                Mnemonic::conditional(stem, true, "")
                    .reg(rd)
                    .reg(rn)
                    .with(Operand::SignedImm(amount as i32))
            }
        }
        AddSubRegister => Mnemonic::conditional(stem, true, "")
            .reg(rd)
            .reg(rn)
            .reg(low_reg_at(hw, 6)),
        AddSubImmediate3 => Mnemonic::conditional(stem, true, "")
            .reg(rd)
            .reg(rn)
            .imm(bits(hw, 8, 6)),
        MoveCompareImmediate => {
            Mnemonic::conditional(stem, stem == "mov", "")
                .reg(low_reg_at(hw, 8))
                .imm(bits(hw, 7, 0))
        }
        AddSubImmediate8 => Mnemonic::conditional(stem, true, "")
            .reg(low_reg_at(hw, 8))
            .imm(bits(hw, 7, 0)),
        Alu => {
            let op = bits(hw, 9, 6) as usize;
            let name = ALU_OPS[op];
            match name {
                "tst" | "cmp" | "cmn" => Mnemonic::new(name).reg(rd).reg(rn),
                "rsb" => Mnemonic::new("rsbs").reg(rd).reg(rn).imm(0),
                "mul" => Mnemonic::new("muls").reg(rd).reg(rn).reg(rd),
                _ => Mnemonic::conditional(name, true, "").reg(rd).reg(rn),
            }
        }
        HighRegister => return Some(high_register(stem, hw)),
        BranchExchange => {
            let rm = Reg::new(bits(hw, 6, 3));
            return Some(Formatted::jump(
                Mnemonic::new(stem).reg(rm),
                JumpTarget::register(rm, true, stem == "blx"),
            ));
        }
        LoadLiteral => Mnemonic::new(stem)
            .reg(low_reg_at(hw, 8))
            .mem(Memory::imm(Reg::PC, bits(hw, 7, 0) * 4, true, Indexing::Offset)),
        LoadStoreRegister => Mnemonic::new(stem).reg(rd).mem(Memory::reg(
            rn,
            low_reg_at(hw, 6),
            true,
            None,
            Indexing::Offset,
        )),
        LoadStoreImmediate => {
            let scale = match stem {
                "str" | "ldr" => 4,
                "strh" | "ldrh" => 2,
                _ => 1,
            };
            Mnemonic::new(stem).reg(rd).mem(Memory::imm(
                rn,
                bits(hw, 10, 6) * scale,
                true,
                Indexing::Offset,
            ))
        }
        LoadStoreStack => Mnemonic::new(stem)
            .reg(low_reg_at(hw, 8))
            .mem(Memory::imm(Reg::SP, bits(hw, 7, 0) * 4, true, Indexing::Offset)),
        Adr => {
            let base = state.address.wrapping_add(4) & !3;
            Mnemonic::new(stem)
                .reg(low_reg_at(hw, 8))
                .with(Operand::Address(base.wrapping_add(bits(hw, 7, 0) * 4)))
        }
        AddSpImmediate => Mnemonic::new(stem)
            .reg(low_reg_at(hw, 8))
            .reg(Reg::SP)
            .imm(bits(hw, 7, 0) * 4),
        AdjustSp => Mnemonic::new(stem)
            .reg(Reg::SP)
            .reg(Reg::SP)
            .imm(bits(hw, 6, 0) * 4),
        CompareBranch => {
            let offset = (bits(hw, 9, 9) << 6) | (bits(hw, 7, 3) << 1);
            let target = state.address.wrapping_add(4).wrapping_add(offset);
            return Some(Formatted::jump(
                Mnemonic::new(stem).reg(rd).with(Operand::Address(target)),
                JumpTarget::address(target, false, false),
            ));
        }
        Extend | Reverse => Mnemonic::new(stem).reg(rd).reg(rn),
        Push => {
            let mut list = bits(hw, 7, 0);
            if bit(hw, 8) {
                list |= 1 << 14;
            }
            if list == 0 {
                return None;
            }
            Mnemonic::new(stem).with(Operand::RegList {
                regs: register_list(list),
                user: false,
            })
        }
        Pop => {
            let mut list = bits(hw, 7, 0);
            if bit(hw, 8) {
                list |= 1 << 15;
            }
            if list == 0 {
                return None;
            }
            let text = Mnemonic::new(stem).with(Operand::RegList {
                regs: register_list(list),
                user: false,
            });
            let jump = bit(hw, 8).then(|| JumpTarget::link_register(true));
            return Some(Formatted::jump_if(text, jump));
        }
        Setend => Mnemonic::new(stem).text(if bit(hw, 3) { "be" } else { "le" }),
        Cps => {
            let flags: String = [(2, 'a'), (1, 'i'), (0, 'f')]
                .iter()
                .filter(|(n, _)| bit(hw, *n))
                .map(|(_, c)| *c)
                .collect();
            if flags.is_empty() {
                return None;
            }
            Mnemonic::new(if bit(hw, 4) { "cpsid" } else { "cpsie" }).text(flags)
        }
        Breakpoint | PermanentlyUndefined | SupervisorCall => {
            Mnemonic::new(stem).imm(bits(hw, 7, 0))
        }
        Hint => Mnemonic::new(stem),
        IfThen => if_then(bits(hw, 7, 4), bits(hw, 3, 0))?,
        StoreMultiple => {
            let list = bits(hw, 7, 0);
            if list == 0 {
                return None;
            }
            Mnemonic::new(stem)
                .with(Operand::Writeback(low_reg_at(hw, 8)))
                .with(Operand::RegList {
                    regs: register_list(list),
                    user: false,
                })
        }
        LoadMultiple => {
            let list = bits(hw, 7, 0);
            if list == 0 {
                return None;
            }
            let base = low_reg_at(hw, 8);
            let base = if bit(list, base.number() as u32) {
                Operand::Reg(base)
            } else {
                Operand::Writeback(base)
            };
            Mnemonic::new(stem).with(base).with(Operand::RegList {
                regs: register_list(list),
                user: false,
            })
        }
        ConditionalBranch => {
            let offset = sign_extend(bits(hw, 7, 0) << 1, 9);
            let target = state.address.wrapping_add(4).wrapping_add(offset as u32);
            return Some(Formatted::jump(
                Mnemonic::conditional(stem, false, cond_suffix(bits(hw, 11, 8)))
                    .with(Operand::Address(target)),
                JumpTarget::address(target, false, false),
            ));
        }
        Branch => {
            let offset = sign_extend(bits(hw, 10, 0) << 1, 12);
            let target = state.address.wrapping_add(4).wrapping_add(offset as u32);
            return Some(Formatted::jump(
                Mnemonic::new(stem).with(Operand::Address(target)),
                JumpTarget::address(target, true, false),
            ));
        }
    };
    Some(m.into())
}

fn high_register(stem: &str, hw: u32) -> Formatted {
    let rd = Reg::new((bits(hw, 7, 7) << 3) | bits(hw, 2, 0));
    let rm = Reg::new(bits(hw, 6, 3));
    let text = Mnemonic::new(stem).reg(rd).reg(rm);
    let jump = (stem != "cmp" && rd.is_pc()).then(|| JumpTarget::link_register(true));
    Formatted::jump_if(text, jump)
}

/// `it{x{y{z}}} <firstcond>`; each mask bit above the trailing one selects
/// then (`t`) when it equals the low bit of the condition.
fn if_then(firstcond: u32, mask: u32) -> Option<Mnemonic> {
    if mask == 0 || firstcond == 0xF {
        return None;
    }
    let mut name = String::from("it");
    let extra = 3 - mask.trailing_zeros();
    for i in 0..extra {
        let b = (mask >> (3 - i)) & 1;
        if b == (firstcond & 1) {
            name.push('t');
        } else if firstcond == 0xE {
            return None;
        } else {
            name.push('e');
        }
    }
    let cond = match cond_suffix(firstcond) {
        "" => "al",
        c => c,
    };
    Some(Mnemonic::new(name).text(cond))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArchVersion;
    use crate::decoder::JumpDestination;

    fn decode_at(hw: u16, address: u32, arch: ArchVersion) -> Option<Formatted> {
        decode(&DecodeState::new(address, hw as u32, arch))
    }

    fn text(hw: u16) -> String {
        decode_at(hw, 0, ArchVersion::V7)
            .map(|f| f.text.render())
            .unwrap_or_else(|| "<invalid>".to_string())
    }

    #[test]
    fn test_immediate_forms() {
        // MOVS R0, #1 -> 2001
        assert_eq!(text(0x2001), "movs\tr0, #1");
        // CMP R1, #0x20 -> 2920
        assert_eq!(text(0x2920), "cmp\tr1, #0x20");
        // ADDS R2, #5 -> 3205
        assert_eq!(text(0x3205), "adds\tr2, #5");
        // SUBS R0, R1, #2 -> 1E88
        assert_eq!(text(0x1E88), "subs\tr0, r1, #2");
        // LSLS R0, R1, #3 -> 00C8
        assert_eq!(text(0x00C8), "lsls\tr0, r1, #3");
        // LSLS R0, R1, #0 is MOVS R0, R1 -> 0008
        assert_eq!(text(0x0008), "movs\tr0, r1");
        // LSRS R0, R1, #32 -> 0808
        assert_eq!(text(0x0808), "lsrs\tr0, r1, #32");
    }

    #[test]
    fn test_alu_and_high_registers() {
        // ANDS R0, R1 -> 4008
        assert_eq!(text(0x4008), "ands\tr0, r1");
        // RSBS R0, R1, #0 -> 4248
        assert_eq!(text(0x4248), "rsbs\tr0, r1, #0");
        // MULS R0, R1, R0 -> 4348
        assert_eq!(text(0x4348), "muls\tr0, r1, r0");
        // TST R2, R3 -> 421A
        assert_eq!(text(0x421A), "tst\tr2, r3");
        // MOV R8, R1 -> 4688
        assert_eq!(text(0x4688), "mov\tr8, r1");
        // ADD SP, R1 -> 448D
        assert_eq!(text(0x448D), "add\tsp, r1");
    }

    #[test]
    fn test_loads_and_stores() {
        // LDR R0, [R1, #4] -> 6848
        assert_eq!(text(0x6848), "ldr\tr0, [r1, #4]");
        // STRB R2, [R3, #1] -> 705A
        assert_eq!(text(0x705A), "strb\tr2, [r3, #1]");
        // LDRH R0, [R1, #2] -> 8848
        assert_eq!(text(0x8848), "ldrh\tr0, [r1, #2]");
        // LDR R0, [R1, R2] -> 5888
        assert_eq!(text(0x5888), "ldr\tr0, [r1, r2]");
        // LDR R0, [SP, #8] -> 9802
        assert_eq!(text(0x9802), "ldr\tr0, [sp, #8]");
        // LDR R3, [PC, #16] -> 4B04
        assert_eq!(text(0x4B04), "ldr\tr3, [pc, #16]");
        // LDM R0!, {R1, R2} -> C806
        assert_eq!(text(0xC806), "ldm\tr0!, {r1, r2}");
        // LDM R0, {R0, R1} keeps the base -> C803
        assert_eq!(text(0xC803), "ldm\tr0, {r0, r1}");
        // STM R1!, {R0} -> C101
        assert_eq!(text(0xC101), "stm\tr1!, {r0}");
    }

    #[test]
    fn test_stack_and_address_forms() {
        // PUSH {R4, LR} -> B510
        assert_eq!(text(0xB510), "push\t{r4, lr}");
        // SUB SP, SP, #16 -> B084
        assert_eq!(text(0xB084), "sub\tsp, sp, #0x10");
        // ADD R0, SP, #4 -> A801
        assert_eq!(text(0xA801), "add\tr0, sp, #4");
        // ADR R0, at 0x1002 aligns the pc: (0x1006 & ~3) + 8
        let adr = decode_at(0xA002, 0x1002, ArchVersion::V7).unwrap();
        assert_eq!(adr.text.render(), "adr\tr0, 0x100c");
    }

    #[test]
    fn test_branches() {
        // B to self -> E7FE
        let b = decode_at(0xE7FE, 0x2000, ArchVersion::V7).unwrap();
        assert_eq!(b.text.render(), "b\t0x2000");
        let jump = b.jump.unwrap();
        assert_eq!(jump.destination, JumpDestination::Address(0x2000));
        assert!(jump.is_sole_destination);

        // BEQ +4 -> D002
        let beq = decode_at(0xD002, 0x100, ArchVersion::V7).unwrap();
        assert_eq!(beq.text.render(), "beq\t0x108");
        assert!(!beq.jump.unwrap().is_sole_destination);

        // CBZ R0, +8 -> B120
        let cbz = decode_at(0xB120, 0x100, ArchVersion::V7).unwrap();
        assert_eq!(cbz.text.render(), "cbz\tr0, 0x10c");
        assert!(!cbz.jump.unwrap().is_sole_destination);

        // BX LR -> 4770
        let bx = decode_at(0x4770, 0, ArchVersion::V7).unwrap();
        assert_eq!(bx.text.render(), "bx\tlr");
        assert_eq!(bx.jump.unwrap().destination, JumpDestination::LINK_REGISTER);

        // BLX R3 -> 4798
        let blx = decode_at(0x4798, 0, ArchVersion::V7).unwrap();
        assert!(blx.jump.unwrap().is_subroutine_call);

        // POP {R4, PC} -> BD10
        let pop = decode_at(0xBD10, 0, ArchVersion::V7).unwrap();
        assert_eq!(pop.text.render(), "pop\t{r4, pc}");
        assert_eq!(pop.jump, Some(JumpTarget::link_register(true)));

        // MOV PC, LR -> 46F7
        let mov = decode_at(0x46F7, 0, ArchVersion::V7).unwrap();
        assert_eq!(mov.jump, Some(JumpTarget::link_register(true)));
    }

    #[test]
    fn test_trap_instructions() {
        // SVC #0xAB -> DFAB
        assert_eq!(text(0xDFAB), "svc\t#0xab");
        // UDF #0 -> DE00
        assert_eq!(text(0xDE00), "udf\t#0");
        // BKPT #0 -> BE00
        assert_eq!(text(0xBE00), "bkpt\t#0");
    }

    #[test]
    fn test_it_blocks() {
        // IT EQ -> BF08
        assert_eq!(text(0xBF08), "it\teq");
        // ITTE NE -> BF1A: mask 1010, firstcond 0001
        assert_eq!(text(0xBF1A), "itte\tne");
        // ITET NE -> BF16: mask 0110
        assert_eq!(text(0xBF16), "itet\tne");
        // ITE AL is unpredictable -> BFEC
        assert_eq!(text(0xBFEC), "<invalid>");
    }

    #[test]
    fn test_misc_v6() {
        // REV R0, R1 -> BA08
        assert_eq!(text(0xBA08), "rev\tr0, r1");
        // UXTB R0, R1 -> B2C8
        assert_eq!(text(0xB2C8), "uxtb\tr0, r1");
        // CPSID I -> B672
        assert_eq!(text(0xB672), "cpsid\ti");
        // SETEND BE -> B658
        assert_eq!(text(0xB658), "setend\tbe");
        assert!(decode_at(0xBA08, 0, ArchVersion::V5TE).is_none());
    }

    #[test]
    fn test_hint_versions() {
        // WFI -> BF30
        assert_eq!(text(0xBF30), "wfi");
        let nop = decode_at(0xBF30, 0, ArchVersion::V6T2).unwrap();
        assert_eq!(nop.text.render(), "nop");
        assert!(decode_at(0xBF30, 0, ArchVersion::V6).is_none());
        // CBZ needs ARMv6T2
        assert!(decode_at(0xB120, 0, ArchVersion::V6).is_none());
    }
}
