// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use armdis_core::{
    decode, ArchVersion, CodeCursor, DecodeConfig, DecodeError, Disassembler, Endianness,
    InstructionSet, JumpDestination, JumpTarget, INVALID_OPCODE,
};

fn arm_words(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

fn thumb_halfwords(halfwords: &[u16]) -> Vec<u8> {
    halfwords.iter().flat_map(|h| h.to_le_bytes()).collect()
}

fn listing(config: DecodeConfig, bytes: &[u8], address: u32) -> anyhow::Result<Vec<String>> {
    let mut lines = Vec::new();
    for insn in Disassembler::new(config).instructions(bytes, address) {
        let insn = insn?;
        lines.push(format!("{:#x} {}", insn.address, insn.text));
    }
    Ok(lines)
}

#[test]
fn test_arm_function_listing() -> anyhow::Result<()> {
    let bytes = arm_words(&[
        0xE92D_4010, // push {r4, lr}
        0xE1A0_4000, // mov r4, r0
        0xE284_0001, // add r0, r4, #1
        0xEB00_0001, // bl +1 word
        0xE8BD_8010, // pop {r4, pc}
    ]);
    let config = DecodeConfig::new(ArchVersion::V7, InstructionSet::Arm);
    assert_eq!(
        listing(config, &bytes, 0x8000)?,
        vec![
            "0x8000 push\t{r4, lr}",
            "0x8004 mov\tr4, r0",
            "0x8008 add\tr0, r4, #1",
            "0x800c bl\t0x8018",
            "0x8010 pop\t{r4, pc}",
        ]
    );
    Ok(())
}

#[test]
fn test_mixed_thumb_stream() -> anyhow::Result<()> {
    let bytes = thumb_halfwords(&[
        0xB510, // push {r4, lr}
        0xF04F, 0x0001, // mov.w r0, #1
        0xF000, 0xF802, // bl +4
        0x2800, // cmp r0, #0
        0xD000, // beq +0
        0xBD10, // pop {r4, pc}
    ]);
    let config = DecodeConfig::new(ArchVersion::V7, InstructionSet::Thumb);
    assert_eq!(
        listing(config, &bytes, 0x100)?,
        vec![
            "0x100 push\t{r4, lr}",
            "0x102 mov.w\tr0, #1",
            "0x106 bl\t0x10e",
            "0x10a cmp\tr0, #0",
            "0x10c beq\t0x110",
            "0x10e pop\t{r4, pc}",
        ]
    );
    Ok(())
}

#[test]
fn test_jump_classification_across_modes() {
    let arm = DecodeConfig::new(ArchVersion::V7, InstructionSet::Arm);
    let thumb = DecodeConfig::new(ArchVersion::V7, InstructionSet::Thumb);

    let jump = |config: &DecodeConfig, bytes: &[u8]| {
        decode(&mut CodeCursor::new(bytes), 0x1000, config)
            .unwrap()
            .jump_target
    };

    // bx lr
    assert_eq!(
        jump(&arm, &0xE12F_FF1Eu32.to_le_bytes()),
        Some(JumpTarget::register(
            armdis_core::decoder::bits::Reg::LR,
            true,
            false
        ))
    );
    // bne back to self
    let bne = jump(&arm, &0x1AFF_FFFEu32.to_le_bytes()).unwrap();
    assert_eq!(bne.destination, JumpDestination::Address(0x1000));
    assert!(!bne.is_sole_destination);
    // mov pc, lr returns through the link register
    assert_eq!(
        jump(&arm, &0xE1A0_F00Eu32.to_le_bytes()),
        Some(JumpTarget::link_register(true))
    );
    // cmp pc, r0 does not write pc
    assert_eq!(jump(&arm, &0xE15F_0000u32.to_le_bytes()), None);

    // pop.w {r4, pc}
    let pop = thumb_halfwords(&[0xE8BD, 0x8010]);
    assert_eq!(jump(&thumb, &pop), Some(JumpTarget::link_register(true)));
    // tbb has no static target
    let tbb = thumb_halfwords(&[0xE8D0, 0xF001]);
    assert_eq!(jump(&thumb, &tbb), None);
    // blx r3 is a register call
    let blx = jump(&thumb, &thumb_halfwords(&[0x4798])).unwrap();
    assert_eq!(blx.destination, JumpDestination::Register(3));
    assert!(blx.is_subroutine_call);
}

#[test]
fn test_architecture_gating() {
    // sdiv r0, r1, r2
    let sdiv = 0xE710_F211u32.to_le_bytes();
    for arch in ArchVersion::ALL {
        let config = DecodeConfig::new(arch, InstructionSet::Arm);
        let insn = decode(&mut CodeCursor::new(&sdiv), 0, &config).unwrap();
        if arch >= ArchVersion::V7 {
            assert_eq!(insn.text, "sdiv\tr0, r1, r2", "{}", arch);
        } else {
            assert_eq!(insn.text, INVALID_OPCODE, "{}", arch);
            assert_eq!(insn.size, 4);
        }
    }

    // Wide Thumb branches only exist from v6t2
    let b_w = thumb_halfwords(&[0xF000, 0xB800]);
    let v6 = DecodeConfig::new(ArchVersion::V6, InstructionSet::Thumb);
    let v6t2 = DecodeConfig::new(ArchVersion::V6T2, InstructionSet::Thumb);
    assert!(decode(&mut CodeCursor::new(&b_w), 0, &v6).unwrap().is_invalid());
    assert_eq!(
        decode(&mut CodeCursor::new(&b_w), 0, &v6t2).unwrap().text,
        "b.w\t0x4"
    );
}

#[test]
fn test_big_endian_thumb() {
    let config = DecodeConfig::new(ArchVersion::V7, InstructionSet::Thumb)
        .with_endianness(Endianness::Big);
    // bl +4 with each halfword stored big-endian
    let bytes = [0xF0, 0x00, 0xF8, 0x02];
    let insn = decode(&mut CodeCursor::new(&bytes), 0x2000, &config).unwrap();
    assert_eq!(insn.opcode, 0xF000_F802);
    assert_eq!(insn.text, "bl\t0x2008");
    assert_eq!(insn.bytes, bytes.to_vec());
}

#[test]
fn test_thumb2_mode_reads_words() {
    let config = DecodeConfig::new(ArchVersion::V7, InstructionSet::Thumb2);
    let bytes = thumb_halfwords(&[0xFB91, 0xF0F2, 0xF3BF, 0x8F5F]);
    let texts: Vec<String> = Disassembler::new(config)
        .instructions(&bytes, 0)
        .map(|r| r.map(|insn| insn.text))
        .collect::<Result<_, DecodeError>>()
        .unwrap();
    assert_eq!(texts, vec!["sdiv\tr0, r1, r2", "dmb\tsy"]);
}

#[test]
fn test_truncated_stream_reports_underrun() {
    let config = DecodeConfig::new(ArchVersion::V7, InstructionSet::Thumb);
    // movs r0, #1 then the first half of a bl
    let bytes = thumb_halfwords(&[0x2001, 0xF000]);
    let results: Vec<_> = Disassembler::new(config).instructions(&bytes, 0).collect();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().text, "movs\tr0, #1");
    assert_eq!(
        results[1],
        Err(DecodeError::InsufficientData {
            needed: 4,
            available: 2
        })
    );
}

#[test]
fn test_instruction_serializes_to_json() -> anyhow::Result<()> {
    let config = DecodeConfig::new(ArchVersion::V7, InstructionSet::Arm);
    let bytes = 0xEB00_0010u32.to_le_bytes();
    let insn = decode(&mut CodeCursor::new(&bytes), 0x1000, &config)?;
    let json = serde_json::to_value(&insn)?;
    assert_eq!(json["address"], 0x1000);
    assert_eq!(json["size"], 4);
    assert_eq!(json["text"], "bl\t0x1048");
    assert_eq!(json["jump_target"]["destination"]["address"], 0x1048);
    assert_eq!(json["jump_target"]["is_subroutine_call"], true);
    Ok(())
}
