// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Text and JSON-lines rendering of decoded code and data.

use anyhow::{Context, Result};
use armdis_config::ModeRegion;
use armdis_core::{
    decode, CodeCursor, DecodeConfig, DecodedInstruction, Endianness, InstructionSet,
    JumpDestination,
};
use armdis_loader::{CodeImage, RegionKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::{debug, warn};

/// Address range and line budget of a listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Window {
    pub start: Option<u32>,
    pub count: Option<usize>,
}

#[derive(Serialize)]
struct InstructionRecord<'a> {
    #[serde(flatten)]
    instruction: &'a DecodedInstruction,
    mode: InstructionSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<&'a str>,
}

#[derive(Serialize)]
struct DataRecord<'a> {
    address: u32,
    size: usize,
    directive: &'static str,
    value: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<&'a str>,
}

pub struct Listing<W: Write> {
    out: W,
    config: DecodeConfig,
    json: bool,
    /// Ignore mapping symbols and profile regions, decode everything as `config.mode`.
    force_mode: bool,
    regions: Vec<ModeRegion>,
    symbols: BTreeMap<u32, String>,
    window: Window,
    emitted: usize,
}

impl<W: Write> Listing<W> {
    pub fn new(out: W, config: DecodeConfig, json: bool) -> Self {
        Self {
            out,
            config,
            json,
            force_mode: false,
            regions: Vec::new(),
            symbols: BTreeMap::new(),
            window: Window::default(),
            emitted: 0,
        }
    }

    pub fn force_mode(mut self, force: bool) -> Self {
        self.force_mode = force;
        self
    }

    pub fn with_regions(mut self, regions: Vec<ModeRegion>) -> Self {
        self.regions = regions;
        self
    }

    pub fn with_symbols(mut self, symbols: BTreeMap<u32, String>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    /// Lines written so far, labels excluded.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn is_full(&self) -> bool {
        self.window.count.is_some_and(|count| self.emitted >= count)
    }

    /// Drops the part of `bytes` before the window start.
    fn clip<'a>(&self, address: u32, bytes: &'a [u8]) -> Option<(u32, &'a [u8])> {
        let Some(start) = self.window.start else {
            return Some((address, bytes));
        };
        if start <= address {
            return Some((address, bytes));
        }
        let skip = (start - address) as usize;
        if skip >= bytes.len() {
            return None;
        }
        Some((start, &bytes[skip..]))
    }

    fn mode_for(&self, address: u32, run_mode: InstructionSet) -> InstructionSet {
        if self.force_mode {
            return self.config.mode;
        }
        self.regions
            .iter()
            .find(|r| r.contains(address))
            .map(|r| r.mode)
            .unwrap_or(run_mode)
    }

    /// Lists every segment of `image`, switching between code and data at
    /// mapping-symbol boundaries. A run that ends partway through an
    /// instruction has its tail listed as data.
    pub fn write_image(&mut self, image: &CodeImage) -> Result<()> {
        for run in image.runs(self.config.mode) {
            if self.is_full() {
                break;
            }
            let Some((address, bytes)) = self.clip(run.address, run.bytes) else {
                continue;
            };
            debug!(
                "Run at {:#010x}: {} bytes as {:?}",
                address,
                bytes.len(),
                run.kind
            );
            match run.kind {
                RegionKind::Code(mode) => self.write_code(address, bytes, mode, true)?,
                RegionKind::Data => self.write_data(address, bytes)?,
            }
        }
        Ok(())
    }

    /// Lists a standalone byte buffer. Running out of bytes mid-instruction is an error.
    pub fn write_bytes(&mut self, address: u32, bytes: &[u8]) -> Result<()> {
        let Some((address, bytes)) = self.clip(address, bytes) else {
            return Ok(());
        };
        self.write_code(address, bytes, self.config.mode, false)
    }

    fn write_code(
        &mut self,
        mut address: u32,
        bytes: &[u8],
        run_mode: InstructionSet,
        tail_as_data: bool,
    ) -> Result<()> {
        let mut cursor = CodeCursor::new(bytes);
        while !cursor.is_empty() && !self.is_full() {
            let mode = self.mode_for(address, run_mode);
            let config = self.config.with_mode(mode);
            match decode(&mut cursor, address, &config) {
                Ok(insn) => {
                    address = insn.next_address();
                    self.emit_instruction(&insn, mode)?;
                }
                Err(e) if tail_as_data => {
                    warn!("{:#010x}: {}, listing the remainder as data", address, e);
                    return self.write_data(address, cursor.rest());
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Decode failed at {:#010x}", address))
                }
            }
        }
        Ok(())
    }

    fn write_data(&mut self, mut address: u32, bytes: &[u8]) -> Result<()> {
        let mut rest = bytes;
        while !rest.is_empty() && !self.is_full() {
            let size = match rest.len() {
                1 => 1,
                2 | 3 => 2,
                _ => 4,
            };
            let (chunk, tail) = rest.split_at(size);
            self.emit_data(address, chunk)?;
            address = address.wrapping_add(size as u32);
            rest = tail;
        }
        Ok(())
    }

    fn emit_instruction(&mut self, insn: &DecodedInstruction, mode: InstructionSet) -> Result<()> {
        let symbol = self.symbols.get(&insn.address).map(String::as_str);
        if self.json {
            let record = InstructionRecord {
                instruction: insn,
                mode,
                symbol,
            };
            serde_json::to_writer(&mut self.out, &record)?;
            writeln!(self.out)?;
        } else {
            if let Some(name) = symbol {
                writeln!(self.out, "\n{:08x} <{}>:", insn.address, name)?;
            }
            let opcode = match (insn.size, mode) {
                (2, _) => format!("{:04x}", insn.opcode),
                (_, InstructionSet::Arm) => format!("{:08x}", insn.opcode),
                _ => format!("{:04x} {:04x}", insn.opcode >> 16, insn.opcode & 0xFFFF),
            };
            let mut body = insn.text.clone();
            if let Some(JumpDestination::Address(target)) =
                insn.jump_target.map(|j| j.destination)
            {
                if let Some(name) = self.symbols.get(&target) {
                    body.push_str(&format!(" <{}>", name));
                }
            }
            let line = self.columns(insn.address, &opcode, &body);
            writeln!(self.out, "{}", line)?;
        }
        self.emitted += 1;
        Ok(())
    }

    fn emit_data(&mut self, address: u32, chunk: &[u8]) -> Result<()> {
        let value = read_value(chunk, self.config.endianness);
        let (directive, digits) = match chunk.len() {
            4 => (".word", 8),
            2 => (".short", 4),
            _ => (".byte", 2),
        };
        let symbol = self.symbols.get(&address).map(String::as_str);
        if self.json {
            let record = DataRecord {
                address,
                size: chunk.len(),
                directive,
                value,
                symbol,
            };
            serde_json::to_writer(&mut self.out, &record)?;
            writeln!(self.out)?;
        } else {
            if let Some(name) = symbol {
                writeln!(self.out, "\n{:08x} <{}>:", address, name)?;
            }
            let raw = format!("{:0width$x}", value, width = digits);
            let body = format!("{}\t0x{}", directive, raw);
            let line = self.columns(address, &raw, &body);
            writeln!(self.out, "{}", line)?;
        }
        self.emitted += 1;
        Ok(())
    }

    fn columns(&self, address: u32, raw: &str, body: &str) -> String {
        let mut line = String::new();
        if self.config.show_address {
            line.push_str(&format!("{:08x}:\t", address));
        }
        if self.config.show_bytes {
            line.push_str(raw);
            line.push('\t');
        }
        line.push_str(body);
        line
    }
}

fn read_value(chunk: &[u8], endianness: Endianness) -> u32 {
    let fold = |acc: u32, b: &u8| (acc << 8) | *b as u32;
    match endianness {
        Endianness::Big => chunk.iter().fold(0, fold),
        Endianness::Little => chunk.iter().rev().fold(0, fold),
    }
}

/// Parses instruction bytes written as hex in stream order. Whitespace,
/// underscores and a leading `0x` are ignored.
pub fn parse_hex_bytes(input: &str) -> Result<Vec<u8>, String> {
    let trimmed = input.trim();
    let digits: String = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    if digits.is_empty() {
        return Err(format!("No bytes in '{}'", input));
    }
    if digits.len() % 2 != 0 {
        return Err(format!("Odd number of hex digits in '{}'", input));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| format!("Invalid hex byte '{}': {}", &digits[i..i + 2], e))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use armdis_core::ArchVersion;
    use armdis_loader::{load_raw_bytes, MappedRegion};

    fn render(listing: Listing<Vec<u8>>) -> String {
        String::from_utf8(listing.into_inner()).unwrap()
    }

    fn arm_config() -> DecodeConfig {
        DecodeConfig::new(ArchVersion::V7, InstructionSet::Arm)
    }

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(parse_hex_bytes("10402de9").unwrap(), vec![0x10, 0x40, 0x2d, 0xe9]);
        assert_eq!(parse_hex_bytes("0x00f0 02f8").unwrap(), vec![0x00, 0xf0, 0x02, 0xf8]);
        assert_eq!(parse_hex_bytes("10_b5").unwrap(), vec![0x10, 0xb5]);
        assert!(parse_hex_bytes("abc").is_err());
        assert!(parse_hex_bytes("zz").is_err());
        assert!(parse_hex_bytes("  ").is_err());
    }

    #[test]
    fn test_text_columns() {
        let mut listing = Listing::new(Vec::new(), arm_config(), false);
        listing
            .write_bytes(0x8000, &0xE92D_4010u32.to_le_bytes())
            .unwrap();
        assert_eq!(render(listing), "00008000:\te92d4010\tpush\t{r4, lr}\n");

        let mut config = arm_config();
        config.show_address = false;
        config.show_bytes = false;
        let mut listing = Listing::new(Vec::new(), config, false);
        listing
            .write_bytes(0, &0xE12F_FF1Eu32.to_le_bytes())
            .unwrap();
        assert_eq!(render(listing), "bx\tlr\n");
    }

    #[test]
    fn test_thumb2_opcode_is_split_by_halfword() {
        let config = DecodeConfig::new(ArchVersion::V7, InstructionSet::Thumb);
        let mut listing = Listing::new(Vec::new(), config, false);
        listing
            .write_bytes(0x1000, &[0x00, 0xF0, 0x02, 0xF8, 0x70, 0x47])
            .unwrap();
        assert_eq!(
            render(listing),
            "00001000:\tf000 f802\tbl\t0x1008\n00001004:\t4770\tbx\tlr\n"
        );
    }

    #[test]
    fn test_image_data_runs_and_labels() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0xE12F_FF1Eu32.to_le_bytes());
        bytes.extend_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
        bytes.extend_from_slice(&[0x34, 0x12]);
        let mut image = load_raw_bytes(bytes, 0x100);
        image.regions.push(MappedRegion {
            start: 0x104,
            kind: RegionKind::Data,
        });
        image.symbols.insert(0x100, "ret".to_string());

        let mut listing =
            Listing::new(Vec::new(), arm_config(), false).with_symbols(image.symbols.clone());
        listing.write_image(&image).unwrap();
        assert_eq!(listing.emitted(), 3);
        assert_eq!(
            render(listing),
            "\n00000100 <ret>:\n\
             00000100:\te12fff1e\tbx\tlr\n\
             00000104:\tdeadbeef\t.word\t0xdeadbeef\n\
             00000108:\t1234\t.short\t0x1234\n"
        );
    }

    #[test]
    fn test_truncated_run_tail_becomes_data() {
        let image = load_raw_bytes(vec![0x1E, 0xFF, 0x2F, 0xE1, 0xAA, 0xBB], 0);
        let mut listing = Listing::new(Vec::new(), arm_config(), false);
        listing.write_image(&image).unwrap();
        assert!(render(listing).ends_with("00000004:\tbbaa\t.short\t0xbbaa\n"));

        let mut listing = Listing::new(Vec::new(), arm_config(), false);
        assert!(listing.write_bytes(0, &[0x1E, 0xFF]).is_err());
    }

    #[test]
    fn test_window_start_and_count() {
        let words = [0xE1A0_0001u32, 0xE12F_FF1E, 0xE1A0_0001];
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        let mut config = arm_config();
        config.show_bytes = false;
        let mut listing = Listing::new(Vec::new(), config, false).with_window(Window {
            start: Some(0x4),
            count: Some(1),
        });
        listing.write_bytes(0, &bytes).unwrap();
        assert_eq!(render(listing), "00000004:\tbx\tlr\n");
    }

    #[test]
    fn test_profile_regions_switch_mode() {
        let mut bytes = 0xE12F_FF1Eu32.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0x70, 0x47]);
        let mut config = arm_config();
        config.show_address = false;
        config.show_bytes = false;
        let regions = vec![ModeRegion {
            start: 4,
            end: 6,
            mode: InstructionSet::Thumb,
        }];
        let mut listing = Listing::new(Vec::new(), config, false).with_regions(regions.clone());
        listing.write_image(&load_raw_bytes(bytes.clone(), 0)).unwrap();
        assert_eq!(render(listing), "bx\tlr\nbx\tlr\n");

        let mut listing = Listing::new(Vec::new(), config, false)
            .with_regions(regions)
            .force_mode(true);
        listing.write_image(&load_raw_bytes(bytes, 0)).unwrap();
        assert!(render(listing).ends_with(".short\t0x4770\n"));
    }

    #[test]
    fn test_json_records() {
        let mut listing = Listing::new(Vec::new(), arm_config(), true);
        listing
            .write_bytes(0x1000, &0xEB00_0010u32.to_le_bytes())
            .unwrap();
        let out = render(listing);
        let value: serde_json::Value = serde_json::from_str(out.trim()).unwrap();
        assert_eq!(value["text"], "bl\t0x1048");
        assert_eq!(value["mode"], "arm");
        assert_eq!(value["jump_target"]["destination"]["address"], 0x1048);
        assert!(value.get("symbol").is_none());
    }
}
