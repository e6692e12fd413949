// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Code images for the disassembler: executable ELF segments or flat binaries,
//! plus the ARM mapping symbols (`$a`, `$t`, `$d`) that say how each address
//! range should be decoded.

use anyhow::{anyhow, Context, Result};
use armdis_core::{Endianness, InstructionSet};
use goblin::elf::header::EM_ARM;
use goblin::elf::program_header::{PF_X, PT_LOAD};
use goblin::elf::section_header::{SHF_EXECINSTR, SHT_NOBITS};
use goblin::elf::sym::STT_FUNC;
use goblin::elf::Elf;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// How bytes in a mapped range are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Code(InstructionSet),
    Data,
}

/// A mapping symbol: `kind` applies from `start` up to the next mapping symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedRegion {
    pub start: u32,
    pub kind: RegionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSegment {
    pub address: u32,
    pub data: Vec<u8>,
}

impl CodeSegment {
    pub fn end(&self) -> u32 {
        self.address.wrapping_add(self.data.len() as u32)
    }

    pub fn contains(&self, address: u32) -> bool {
        address >= self.address && address < self.end()
    }
}

/// Contiguous bytes that decode one way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run<'a> {
    pub address: u32,
    pub bytes: &'a [u8],
    pub kind: RegionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeImage {
    pub entry: u32,
    pub endianness: Endianness,
    pub segments: Vec<CodeSegment>,
    /// Sorted by `start`.
    pub regions: Vec<MappedRegion>,
    /// Function symbols by address, Thumb bit cleared.
    pub symbols: BTreeMap<u32, String>,
}

impl CodeImage {
    pub fn new(entry: u32, endianness: Endianness) -> Self {
        Self {
            entry,
            endianness,
            segments: Vec::new(),
            regions: Vec::new(),
            symbols: BTreeMap::new(),
        }
    }

    pub fn add_segment(&mut self, address: u32, data: Vec<u8>) {
        self.segments.push(CodeSegment { address, data });
        self.segments.sort_by_key(|s| s.address);
    }

    pub fn segment_containing(&self, address: u32) -> Option<&CodeSegment> {
        self.segments.iter().find(|s| s.contains(address))
    }

    /// Mapping-symbol kind in effect at `address`. A mapping symbol only
    /// reaches to the end of its own segment.
    pub fn region_at(&self, address: u32) -> Option<RegionKind> {
        let segment = self.segment_containing(address)?;
        self.regions
            .iter()
            .rev()
            .find(|r| r.start <= address && r.start >= segment.address)
            .map(|r| r.kind)
    }

    /// Instruction set for `address`, or `default` when no code mapping covers it.
    pub fn mode_at(&self, address: u32, default: InstructionSet) -> InstructionSet {
        match self.region_at(address) {
            Some(RegionKind::Code(mode)) => mode,
            _ => default,
        }
    }

    /// Thumb when the entry point has its interworking bit set.
    pub fn entry_mode(&self) -> Option<InstructionSet> {
        (self.entry & 1 == 1).then_some(InstructionSet::Thumb)
    }

    /// Splits every segment at its mapping-symbol boundaries.
    pub fn runs(&self, default: InstructionSet) -> Vec<Run<'_>> {
        let mut runs = Vec::new();
        for segment in &self.segments {
            let mut starts: Vec<u32> = vec![segment.address];
            starts.extend(
                self.regions
                    .iter()
                    .map(|r| r.start)
                    .filter(|&start| start > segment.address && segment.contains(start)),
            );
            starts.dedup();
            for (i, &start) in starts.iter().enumerate() {
                let end = starts.get(i + 1).copied().unwrap_or_else(|| segment.end());
                let from = (start - segment.address) as usize;
                let to = (end - segment.address) as usize;
                let kind = self
                    .region_at(start)
                    .unwrap_or(RegionKind::Code(default));
                runs.push(Run {
                    address: start,
                    bytes: &segment.data[from..to],
                    kind,
                });
            }
        }
        runs
    }

    pub fn symbol_at(&self, address: u32) -> Option<&str> {
        self.symbols.get(&address).map(String::as_str)
    }
}

fn to_address(value: u64, what: &str) -> Result<u32> {
    u32::try_from(value).map_err(|_| anyhow!("{} {:#x} does not fit a 32-bit address", what, value))
}

fn mapping_kind(name: &str) -> Option<RegionKind> {
    let tag = name.get(..2)?;
    let rest = &name[2..];
    if !(rest.is_empty() || rest.starts_with('.')) {
        return None;
    }
    match tag {
        "$a" => Some(RegionKind::Code(InstructionSet::Arm)),
        "$t" => Some(RegionKind::Code(InstructionSet::Thumb)),
        "$d" => Some(RegionKind::Data),
        _ => None,
    }
}

pub fn load_elf(path: &Path) -> Result<CodeImage> {
    let buffer = fs::read(path).with_context(|| format!("Failed to read ELF file: {:?}", path))?;
    load_elf_bytes(&buffer)
}

pub fn load_elf_bytes(buffer: &[u8]) -> Result<CodeImage> {
    let elf = Elf::parse(buffer).context("Failed to parse ELF binary")?;

    info!("ELF Entry Point: {:#x}", elf.entry);
    if elf.header.e_machine != EM_ARM {
        warn!("ELF machine type {} is not ARM", elf.header.e_machine);
    }

    let endianness = if elf.little_endian {
        Endianness::Little
    } else {
        Endianness::Big
    };
    let mut image = CodeImage::new(to_address(elf.entry, "Entry point")?, endianness);

    for ph in &elf.program_headers {
        if ph.p_type != PT_LOAD || ph.p_flags & PF_X == 0 || ph.p_filesz == 0 {
            continue;
        }
        let address = to_address(ph.p_vaddr, "Segment address")?;
        let size = ph.p_filesz as usize;
        let offset = ph.p_offset as usize;
        debug!(
            "Found executable segment: Addr={:#x}, Size={} bytes, Offset={:#x}",
            address, size, offset
        );
        let data = buffer
            .get(offset..offset + size)
            .ok_or_else(|| anyhow!("Segment out of bounds in ELF file"))?;
        image.add_segment(address, data.to_vec());
    }

    // Relocatable objects have no program headers; fall back to code sections.
    if image.segments.is_empty() {
        for sh in &elf.section_headers {
            if sh.sh_flags & SHF_EXECINSTR as u64 == 0 || sh.sh_type == SHT_NOBITS || sh.sh_size == 0
            {
                continue;
            }
            let address = to_address(sh.sh_addr, "Section address")?;
            let offset = sh.sh_offset as usize;
            let size = sh.sh_size as usize;
            debug!(
                "Found code section: Addr={:#x}, Size={} bytes, Offset={:#x}",
                address, size, offset
            );
            let data = buffer
                .get(offset..offset + size)
                .ok_or_else(|| anyhow!("Section out of bounds in ELF file"))?;
            image.add_segment(address, data.to_vec());
        }
    }

    if image.segments.is_empty() {
        warn!("No executable code found in ELF file");
    }

    for sym in elf.syms.iter() {
        let Some(name) = elf.strtab.get_at(sym.st_name) else {
            continue;
        };
        let value = to_address(sym.st_value, "Symbol value")?;
        if let Some(kind) = mapping_kind(name) {
            image.regions.push(MappedRegion { start: value, kind });
        } else if sym.st_type() == STT_FUNC && !name.is_empty() {
            image.symbols.insert(value & !1, name.to_string());
        }
    }
    image.regions.sort_by_key(|r| r.start);
    image.regions.dedup_by_key(|r| r.start);
    debug!(
        "{} mapping symbols, {} function symbols",
        image.regions.len(),
        image.symbols.len()
    );

    Ok(image)
}

/// Flat binary loaded at `base`.
pub fn load_raw(path: &Path, base: u32) -> Result<CodeImage> {
    let buffer =
        fs::read(path).with_context(|| format!("Failed to read raw image: {:?}", path))?;
    info!("Raw image: {} bytes at {:#x}", buffer.len(), base);
    Ok(load_raw_bytes(buffer, base))
}

pub fn load_raw_bytes(buffer: Vec<u8>, base: u32) -> CodeImage {
    let mut image = CodeImage::new(base, Endianness::Little);
    if !buffer.is_empty() {
        image.add_segment(base, buffer);
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_symbol_names() {
        assert_eq!(
            mapping_kind("$a"),
            Some(RegionKind::Code(InstructionSet::Arm))
        );
        assert_eq!(
            mapping_kind("$t.12"),
            Some(RegionKind::Code(InstructionSet::Thumb))
        );
        assert_eq!(mapping_kind("$d"), Some(RegionKind::Data));
        assert_eq!(mapping_kind("$x"), None);
        assert_eq!(mapping_kind("$ab"), None);
        assert_eq!(mapping_kind("main"), None);
        assert_eq!(mapping_kind(""), None);
    }

    #[test]
    fn test_runs_split_on_regions() {
        let mut image = load_raw_bytes(vec![0; 16], 0x100);
        image.regions = vec![
            MappedRegion {
                start: 0x104,
                kind: RegionKind::Code(InstructionSet::Thumb),
            },
            MappedRegion {
                start: 0x10C,
                kind: RegionKind::Data,
            },
        ];
        let runs = image.runs(InstructionSet::Arm);
        let shape: Vec<(u32, usize, RegionKind)> = runs
            .iter()
            .map(|r| (r.address, r.bytes.len(), r.kind))
            .collect();
        assert_eq!(
            shape,
            vec![
                (0x100, 4, RegionKind::Code(InstructionSet::Arm)),
                (0x104, 8, RegionKind::Code(InstructionSet::Thumb)),
                (0x10C, 4, RegionKind::Data),
            ]
        );
        assert_eq!(image.mode_at(0x106, InstructionSet::Arm), InstructionSet::Thumb);
        assert_eq!(image.mode_at(0x10C, InstructionSet::Arm), InstructionSet::Arm);
        assert_eq!(image.region_at(0x200), None);
    }

    #[test]
    fn test_raw_image_entry() {
        let image = load_raw_bytes(vec![0x70, 0x47], 0x0800_0001);
        assert_eq!(image.entry_mode(), Some(InstructionSet::Thumb));
        assert!(load_raw_bytes(Vec::new(), 0).segments.is_empty());
    }
}
