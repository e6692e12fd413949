// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Ordered bit-pattern tables.
//!
//! Each encoding is written as a pattern string where `0`/`1` are fixed bits,
//! letters are fields (wildcards) and `_`/spaces are separators. Lookup is a
//! linear scan that returns the first entry whose fixed bits match, so a more
//! specific pattern must appear before any broader pattern that also covers it.

use crate::config::ArchVersion;

/// Parse a pattern string into `(mask, value)` at compile time.
///
/// Patterns must describe exactly 16 or 32 bits; anything else fails const
/// evaluation of the table that uses it.
pub const fn parse_pattern(pattern: &[u8]) -> (u32, u32) {
    let mut mask: u32 = 0;
    let mut value: u32 = 0;
    let mut width: u32 = 0;
    let mut i = 0;
    while i < pattern.len() {
        let c = pattern[i];
        i += 1;
        if c == b'_' || c == b' ' {
            continue;
        }
        mask <<= 1;
        value <<= 1;
        match c {
            b'0' => mask |= 1,
            b'1' => {
                mask |= 1;
                value |= 1;
            }
            _ => {}
        }
        width += 1;
    }
    if width != 16 && width != 32 {
        panic!("encoding pattern must be 16 or 32 bits wide");
    }
    (mask, value)
}

/// Minimum architecture revision for an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Since(ArchVersion),
    /// Hint instruction: decodes normally from `since`, executes as `nop`
    /// from `nop_since`, and is invalid below that.
    Hint {
        since: ArchVersion,
        nop_since: ArchVersion,
    },
}

/// Outcome of checking an entry against the configured architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Available,
    Nop,
    Unavailable,
}

impl Availability {
    pub fn gate(self, arch: ArchVersion) -> Gate {
        match self {
            Availability::Since(since) if arch >= since => Gate::Available,
            Availability::Since(_) => Gate::Unavailable,
            Availability::Hint { since, .. } if arch >= since => Gate::Available,
            Availability::Hint { nop_since, .. } if arch >= nop_since => Gate::Nop,
            Availability::Hint { .. } => Gate::Unavailable,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Entry<T> {
    pub mask: u32,
    pub value: u32,
    pub stem: &'static str,
    pub tag: T,
    pub availability: Availability,
}

impl<T> Entry<T> {
    #[inline]
    pub fn matches(&self, word: u32) -> bool {
        word & self.mask == self.value
    }
}

/// Result of a gated lookup.
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'t, T> {
    Found(&'t Entry<T>),
    /// A hint below its minimum revision that still executes as `nop`.
    Nop(&'t Entry<T>),
    /// The matched entry exists but not at the configured revision.
    Gated(&'t Entry<T>),
    Undefined,
}

/// An ordered encoding table for one instruction set.
#[derive(Debug, Clone, Copy)]
pub struct EncodingTable<'t, T> {
    entries: &'t [Entry<T>],
}

impl<'t, T> EncodingTable<'t, T> {
    pub const fn new(entries: &'t [Entry<T>]) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &'t [Entry<T>] {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose fixed bits match `word`.
    pub fn find(&self, word: u32) -> Option<&'t Entry<T>> {
        self.entries.iter().find(|entry| entry.matches(word))
    }

    pub fn lookup(&self, word: u32, arch: ArchVersion) -> Lookup<'t, T> {
        match self.find(word) {
            None => Lookup::Undefined,
            Some(entry) => match entry.availability.gate(arch) {
                Gate::Available => Lookup::Found(entry),
                Gate::Nop => Lookup::Nop(entry),
                Gate::Unavailable => Lookup::Gated(entry),
            },
        }
    }
}

/// Table entry available from the given revision; `hint` entries take a
/// second revision from which they fall back to `nop`.
macro_rules! op {
    ($pattern:literal, $stem:literal, $tag:expr) => {
        op!($pattern, $stem, $tag, V4)
    };
    ($pattern:literal, $stem:literal, $tag:expr, $since:ident) => {{
        const MV: (u32, u32) = $crate::decoder::table::parse_pattern($pattern);
        $crate::decoder::table::Entry {
            mask: MV.0,
            value: MV.1,
            stem: $stem,
            tag: $tag,
            availability: $crate::decoder::table::Availability::Since(
                $crate::config::ArchVersion::$since,
            ),
        }
    }};
    ($pattern:literal, $stem:literal, $tag:expr, hint $since:ident, $nop_since:ident) => {{
        const MV: (u32, u32) = $crate::decoder::table::parse_pattern($pattern);
        $crate::decoder::table::Entry {
            mask: MV.0,
            value: MV.1,
            stem: $stem,
            tag: $tag,
            availability: $crate::decoder::table::Availability::Hint {
                since: $crate::config::ArchVersion::$since,
                nop_since: $crate::config::ArchVersion::$nop_since,
            },
        }
    }};
}

pub(crate) use op;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Tag {
        Specific,
        General,
        Wait,
    }

    static OVERLAPPING: [Entry<Tag>; 3] = [
        op!(b"0000_0000_0000_0000_1111_0000_1010_0101", "special", Tag::Specific, V7),
        op!(b"xxxx_xxxx_xxxx_xxxx_1111_xxxx_xxxx_xxxx", "general", Tag::General),
        op!(b"1011_1111_0010_0000", "wfe", Tag::Wait, hint V7, V6T2),
    ];

    #[test]
    fn test_parse_pattern_fixed_and_wildcard_bits() {
        assert_eq!(
            parse_pattern(b"cccc_1010_iiii_iiii_iiii_iiii_iiii_iiii"),
            (0x0F00_0000, 0x0A00_0000)
        );
        assert_eq!(parse_pattern(b"0100 0110 dmmm mddd"), (0xFF00, 0x4600));
        assert_eq!(
            parse_pattern(b"11111111111111111111111111111111"),
            (0xFFFF_FFFF, 0xFFFF_FFFF)
        );
    }

    #[test]
    fn test_first_match_wins() {
        let table = EncodingTable::new(&OVERLAPPING);
        let word = 0x0000_F0A5;
        assert!(OVERLAPPING[0].matches(word));
        assert!(OVERLAPPING[1].matches(word));
        assert_eq!(table.find(word).map(|e| e.tag), Some(Tag::Specific));

        // Swapping the order changes the winner
        let reversed = [OVERLAPPING[1], OVERLAPPING[0]];
        let table = EncodingTable::new(&reversed);
        assert_eq!(table.find(word).map(|e| e.tag), Some(Tag::General));
    }

    #[test]
    fn test_unmatched_word_is_undefined() {
        let table = EncodingTable::new(&OVERLAPPING);
        assert!(matches!(
            table.lookup(0x0000_0000, ArchVersion::LATEST),
            Lookup::Undefined
        ));
    }

    #[test]
    fn test_version_gate() {
        let table = EncodingTable::new(&OVERLAPPING);
        assert!(matches!(
            table.lookup(0x0000_F0A5, ArchVersion::V6),
            Lookup::Gated(_)
        ));
        assert!(matches!(
            table.lookup(0x0000_F0A5, ArchVersion::V7),
            Lookup::Found(_)
        ));
    }

    #[test]
    fn test_hint_gate_levels() {
        let hint = OVERLAPPING[2].availability;
        assert_eq!(hint.gate(ArchVersion::V7), Gate::Available);
        assert_eq!(hint.gate(ArchVersion::V6K), Gate::Nop);
        assert_eq!(hint.gate(ArchVersion::V6T2), Gate::Nop);
        assert_eq!(hint.gate(ArchVersion::V6), Gate::Unavailable);
    }
}
