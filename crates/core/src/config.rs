// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Architecture revision used to gate encodings. Ordering is chronological,
/// so `version >= ArchVersion::V7` reads as "ARMv7 or later".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchVersion {
    #[serde(alias = "armv4", alias = "4")]
    V4,
    #[serde(alias = "armv4t", alias = "arm7tdmi")]
    V4T,
    #[serde(alias = "armv5", alias = "armv5t")]
    V5,
    #[serde(alias = "armv5te", alias = "armv5tej", alias = "arm926ej-s")]
    V5TE,
    #[serde(alias = "armv6", alias = "arm1136")]
    V6,
    #[serde(alias = "armv6t2", alias = "arm1156t2")]
    V6T2,
    #[serde(alias = "armv6k", alias = "armv6kz", alias = "arm1176")]
    V6K,
    #[serde(
        alias = "armv7",
        alias = "armv7-a",
        alias = "armv7-r",
        alias = "cortex-a8",
        alias = "cortex-a9",
        alias = "cortex-r4"
    )]
    V7,
    #[serde(alias = "armv8", alias = "armv8-a", alias = "cortex-a53")]
    V8,
}

impl ArchVersion {
    pub const LATEST: ArchVersion = ArchVersion::V8;

    pub const ALL: [ArchVersion; 9] = [
        ArchVersion::V4,
        ArchVersion::V4T,
        ArchVersion::V5,
        ArchVersion::V5TE,
        ArchVersion::V6,
        ArchVersion::V6T2,
        ArchVersion::V6K,
        ArchVersion::V7,
        ArchVersion::V8,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ArchVersion::V4 => "armv4",
            ArchVersion::V4T => "armv4t",
            ArchVersion::V5 => "armv5",
            ArchVersion::V5TE => "armv5te",
            ArchVersion::V6 => "armv6",
            ArchVersion::V6T2 => "armv6t2",
            ArchVersion::V6K => "armv6k",
            ArchVersion::V7 => "armv7",
            ArchVersion::V8 => "armv8",
        }
    }
}

impl Default for ArchVersion {
    fn default() -> Self {
        ArchVersion::LATEST
    }
}

impl fmt::Display for ArchVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ArchVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let stripped = normalized
            .strip_prefix("arm")
            .unwrap_or(normalized.as_str());
        let stripped = stripped.strip_prefix('v').unwrap_or(stripped);
        match stripped {
            "4" => Ok(ArchVersion::V4),
            "4t" => Ok(ArchVersion::V4T),
            "5" | "5t" => Ok(ArchVersion::V5),
            "5te" | "5tej" => Ok(ArchVersion::V5TE),
            "6" => Ok(ArchVersion::V6),
            "6t2" => Ok(ArchVersion::V6T2),
            "6k" | "6kz" => Ok(ArchVersion::V6K),
            "7" | "7-a" | "7-r" | "7a" | "7r" => Ok(ArchVersion::V7),
            "8" | "8-a" | "8a" => Ok(ArchVersion::V8),
            _ => Err(format!("Unknown architecture version '{}'", s)),
        }
    }
}

/// Which instruction set the bytes are decoded as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstructionSet {
    #[serde(alias = "arm32", alias = "a32")]
    Arm,
    /// Mixed 16/32-bit Thumb stream: 32-bit prefixes switch to Thumb-2 decoding.
    #[serde(alias = "thumb16", alias = "t16", alias = "t32")]
    Thumb,
    /// Every instruction is a 32-bit Thumb-2 word made of two halfwords.
    #[serde(alias = "thumb-2", alias = "thumb32")]
    Thumb2,
}

impl InstructionSet {
    /// Smallest number of bytes a decode in this mode may consume.
    pub fn min_width(self) -> usize {
        match self {
            InstructionSet::Arm | InstructionSet::Thumb2 => 4,
            InstructionSet::Thumb => 2,
        }
    }
}

impl Default for InstructionSet {
    fn default() -> Self {
        InstructionSet::Thumb
    }
}

impl FromStr for InstructionSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arm" | "arm32" | "a32" => Ok(InstructionSet::Arm),
            "thumb" | "thumb16" | "t16" | "t32" => Ok(InstructionSet::Thumb),
            "thumb2" | "thumb-2" | "thumb32" => Ok(InstructionSet::Thumb2),
            _ => Err(format!("Unknown instruction set '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    #[serde(alias = "be", alias = "big-endian")]
    Big,
    #[default]
    #[serde(alias = "le", alias = "little-endian")]
    Little,
}

/// Options recognised by the decoder. Passed by value per call; the decoder never
/// keeps a copy between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    pub arch: ArchVersion,
    pub mode: InstructionSet,
    pub endianness: Endianness,
    /// Caller hint: prefix lines with the instruction address.
    pub show_address: bool,
    /// Caller hint: prefix lines with the raw instruction bytes.
    pub show_bytes: bool,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            arch: ArchVersion::LATEST,
            mode: InstructionSet::Thumb,
            endianness: Endianness::Little,
            show_address: true,
            show_bytes: true,
        }
    }
}

impl DecodeConfig {
    pub fn new(arch: ArchVersion, mode: InstructionSet) -> Self {
        Self {
            arch,
            mode,
            ..Self::default()
        }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_mode(mut self, mode: InstructionSet) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_arch(mut self, arch: ArchVersion) -> Self {
        self.arch = arch;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_ordered() {
        assert!(ArchVersion::V4 < ArchVersion::V4T);
        assert!(ArchVersion::V6T2 < ArchVersion::V6K);
        assert!(ArchVersion::V7 >= ArchVersion::V6K);
        let mut sorted = ArchVersion::ALL;
        sorted.sort();
        assert_eq!(sorted, ArchVersion::ALL);
    }

    #[test]
    fn test_parse_version_names() {
        assert_eq!("armv7".parse::<ArchVersion>(), Ok(ArchVersion::V7));
        assert_eq!("v6T2".parse::<ArchVersion>(), Ok(ArchVersion::V6T2));
        assert_eq!("5te".parse::<ArchVersion>(), Ok(ArchVersion::V5TE));
        assert!("armv9".parse::<ArchVersion>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = DecodeConfig::default();
        assert_eq!(config.arch, ArchVersion::LATEST);
        assert_eq!(config.mode, InstructionSet::Thumb);
        assert_eq!(config.endianness, Endianness::Little);
        assert!(config.show_address);
        assert!(config.show_bytes);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: DecodeConfig = serde_json::from_str(r#"{"mode": "arm"}"#).unwrap();
        assert_eq!(config.mode, InstructionSet::Arm);
        assert_eq!(config.arch, ArchVersion::V8);
        assert_eq!(config.endianness, Endianness::Little);

        let config: DecodeConfig =
            serde_json::from_str(r#"{"arch": "cortex-a8", "endianness": "be"}"#).unwrap();
        assert_eq!(config.arch, ArchVersion::V7);
        assert_eq!(config.endianness, Endianness::Big);
    }
}
