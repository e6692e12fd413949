// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Decode profiles: the on-disk form of a `DecodeConfig`.
//!
//! Every field is optional. `resolve` fills the gaps with the decoder defaults
//! and logs each one it had to fill.

use anyhow::{Context, Result};
use armdis_core::{ArchVersion, DecodeConfig, Endianness, InstructionSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

fn default_schema_version() -> String {
    "1.0".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported profile format {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
    #[error("Unsupported schema version '{0}'")]
    UnsupportedSchema(String),
    #[error("Region {index} is empty: start {start:#x} is not below end {end:#x}")]
    EmptyRegion { index: usize, start: u32, end: u32 },
    #[error("Regions {first} and {second} overlap")]
    OverlappingRegions { first: usize, second: usize },
}

/// Half-open address range `[start, end)` decoded in one instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeRegion {
    pub start: u32,
    pub end: u32,
    pub mode: InstructionSet,
}

impl ModeRegion {
    pub fn contains(&self, address: u32) -> bool {
        address >= self.start && address < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeProfile {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch: Option<ArchVersion>,
    #[serde(default)]
    pub mode: Option<InstructionSet>,
    #[serde(default)]
    pub endianness: Option<Endianness>,
    #[serde(default)]
    pub show_address: Option<bool>,
    #[serde(default)]
    pub show_bytes: Option<bool>,
    /// Load address for raw images.
    #[serde(default)]
    pub base_address: Option<u32>,
    #[serde(default)]
    pub regions: Vec<ModeRegion>,
}

impl Default for DecodeProfile {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            name: None,
            arch: None,
            mode: None,
            endianness: None,
            show_address: None,
            show_bytes: None,
            base_address: None,
            regions: Vec::new(),
        }
    }
}

impl DecodeProfile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read decode profile {:?}", path))?;

        let profile = match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)
                .with_context(|| format!("Failed to parse decode profile YAML {:?}", path))?,
            Some("json") => Self::from_json_str(&content)
                .with_context(|| format!("Failed to parse decode profile JSON {:?}", path))?,
            other => {
                return Err(ConfigError::UnsupportedFormat(other.unwrap_or("").to_string()).into())
            }
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid decode profile")
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Invalid decode profile")
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.schema_version.starts_with("1.") {
            return Err(ConfigError::UnsupportedSchema(self.schema_version.clone()));
        }
        for (index, region) in self.regions.iter().enumerate() {
            if region.start >= region.end {
                return Err(ConfigError::EmptyRegion {
                    index,
                    start: region.start,
                    end: region.end,
                });
            }
        }
        let mut sorted: Vec<(usize, &ModeRegion)> = self.regions.iter().enumerate().collect();
        sorted.sort_by_key(|(_, r)| r.start);
        for pair in sorted.windows(2) {
            let ((first, a), (second, b)) = (pair[0], pair[1]);
            if b.start < a.end {
                return Err(ConfigError::OverlappingRegions {
                    first: first.min(second),
                    second: first.max(second),
                });
            }
        }
        Ok(())
    }

    /// Fields set in `other` win over this profile's.
    pub fn overlay(mut self, other: DecodeProfile) -> Self {
        self.name = other.name.or(self.name);
        self.arch = other.arch.or(self.arch);
        self.mode = other.mode.or(self.mode);
        self.endianness = other.endianness.or(self.endianness);
        self.show_address = other.show_address.or(self.show_address);
        self.show_bytes = other.show_bytes.or(self.show_bytes);
        self.base_address = other.base_address.or(self.base_address);
        if !other.regions.is_empty() {
            self.regions = other.regions;
        }
        self
    }

    pub fn resolve(&self) -> DecodeConfig {
        let defaults = DecodeConfig::default();
        DecodeConfig {
            arch: self.arch.unwrap_or_else(|| {
                debug!("No architecture in decode profile, using {}", defaults.arch);
                defaults.arch
            }),
            mode: self.mode.unwrap_or_else(|| {
                debug!("No mode in decode profile, using {:?}", defaults.mode);
                defaults.mode
            }),
            endianness: self.endianness.unwrap_or_else(|| {
                debug!(
                    "No endianness in decode profile, using {:?}",
                    defaults.endianness
                );
                defaults.endianness
            }),
            show_address: self.show_address.unwrap_or_else(|| {
                debug!(
                    "show_address not set in decode profile, using {}",
                    defaults.show_address
                );
                defaults.show_address
            }),
            show_bytes: self.show_bytes.unwrap_or_else(|| {
                debug!(
                    "show_bytes not set in decode profile, using {}",
                    defaults.show_bytes
                );
                defaults.show_bytes
            }),
        }
    }

    /// Instruction set the profile assigns to `address`, if any region covers it.
    pub fn mode_at(&self, address: u32) -> Option<InstructionSet> {
        self.regions
            .iter()
            .find(|r| r.contains(address))
            .map(|r| r.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_resolves_to_defaults() {
        let profile = DecodeProfile::default();
        assert_eq!(profile.resolve(), DecodeConfig::default());
    }

    #[test]
    fn test_overlay_prefers_later_fields() {
        let base = DecodeProfile {
            arch: Some(ArchVersion::V5TE),
            mode: Some(InstructionSet::Arm),
            ..Default::default()
        };
        let flags = DecodeProfile {
            mode: Some(InstructionSet::Thumb),
            show_bytes: Some(false),
            ..Default::default()
        };
        let merged = base.overlay(flags).resolve();
        assert_eq!(merged.arch, ArchVersion::V5TE);
        assert_eq!(merged.mode, InstructionSet::Thumb);
        assert!(!merged.show_bytes);
        assert!(merged.show_address);
    }

    #[test]
    fn test_region_validation() {
        let mut profile = DecodeProfile {
            regions: vec![
                ModeRegion {
                    start: 0x100,
                    end: 0x200,
                    mode: InstructionSet::Arm,
                },
                ModeRegion {
                    start: 0x180,
                    end: 0x300,
                    mode: InstructionSet::Thumb,
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            profile.validate(),
            Err(ConfigError::OverlappingRegions {
                first: 0,
                second: 1
            })
        );

        profile.regions[1].start = 0x200;
        assert_eq!(profile.validate(), Ok(()));
        assert_eq!(profile.mode_at(0x1FE), Some(InstructionSet::Arm));
        assert_eq!(profile.mode_at(0x200), Some(InstructionSet::Thumb));
        assert_eq!(profile.mode_at(0x300), None);

        profile.regions[0].end = 0x100;
        assert!(matches!(
            profile.validate(),
            Err(ConfigError::EmptyRegion { index: 0, .. })
        ));
    }
}
