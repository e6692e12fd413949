// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use armdis_config::{ConfigError, DecodeProfile};
use armdis_core::{ArchVersion, Endianness, InstructionSet};
use std::path::PathBuf;

fn scratch_file(name: &str, content: &str) -> anyhow::Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("armdis-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(name);
    std::fs::write(&path, content)?;
    Ok(path)
}

#[test]
fn test_yaml_profile_with_aliases() -> anyhow::Result<()> {
    let yaml = r#"
name: "boot-rom"
arch: "cortex-a8"
mode: "arm32"
endianness: "be"
show_bytes: false
base_address: 0xFFFF0000
regions:
  - start: 0xFFFF0000
    end: 0xFFFF0100
    mode: arm
  - start: 0xFFFF0100
    end: 0xFFFF0800
    mode: thumb
"#;
    let profile = DecodeProfile::from_yaml_str(yaml)?;
    assert_eq!(profile.schema_version, "1.0");
    assert_eq!(profile.arch, Some(ArchVersion::V7));
    assert_eq!(profile.mode, Some(InstructionSet::Arm));
    assert_eq!(profile.base_address, Some(0xFFFF_0000));
    assert_eq!(profile.regions.len(), 2);

    let config = profile.resolve();
    assert_eq!(config.endianness, Endianness::Big);
    assert!(!config.show_bytes);
    assert!(config.show_address);
    assert_eq!(profile.mode_at(0xFFFF_0104), Some(InstructionSet::Thumb));
    Ok(())
}

#[test]
fn test_partial_profile_fills_defaults() -> anyhow::Result<()> {
    let profile = DecodeProfile::from_yaml_str("arch: armv5te\n")?;
    let config = profile.resolve();
    assert_eq!(config.arch, ArchVersion::V5TE);
    assert_eq!(config.mode, InstructionSet::Thumb);
    assert_eq!(config.endianness, Endianness::Little);
    Ok(())
}

#[test]
fn test_unknown_arch_is_rejected() {
    assert!(DecodeProfile::from_yaml_str("arch: armv9\n").is_err());
}

#[test]
fn test_from_file_picks_format_by_extension() -> anyhow::Result<()> {
    let json = scratch_file(
        "profile.json",
        r#"{ "arch": "v6t2", "mode": "thumb2", "show_address": false }"#,
    )?;
    let profile = DecodeProfile::from_file(&json)?;
    assert_eq!(profile.arch, Some(ArchVersion::V6T2));
    assert_eq!(profile.mode, Some(InstructionSet::Thumb2));
    assert_eq!(profile.show_address, Some(false));

    let yaml = scratch_file("profile.yml", "mode: thumb\n")?;
    assert_eq!(
        DecodeProfile::from_file(&yaml)?.mode,
        Some(InstructionSet::Thumb)
    );

    let toml = scratch_file("profile.toml", "mode = \"thumb\"\n")?;
    let err = DecodeProfile::from_file(&toml).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ConfigError>(),
        Some(&ConfigError::UnsupportedFormat("toml".to_string()))
    );
    Ok(())
}

#[test]
fn test_from_file_validates_regions() -> anyhow::Result<()> {
    let yaml = scratch_file(
        "reversed.yaml",
        "regions:\n  - start: 0x200\n    end: 0x100\n    mode: arm\n",
    )?;
    let err = DecodeProfile::from_file(&yaml).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::EmptyRegion { index: 0, .. })
    ));
    Ok(())
}
