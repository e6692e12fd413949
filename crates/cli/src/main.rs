// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Result;
use armdis_config::DecodeProfile;
use armdis_core::{ArchVersion, DecodeConfig, Endianness, InstructionSet};
use armdis_loader::CodeImage;
use clap::{Args, Parser, Subcommand};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{debug, error, info};

mod listing;

use listing::{parse_hex_bytes, Listing, Window};

const EXIT_OK: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

fn parse_u32_addr(s: &str) -> Result<u32, String> {
    let trimmed = s.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex address '{}': {}", s, e))
    } else {
        u32::from_str(trimmed).map_err(|e| format!("Invalid address '{}': {}", s, e))
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ARM, Thumb and Thumb-2 disassembler",
    long_about = None,
    subcommand_negates_reqs = true
)]
struct Cli {
    /// ELF image to disassemble, or a flat binary with --raw
    file: Option<PathBuf>,

    /// Treat FILE as a flat binary instead of an ELF image
    #[arg(long)]
    raw: bool,

    #[command(flatten)]
    decode: DecodeArgs,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Decode options shared by file listings and `hex`.
#[derive(Args, Debug, Clone, Default)]
struct DecodeArgs {
    /// Load address for flat binaries and hex input (default: 0)
    #[arg(long, global = true, value_parser = parse_u32_addr)]
    base: Option<u32>,

    /// First address to list
    #[arg(long, global = true, value_parser = parse_u32_addr)]
    start: Option<u32>,

    /// Stop after N lines
    #[arg(short = 'n', long, global = true)]
    count: Option<usize>,

    /// Architecture version (v4, v4t, v5, v5t, v5te, v6, v6t2, v6k, v7, v8)
    #[arg(short, long, global = true)]
    arch: Option<ArchVersion>,

    /// Instruction set (arm, thumb, thumb2). Overrides mapping symbols.
    #[arg(short, long, global = true)]
    mode: Option<InstructionSet>,

    /// Read instructions as big-endian
    #[arg(long, global = true)]
    big_endian: bool,

    /// Decode profile (YAML or JSON)
    #[arg(short, long, global = true)]
    profile: Option<PathBuf>,

    /// Omit the address column
    #[arg(long, global = true)]
    no_address: bool,

    /// Omit the raw bytes column
    #[arg(long, global = true)]
    no_bytes: bool,

    /// Emit one JSON object per line
    #[arg(long, global = true)]
    json: bool,
}

impl DecodeArgs {
    /// Only flags that were actually given, so profile values survive the overlay.
    fn overrides(&self) -> DecodeProfile {
        DecodeProfile {
            arch: self.arch,
            mode: self.mode,
            endianness: self.big_endian.then_some(Endianness::Big),
            show_address: self.no_address.then_some(false),
            show_bytes: self.no_bytes.then_some(false),
            base_address: self.base,
            ..DecodeProfile::default()
        }
    }

    fn profile(&self) -> Result<DecodeProfile> {
        let base = match &self.profile {
            Some(path) => {
                info!("Loading decode profile: {:?}", path);
                DecodeProfile::from_file(path)?
            }
            None => DecodeProfile::default(),
        };
        Ok(base.overlay(self.overrides()))
    }

    fn window(&self) -> Window {
        Window {
            start: self.start,
            count: self.count,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Disassemble bytes given on the command line.
    Hex(HexArgs),
}

#[derive(Parser, Debug)]
struct HexArgs {
    /// Instruction bytes in stream order, e.g. `00f002f8`
    #[arg(required = true)]
    bytes: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so listings stay machine readable.
    let level = if cli.trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Some(Commands::Hex(args)) => run_hex(&cli.decode, args),
        None => run_file(&cli),
    }
}

fn run_file(cli: &Cli) -> ExitCode {
    let Some(path) = &cli.file else {
        error!("Missing FILE argument (use `armdis hex` for inline bytes)");
        return ExitCode::from(EXIT_CONFIG_ERROR);
    };

    let profile = match cli.decode.profile() {
        Ok(profile) => profile,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let loaded = if cli.raw {
        armdis_loader::load_raw(path, profile.base_address.unwrap_or(0))
    } else {
        armdis_loader::load_elf(path)
    };
    let image = match loaded {
        Ok(image) => image,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };

    let config = image_config(&profile, &image, cli.raw);
    info!(
        "Decoding {} segment(s) as {} {:?}",
        image.segments.len(),
        config.arch,
        config.mode
    );

    let stdout = std::io::stdout();
    let mut listing = Listing::new(BufWriter::new(stdout.lock()), config, cli.decode.json)
        .force_mode(cli.decode.mode.is_some())
        .with_regions(profile.regions.clone())
        .with_symbols(image.symbols.clone())
        .with_window(cli.decode.window());

    match listing.write_image(&image).and_then(|_| finish(listing)) {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

/// Fills what the profile leaves open from the image: byte order from the ELF
/// header, and the instruction set from the entry point.
fn image_config(profile: &DecodeProfile, image: &CodeImage, raw: bool) -> DecodeConfig {
    let mut config = profile.resolve();
    if profile.endianness.is_none() {
        config.endianness = image.endianness;
    }
    if profile.mode.is_none() {
        config.mode = match image.entry_mode() {
            Some(mode) => mode,
            None if raw => config.mode,
            // An even ELF entry point is ARM state.
            None => InstructionSet::Arm,
        };
    }
    config
}

fn run_hex(decode: &DecodeArgs, args: &HexArgs) -> ExitCode {
    let profile = match decode.profile() {
        Ok(profile) => profile,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let mut bytes = Vec::new();
    for chunk in &args.bytes {
        match parse_hex_bytes(chunk) {
            Ok(parsed) => bytes.extend(parsed),
            Err(e) => {
                error!("{}", e);
                return ExitCode::from(EXIT_CONFIG_ERROR);
            }
        }
    }

    let config = profile.resolve();
    let stdout = std::io::stdout();
    let mut listing = Listing::new(BufWriter::new(stdout.lock()), config, decode.json)
        .with_regions(profile.regions.clone())
        .with_window(decode.window());

    let base = profile.base_address.unwrap_or(0);
    match listing.write_bytes(base, &bytes).and_then(|_| finish(listing)) {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

fn finish<W: Write>(listing: Listing<W>) -> Result<()> {
    debug!("Listed {} line(s)", listing.emitted());
    listing.into_inner().flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_u32_addr() {
        assert_eq!(parse_u32_addr("0x8000"), Ok(0x8000));
        assert_eq!(parse_u32_addr("0X10"), Ok(0x10));
        assert_eq!(parse_u32_addr(" 256 "), Ok(256));
        assert!(parse_u32_addr("0xZZ").is_err());
        assert!(parse_u32_addr("0x1_0000_0000").is_err());
    }

    #[test]
    fn test_flags_override_only_what_was_given() {
        let args = DecodeArgs {
            no_bytes: true,
            arch: Some(ArchVersion::V6),
            ..DecodeArgs::default()
        };
        let file = DecodeProfile {
            arch: Some(ArchVersion::V7),
            mode: Some(InstructionSet::Arm),
            show_bytes: Some(true),
            ..DecodeProfile::default()
        };
        let merged = file.overlay(args.overrides());
        assert_eq!(merged.arch, Some(ArchVersion::V6));
        assert_eq!(merged.mode, Some(InstructionSet::Arm));
        assert_eq!(merged.show_bytes, Some(false));
        assert_eq!(merged.show_address, None);
        assert_eq!(merged.endianness, None);
    }

    #[test]
    fn test_image_config_precedence() {
        let mut image = armdis_loader::load_raw_bytes(vec![0; 4], 0x8000);
        image.endianness = Endianness::Big;

        let config = image_config(&DecodeProfile::default(), &image, false);
        assert_eq!(config.mode, InstructionSet::Arm);
        assert_eq!(config.endianness, Endianness::Big);

        let config = image_config(&DecodeProfile::default(), &image, true);
        assert_eq!(config.mode, DecodeConfig::default().mode);

        image.entry |= 1;
        let config = image_config(&DecodeProfile::default(), &image, false);
        assert_eq!(config.mode, InstructionSet::Thumb);

        let profile = DecodeProfile {
            mode: Some(InstructionSet::Thumb2),
            endianness: Some(Endianness::Little),
            ..DecodeProfile::default()
        };
        let config = image_config(&profile, &image, false);
        assert_eq!(config.mode, InstructionSet::Thumb2);
        assert_eq!(config.endianness, Endianness::Little);
    }

    #[test]
    fn test_cli_parses_hex_with_global_flags() {
        let cli = Cli::parse_from(["armdis", "hex", "--mode", "arm", "--base", "0x100", "1eff2fe1"]);
        assert_eq!(cli.decode.mode, Some(InstructionSet::Arm));
        assert_eq!(cli.decode.base, Some(0x100));
        assert!(matches!(cli.command, Some(Commands::Hex(ref h)) if h.bytes == ["1eff2fe1"]));
    }
}
