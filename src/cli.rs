//! Command-line surface, built with `clap`'s derive API.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ipnetwork::Ipv4Network;

use crate::config::{InterfaceMode, PacingMode, ReplayConfig, TruncationPolicy, NULL_MAC};
use crate::error::ReplayError;
use crate::filter::{CidrFilter, FilterMode, IndexFilter, InterfaceCache};
use crate::interfaces::OutputChoice;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TruncArg {
    None,
    Pad,
    Truncate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InterfaceModeArg {
    Single,
    Cache,
    Cidr,
}

/// Replays a captured link-layer packet stream onto live network interfaces.
#[derive(Debug, Parser)]
#[command(name = "pktreplay", version, about)]
pub struct Cli {
    /// Path to the input capture file.
    pub input: PathBuf,

    /// Primary output interface name.
    #[arg(long)]
    pub primary: String,

    /// Secondary output interface name, required for cache/cidr interface modes.
    #[arg(long)]
    pub secondary: Option<String>,

    /// Replay at original capture timing scaled by this factor.
    #[arg(long, conflicts_with_all = ["rate", "topspeed"])]
    pub multiplier: Option<f64>,

    /// Replay at a constant output rate, in bytes/sec.
    #[arg(long, conflicts_with_all = ["multiplier", "topspeed"])]
    pub rate: Option<u64>,

    /// Send as fast as possible, ignoring capture timing.
    #[arg(long, conflicts_with_all = ["multiplier", "rate"])]
    pub topspeed: bool,

    /// Address-randomization seed. Omit to leave addresses untouched.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Drop packets whose destination address is 0/8, 127/8, or 255/8.
    #[arg(long)]
    pub no_martians: bool,

    /// Path to a file of one CIDR prefix per line; include-mode source filter.
    #[arg(long, conflicts_with = "cidr_exclude")]
    pub cidr_include: Option<PathBuf>,

    /// Path to a file of one CIDR prefix per line; exclude-mode source filter.
    #[arg(long, conflicts_with = "cidr_include")]
    pub cidr_exclude: Option<PathBuf>,

    /// Comma-separated 1-based ordinals/ranges (e.g. "1-5,9"); include-mode.
    #[arg(long, conflicts_with = "index_exclude")]
    pub index_include: Option<String>,

    /// Comma-separated 1-based ordinals/ranges (e.g. "1-5,9"); exclude-mode.
    #[arg(long, conflicts_with = "index_include")]
    pub index_exclude: Option<String>,

    /// How to pick the output interface per packet.
    #[arg(long, value_enum, default_value_t = InterfaceModeArg::Single)]
    pub interface_mode: InterfaceModeArg,

    /// Path to a cache file: one of "primary"/"secondary"/"drop" per line, in
    /// packet order. Required when `--interface-mode cache`.
    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Path to a file of CIDR prefixes identifying "primary" sources when
    /// `--interface-mode cidr`.
    #[arg(long)]
    pub interface_cidr: Option<PathBuf>,

    /// Destination MAC override on the primary interface, e.g. "aa:bb:cc:dd:ee:ff".
    #[arg(long)]
    pub primary_mac: Option<String>,

    /// Destination MAC override on the secondary interface.
    #[arg(long)]
    pub secondary_mac: Option<String>,

    /// How to reconcile captured vs. original on-the-wire length.
    #[arg(long, value_enum, default_value_t = TruncArg::None)]
    pub trunc: TruncArg,
}

impl Cli {
    pub fn pacing_mode(&self) -> PacingMode {
        if self.topspeed {
            PacingMode::TopSpeed
        } else if let Some(rate) = self.rate {
            PacingMode::ConstantRate { bytes_per_sec: rate }
        } else {
            PacingMode::OriginalTime { multiplier: self.multiplier.unwrap_or(1.0) }
        }
    }

    pub fn truncation_policy(&self) -> TruncationPolicy {
        match self.trunc {
            TruncArg::None => TruncationPolicy::None,
            TruncArg::Pad => TruncationPolicy::PadToOriginal,
            TruncArg::Truncate => TruncationPolicy::TruncateToCaptured,
        }
    }

    pub fn interface_mode(&self) -> InterfaceMode {
        match self.interface_mode {
            InterfaceModeArg::Single => InterfaceMode::Single,
            InterfaceModeArg::Cache => InterfaceMode::CacheDriven,
            InterfaceModeArg::Cidr => InterfaceMode::CidrDriven,
        }
    }

    /// Builds the immutable `ReplayConfig` this invocation describes,
    /// reading any referenced CIDR/cache files along the way.
    pub fn build_config(&self) -> Result<ReplayConfig, ReplayError> {
        let cidr_filter = match (&self.cidr_include, &self.cidr_exclude) {
            (Some(path), None) => Some(load_cidr_filter(path, FilterMode::Include)?),
            (None, Some(path)) => Some(load_cidr_filter(path, FilterMode::Exclude)?),
            (None, None) => None,
            (Some(_), Some(_)) => unreachable!("clap enforces mutual exclusion"),
        };

        let index_filter = match (&self.index_include, &self.index_exclude) {
            (Some(spec), None) => Some(parse_index_filter(spec, FilterMode::Include)?),
            (None, Some(spec)) => Some(parse_index_filter(spec, FilterMode::Exclude)?),
            (None, None) => None,
            (Some(_), Some(_)) => unreachable!("clap enforces mutual exclusion"),
        };

        let interface_cidr = match &self.interface_cidr {
            Some(path) => Some(load_cidr_filter(path, FilterMode::Include)?),
            None => None,
        };

        let interface_cache = match &self.cache_file {
            Some(path) => Some(load_interface_cache(path)?),
            None => None,
        };

        let primary_mac = match &self.primary_mac {
            Some(s) => parse_mac(s)?,
            None => NULL_MAC,
        };
        let secondary_mac = match &self.secondary_mac {
            Some(s) => parse_mac(s)?,
            None => NULL_MAC,
        };

        Ok(ReplayConfig {
            pacing: self.pacing_mode(),
            truncation: self.truncation_policy(),
            seed: self.seed,
            suppress_martians: self.no_martians,
            interface_mode: self.interface_mode(),
            primary_mac,
            secondary_mac,
            cidr_filter,
            index_filter,
            interface_cidr,
            interface_cache,
        })
    }
}

fn load_cidr_filter(path: &std::path::Path, mode: FilterMode) -> Result<CidrFilter, ReplayError> {
    let text = std::fs::read_to_string(path).map_err(|e| ReplayError::Config(format!("reading {}: {e}", path.display())))?;
    let mut prefixes = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let net: Ipv4Network = line.parse().map_err(|e| ReplayError::Config(format!("invalid CIDR prefix {line:?}: {e}")))?;
        prefixes.push(net);
    }
    Ok(CidrFilter::new(mode, prefixes))
}

fn parse_index_filter(spec: &str, mode: FilterMode) -> Result<IndexFilter, ReplayError> {
    let mut ranges = Vec::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let range = match part.split_once('-') {
            Some((start, end)) => {
                let start: u64 = start.trim().parse().map_err(|_| ReplayError::Config(format!("invalid ordinal range {part:?}")))?;
                let end: u64 = end.trim().parse().map_err(|_| ReplayError::Config(format!("invalid ordinal range {part:?}")))?;
                (start, end)
            }
            None => {
                let ordinal: u64 = part.parse().map_err(|_| ReplayError::Config(format!("invalid ordinal {part:?}")))?;
                (ordinal, ordinal)
            }
        };
        ranges.push(range);
    }
    Ok(IndexFilter::new(mode, ranges))
}

fn load_interface_cache(path: &std::path::Path) -> Result<InterfaceCache, ReplayError> {
    let text = std::fs::read_to_string(path).map_err(|e| ReplayError::Config(format!("reading {}: {e}", path.display())))?;
    let mut choices = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let choice = match line {
            "primary" => OutputChoice::Primary,
            "secondary" => OutputChoice::Secondary,
            "drop" => OutputChoice::Drop,
            other => return Err(ReplayError::Config(format!("unrecognized cache entry {other:?}"))),
        };
        choices.push(choice);
    }
    Ok(InterfaceCache::new(choices))
}

fn parse_mac(s: &str) -> Result<[u8; 6], ReplayError> {
    let mut mac = [0u8; 6];
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 6 {
        return Err(ReplayError::Config(format!("MAC address {s:?} must have 6 colon-separated octets")));
    }
    for (i, part) in parts.iter().enumerate() {
        mac[i] = u8::from_str_radix(part, 16).map_err(|_| ReplayError::Config(format!("invalid MAC octet {part:?} in {s:?}")))?;
    }
    Ok(mac)
}
