//! Centralized named constants and the immutable per-run replay
//! configuration, collected in one place.

use crate::filter::{CidrFilter, IndexFilter, InterfaceCache};

/// Length of an Ethernet header in bytes (dest MAC + src MAC + EtherType).
pub const ETH_HEADER_LEN: usize = 14;

/// Minimum length of an IPv4 header with no options.
pub const MIN_IPV4_HEADER_LEN: usize = 20;

/// EtherType value for IPv4, in host byte order.
pub const ETHERTYPE_IPV4: u16 = 0x0800;

/// IP protocol number for TCP.
pub const IPPROTO_TCP: u8 = 6;

/// IP protocol number for UDP.
pub const IPPROTO_UDP: u8 = 17;

/// All-zero MAC address, meaning "do not rewrite" for a destination-MAC override.
pub const NULL_MAC: [u8; 6] = [0; 6];

/// Pacing policy.
#[derive(Debug, Clone, Copy)]
pub enum PacingMode {
    /// Replay at original capture timing scaled by `multiplier` (> 0).
    OriginalTime { multiplier: f64 },
    /// Drive a constant output rate in bytes/sec (> 0), ignoring capture timing.
    ConstantRate { bytes_per_sec: u64 },
    /// Send as fast as possible; the pacer is never invoked.
    TopSpeed,
}

/// Truncation-handling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationPolicy {
    /// Leave captured-vs-original length mismatches alone.
    None,
    /// Zero-fill up to the original on-the-wire length.
    PadToOriginal,
    /// Rewrite the IP total-length field down to the captured length.
    TruncateToCaptured,
}

/// Interface-selection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceMode {
    /// Always choose the primary interface.
    Single,
    /// Consult the interface-selection cache by ordinal.
    CacheDriven,
    /// Choose by source-address membership in the interface-selection CIDR set.
    CidrDriven,
}

/// Immutable configuration for one replay run.
pub struct ReplayConfig {
    pub pacing: PacingMode,
    pub truncation: TruncationPolicy,
    /// Address-randomization seed; `None` disables randomize-IPs entirely.
    pub seed: Option<u32>,
    pub suppress_martians: bool,
    pub interface_mode: InterfaceMode,
    /// Destination-MAC override for the primary interface (`NULL_MAC` = don't rewrite).
    pub primary_mac: [u8; 6],
    /// Destination-MAC override for the secondary interface (`NULL_MAC` = don't rewrite).
    pub secondary_mac: [u8; 6],
    /// §4.1 step 5 source/destination CIDR include/exclude filter.
    pub cidr_filter: Option<CidrFilter>,
    /// §4.1 step 3 packet-ordinal include/exclude filter.
    pub index_filter: Option<IndexFilter>,
    /// §4.3 cidr-driven interface selector's CIDR set — independent of `cidr_filter`.
    pub interface_cidr: Option<CidrFilter>,
    /// §4.3 cache-driven interface selector's precomputed decisions.
    pub interface_cache: Option<InterfaceCache>,
}

impl ReplayConfig {
    /// A secondary interface is configured whenever the interface mode is
    /// anything but `Single`.
    pub fn has_secondary(&self) -> bool {
        self.interface_mode != InterfaceMode::Single
    }
}
