//! A set of IPv4 prefixes with an include/exclude mode. Used both for the
//! source-address include/exclude filter and, independently, for the
//! cidr-driven interface selector (see DESIGN.md: these are two distinct
//! `CidrFilter` values, never implicitly shared).

use std::net::Ipv4Addr;

use ipnetwork::Ipv4Network;

use super::FilterMode;

#[derive(Debug, Clone)]
pub struct CidrFilter {
    mode: FilterMode,
    prefixes: Vec<Ipv4Network>,
}

impl CidrFilter {
    pub fn new(mode: FilterMode, prefixes: Vec<Ipv4Network>) -> Self {
        Self { mode, prefixes }
    }

    /// Whether `addr` matches any configured prefix, ignoring include/exclude
    /// mode. Used by the cidr-driven interface selector, which treats
    /// matching as "primary" rather than as a pass/fail filter decision.
    pub fn contains_address(&self, addr: Ipv4Addr) -> bool {
        self.prefixes.iter().any(|net| net.contains(addr))
    }

    /// Include mode passes addresses that match some prefix; exclude mode
    /// passes addresses that match none.
    pub fn passes(&self, addr: Ipv4Addr) -> bool {
        match self.mode {
            FilterMode::Include => self.contains_address(addr),
            FilterMode::Exclude => !self.contains_address(addr),
        }
    }
}
