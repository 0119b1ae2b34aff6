//! Per-packet decisions: martian suppression and interface selection. These
//! are pure functions over the config and the current packet's IP view — no
//! mutable state of their own. Both only apply once an IP view is present.

use std::net::Ipv4Addr;

use crate::config::{InterfaceMode, ReplayConfig};
use crate::error::ReplayError;
use crate::interfaces::OutputChoice;
use crate::ipview::IpView;

/// A martian destination: high byte of 0, 127 or 255.
pub fn is_martian(dest: Ipv4Addr) -> bool {
    matches!(dest.octets()[0], 0 | 127 | 255)
}

/// Decide which interface (if any) this packet goes out, per the
/// configured mode.
pub fn select_interface(
    config: &ReplayConfig,
    ordinal: u64,
    ip_view: Option<&IpView>,
) -> Result<OutputChoice, ReplayError> {
    match config.interface_mode {
        InterfaceMode::Single => Ok(OutputChoice::Primary),
        InterfaceMode::CacheDriven => {
            let cache = config
                .interface_cache
                .as_ref()
                .ok_or_else(|| ReplayError::ImpossibleState("cache-driven mode with no interface cache configured".into()))?;
            cache.lookup(ordinal)
        }
        InterfaceMode::CidrDriven => {
            let Some(view) = ip_view else {
                return Ok(OutputChoice::Primary);
            };
            let cidr = config
                .interface_cidr
                .as_ref()
                .ok_or_else(|| ReplayError::ImpossibleState("cidr-driven mode with no interface CIDR set configured".into()))?;
            if cidr.contains_address(view.source_addr()) {
                Ok(OutputChoice::Primary)
            } else {
                Ok(OutputChoice::Secondary)
            }
        }
    }
}
