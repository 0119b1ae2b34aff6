//! The one's-complement 16-bit Internet checksum (RFC 1071), and the
//! `ChecksumEngine` trait the Rewriter delegates to.
//!
//! A single contract — an explicit byte range plus a protocol tag — covers
//! both the IP header and the TCP/UDP pseudo-header case, bound to a
//! pure-Rust implementation rather than an external checksum library, since
//! computing RFC 1071 checksums is core engineering here, not an external
//! collaborator.

use std::ops::Range;

use crate::config::{IPPROTO_TCP, IPPROTO_UDP};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumProtocol {
    Ip,
    Tcp,
    Udp,
}

#[derive(Debug, thiserror::Error)]
#[error("checksum computation failed: {0}")]
pub struct ChecksumError(pub String);

/// Recomputes and writes back a checksum field in place.
pub trait ChecksumEngine {
    /// `view` is the full IP-and-above buffer. `range` is the byte span
    /// within `view` holding the unit to checksum: the IP header itself for
    /// `Ip`, the transport segment for `Tcp`/`Udp`.
    fn recompute(
        &self,
        view: &mut [u8],
        protocol: ChecksumProtocol,
        range: Range<usize>,
    ) -> Result<(), ChecksumError>;
}

/// The one real implementation: a pure one's-complement Internet checksum.
#[derive(Debug, Default, Clone, Copy)]
pub struct InternetChecksum;

impl ChecksumEngine for InternetChecksum {
    fn recompute(
        &self,
        view: &mut [u8],
        protocol: ChecksumProtocol,
        range: Range<usize>,
    ) -> Result<(), ChecksumError> {
        if range.end > view.len() || range.start > range.end {
            return Err(ChecksumError(format!(
                "checksum range {:?} out of bounds for {}-byte view",
                range,
                view.len()
            )));
        }

        match protocol {
            ChecksumProtocol::Ip => recompute_ip(view, range),
            ChecksumProtocol::Tcp | ChecksumProtocol::Udp => recompute_transport(view, protocol, range),
        }
    }
}

fn recompute_ip(view: &mut [u8], range: Range<usize>) -> Result<(), ChecksumError> {
    const IP_CHECKSUM_OFFSET: usize = 10;
    if range.len() < IP_CHECKSUM_OFFSET + 2 {
        return Err(ChecksumError("IP header too short for checksum field".into()));
    }
    let field = range.start + IP_CHECKSUM_OFFSET;
    view[field] = 0;
    view[field + 1] = 0;

    let sum = checksum16(&view[range.clone()]);
    view[field..field + 2].copy_from_slice(&sum.to_be_bytes());
    Ok(())
}

fn recompute_transport(
    view: &mut [u8],
    protocol: ChecksumProtocol,
    range: Range<usize>,
) -> Result<(), ChecksumError> {
    // IPv4 pseudo-header: src addr (4), dst addr (4), zero (1), protocol (1), length (2).
    if view.len() < 20 {
        return Err(ChecksumError("view too short to contain an IPv4 header".into()));
    }
    let checksum_offset = match protocol {
        ChecksumProtocol::Tcp => 16,
        ChecksumProtocol::Udp => 6,
        ChecksumProtocol::Ip => unreachable!(),
    };
    if range.len() < checksum_offset + 2 {
        return Err(ChecksumError("transport segment too short for checksum field".into()));
    }

    let proto_byte = if protocol == ChecksumProtocol::Tcp { IPPROTO_TCP } else { IPPROTO_UDP };
    let mut pseudo = [0u8; 12];
    pseudo[0..4].copy_from_slice(&view[12..16]);
    pseudo[4..8].copy_from_slice(&view[16..20]);
    pseudo[9] = proto_byte;
    pseudo[10..12].copy_from_slice(&(range.len() as u16).to_be_bytes());

    let field = range.start + checksum_offset;
    view[field] = 0;
    view[field + 1] = 0;

    let mut sum = checksum16_partial(&pseudo, 0);
    sum = checksum16_partial(&view[range.clone()], sum);
    let result = finish_checksum(sum);

    // A UDP checksum of 0 after recomputation is written as 0, not the
    // RFC 768 all-ones sentinel.
    let to_write = if protocol == ChecksumProtocol::Udp && result == 0 { 0 } else { result };
    view[field..field + 2].copy_from_slice(&to_write.to_be_bytes());
    Ok(())
}

/// Sums `bytes` as a sequence of big-endian 16-bit words (odd trailing byte
/// treated as high-order), folds carries, and returns the completed checksum.
fn checksum16(bytes: &[u8]) -> u16 {
    finish_checksum(checksum16_partial(bytes, 0))
}

/// Accumulates the running 32-bit sum of 16-bit words without folding or
/// complementing, so multiple byte ranges (e.g. pseudo-header + segment)
/// can be summed together before a single finishing step.
fn checksum16_partial(bytes: &[u8], initial: u32) -> u32 {
    let mut sum = initial;
    let mut chunks = bytes.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }
    if let [last] = chunks.remainder() {
        sum += (*last as u32) << 8;
    }
    sum
}

fn finish_checksum(mut sum: u32) -> u16 {
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}
