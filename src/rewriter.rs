//! In-place mutation of a frame: untruncate, randomize-IPs, MAC rewrite,
//! and the checksum recomputation each of those invalidates.

use crate::checksum::{ChecksumEngine, ChecksumProtocol};
use crate::config::{TruncationPolicy, IPPROTO_TCP, IPPROTO_UDP, NULL_MAC};
use crate::ipview::IpView;
use crate::packet::Packet;

/// Zero-fill or truncate to normalize a captured/original length mismatch,
/// then recompute the checksums that invalidates.
///
/// No-op when `packet.captured_len == packet.original_len` — including when
/// that equality holds because the frame was never truncated in the first
/// place.
pub fn untruncate(
    packet: &mut Packet,
    view: &mut IpView,
    policy: TruncationPolicy,
    checksum: &dyn ChecksumEngine,
) {
    if policy == TruncationPolicy::None || packet.captured_len == packet.original_len {
        return;
    }

    match policy {
        TruncationPolicy::PadToOriginal => {
            let new_ip_len = packet.original_len - crate::config::ETH_HEADER_LEN;
            view.resize(new_ip_len);
            packet.captured_len = packet.original_len;
        }
        TruncationPolicy::TruncateToCaptured => {
            view.set_total_length((packet.captured_len - crate::config::ETH_HEADER_LEN) as u16);
        }
        TruncationPolicy::None => unreachable!(),
    }

    recompute_checksums(view, checksum);
}

/// `(addr XOR seed) - (addr AND seed)` on both source and destination
/// addresses — a deterministic, seed-parameterized scramble, not a
/// reversible XOR (applying it twice is not guaranteed to return to the
/// original address). `seed == 0` is the identity on addresses.
pub fn randomize_ips(view: &mut IpView, seed: u32, checksum: &dyn ChecksumEngine) {
    let new_src = view.source_addr_u32() ^ seed;
    let new_src = new_src.wrapping_sub(view.source_addr_u32() & seed);
    let new_dst = view.dest_addr_u32() ^ seed;
    let new_dst = new_dst.wrapping_sub(view.dest_addr_u32() & seed);

    view.set_source_addr(new_src);
    view.set_dest_addr(new_dst);

    recompute_checksums(view, checksum);
}

/// Overwrites the Ethernet destination (bytes 0..6) if `mac` is non-zero.
/// Source MAC is never touched here.
pub fn rewrite_dest_mac(frame: &mut [u8], mac: [u8; 6]) {
    if mac != NULL_MAC && frame.len() >= 6 {
        frame[0..6].copy_from_slice(&mac);
    }
}

fn recompute_checksums(view: &mut IpView, checksum: &dyn ChecksumEngine) {
    let ip_hdr_len = view.header_len();
    let total_len = view.len();
    if ip_hdr_len > total_len {
        tracing::warn!("IP header length {ip_hdr_len} exceeds view length {total_len}; skipping checksum recompute");
        return;
    }

    let protocol = view.protocol();
    if protocol == IPPROTO_TCP || protocol == IPPROTO_UDP {
        let proto_tag = if protocol == IPPROTO_TCP { ChecksumProtocol::Tcp } else { ChecksumProtocol::Udp };
        if let Err(e) = checksum.recompute(view.as_bytes_mut(), proto_tag, ip_hdr_len..total_len) {
            tracing::warn!("transport checksum recompute failed: {e}");
        }
    }

    if let Err(e) = checksum.recompute(view.as_bytes_mut(), ChecksumProtocol::Ip, 0..ip_hdr_len) {
        tracing::warn!("IP checksum recompute failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::InternetChecksum;
    use crate::config::ETH_HEADER_LEN;

    fn ipv4_udp_view(src: [u8; 4], dst: [u8; 4], payload_len: usize) -> IpView {
        let mut hdr = vec![0u8; 20 + 8 + payload_len];
        hdr[0] = 0x45;
        hdr[2..4].copy_from_slice(&(hdr.len() as u16).to_be_bytes());
        hdr[9] = IPPROTO_UDP;
        hdr[12..16].copy_from_slice(&src);
        hdr[16..20].copy_from_slice(&dst);
        hdr[24..26].copy_from_slice(&((8 + payload_len) as u16).to_be_bytes());

        let mut frame = vec![0u8; ETH_HEADER_LEN];
        frame[12..14].copy_from_slice(&0x0800u16.to_be_bytes());
        frame.extend_from_slice(&hdr);
        IpView::load_from(&frame, frame.len()).unwrap()
    }

    #[test]
    fn randomize_with_seed_zero_is_identity_on_addresses() {
        let mut view = ipv4_udp_view([10, 1, 2, 3], [10, 4, 5, 6], 0);
        let src_before = view.source_addr();
        let dst_before = view.dest_addr();
        randomize_ips(&mut view, 0, &InternetChecksum);
        assert_eq!(view.source_addr(), src_before);
        assert_eq!(view.dest_addr(), dst_before);
    }

    #[test]
    fn randomize_changes_addresses_for_nonzero_seed() {
        let mut view = ipv4_udp_view([10, 1, 2, 3], [10, 4, 5, 6], 0);
        let src_before = view.source_addr_u32();
        randomize_ips(&mut view, 0xDEADBEEF, &InternetChecksum);
        assert_ne!(view.source_addr_u32(), src_before);
    }

    #[test]
    fn randomize_twice_is_not_guaranteed_identity() {
        // This is an XOR-minus-AND scramble, not an involution like plain XOR.
        let mut view = ipv4_udp_view([10, 1, 2, 3], [10, 4, 5, 6], 0);
        let original = view.source_addr_u32();
        randomize_ips(&mut view, 0xABCD1234, &InternetChecksum);
        randomize_ips(&mut view, 0xABCD1234, &InternetChecksum);
        assert_ne!(view.source_addr_u32(), original);
    }

    #[test]
    fn untruncate_noop_when_captured_equals_original() {
        let mut view = ipv4_udp_view([1, 2, 3, 4], [5, 6, 7, 8], 4);
        let before = view.as_bytes().to_vec();
        let mut pkt = Packet::new(vec![0; ETH_HEADER_LEN + before.len()], ETH_HEADER_LEN + before.len(), ETH_HEADER_LEN + before.len(), Default::default());
        untruncate(&mut pkt, &mut view, TruncationPolicy::PadToOriginal, &InternetChecksum);
        assert_eq!(view.as_bytes(), before.as_slice());
    }

    #[test]
    fn untruncate_pad_to_original_zero_fills_and_updates_captured_len() {
        let mut view = ipv4_udp_view([1, 2, 3, 4], [5, 6, 7, 8], 0);
        let captured = ETH_HEADER_LEN + view.len();
        let original = captured + 10;
        let mut pkt = Packet::new(vec![0; original], captured, original, Default::default());
        untruncate(&mut pkt, &mut view, TruncationPolicy::PadToOriginal, &InternetChecksum);
        assert_eq!(pkt.captured_len, original);
        assert_eq!(view.len(), original - ETH_HEADER_LEN);
        assert!(view.as_bytes()[view.len() - 10..].iter().all(|&b| b == 0));
    }

    #[test]
    fn untruncate_truncate_to_captured_rewrites_total_length_field() {
        let mut view = ipv4_udp_view([1, 2, 3, 4], [5, 6, 7, 8], 20);
        let original = ETH_HEADER_LEN + view.len();
        let captured = original - 10;
        let mut pkt = Packet::new(vec![0; original], captured, original, Default::default());
        untruncate(&mut pkt, &mut view, TruncationPolicy::TruncateToCaptured, &InternetChecksum);
        assert_eq!(view.total_length(), (captured - ETH_HEADER_LEN) as u16);
    }

    #[test]
    fn mac_rewrite_is_noop_for_null_mac() {
        let mut frame = vec![9u8; 14];
        let before = frame.clone();
        rewrite_dest_mac(&mut frame, NULL_MAC);
        assert_eq!(frame, before);
    }

    #[test]
    fn mac_rewrite_overwrites_destination_bytes_only() {
        let mut frame = vec![9u8; 14];
        rewrite_dest_mac(&mut frame, [1, 2, 3, 4, 5, 6]);
        assert_eq!(&frame[0..6], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(&frame[6..14], &[9u8; 8]);
    }
}
