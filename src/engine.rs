//! The per-packet pipeline that ties the pacer, rewriter, classifier and
//! sender together.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::checksum::InternetChecksum;
use crate::classifier::{is_martian, select_interface};
use crate::config::{PacingMode, ReplayConfig};
use crate::error::ReplayError;
use crate::interfaces::OutputChoice;
use crate::ipview::IpView;
use crate::pacer::Pacer;
use crate::rewriter::{randomize_ips, rewrite_dest_mac, untruncate};
use crate::sender::{Counters, LinkWriter, Sender};
use crate::source::PacketSource;

pub struct Engine {
    config: ReplayConfig,
    checksum: InternetChecksum,
    pacer: Pacer,
    sender: Sender,
    ordinal: u64,
    last_timestamp: Option<crate::packet::CaptureTimestamp>,
}

impl Engine {
    pub fn new(config: ReplayConfig) -> Self {
        Self {
            config,
            checksum: InternetChecksum,
            pacer: Pacer::new(),
            sender: Sender::new(),
            ordinal: 0,
            last_timestamp: None,
        }
    }

    pub fn counters(&self) -> Counters {
        self.sender.counters()
    }

    /// Runs the replay to completion or until `shutdown` is observed set.
    /// `secondary` is required iff `self.config.has_secondary()`.
    pub fn run(
        &mut self,
        source: &mut dyn PacketSource,
        primary: &mut dyn LinkWriter,
        mut secondary: Option<&mut dyn LinkWriter>,
        shutdown: &AtomicBool,
    ) -> Result<(), ReplayError> {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                tracing::info!(ordinal = self.ordinal, "shutdown requested, stopping");
                return Ok(());
            }

            let Some(mut packet) = source.next_packet()? else {
                tracing::info!(ordinal = self.ordinal, "capture source exhausted");
                return Ok(());
            };
            self.ordinal += 1;

            if let Some(filter) = &self.config.index_filter {
                if !filter.passes(self.ordinal) {
                    continue;
                }
            }

            let mut ip_view = IpView::load_from(packet.bytes(), packet.captured_len);

            if let (Some(view), Some(cidr)) = (&ip_view, &self.config.cidr_filter) {
                if !cidr.passes(view.source_addr()) {
                    continue;
                }
            }

            if self.config.suppress_martians {
                if let Some(view) = &ip_view {
                    if is_martian(view.dest_addr()) {
                        continue;
                    }
                }
            }

            let choice = select_interface(&self.config, self.ordinal, ip_view.as_ref())?;
            if choice == OutputChoice::Drop {
                continue;
            }

            let mac = match choice {
                OutputChoice::Primary => self.config.primary_mac,
                OutputChoice::Secondary => self.config.secondary_mac,
                OutputChoice::Drop => unreachable!(),
            };
            rewrite_dest_mac(&mut packet.data, mac);

            if let Some(view) = ip_view.as_mut() {
                untruncate(&mut packet, view, self.config.truncation, &self.checksum);
            }

            if let (Some(seed), Some(view)) = (self.config.seed, ip_view.as_mut()) {
                randomize_ips(view, seed, &self.checksum);
            }

            if let Some(view) = &ip_view {
                view.store_into(&mut packet.data);
            }

            if !matches!(self.config.pacing, PacingMode::TopSpeed) {
                let len = packet.bytes().len();
                self.pacer.pace(packet.timestamp, self.last_timestamp, len, self.config.pacing);
            }
            self.last_timestamp = Some(packet.timestamp);

            let writer: &mut dyn LinkWriter = match choice {
                OutputChoice::Primary => primary,
                OutputChoice::Secondary => secondary
                    .as_deref_mut()
                    .ok_or_else(|| ReplayError::ImpossibleState("secondary interface selected but not configured".into()))?,
                OutputChoice::Drop => unreachable!(),
            };
            self.sender.send(writer, packet.bytes())?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InterfaceMode, TruncationPolicy, NULL_MAC};
    use crate::filter::{CidrFilter, FilterMode};
    use crate::packet::{CaptureTimestamp, Packet};
    use crate::sender::SendError;

    struct VecSource {
        packets: std::vec::IntoIter<Packet>,
    }

    impl VecSource {
        fn new(packets: Vec<Packet>) -> Self {
            Self { packets: packets.into_iter() }
        }
    }

    impl PacketSource for VecSource {
        fn next_packet(&mut self) -> Result<Option<Packet>, ReplayError> {
            Ok(self.packets.next())
        }
    }

    #[derive(Default)]
    struct RecordingWriter {
        frames: Vec<Vec<u8>>,
    }

    impl LinkWriter for RecordingWriter {
        fn send(&mut self, frame: &[u8]) -> Result<(), SendError> {
            self.frames.push(frame.to_vec());
            Ok(())
        }
    }

    fn udp_frame(src: [u8; 4], dst: [u8; 4]) -> Packet {
        let mut hdr = vec![0u8; 28];
        hdr[0] = 0x45;
        hdr[2..4].copy_from_slice(&28u16.to_be_bytes());
        hdr[9] = crate::config::IPPROTO_UDP;
        hdr[12..16].copy_from_slice(&src);
        hdr[16..20].copy_from_slice(&dst);
        hdr[24..26].copy_from_slice(&8u16.to_be_bytes());

        let mut frame = vec![0u8; 14];
        frame[12..14].copy_from_slice(&0x0800u16.to_be_bytes());
        frame.extend_from_slice(&hdr);
        let len = frame.len();
        Packet::new(frame, len, len, CaptureTimestamp::new(0, 0))
    }

    fn base_config() -> ReplayConfig {
        ReplayConfig {
            pacing: PacingMode::TopSpeed,
            truncation: TruncationPolicy::None,
            seed: None,
            suppress_martians: false,
            interface_mode: InterfaceMode::Single,
            primary_mac: NULL_MAC,
            secondary_mac: NULL_MAC,
            cidr_filter: None,
            index_filter: None,
            interface_cidr: None,
            interface_cache: None,
        }
    }

    #[test]
    fn top_speed_single_interface_sends_every_packet() {
        let config = base_config();
        let mut engine = Engine::new(config);
        let mut source = VecSource::new(vec![udp_frame([10, 0, 0, 1], [10, 0, 0, 2]), udp_frame([10, 0, 0, 3], [10, 0, 0, 4])]);
        let mut primary = RecordingWriter::default();
        let shutdown = AtomicBool::new(false);

        engine.run(&mut source, &mut primary, None, &shutdown).unwrap();

        assert_eq!(primary.frames.len(), 2);
        assert_eq!(engine.counters().packets_sent, 2);
    }

    #[test]
    fn cidr_include_filter_drops_non_matching_source() {
        let mut config = base_config();
        config.cidr_filter = Some(CidrFilter::new(FilterMode::Include, vec!["10.0.0.0/8".parse().unwrap()]));
        let mut engine = Engine::new(config);
        let mut source = VecSource::new(vec![udp_frame([10, 0, 0, 1], [8, 8, 8, 8]), udp_frame([192, 168, 0, 1], [8, 8, 8, 8])]);
        let mut primary = RecordingWriter::default();
        let shutdown = AtomicBool::new(false);

        engine.run(&mut source, &mut primary, None, &shutdown).unwrap();

        assert_eq!(primary.frames.len(), 1);
    }

    #[test]
    fn martian_suppression_drops_broadcast_destination() {
        let mut config = base_config();
        config.suppress_martians = true;
        let mut engine = Engine::new(config);
        let mut source = VecSource::new(vec![udp_frame([10, 0, 0, 1], [255, 255, 255, 255]), udp_frame([10, 0, 0, 1], [10, 0, 0, 9])]);
        let mut primary = RecordingWriter::default();
        let shutdown = AtomicBool::new(false);

        engine.run(&mut source, &mut primary, None, &shutdown).unwrap();

        assert_eq!(primary.frames.len(), 1);
    }

    #[test]
    fn shutdown_flag_stops_before_next_packet() {
        let config = base_config();
        let mut engine = Engine::new(config);
        let mut source = VecSource::new(vec![udp_frame([10, 0, 0, 1], [10, 0, 0, 2])]);
        let mut primary = RecordingWriter::default();
        let shutdown = AtomicBool::new(true);

        engine.run(&mut source, &mut primary, None, &shutdown).unwrap();

        assert_eq!(primary.frames.len(), 0);
    }

    #[test]
    fn index_filter_include_mode_restricts_to_listed_ordinals() {
        let mut config = base_config();
        config.index_filter = Some(crate::filter::IndexFilter::new(FilterMode::Include, vec![(2, 2)]));
        let mut engine = Engine::new(config);
        let mut source = VecSource::new(vec![
            udp_frame([10, 0, 0, 1], [10, 0, 0, 2]),
            udp_frame([10, 0, 0, 1], [10, 0, 0, 3]),
            udp_frame([10, 0, 0, 1], [10, 0, 0, 4]),
        ]);
        let mut primary = RecordingWriter::default();
        let shutdown = AtomicBool::new(false);

        engine.run(&mut source, &mut primary, None, &shutdown).unwrap();

        assert_eq!(primary.frames.len(), 1);
    }
}
