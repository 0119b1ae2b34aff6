//! Concrete `PacketSource`/`LinkWriter` bindings onto libpcap: reading frames
//! back out of a capture file, and writing them onto a live interface.

use pcap::{Active, Capture, Offline};

use crate::error::ReplayError;
use crate::packet::{CaptureTimestamp, Packet};
use crate::sender::{LinkWriter, SendError};
use crate::source::PacketSource;

/// Reads frames out of a capture file in file order.
pub struct PcapFileSource {
    capture: Capture<Offline>,
}

impl PcapFileSource {
    pub fn open(path: &str) -> Result<Self, ReplayError> {
        let capture = Capture::from_file(path).map_err(|e| ReplayError::Source(e.to_string()))?;
        Ok(Self { capture })
    }
}

impl PacketSource for PcapFileSource {
    fn next_packet(&mut self) -> Result<Option<Packet>, ReplayError> {
        match self.capture.next_packet() {
            Ok(raw) => {
                let header = raw.header;
                let timestamp = CaptureTimestamp::new(header.ts.tv_sec as i64, header.ts.tv_usec as i64);
                let data = raw.data.to_vec();
                let captured_len = header.caplen as usize;
                let original_len = header.len as usize;
                Ok(Some(Packet::new(data, captured_len, original_len, timestamp)))
            }
            Err(pcap::Error::NoMorePackets) => Ok(None),
            Err(e) => Err(ReplayError::Source(e.to_string())),
        }
    }
}

/// Writes frames onto a live interface handle.
pub struct PcapInterfaceWriter {
    capture: Capture<Active>,
}

impl PcapInterfaceWriter {
    pub fn open(device: &str) -> Result<Self, ReplayError> {
        let capture = Capture::from_device(device)
            .map_err(|e| ReplayError::Config(e.to_string()))?
            .open()
            .map_err(|e| ReplayError::Source(e.to_string()))?;
        Ok(Self { capture })
    }
}

impl LinkWriter for PcapInterfaceWriter {
    fn send(&mut self, frame: &[u8]) -> Result<(), SendError> {
        match self.capture.sendpacket(frame) {
            Ok(()) => Ok(()),
            Err(e) => {
                let msg = e.to_string();
                if is_transient_buffer_error(&msg) {
                    Err(SendError::Transient(msg))
                } else {
                    Err(SendError::Fatal(msg))
                }
            }
        }
    }
}

/// libpcap surfaces a full send buffer as a platform-specific "no buffer
/// space"/ENOBUFS message rather than a typed error variant.
fn is_transient_buffer_error(msg: &str) -> bool {
    let lower = msg.to_ascii_lowercase();
    lower.contains("enobufs") || lower.contains("no buffer space") || lower.contains("buffer full")
}
