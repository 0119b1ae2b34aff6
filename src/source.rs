//! The pull interface a capture source implements.

use crate::error::ReplayError;
use crate::packet::Packet;

/// Yields frames in capture order. `Ok(None)` means end of capture; `Err`
/// is a fatal read failure.
pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<Packet>, ReplayError>;
}
