//! The packet record pulled from a capture source and fed through the engine.

/// Capture timestamp, seconds and microseconds since the epoch, exactly as
/// stored in the capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct CaptureTimestamp {
    pub secs: i64,
    pub usecs: i64,
}

impl CaptureTimestamp {
    pub fn new(secs: i64, usecs: i64) -> Self {
        Self { secs, usecs }
    }

    /// Total seconds as a float, for pacing arithmetic.
    pub fn as_secs_f64(&self) -> f64 {
        self.secs as f64 + self.usecs as f64 / 1_000_000.0
    }
}

/// An owned link-layer frame pulled from the capture source.
///
/// Invariant: `captured_len <= original_len <= data.len()`.
#[derive(Debug, Clone)]
pub struct Packet {
    pub data: Vec<u8>,
    pub captured_len: usize,
    pub original_len: usize,
    pub timestamp: CaptureTimestamp,
}

impl Packet {
    pub fn new(data: Vec<u8>, captured_len: usize, original_len: usize, timestamp: CaptureTimestamp) -> Self {
        debug_assert!(captured_len <= original_len);
        debug_assert!(original_len <= data.len());
        Self { data, captured_len, original_len, timestamp }
    }

    /// The bytes of the frame actually present right now (bounded by `captured_len`).
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.captured_len]
    }
}
