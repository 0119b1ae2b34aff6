//! The send side: hands a finished frame to a link-layer writer, retrying
//! forever on a transient buffer-full condition and bailing out on anything
//! else.

use crate::error::ReplayError;

/// A destination for finished frames — a live interface, a pcap dump file,
/// or (in tests) an in-memory sink.
pub trait LinkWriter {
    fn send(&mut self, frame: &[u8]) -> Result<(), SendError>;
}

/// `Transient` is retried forever by `Sender::send`; `Fatal` aborts the run.
#[derive(Debug, Clone)]
pub enum SendError {
    Transient(String),
    Fatal(String),
}

/// Running totals for one replay run, reported at shutdown.
#[derive(Debug, Default, Clone, Copy)]
pub struct Counters {
    pub packets_sent: u64,
    pub bytes_sent: u64,
    pub write_retries: u64,
}

pub struct Sender {
    counters: Counters,
}

impl Default for Sender {
    fn default() -> Self {
        Self::new()
    }
}

impl Sender {
    pub fn new() -> Self {
        Self { counters: Counters::default() }
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Sends `frame` via `writer`. A transient failure is counted and
    /// retried with no bound; a fatal failure propagates immediately.
    pub fn send(&mut self, writer: &mut dyn LinkWriter, frame: &[u8]) -> Result<(), ReplayError> {
        loop {
            match writer.send(frame) {
                Ok(()) => {
                    self.counters.packets_sent += 1;
                    self.counters.bytes_sent += frame.len() as u64;
                    return Ok(());
                }
                Err(SendError::Transient(msg)) => {
                    self.counters.write_retries += 1;
                    tracing::warn!("transient write failure, retrying: {msg}");
                }
                Err(SendError::Fatal(msg)) => {
                    return Err(ReplayError::Send(msg));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlakyWriter {
        failures_remaining: u32,
        sent: Vec<Vec<u8>>,
    }

    impl LinkWriter for FlakyWriter {
        fn send(&mut self, frame: &[u8]) -> Result<(), SendError> {
            if self.failures_remaining > 0 {
                self.failures_remaining -= 1;
                return Err(SendError::Transient("buffer full".into()));
            }
            self.sent.push(frame.to_vec());
            Ok(())
        }
    }

    struct AlwaysFatalWriter;

    impl LinkWriter for AlwaysFatalWriter {
        fn send(&mut self, _frame: &[u8]) -> Result<(), SendError> {
            Err(SendError::Fatal("device gone".into()))
        }
    }

    #[test]
    fn transient_failures_retry_until_success() {
        let mut writer = FlakyWriter { failures_remaining: 5, sent: Vec::new() };
        let mut sender = Sender::new();
        sender.send(&mut writer, b"hello").unwrap();

        let counters = sender.counters();
        assert_eq!(counters.packets_sent, 1);
        assert_eq!(counters.write_retries, 5);
        assert_eq!(writer.sent.len(), 1);
    }

    #[test]
    fn fatal_failure_propagates_immediately() {
        let mut writer = AlwaysFatalWriter;
        let mut sender = Sender::new();
        let err = sender.send(&mut writer, b"hello").unwrap_err();
        assert!(matches!(err, ReplayError::Send(_)));
        assert_eq!(sender.counters().packets_sent, 0);
    }

    #[test]
    fn bytes_sent_accumulates_across_calls() {
        let mut writer = FlakyWriter { failures_remaining: 0, sent: Vec::new() };
        let mut sender = Sender::new();
        sender.send(&mut writer, b"abc").unwrap();
        sender.send(&mut writer, b"de").unwrap();
        assert_eq!(sender.counters().bytes_sent, 5);
        assert_eq!(sender.counters().packets_sent, 2);
    }
}
