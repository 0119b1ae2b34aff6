//! Tracks accumulated virtual sleep time against a wall clock so total real
//! time elapsed tracks total virtual time, absorbing per-packet overhead and
//! preventing drift.

use std::time::{Duration, Instant};

use crate::config::PacingMode;
use crate::packet::CaptureTimestamp;

/// Process-wide (in practice: per-run) pacer state: wall-clock start time
/// and accumulated virtual sleep. Zeroed on the first packet of a run and
/// never reset thereafter.
pub struct Pacer {
    start: Option<Instant>,
    didsleep: Duration,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer {
    pub fn new() -> Self {
        Self { start: None, didsleep: Duration::ZERO }
    }

    /// Blocks the calling thread until it's time to emit the current
    /// packet, per `mode`. `last` is the capture timestamp of the
    /// previously-sent packet, or `None` on the first packet of the run.
    pub fn pace(&mut self, t_cap: CaptureTimestamp, last: Option<CaptureTimestamp>, len: usize, mode: PacingMode) {
        let sleep_for = self.compute_sleep(t_cap, last, len, mode, Instant::now());
        if !sleep_for.is_zero() {
            std::thread::sleep(sleep_for);
        }
    }

    /// The pure part of `pace`: given an injectable `now`, returns how long
    /// to sleep without actually sleeping. Kept separate so nap-math
    /// boundary cases are testable without a real wall clock.
    fn compute_sleep(
        &mut self,
        t_cap: CaptureTimestamp,
        last: Option<CaptureTimestamp>,
        len: usize,
        mode: PacingMode,
        now: Instant,
    ) -> Duration {
        if last.is_none() {
            self.start = Some(now);
            self.didsleep = Duration::ZERO;
            return Duration::ZERO;
        }

        let start = *self.start.get_or_insert(now);
        let delta = now.saturating_duration_since(start);
        let nap = nominal_nap(mode, t_cap, last, len);
        self.didsleep += nap;

        if self.didsleep > delta {
            self.didsleep - delta
        } else {
            Duration::ZERO
        }
    }
}

/// The nominal inter-packet nap before accounting for accumulated drift.
fn nominal_nap(mode: PacingMode, t_cap: CaptureTimestamp, last: Option<CaptureTimestamp>, len: usize) -> Duration {
    let Some(last_ts) = last else {
        return Duration::ZERO;
    };
    match mode {
        PacingMode::TopSpeed => Duration::ZERO,
        PacingMode::OriginalTime { multiplier } => {
            if t_cap > last_ts {
                let delta_secs = t_cap.as_secs_f64() - last_ts.as_secs_f64();
                Duration::from_secs_f64((delta_secs / multiplier).max(0.0))
            } else {
                Duration::ZERO
            }
        }
        PacingMode::ConstantRate { bytes_per_sec } => {
            if bytes_per_sec == 0 {
                Duration::ZERO
            } else {
                Duration::from_secs_f64(len as f64 / bytes_per_sec as f64)
            }
        }
    }
}
