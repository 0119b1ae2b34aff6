//! Error type shared by every fatal disposition in the replay engine.
//!
//! One variant per failure domain (`thiserror`, `#[error("{0}")]` per
//! variant), feeding `anyhow` context chains surfaced to `main`.

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("capture source error: {0}")]
    Source(String),

    #[error("link-layer write failed: {0}")]
    Send(String),

    #[error("cache lookup out of range: ordinal {ordinal} exceeds cache length {len}")]
    CacheOverflow { ordinal: u64, len: usize },

    #[error("impossible interface-selection state: {0}")]
    ImpossibleState(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_overflow_message_includes_both_numbers() {
        let err = ReplayError::CacheOverflow { ordinal: 42, len: 10 };
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains("10"));
    }

    #[test]
    fn config_error_wraps_message() {
        let err = ReplayError::Config("missing --primary".into());
        assert_eq!(err.to_string(), "configuration error: missing --primary");
    }
}
