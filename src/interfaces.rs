//! The "which interface, or none" decision, modeled as a tagged variant
//! instead of a sentinel-valued pointer.

/// Result of interface selection for one packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputChoice {
    Primary,
    Secondary,
    Drop,
}
