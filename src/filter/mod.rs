//! Deterministic, compositional filter primitives: index filter, CIDR
//! filter, interface-selection cache.

pub mod cache;
pub mod cidr;
pub mod index;

pub use cache::InterfaceCache;
pub use cidr::CidrFilter;
pub use index::IndexFilter;

/// Shared include/exclude mode used by both the index filter and the CIDR
/// filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Include,
    Exclude,
}
