pub mod checksum;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod interfaces;
pub mod ipview;
pub mod pacer;
pub mod pcap_io;
pub mod packet;
pub mod rewriter;
pub mod sender;
pub mod source;

pub use config::ReplayConfig;
pub use engine::Engine;
pub use error::ReplayError;

/// Initializes `tracing` from `RUST_LOG`/`PKTREPLAY_LOG`, defaulting to
/// `pktreplay=info` when neither is set.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("PKTREPLAY_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("pktreplay=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
