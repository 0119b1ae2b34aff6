use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use pktreplay::cli::Cli;
use pktreplay::pcap_io::{PcapFileSource, PcapInterfaceWriter};
use pktreplay::sender::LinkWriter;
use pktreplay::Engine;

fn main() -> ExitCode {
    pktreplay::init_tracing();

    match run() {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli.build_config().context("building replay configuration")?;

    if config.has_secondary() && cli.secondary.is_none() {
        anyhow::bail!("interface mode {:?} requires --secondary", cli.interface_mode());
    }

    let mut source = PcapFileSource::open(&cli.input.to_string_lossy())
        .with_context(|| format!("opening capture file {}", cli.input.display()))?;
    let mut primary = PcapInterfaceWriter::open(&cli.primary).with_context(|| format!("opening primary interface {}", cli.primary))?;
    let mut secondary = cli
        .secondary
        .as_ref()
        .map(|name| PcapInterfaceWriter::open(name).with_context(|| format!("opening secondary interface {name}")))
        .transpose()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .context("registering shutdown handler")?;

    let mut engine = Engine::new(config);
    let secondary_writer = secondary.as_mut().map(|w| w as &mut dyn LinkWriter);
    let result = engine.run(&mut source, &mut primary, secondary_writer, &shutdown);

    let counters = engine.counters();
    tracing::info!(
        packets_sent = counters.packets_sent,
        bytes_sent = counters.bytes_sent,
        write_retries = counters.write_retries,
        "replay finished"
    );

    result.context("replay failed")?;

    if shutdown.load(Ordering::Relaxed) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
