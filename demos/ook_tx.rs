//! OOK Transmitter Example
//!
//! Keys a complex carrier on and off with a repeating bit pattern and writes
//! the raw `Complex32` samples to a file. Settings come from `sdrchain.toml`
//! and `SDRCHAIN_*` variables; see `TxConfig` for the defaults.

use anyhow::Context;
use sdrchain::logging;
use sdrchain::{build_transmitter, TxConfig};
use std::fs::File;
use std::io::BufWriter;
use tracing::info;
use tracing::level_filters::LevelFilter;

fn main() -> anyhow::Result<()> {
    logging::init(LevelFilter::INFO);

    let cfg = TxConfig::load()?;
    let file = File::create(&cfg.output_path)
        .with_context(|| format!("cannot create {}", cfg.output_path.display()))?;

    let mut tx = build_transmitter(&cfg, BufWriter::new(file))?;
    let report = tx.run()?;

    info!(
        "executed {} iterations in {:.2?}, stopped by {:?}",
        report.ticks, report.elapsed, report.stop
    );
    info!("samples written to {}", cfg.output_path.display());
    Ok(())
}
