//! On-off keying transmitter.
//!
//! ```text
//! VectorSource ─▶ Repeat ─▶ ToComplex.real
//! ConstantSource(0) ─────▶ ToComplex.imag
//! ToComplex ──────────────────────────▶ Multiply.left
//! SignalSource(carrier) ─▶ Throttle ──▶ Multiply.right
//! Multiply ─▶ StreamSink
//! ```
//!
//! Each data symbol is held for `repeat_count` samples and gates the carrier:
//! a 1 passes it at full amplitude, a 0 silences it.

use crate::blocks::{
    ConstantSource, Multiply, Repeat, SignalSource, StreamSink, Throttle, ToComplex, VectorSource,
};
use crate::config::TxConfig;
use crate::dsl::GraphBuilder;
use crate::error::Error;
use crate::graph::NodeId;
use crate::invariant_ppt::{assert_invariant, TRANSMITTER_WIRED};
use crate::rt::{RunLimit, RunReport, Runtime};
use num_complex::Complex32;
use std::io::Write;
use std::marker::PhantomData;

/// Node ids of the transmitter's blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxNodes {
    /// `VectorSource<f32>` replaying the symbols.
    pub data: NodeId,
    /// `Repeat<f32>` holding each symbol for `repeat_count` samples.
    pub repeat: NodeId,
    /// `ConstantSource<f32>` feeding the imaginary part.
    pub zero: NodeId,
    /// `ToComplex<f32>` building the baseband sample.
    pub to_complex: NodeId,
    /// `SignalSource<Complex32>` generating the carrier.
    pub carrier: NodeId,
    /// `Throttle<Complex32>` pacing the carrier.
    pub throttle: NodeId,
    /// `Multiply<Complex32>` gating the carrier.
    pub multiply: NodeId,
    /// `StreamSink<Complex32, W>` writing the output.
    pub sink: NodeId,
}

/// A wired transmitter writing `Complex32` samples to `W`.
#[derive(Debug)]
pub struct Transmitter<W> {
    runtime: Runtime,
    nodes: TxNodes,
    limit: RunLimit,
    _writer: PhantomData<fn() -> W>,
}

/// Validate `cfg` and wire the transmitter around `writer`.
pub fn build_transmitter<W: Write + Send + 'static>(
    cfg: &TxConfig,
    writer: W,
) -> Result<Transmitter<W>, Error> {
    cfg.validate()?;

    let mut carrier = SignalSource::<Complex32>::new(
        cfg.carrier_waveform,
        cfg.carrier_frequency,
        cfg.sample_rate,
        cfg.carrier_amplitude,
    )?;
    carrier.set_offset(Complex32::new(0.0, 0.0));

    let mut b = GraphBuilder::new();
    let data = b.node("data", VectorSource::new(cfg.data.clone(), cfg.repeat_data))?;
    let repeat = b.node("repeat", Repeat::<f32>::new(cfg.repeat_count)?)?;
    let zero = b.node("zero", ConstantSource::new(0.0f32))?;
    let to_complex = b.node("to_complex", ToComplex::<f32>::new())?;
    let carrier = b.node("carrier", carrier)?;
    let throttle = b.node("throttle", Throttle::<Complex32>::new(cfg.sample_rate)?)?;
    let multiply = b.node("multiply", Multiply::<Complex32>::new())?;
    let sink = b.node("sink", StreamSink::<Complex32, W>::new(writer))?;

    b.connect(data, repeat, "in")?;
    b.connect(repeat, to_complex, "real")?;
    b.connect(zero, to_complex, "imag")?;
    b.connect(carrier, throttle, "in")?;
    b.connect(to_complex, multiply, "left")?;
    b.connect(throttle, multiply, "right")?;
    b.connect(multiply, sink, "in")?;

    let runtime = Runtime::new(b.build())?;
    assert_invariant(
        TRANSMITTER_WIRED,
        runtime.plan.order.last() == Some(&sink.0),
        "Sink runs last in every tick",
        Some("build_transmitter"),
    );
    info!(
        "ook: {} symbols x {} samples at {} Hz, carrier {} Hz",
        cfg.data.len(),
        cfg.repeat_count,
        cfg.sample_rate,
        cfg.carrier_frequency
    );

    Ok(Transmitter {
        runtime,
        nodes: TxNodes {
            data: data.0,
            repeat: repeat.0,
            zero: zero.0,
            to_complex: to_complex.0,
            carrier: carrier.0,
            throttle: throttle.0,
            multiply: multiply.0,
            sink: sink.0,
        },
        limit: cfg.run_limit(),
        _writer: PhantomData,
    })
}

impl<W: Write + Send + 'static> Transmitter<W> {
    /// Run until the configured duration elapses or the data runs out.
    pub fn run(&mut self) -> Result<RunReport, Error> {
        self.runtime.run(self.limit)
    }

    /// Run with an explicit limit.
    pub fn run_with(&mut self, limit: RunLimit) -> Result<RunReport, Error> {
        self.runtime.run(limit)
    }

    /// The limit used by [`Transmitter::run`].
    pub fn limit(&self) -> RunLimit {
        self.limit
    }

    /// Node ids, for typed access through [`Transmitter::runtime`].
    pub fn nodes(&self) -> TxNodes {
        self.nodes
    }

    /// The runtime driving the transmitter.
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Mutable runtime access, e.g. to retune blocks between runs.
    pub fn runtime_mut(&mut self) -> &mut Runtime {
        &mut self.runtime
    }

    /// The sink block.
    pub fn sink(&self) -> Option<&StreamSink<Complex32, W>> {
        self.runtime.block(self.nodes.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn small_config() -> TxConfig {
        TxConfig {
            sample_rate: 1e6,
            carrier_frequency: 1e5,
            carrier_amplitude: 2.0,
            repeat_count: 3,
            run_seconds: None,
            data: vec![1.0, 0.0],
            repeat_data: false,
            ..TxConfig::default()
        }
    }

    #[test]
    fn finite_data_stops_on_exhaustion() {
        let mut tx = build_transmitter(&small_config(), Vec::new()).unwrap();
        let report = tx.run().unwrap();
        assert_eq!(report.ticks, 6);
        assert_eq!(
            report.stop,
            crate::rt::StopReason::SourceExhausted {
                node: tx.nodes().data
            }
        );
        let sink = tx.sink().unwrap();
        assert_eq!(sink.samples_written(), 6);
        assert_eq!(sink.get_ref().len(), 6 * 8);
    }

    #[test]
    fn invalid_config_is_rejected_before_wiring() {
        let cfg = TxConfig {
            repeat_count: 0,
            ..small_config()
        };
        assert!(matches!(
            build_transmitter(&cfg, Vec::new()),
            Err(Error::Config(ConfigError::ZeroRepeatCount))
        ));
    }

    #[test]
    fn typed_access_to_inner_blocks() {
        let mut tx = build_transmitter(&small_config(), Vec::new()).unwrap();
        tx.run_with(RunLimit::ticks(4)).unwrap();
        let nodes = tx.nodes();
        let rt = tx.runtime();
        assert_eq!(rt.block::<Throttle<Complex32>>(nodes.throttle).unwrap().items_passed(), 4);
        assert_eq!(rt.block::<VectorSource<f32>>(nodes.data).unwrap().position(), 2);
    }
}
