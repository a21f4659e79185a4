//! Per-sample SDR block pipelines.
//!
//! Blocks advance one sample per tick and pass single values to each other
//! through typed ports. A [`graph::Graph`] wires blocks into a DAG, a
//! [`plan::Plan`] fixes the execution order, and the [`rt::Runtime`] drives
//! it until a time budget is used up or a source runs dry.
//!
//! ```
//! use num_complex::Complex32;
//! use sdrchain::blocks::{ConstantSource, Multiply, StreamSink};
//! use sdrchain::graph::Graph;
//! use sdrchain::rt::{RunLimit, Runtime};
//!
//! let mut g = Graph::new();
//! let a = g.add_node("a", ConstantSource::new(Complex32::new(0.0, 1.0)));
//! let b = g.add_node("b", ConstantSource::new(Complex32::new(0.0, 1.0)));
//! let mul = g.add_node("mul", Multiply::<Complex32>::new());
//! let sink = g.add_node("sink", StreamSink::<Complex32, Vec<u8>>::new(Vec::new()));
//! g.connect(a, mul, "left").unwrap();
//! g.connect(b, mul, "right").unwrap();
//! g.connect(mul, sink, "in").unwrap();
//!
//! let mut rt = Runtime::new(g).unwrap();
//! let report = rt.run(RunLimit::ticks(4)).unwrap();
//! assert_eq!(report.ticks, 4);
//! ```

#[macro_use]
extern crate tracing;

pub mod block;
pub mod blocks;
pub mod config;
pub mod dsl;
pub mod error;
pub mod graph;
#[doc(hidden)]
pub mod invariant_ppt;
pub mod logging;
pub mod ook;
pub mod plan;
pub mod port;
pub mod rt;
pub mod sample;

pub use block::Block;
pub use config::TxConfig;
pub use error::{BlockError, ConfigError, Error, Result};
pub use ook::build_transmitter;
pub use sample::Sample;
