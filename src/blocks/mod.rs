//! ## Source blocks
//! | Block | Usage |
//! |---|---|
//! | [VectorSource] | Replays a buffer, once or looping |
//! | [ConstantSource] | Emits the same value forever |
//! | [SignalSource] | Synthesizes a periodic waveform |
//!
//! ## Transform blocks
//! | Block | Usage |
//! |---|---|
//! | [Repeat] | Emits each input value for N ticks |
//! | [ToComplex] | Combines real and imaginary streams |
//! | [Multiply] | Product of two streams |
//!
//! ## Limiting blocks
//! | Block | Usage |
//! |---|---|
//! | [Throttle] | Paces the pipeline to a sample rate in wall-clock time |
//!
//! ## Sink blocks
//! | Block | Usage |
//! |---|---|
//! | [StreamSink] | Writes raw samples to a byte stream |

mod constant_source;
pub use constant_source::ConstantSource;

mod multiply;
pub use multiply::Multiply;

mod repeat;
pub use repeat::Repeat;

mod signal_source;
pub use signal_source::SignalSource;
pub use signal_source::Waveform;

mod stream_sink;
pub use stream_sink::StreamSink;

mod throttle;
pub use throttle::Throttle;

mod to_complex;
pub use to_complex::ToComplex;

mod vector_source;
pub use vector_source::VectorSource;
