use crate::block::Block;
use crate::error::{BlockError, ConfigError};
use crate::port::{ErasedInput, InputPort, OutputPort, PortSpec};
use crate::sample::Sample;
use std::time::{Duration, Instant};

/// Limit the sample rate to wall-clock time.
///
/// # Inputs
///
/// `in`: Input
///
/// # Outputs
///
/// `out`: Output, the input passed through unchanged
///
/// The first call starts the clock and passes immediately. Sample `k`
/// (counting from zero) is released no earlier than `k / rate` seconds after
/// that. A call that is ahead of schedule sleeps the calling thread for the
/// difference; the pipeline is single-threaded, so blocking is the
/// back-pressure. Never exhausts.
///
/// # Usage
/// ```
/// use num_complex::Complex32;
/// use sdrchain::blocks::Throttle;
///
/// let throttle = Throttle::<Complex32>::new(1_000_000.0).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Throttle<T: Sample> {
    rate: f64,
    t_init: Option<Instant>,
    n_items: u64,
    input: InputPort<T>,
    output: OutputPort<T>,
}

impl<T: Sample> Throttle<T> {
    /// Throttle to `rate` samples per second.
    pub fn new(rate: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            rate: ConfigError::check_positive("sampling frequency", rate)?,
            t_init: None,
            n_items: 0,
            input: InputPort::new(Self::TYPE_NAME, "in"),
            output: OutputPort::new(),
        })
    }

    /// Change the target rate. Takes effect on the schedule already started.
    pub fn set_sampling_frequency(&mut self, rate: f64) -> Result<(), ConfigError> {
        self.rate = ConfigError::check_positive("sampling frequency", rate)?;
        Ok(())
    }

    /// Target rate in samples per second.
    pub fn sampling_frequency(&self) -> f64 {
        self.rate
    }

    /// Bind the sample for this tick.
    pub fn set_value(&mut self, value: &T) {
        self.input.set(value);
    }

    /// Samples passed since the clock started.
    pub fn items_passed(&self) -> u64 {
        self.n_items
    }

    /// Restart the clock; the next call counts as the first.
    pub fn reset(&mut self) {
        self.t_init = None;
        self.n_items = 0;
        self.output.clear();
    }

    /// Release time of the next sample relative to the first. Saturates
    /// when the rate is too low for the offset to fit in a `Duration`.
    fn schedule_offset(&self) -> Duration {
        Duration::try_from_secs_f64(self.n_items as f64 / self.rate).unwrap_or(Duration::MAX)
    }

    fn wait_for_schedule(&self, t_init: Instant) {
        let expected = self.schedule_offset();
        let actual = t_init.elapsed();
        if actual < expected {
            std::thread::sleep(expected - actual);
        }
    }
}

impl<T: Sample> Block for Throttle<T> {
    type Output = T;
    const TYPE_NAME: &'static str = "Throttle";

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![self.input.spec()]
    }

    fn input_mut(&mut self, index: usize) -> Option<&mut dyn ErasedInput> {
        match index {
            0 => Some(&mut self.input),
            _ => None,
        }
    }

    fn process(&mut self) -> Result<Option<&T>, BlockError> {
        let value = self.input.require()?;

        match self.t_init {
            None => {
                self.t_init = Some(Instant::now());
                self.n_items = 0;
            }
            Some(t_init) => self.wait_for_schedule(t_init),
        }

        self.n_items += 1;
        Ok(Some(self.output.produce(value)))
    }
}
