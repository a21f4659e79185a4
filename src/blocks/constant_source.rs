use crate::block::Block;
use crate::error::BlockError;
use crate::port::OutputPort;
use crate::sample::Sample;

/// Emit the same value on every tick. Never exhausts.
///
/// # Outputs
///
/// `out`: the configured value
#[derive(Debug, Clone)]
pub struct ConstantSource<T: Sample> {
    value: T,
    output: OutputPort<T>,
}

impl<T: Sample> ConstantSource<T> {
    /// Create a source emitting `value`.
    pub fn new(value: T) -> Self {
        Self {
            value,
            output: OutputPort::new(),
        }
    }

    /// Change the emitted value from the next tick on.
    pub fn set_value(&mut self, value: T) {
        self.value = value;
    }

    /// Configured value.
    pub fn value(&self) -> T {
        self.value
    }
}

impl<T: Sample> Block for ConstantSource<T> {
    type Output = T;
    const TYPE_NAME: &'static str = "ConstantSource";

    fn process(&mut self) -> Result<Option<&T>, BlockError> {
        Ok(Some(self.output.produce(self.value)))
    }
}
