use crate::block::Block;
use crate::error::{BlockError, ConfigError};
use crate::port::{ErasedInput, InputPort, OutputPort, PortSpec};
use crate::sample::Sample;

/// Emit each input value for `count` consecutive ticks.
///
/// # Inputs
///
/// `in`: the value to repeat; only read when [`Block::is_output_available`]
/// is false
///
/// # Outputs
///
/// `out`: the current value
///
/// # Usage
/// ```
/// use sdrchain::block::Block;
/// use sdrchain::blocks::Repeat;
///
/// let mut rep = Repeat::<f32>::new(2).unwrap();
/// rep.set_value(&1.0);
/// assert_eq!(rep.process().unwrap(), Some(&1.0));
/// assert!(rep.is_output_available());
/// assert_eq!(rep.process().unwrap(), Some(&1.0));
/// assert!(!rep.is_output_available());
/// ```
#[derive(Debug, Clone)]
pub struct Repeat<T: Sample> {
    count: usize,
    current: Option<T>,
    remaining: usize,
    input: InputPort<T>,
    output: OutputPort<T>,
}

impl<T: Sample> Repeat<T> {
    /// Create a block repeating each value `count` times.
    pub fn new(count: usize) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::ZeroRepeatCount);
        }
        Ok(Self {
            count,
            current: None,
            remaining: 0,
            input: InputPort::new(Self::TYPE_NAME, "in"),
            output: OutputPort::new(),
        })
    }

    /// Set the repetition count; applies from the next fresh input on.
    pub fn set_repeat_count(&mut self, count: usize) -> Result<(), ConfigError> {
        if count == 0 {
            return Err(ConfigError::ZeroRepeatCount);
        }
        self.count = count;
        Ok(())
    }

    /// Repetition count.
    pub fn repeat_count(&self) -> usize {
        self.count
    }

    /// Bind a fresh value for the next `process`.
    pub fn set_value(&mut self, value: &T) {
        self.input.set(value);
    }

    /// Emissions of the current value still to come.
    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

impl<T: Sample> Block for Repeat<T> {
    type Output = T;
    const TYPE_NAME: &'static str = "Repeat";

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
        if let Some(fresh) = self.input.take() {
            self.current = Some(fresh);
            self.remaining = self.count;
        }
        let value = match self.current {
            Some(v) if self.remaining > 0 => v,
            _ => {
                return Err(BlockError::InputRequired {
                    block: Self::TYPE_NAME,
                })
            }
        };
        self.remaining -= 1;
        Ok(Some(self.output.produce(value)))
    }

    fn is_output_available(&self) -> bool {
        self.remaining > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_rejected() {
        assert_eq!(Repeat::<f32>::new(0).unwrap_err(), ConfigError::ZeroRepeatCount);
        let mut rep = Repeat::<f32>::new(1).unwrap();
        assert!(rep.set_repeat_count(0).is_err());
        assert_eq!(rep.repeat_count(), 1);
    }

    #[test]
    fn process_without_value_requires_input() {
        let mut rep = Repeat::<f32>::new(3).unwrap();
        assert!(matches!(
            rep.process(),
            Err(BlockError::InputRequired { block: "Repeat" })
        ));
    }

    #[test]
    fn drained_value_requires_fresh_input() {
        let mut rep = Repeat::<f64>::new(1).unwrap();
        rep.set_value(&4.0);
        assert_eq!(rep.process().unwrap(), Some(&4.0));
        assert!(!rep.is_output_available());
        assert!(rep.process().is_err());
    }

    #[test]
    fn availability_tracks_remaining() {
        let n = 4;
        let mut rep = Repeat::<f32>::new(n).unwrap();
        rep.set_value(&7.0);
        let mut available = 0;
        for _ in 0..n {
            assert_eq!(rep.process().unwrap(), Some(&7.0));
            if rep.is_output_available() {
                available += 1;
            }
        }
        assert_eq!(available, n - 1);
        assert_eq!(rep.remaining(), 0);
    }
}
