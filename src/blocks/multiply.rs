use crate::block::Block;
use crate::error::BlockError;
use crate::port::{ErasedInput, InputPort, OutputPort, PortSpec};
use crate::sample::Sample;

/// Elementwise product of two streams of the same type.
///
/// # Inputs
///
/// `left`: first factor
///
/// `right`: second factor
///
/// # Outputs
///
/// `out`: `left * right`, unscaled and unsaturated
///
/// # Usage
/// ```
/// use num_complex::Complex32;
/// use sdrchain::block::Block;
/// use sdrchain::blocks::Multiply;
///
/// let mut mul = Multiply::<Complex32>::new();
/// mul.set_left(&Complex32::new(1.0, 2.0));
/// mul.set_right(&Complex32::new(3.0, 4.0));
/// assert_eq!(mul.process().unwrap(), Some(&Complex32::new(-5.0, 10.0)));
/// ```
#[derive(Debug, Clone)]
pub struct Multiply<T: Sample> {
    left: InputPort<T>,
    right: InputPort<T>,
    output: OutputPort<T>,
}

impl<T: Sample> Multiply<T> {
    /// Create the block.
    pub fn new() -> Self {
        Self {
            left: InputPort::new(Self::TYPE_NAME, "left"),
            right: InputPort::new(Self::TYPE_NAME, "right"),
            output: OutputPort::new(),
        }
    }

    /// Bind the left factor for this tick.
    pub fn set_left(&mut self, value: &T) {
        self.left.set(value);
    }

    /// Bind the right factor for this tick.
    pub fn set_right(&mut self, value: &T) {
        self.right.set(value);
    }
}

impl<T: Sample> Default for Multiply<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> Block for Multiply<T> {
    type Output = T;
    const TYPE_NAME: &'static str = "Multiply";

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![self.left.spec(), self.right.spec()]
    }

    fn input_mut(&mut self, index: usize) -> Option<&mut dyn ErasedInput> {
        match index {
            0 => Some(&mut self.left),
            1 => Some(&mut self.right),
            _ => None,
        }
    }

    fn process(&mut self) -> Result<Option<&T>, BlockError> {
        let a = self.left.require()?;
        let b = self.right.require()?;
        Ok(Some(self.output.produce(a * b)))
    }
}
