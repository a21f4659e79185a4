use crate::block::Block;
use crate::error::BlockError;
use crate::port::{ErasedInput, InputPort, OutputPort, PortSpec};
use crate::sample::Sample;
use num_complex::Complex;

/// Combine a real and an imaginary stream into one complex stream.
///
/// # Inputs
///
/// `real`: real part
///
/// `imag`: imaginary part
///
/// # Outputs
///
/// `out`: `real + j imag`
#[derive(Debug, Clone)]
pub struct ToComplex<T: Sample>
where
    Complex<T>: Sample,
{
    real: InputPort<T>,
    imag: InputPort<T>,
    output: OutputPort<Complex<T>>,
}

impl<T: Sample> ToComplex<T>
where
    Complex<T>: Sample,
{
    /// Create the block.
    pub fn new() -> Self {
        Self {
            real: InputPort::new(Self::TYPE_NAME, "real"),
            imag: InputPort::new(Self::TYPE_NAME, "imag"),
            output: OutputPort::new(),
        }
    }

    /// Bind the real part for this tick.
    pub fn set_real(&mut self, value: &T) {
        self.real.set(value);
    }

    /// Bind the imaginary part for this tick.
    pub fn set_imag(&mut self, value: &T) {
        self.imag.set(value);
    }
}

impl<T: Sample> Default for ToComplex<T>
where
    Complex<T>: Sample,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Sample> Block for ToComplex<T>
where
    Complex<T>: Sample,
{
    type Output = Complex<T>;
    const TYPE_NAME: &'static str = "ToComplex";

    fn input_ports(&self) -> Vec<PortSpec> {
        vec![self.real.spec(), self.imag.spec()]
    }

    fn input_mut(&mut self, index: usize) -> Option<&mut dyn ErasedInput> {
        match index {
            0 => Some(&mut self.real),
            1 => Some(&mut self.imag),
            _ => None,
        }
    }

    fn process(&mut self) -> Result<Option<&Complex<T>>, BlockError> {
        let re = self.real.require()?;
        let im = self.imag.require()?;
        Ok(Some(self.output.produce(Complex::new(re, im))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combines_parts() {
        let mut tc = ToComplex::<f32>::new();
        tc.set_real(&1.0);
        tc.set_imag(&-2.0);
        assert_eq!(tc.process().unwrap(), Some(&Complex::new(1.0, -2.0)));
    }

    #[test]
    fn needs_fresh_inputs_every_tick() {
        let mut tc = ToComplex::<f64>::new();
        tc.set_real(&1.0);
        tc.set_imag(&1.0);
        tc.process().unwrap();
        tc.set_real(&2.0);
        assert!(matches!(
            tc.process(),
            Err(BlockError::PreconditionViolation { port: "imag", .. })
        ));
    }
}
