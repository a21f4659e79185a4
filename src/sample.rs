//! Element types a block can be instantiated with.

use num_complex::Complex;
use std::fmt::Debug;
use std::ops::{Add, Mul};

/// Largest `Sample::SIZE` of any implementor; sinks serialize through a
/// stack buffer of this length.
pub const MAX_SAMPLE_SIZE: usize = 16;

/// A scalar sample flowing through a pipeline, real or complex.
pub trait Sample:
    Copy + Send + Sync + PartialEq + Debug + Add<Output = Self> + Mul<Output = Self> + 'static
{
    /// Width of one sample in bytes when written raw.
    const SIZE: usize;
    /// Additive identity.
    const ZERO: Self;

    /// Build a sample from an in-phase and a quadrature component.
    ///
    /// Real types keep the in-phase component only.
    fn from_quadrature(in_phase: f64, quadrature: f64) -> Self;

    /// Write the native-byte-order representation into `out[..Self::SIZE]`.
    fn write_ne_bytes(&self, out: &mut [u8]);
}

macro_rules! impl_real_sample {
    ($t:ty) => {
        impl Sample for $t {
            const SIZE: usize = std::mem::size_of::<$t>();
            const ZERO: Self = 0.0;

            fn from_quadrature(in_phase: f64, _quadrature: f64) -> Self {
                in_phase as $t
            }

            fn write_ne_bytes(&self, out: &mut [u8]) {
                out[..Self::SIZE].copy_from_slice(&self.to_ne_bytes());
            }
        }
    };
}

macro_rules! impl_complex_sample {
    ($t:ty) => {
        impl Sample for Complex<$t> {
            const SIZE: usize = 2 * std::mem::size_of::<$t>();
            const ZERO: Self = Complex::new(0.0, 0.0);

            fn from_quadrature(in_phase: f64, quadrature: f64) -> Self {
                Complex::new(in_phase as $t, quadrature as $t)
            }

            fn write_ne_bytes(&self, out: &mut [u8]) {
                let half = std::mem::size_of::<$t>();
                out[..half].copy_from_slice(&self.re.to_ne_bytes());
                out[half..Self::SIZE].copy_from_slice(&self.im.to_ne_bytes());
            }
        }
    };
}

impl_real_sample!(f32);
impl_real_sample!(f64);
impl_complex_sample!(f32);
impl_complex_sample!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_fit_serialization_buffer() {
        assert_eq!(<f32 as Sample>::SIZE, 4);
        assert_eq!(<f64 as Sample>::SIZE, 8);
        assert_eq!(<Complex<f32> as Sample>::SIZE, 8);
        assert_eq!(<Complex<f64> as Sample>::SIZE, MAX_SAMPLE_SIZE);
    }

    #[test]
    fn complex_bytes_are_real_then_imag() {
        let mut buf = [0u8; MAX_SAMPLE_SIZE];
        Complex::new(1.5f32, -2.0f32).write_ne_bytes(&mut buf);
        assert_eq!(&buf[..4], &1.5f32.to_ne_bytes());
        assert_eq!(&buf[4..8], &(-2.0f32).to_ne_bytes());
    }

    #[test]
    fn real_drops_quadrature() {
        assert_eq!(f32::from_quadrature(0.25, 9.0), 0.25);
        assert_eq!(
            Complex::<f64>::from_quadrature(0.25, 9.0),
            Complex::new(0.25, 9.0)
        );
    }
}
