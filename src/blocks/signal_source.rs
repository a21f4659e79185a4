use crate::block::Block;
use crate::error::{BlockError, ConfigError};
use crate::port::OutputPort;
use crate::sample::Sample;
use serde::Deserialize;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Periodic waveform shapes.
///
/// Each shape yields an in-phase and a quadrature component; real outputs
/// keep the in-phase component, complex outputs use both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    /// `cos φ + j sin φ`
    #[default]
    Cos,
    /// `sin φ - j cos φ`
    Sin,
    /// Sign of the cosine and the sine.
    Square,
    /// Rising ramp in `[-1, 1)`, quadrature shifted by a quarter period.
    Sawtooth,
}

impl Waveform {
    /// Evaluate at `phase` radians, which must lie in `[0, 2π)`.
    fn eval(self, phase: f64) -> (f64, f64) {
        match self {
            Waveform::Cos => (phase.cos(), phase.sin()),
            Waveform::Sin => (phase.sin(), -phase.cos()),
            Waveform::Square => (sign(phase.cos()), sign(phase.sin())),
            Waveform::Sawtooth => (ramp(phase), ramp((phase + FRAC_PI_2).rem_euclid(TAU))),
        }
    }
}

fn sign(x: f64) -> f64 {
    if x >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

fn ramp(phase: f64) -> f64 {
    phase / PI - 1.0
}

/// Synthesize one sample of `A * w(2π·Fc·n/Fs + φ0) + offset` per tick.
///
/// # Outputs
///
/// `out`: the waveform sample
///
/// The phase is accumulated modulo 2π, so precision does not degrade over
/// long runs. Retuning keeps the accumulated phase. Never exhausts.
///
/// # Usage
/// ```
/// use num_complex::Complex32;
/// use sdrchain::block::Block;
/// use sdrchain::blocks::SignalSource;
///
/// let mut carrier = SignalSource::<Complex32>::cos(2_000.0, 8_000.0, 1.0).unwrap();
/// let first = *carrier.process().unwrap().unwrap();
/// assert!((first - Complex32::new(1.0, 0.0)).norm() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct SignalSource<T: Sample> {
    waveform: Waveform,
    sample_rate: f64,
    frequency: f64,
    amplitude: f64,
    phase_offset: f64,
    offset: T,
    phase: f64,
    phase_inc: f64,
    output: OutputPort<T>,
}

impl<T: Sample> SignalSource<T> {
    /// Create a source; `sample_rate` must be positive.
    pub fn new(
        waveform: Waveform,
        frequency: f64,
        sample_rate: f64,
        amplitude: f64,
    ) -> Result<Self, ConfigError> {
        let mut src = Self {
            waveform,
            sample_rate: ConfigError::check_positive("sampling frequency", sample_rate)?,
            frequency: 0.0,
            amplitude: 0.0,
            phase_offset: 0.0,
            offset: T::ZERO,
            phase: 0.0,
            phase_inc: 0.0,
            output: OutputPort::new(),
        };
        src.set_signal_frequency(frequency)?;
        src.set_amplitude(amplitude)?;
        Ok(src)
    }

    /// Cosine carrier.
    pub fn cos(frequency: f64, sample_rate: f64, amplitude: f64) -> Result<Self, ConfigError> {
        Self::new(Waveform::Cos, frequency, sample_rate, amplitude)
    }

    /// Sine carrier.
    pub fn sin(frequency: f64, sample_rate: f64, amplitude: f64) -> Result<Self, ConfigError> {
        Self::new(Waveform::Sin, frequency, sample_rate, amplitude)
    }

    /// Set the sampling frequency in Hz.
    pub fn set_sampling_frequency(&mut self, sample_rate: f64) -> Result<(), ConfigError> {
        self.sample_rate = ConfigError::check_positive("sampling frequency", sample_rate)?;
        self.update_increment();
        Ok(())
    }

    /// Set the signal frequency in Hz. Negative frequencies rotate the other way.
    pub fn set_signal_frequency(&mut self, frequency: f64) -> Result<(), ConfigError> {
        self.frequency = ConfigError::check_finite("signal frequency", frequency)?;
        self.update_increment();
        Ok(())
    }

    /// Set the peak amplitude.
    pub fn set_amplitude(&mut self, amplitude: f64) -> Result<(), ConfigError> {
        self.amplitude = ConfigError::check_finite("amplitude", amplitude)?;
        Ok(())
    }

    /// Set the initial phase in radians.
    pub fn set_phase_offset(&mut self, phase_offset: f64) -> Result<(), ConfigError> {
        self.phase_offset =
            ConfigError::check_finite("phase offset", phase_offset)?.rem_euclid(TAU);
        Ok(())
    }

    /// Set the DC offset added to every sample.
    pub fn set_offset(&mut self, offset: T) {
        self.offset = offset;
    }

    /// Set the waveform shape.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    /// Rewind to the initial phase.
    pub fn reset(&mut self) {
        self.phase = 0.0;
        self.output.clear();
    }

    /// Sampling frequency in Hz.
    pub fn sampling_frequency(&self) -> f64 {
        self.sample_rate
    }

    /// Signal frequency in Hz.
    pub fn signal_frequency(&self) -> f64 {
        self.frequency
    }

    fn update_increment(&mut self) {
        self.phase_inc = (TAU * self.frequency / self.sample_rate).rem_euclid(TAU);
    }
}

impl<T: Sample> Block for SignalSource<T> {
    type Output = T;
    const TYPE_NAME: &'static str = "SignalSource";

    fn process(&mut self) -> Result<Option<&T>, BlockError> {
        let phase = (self.phase + self.phase_offset).rem_euclid(TAU);
        let (i, q) = self.waveform.eval(phase);
        let value = T::from_quadrature(self.amplitude * i, self.amplitude * q) + self.offset;

        self.phase = (self.phase + self.phase_inc).rem_euclid(TAU);

        Ok(Some(self.output.produce(value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    #[test]
    fn rejects_zero_sample_rate() {
        assert_eq!(
            SignalSource::<f32>::cos(1.0, 0.0, 1.0).unwrap_err(),
            ConfigError::NotPositive {
                name: "sampling frequency",
                value: 0.0
            }
        );
        let mut src = SignalSource::<f32>::cos(1.0, 4.0, 1.0).unwrap();
        assert!(src.set_sampling_frequency(-1.0).is_err());
        assert_eq!(src.sampling_frequency(), 4.0);
    }

    #[test]
    fn quarter_rate_cosine() {
        let mut src = SignalSource::<f64>::cos(1.0, 4.0, 2.0).unwrap();
        let out: Vec<f64> = (0..8).map(|_| *src.process().unwrap().unwrap()).collect();
        let expected = [2.0, 0.0, -2.0, 0.0, 2.0, 0.0, -2.0, 0.0];
        for (o, e) in out.iter().zip(expected) {
            assert!((o - e).abs() < 1e-9, "{o} != {e}");
        }
    }

    #[test]
    fn complex_cosine_has_constant_magnitude() {
        let mut src = SignalSource::<Complex64>::cos(3.0, 17.0, 5.0).unwrap();
        for _ in 0..100 {
            let v = src.process().unwrap().unwrap();
            assert!((v.norm() - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn offset_is_added() {
        let mut src = SignalSource::<Complex64>::cos(0.0, 10.0, 1.0).unwrap();
        src.set_offset(Complex64::new(0.5, 0.25));
        let v = *src.process().unwrap().unwrap();
        assert!((v - Complex64::new(1.5, 0.25)).norm() < 1e-12);
    }

    #[test]
    fn phase_stays_wrapped() {
        let mut src = SignalSource::<f32>::cos(0.3, 1.0, 1.0).unwrap();
        for _ in 0..10_000 {
            src.process().unwrap();
            assert!((0.0..TAU).contains(&src.phase));
        }
    }

    #[test]
    fn square_and_sawtooth_ranges() {
        let mut sq = SignalSource::<f32>::new(Waveform::Square, 1.0, 8.0, 1.0).unwrap();
        let mut saw = SignalSource::<f32>::new(Waveform::Sawtooth, 1.0, 8.0, 1.0).unwrap();
        for _ in 0..16 {
            let s = *sq.process().unwrap().unwrap();
            assert!(s == 1.0 || s == -1.0);
            let r = *saw.process().unwrap().unwrap();
            assert!((-1.0..1.0).contains(&r));
        }
    }

    #[test]
    fn reset_rewinds_phase() {
        let mut src = SignalSource::<f64>::sin(1.0, 8.0, 1.0).unwrap();
        let first = *src.process().unwrap().unwrap();
        src.process().unwrap();
        src.reset();
        assert_eq!(*src.process().unwrap().unwrap(), first);
    }
}
