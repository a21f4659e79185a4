//! Transmitter configuration.
//!
//! Values come from built-in defaults, then an optional `sdrchain.toml` in
//! the working directory, then `SDRCHAIN_*` environment variables
//! (`SDRCHAIN_SAMPLE_RATE=1e6`, `SDRCHAIN_DATA=0,1,1,0`). A config is built
//! once at startup and passed by reference; there is no global instance.
//!
//! `run_seconds` takes a whole number of seconds or the string
//! `"until_exhausted"`, which runs until the data is used up.

use crate::blocks::Waveform;
use crate::error::ConfigError;
use crate::invariant_ppt::{assert_invariant, CONFIG_VALIDATED};
use crate::rt::RunLimit;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::time::Duration;

/// Parameters of the OOK transmitter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TxConfig {
    /// Sampling rate in Hz.
    pub sample_rate: f64,
    /// Carrier frequency in Hz. Should stay below `sample_rate / 2`.
    pub carrier_frequency: f64,
    /// Carrier amplitude.
    pub carrier_amplitude: f64,
    /// Carrier shape.
    pub carrier_waveform: Waveform,
    /// Samples per data symbol.
    pub repeat_count: usize,
    /// Run time in seconds; `None` runs until the data is used up.
    #[serde(deserialize_with = "deserialize_run_seconds")]
    pub run_seconds: Option<u64>,
    /// Baseband symbols, normally 0 or 1.
    pub data: Vec<f32>,
    /// Loop over `data` instead of stopping at its end.
    pub repeat_data: bool,
    /// Where the demo writes samples.
    pub output_path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RunSeconds {
    Seconds(u64),
    Keyword(RunKeyword),
}

#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
enum RunKeyword {
    UntilExhausted,
}

fn deserialize_run_seconds<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    Ok(match RunSeconds::deserialize(d)? {
        RunSeconds::Seconds(secs) => Some(secs),
        RunSeconds::Keyword(RunKeyword::UntilExhausted) => None,
    })
}

impl Default for TxConfig {
    fn default() -> Self {
        let mut data = vec![0.0, 1.0, 1.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0];
        data.resize(20, 0.0);
        Self {
            sample_rate: 8e6,
            carrier_frequency: 2e6,
            carrier_amplitude: 1000.0,
            carrier_waveform: Waveform::Cos,
            repeat_count: 800,
            run_seconds: Some(10),
            data,
            repeat_data: true,
            output_path: PathBuf::from("rfdata.out"),
        }
    }
}

impl TxConfig {
    /// Load from `sdrchain.toml` (optional) and the environment, then
    /// validate.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(File::new("sdrchain", FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix("SDRCHAIN")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("data"),
            );
        Self::from_builder(builder)
    }

    /// Parse a TOML document over the defaults, then validate.
    pub fn from_toml(document: &str) -> Result<Self, ConfigError> {
        let builder =
            config::Config::builder().add_source(File::from_str(document, FileFormat::Toml));
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let cfg: Self = builder
            .build()
            .and_then(|sources| sources.try_deserialize())
            .map_err(|e| ConfigError::Load(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check every parameter before any block is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("sample_rate", self.sample_rate)?;
        ConfigError::check_positive("carrier_frequency", self.carrier_frequency)?;
        ConfigError::check_positive("carrier_amplitude", self.carrier_amplitude)?;
        if self.repeat_count == 0 {
            return Err(ConfigError::ZeroRepeatCount);
        }
        if self.data.is_empty() {
            return Err(ConfigError::EmptyData);
        }
        if let Some(bad) = self.data.iter().find(|x| !x.is_finite()) {
            return Err(ConfigError::NotFinite {
                name: "data",
                value: f64::from(*bad),
            });
        }
        match self.run_seconds {
            Some(0) => {
                return Err(ConfigError::NotPositive {
                    name: "run_seconds",
                    value: 0.0,
                })
            }
            None if self.repeat_data => return Err(ConfigError::Unbounded),
            _ => {}
        }

        if self.carrier_frequency > self.sample_rate / 2.0 {
            warn!(
                "carrier {} Hz is above the Nyquist frequency {} Hz, output will alias",
                self.carrier_frequency,
                self.sample_rate / 2.0
            );
        }
        assert_invariant(CONFIG_VALIDATED, true, "Configuration validated", Some("validate"));
        Ok(())
    }

    /// Stop condition for a run: the configured duration, counted both in
    /// wall-clock time and in samples, or the end of the data.
    pub fn run_limit(&self) -> RunLimit {
        match self.run_seconds {
            Some(secs) => {
                let samples = (self.sample_rate * secs as f64).round() as u64;
                RunLimit::for_duration(Duration::from_secs(secs)).with_max_ticks(samples)
            }
            None => RunLimit::until_exhausted(),
        }
    }
}
