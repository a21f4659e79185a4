//! Error types shared across blocks, graph construction and the runtime.

use crate::dsl::DslError;
use crate::graph::GraphError;
use crate::plan::PlanError;
use std::io;
use thiserror::Error;

/// Rejected configuration values. Raised when a block is configured or a
/// `TxConfig` is validated, never on the sample path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A rate, frequency or amplitude that must be strictly positive and finite.
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A parameter that may be zero or negative but must be finite.
    #[error("{name} must be finite, got {value}")]
    NotFinite {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// Repeat blocks need at least one repetition per value.
    #[error("repeat count must be at least 1")]
    ZeroRepeatCount,
    /// The source data vector is empty.
    #[error("source data vector is empty")]
    EmptyData,
    /// Neither a run duration nor a finite source bounds the run.
    #[error("run has no stop condition: set run_seconds or disable repeat_data")]
    Unbounded,
    /// Configuration sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(String),
}

impl ConfigError {
    pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(ConfigError::NotPositive { name, value })
        }
    }

    pub(crate) fn check_finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ConfigError::NotFinite { name, value })
        }
    }
}

/// Errors raised by a single block.
#[derive(Debug, Error)]
pub enum BlockError {
    /// `process` was called before a required input was bound for this tick.
    #[error("{block}: input `{port}` not set before process")]
    PreconditionViolation {
        /// Block type.
        block: &'static str,
        /// Unbound port.
        port: &'static str,
    },
    /// An expander block has no buffered value and received no fresh input.
    #[error("{block}: no buffered output and no fresh input")]
    InputRequired {
        /// Block type.
        block: &'static str,
    },
    /// The sink's destination rejected a write.
    #[error("{block}: write failed")]
    Write {
        /// Block type.
        block: &'static str,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// `set_input` named a port the block does not have.
    #[error("{block}: no input port named `{port}`")]
    UnknownPort {
        /// Block type.
        block: &'static str,
        /// Requested port name.
        port: String,
    },
    /// A value of the wrong element type was bound to a port.
    #[error("{block}: port `{port}` expects {expected}")]
    PortTypeMismatch {
        /// Block type.
        block: &'static str,
        /// Port name.
        port: &'static str,
        /// Expected element type.
        expected: &'static str,
    },
    /// A setter rejected its value.
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl BlockError {
    /// True for failures caused by the environment (the sink's destination)
    /// rather than by a wiring or logic bug.
    pub fn is_environmental(&self) -> bool {
        matches!(self, BlockError::Write { .. })
    }
}

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// Graph construction failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
    /// Plan compilation failed.
    #[error(transparent)]
    Plan(#[from] PlanError),
    /// Builder failure.
    #[error(transparent)]
    Dsl(#[from] DslError),
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A block failed while the pipeline was running.
    #[error("block `{node}` failed")]
    Block {
        /// Instance name of the failing node.
        node: String,
        /// Block error.
        #[source]
        source: BlockError,
    },
    /// A block failed while being configured.
    #[error(transparent)]
    Setup(#[from] BlockError),
}

/// Result alias using the crate-level [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_check() {
        assert_eq!(ConfigError::check_positive("rate", 2.0), Ok(2.0));
        assert!(ConfigError::check_positive("rate", 0.0).is_err());
        assert!(ConfigError::check_positive("rate", -1.0).is_err());
        assert!(ConfigError::check_positive("rate", f64::NAN).is_err());
        assert!(ConfigError::check_positive("rate", f64::INFINITY).is_err());
    }

    #[test]
    fn only_write_errors_are_environmental() {
        let write = BlockError::Write {
            block: "StreamSink",
            source: io::Error::new(io::ErrorKind::WriteZero, "full"),
        };
        assert!(write.is_environmental());
        assert!(!BlockError::InputRequired { block: "Repeat" }.is_environmental());
    }
}
