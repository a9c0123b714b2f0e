//! Unified error handling for infermon.
//!
//! Instrument registration and label binding go through the `prometheus`
//! client, whose errors are mapped here into variants a caller can match on.

use thiserror::Error;

/// Errors surfaced by [`Monitor`](crate::Monitor) construction and
/// measurement calls.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// A metric with the same fully-qualified name is already registered.
    ///
    /// Indicates a construction-order bug or a duplicate Monitor for the
    /// same service on one registry. Fatal, never retried.
    #[error("instrument already registered on this registry")]
    DuplicateRegistration,

    /// The number of extra label values supplied at call time does not
    /// match the number declared for that metric at construction.
    #[error("label cardinality mismatch: instrument declares {expected} labels, call supplied {got} values")]
    LabelCardinality { expected: usize, got: usize },

    /// `parallel_executions` must be positive; the per-request duration is
    /// the raw duration divided by it.
    #[error("parallel_executions must be positive")]
    ZeroParallelExecutions,

    /// Any other failure reported by the metrics client.
    #[error("metrics client error: {0}")]
    Prometheus(prometheus::Error),
}

impl From<prometheus::Error> for MonitorError {
    fn from(e: prometheus::Error) -> Self {
        match e {
            prometheus::Error::AlreadyReg => Self::DuplicateRegistration,
            prometheus::Error::InconsistentCardinality { expect, got } => {
                Self::LabelCardinality {
                    expected: expect,
                    got,
                }
            }
            other => Self::Prometheus(other),
        }
    }
}

/// Errors raised while assembling the Monitor's identity and configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// The deployment-id environment variable is unset or empty.
    #[error("deployment id missing: set the {0} environment variable")]
    MissingDeploymentId(&'static str),
    /// The configured metrics namespace is empty.
    #[error("default_namespace must not be empty")]
    MissingNamespace,
}
