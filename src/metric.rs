//! The fixed set of exported instruments.
//!
//! Suffixes are a contract with operator dashboards: every deployed service
//! exposes the same four series shapes, addressable per service via the
//! `<namespace>_<service_name>_<suffix>` naming scheme.

/// Mandatory label names, in binding order, shared by every instrument.
pub const BASE_LABELS: [&str; 3] = ["deployment_id", "service_version", "endpoint"];

/// Instrument kind, mirroring the two client primitives in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Histogram,
}

/// One variant per exported instrument.
///
/// A closed enum instead of string-keyed lookup: the mapping from metric to
/// instrument is exhaustive at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    /// Exceptions raised while serving a request.
    ExceptionTotal,
    /// Wall-clock model execution duration.
    ModelExecutionDuration,
    /// Execution duration normalized by the number of parallel executions.
    ModelExecutionPerRequestDuration,
    /// Feedback-derived reward signal.
    Reward,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::ExceptionTotal,
        Metric::ModelExecutionDuration,
        Metric::ModelExecutionPerRequestDuration,
        Metric::Reward,
    ];

    /// Fixed name suffix appended to the service name.
    pub const fn suffix(self) -> &'static str {
        match self {
            Metric::ExceptionTotal => "exception_total",
            Metric::ModelExecutionDuration => "model_execution_duration_seconds",
            Metric::ModelExecutionPerRequestDuration => {
                "model_execution_per_request_duration_seconds"
            }
            Metric::Reward => "reward",
        }
    }

    /// Help text exported alongside the series.
    pub const fn help(self) -> &'static str {
        match self {
            Metric::ExceptionTotal => "Total number of exceptions",
            Metric::ModelExecutionDuration => "Model execution duration in seconds",
            Metric::ModelExecutionPerRequestDuration => {
                "Model execution per request duration in seconds"
            }
            Metric::Reward => "Reward provided by feedback",
        }
    }

    pub const fn kind(self) -> MetricKind {
        match self {
            Metric::ExceptionTotal => MetricKind::Counter,
            Metric::ModelExecutionDuration
            | Metric::ModelExecutionPerRequestDuration
            | Metric::Reward => MetricKind::Histogram,
        }
    }

    /// Compose the instrument name for a service: `<service_name>_<suffix>`.
    ///
    /// The namespace prefix is applied separately by the client's `Opts`.
    pub fn full_name(self, service_name: &str) -> String {
        format!("{service_name}_{}", self.suffix())
    }
}
