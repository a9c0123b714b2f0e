//! The Monitor: a thin facade binding service identity to a fixed set of
//! Prometheus instruments.
//!
//! One Monitor per running service instance. All four instruments are
//! registered eagerly at construction, so duplicate-name collisions surface
//! at startup and the per-instrument create-once invariant needs no runtime
//! guard. After construction the Monitor is immutable and freely shared
//! across threads; the instrument vecs synchronize internally.

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};
use std::collections::HashMap;
use tracing::debug;

use crate::config::ServiceIdentity;
use crate::error::MonitorError;
use crate::guard::{ExceptionGuard, ExecutionTimer};
use crate::metric::{BASE_LABELS, Metric};

/// Endpoint label value for prediction requests.
pub const PREDICT_ENDPOINT: &str = "predict";
/// Endpoint label value for feedback requests.
pub const FEEDBACK_ENDPOINT: &str = "send-feedback";

/// Construction-time declaration of extra label names, per metric.
///
/// The label schema of an instrument is fixed for the Monitor's lifetime;
/// calls supply values only, in declaration order. Metrics without a
/// declaration carry the mandatory labels alone.
#[derive(Debug, Clone, Default)]
pub struct ExtraLabels {
    names: HashMap<Metric, Vec<String>>,
}

impl ExtraLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the extra label names for one metric.
    ///
    /// The raw and per-request duration histograms are bound from the same
    /// call-site values, so they should be declared identically.
    pub fn declare<I, S>(mut self, metric: Metric, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names
            .insert(metric, names.into_iter().map(Into::into).collect());
        self
    }

    fn names_for(&self, metric: Metric) -> &[String] {
        self.names.get(&metric).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Metric registry facade for one deployed service instance.
pub struct Monitor {
    deployment_id: String,
    service_version: String,
    exception_total: CounterVec,
    model_execution_duration: HistogramVec,
    model_execution_per_request_duration: HistogramVec,
    reward: HistogramVec,
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("deployment_id", &self.deployment_id)
            .field("service_version", &self.service_version)
            .finish_non_exhaustive()
    }
}

impl Monitor {
    /// Register all instruments for `identity` on `registry`.
    ///
    /// Fails if any instrument name is already registered; two Monitors
    /// for the same service name on one registry is a configuration bug.
    pub fn new(
        registry: &Registry,
        identity: ServiceIdentity,
        extra: ExtraLabels,
    ) -> Result<Self, MonitorError> {
        let exception_total = register_counter(registry, &identity, Metric::ExceptionTotal, &extra)?;
        let model_execution_duration =
            register_histogram(registry, &identity, Metric::ModelExecutionDuration, &extra)?;
        let model_execution_per_request_duration = register_histogram(
            registry,
            &identity,
            Metric::ModelExecutionPerRequestDuration,
            &extra,
        )?;
        let reward = register_histogram(registry, &identity, Metric::Reward, &extra)?;

        debug!(
            service = %identity.service_name,
            version = %identity.service_version,
            namespace = %identity.namespace,
            "monitor instruments registered"
        );

        Ok(Self {
            deployment_id: identity.deployment_id,
            service_version: identity.service_version,
            exception_total,
            model_execution_duration,
            model_execution_per_request_duration,
            reward,
        })
    }

    /// Register on the process-default Prometheus registry.
    pub fn with_default_registry(
        identity: ServiceIdentity,
        extra: ExtraLabels,
    ) -> Result<Self, MonitorError> {
        Self::new(prometheus::default_registry(), identity, extra)
    }

    /// Scoped exception counting for `endpoint` (default: predict).
    ///
    /// The returned guard increments the exception counter by one iff the
    /// guarded body fails; the failure still propagates.
    pub fn count_exceptions(
        &self,
        endpoint: Option<&str>,
        extra_values: &[&str],
    ) -> Result<ExceptionGuard, MonitorError> {
        let labels = self.label_values(endpoint.unwrap_or(PREDICT_ENDPOINT), extra_values);
        let counter = self.exception_total.get_metric_with_label_values(&labels)?;
        Ok(ExceptionGuard::new(counter))
    }

    /// Scoped wall-clock timing for `endpoint` (default: predict).
    ///
    /// On stop (or drop) the elapsed duration `d` is recorded into the raw
    /// duration histogram and `d / parallel_executions` into the
    /// per-request histogram, both under the same label tuple.
    /// `parallel_executions` is the number of work items executed within
    /// the timed scope and must be positive.
    pub fn time_model_execution(
        &self,
        parallel_executions: u64,
        endpoint: Option<&str>,
        extra_values: &[&str],
    ) -> Result<ExecutionTimer, MonitorError> {
        if parallel_executions == 0 {
            return Err(MonitorError::ZeroParallelExecutions);
        }

        let labels = self.label_values(endpoint.unwrap_or(PREDICT_ENDPOINT), extra_values);
        let raw = self
            .model_execution_duration
            .get_metric_with_label_values(&labels)?;
        let per_request = self
            .model_execution_per_request_duration
            .get_metric_with_label_values(&labels)?;
        Ok(ExecutionTimer::new(raw, per_request, parallel_executions))
    }

    /// Record a feedback-derived reward for `endpoint` (default:
    /// send-feedback). Immediate, not scoped; no range validation is
    /// imposed here.
    pub fn observe_reward(
        &self,
        value: f64,
        endpoint: Option<&str>,
        extra_values: &[&str],
    ) -> Result<(), MonitorError> {
        let labels = self.label_values(endpoint.unwrap_or(FEEDBACK_ENDPOINT), extra_values);
        self.reward.get_metric_with_label_values(&labels)?.observe(value);
        Ok(())
    }

    /// Mandatory label values first, then caller extras in declaration
    /// order.
    fn label_values<'a>(&'a self, endpoint: &'a str, extra_values: &[&'a str]) -> Vec<&'a str> {
        let mut values = Vec::with_capacity(BASE_LABELS.len() + extra_values.len());
        values.push(self.deployment_id.as_str());
        values.push(self.service_version.as_str());
        values.push(endpoint);
        values.extend_from_slice(extra_values);
        values
    }
}

fn label_names<'a>(metric: Metric, extra: &'a ExtraLabels) -> Vec<&'a str> {
    BASE_LABELS
        .iter()
        .copied()
        .chain(extra.names_for(metric).iter().map(String::as_str))
        .collect()
}

fn register_counter(
    registry: &Registry,
    identity: &ServiceIdentity,
    metric: Metric,
    extra: &ExtraLabels,
) -> Result<CounterVec, MonitorError> {
    let opts = Opts::new(metric.full_name(&identity.service_name), metric.help())
        .namespace(identity.namespace.clone());
    let vec = CounterVec::new(opts, &label_names(metric, extra))?;
    registry.register(Box::new(vec.clone()))?;
    Ok(vec)
}

fn register_histogram(
    registry: &Registry,
    identity: &ServiceIdentity,
    metric: Metric,
    extra: &ExtraLabels,
) -> Result<HistogramVec, MonitorError> {
    let opts = HistogramOpts::new(metric.full_name(&identity.service_name), metric.help())
        .namespace(identity.namespace.clone());
    let vec = HistogramVec::new(opts, &label_names(metric, extra))?;
    registry.register(Box::new(vec.clone()))?;
    Ok(vec)
}
