//! Prometheus instrumentation facade for model-serving endpoints.
//!
//! Deployed inference services export the same four series (exception
//! counts, execution latency raw and per-request, and feedback-derived
//! reward) with uniform names and label schemas, so one set of operator
//! dashboards covers every model.
//!
//! A [`Monitor`] is built once per service instance from a
//! [`ServiceIdentity`] (service name and version from the hosting service,
//! namespace from [`MonitorConfig`], deployment id from the `DEPLOYMENT_ID`
//! environment variable). Instrument names follow
//! `<namespace>_<service_name>_<suffix>`; every observation carries the
//! mandatory `(deployment_id, service_version, endpoint)` label tuple plus
//! any extra labels declared per metric at construction.
//!
//! ```no_run
//! use infermon::{ExtraLabels, Metric, Monitor, ServiceIdentity};
//!
//! # fn main() -> Result<(), infermon::MonitorError> {
//! let registry = prometheus::Registry::new();
//! let identity = ServiceIdentity::new("fraud_model", "3", "dep-7", "ml");
//! let extra = ExtraLabels::new().declare(Metric::Reward, ["model_variant"]);
//! let monitor = Monitor::new(&registry, identity, extra)?;
//!
//! let timer = monitor.time_model_execution(4, None, &[])?;
//! // ... run the model on a batch of 4 ...
//! timer.stop();
//!
//! monitor.observe_reward(0.82, None, &["champion"])?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod guard;
pub mod metric;
pub mod monitor;

pub use config::{DEPLOYMENT_ID_VAR, MonitorConfig, ServiceIdentity};
pub use error::{ConfigError, MonitorError};
pub use guard::{ExceptionGuard, ExecutionTimer};
pub use metric::{Metric, MetricKind};
pub use monitor::{ExtraLabels, FEEDBACK_ENDPOINT, Monitor, PREDICT_ENDPOINT};
