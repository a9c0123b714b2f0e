//! Monitor configuration and service identity.
//!
//! Identity has four parts: the service name and version come from the
//! hosting service, the metrics namespace from configuration, and the
//! deployment id from a process-wide environment variable. All four are
//! fixed before a [`Monitor`](crate::Monitor) can be built.

use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Environment variable naming the deployment this process belongs to.
///
/// Read once at startup; its value labels every observation across all
/// instruments.
pub const DEPLOYMENT_ID_VAR: &str = "DEPLOYMENT_ID";

/// Instrumentation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Namespace prefixed to every metric name (e.g. "ml").
    pub default_namespace: String,
}

impl MonitorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_namespace.is_empty() {
            return Err(ConfigError::MissingNamespace);
        }
        Ok(())
    }
}

/// Immutable identity a [`Monitor`](crate::Monitor) binds to.
///
/// Service name and namespace form metric names; deployment id, service
/// version and endpoint form the mandatory label tuple on every call.
#[derive(Debug, Clone)]
pub struct ServiceIdentity {
    pub service_name: String,
    pub service_version: String,
    pub deployment_id: String,
    pub namespace: String,
}

impl ServiceIdentity {
    pub fn new(
        service_name: impl Into<String>,
        service_version: impl Into<String>,
        deployment_id: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            service_version: service_version.into(),
            deployment_id: deployment_id.into(),
            namespace: namespace.into(),
        }
    }

    /// Build an identity from the hosting service's name and version, the
    /// configured namespace, and the `DEPLOYMENT_ID` environment variable.
    ///
    /// A missing or empty deployment id is a startup-time fatal error; the
    /// Monitor cannot be constructed without it.
    pub fn from_env(
        service_name: impl Into<String>,
        service_version: impl Into<String>,
        config: &MonitorConfig,
    ) -> Result<Self, ConfigError> {
        let deployment_id = std::env::var(DEPLOYMENT_ID_VAR)
            .ok()
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::MissingDeploymentId(DEPLOYMENT_ID_VAR))?;
        config.validate()?;

        Ok(Self::new(
            service_name,
            service_version,
            deployment_id,
            config.default_namespace.clone(),
        ))
    }
}
