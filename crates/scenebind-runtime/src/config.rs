//! Bridge configuration.

use scenebind_core::Variant;
use scenebind_registry::OrderingPolicy;

use crate::{ConfigError, LoggingConfig};

pub const ENV_VARIANT: &str = "SCENEBIND_VARIANT";
pub const ENV_ORDERING: &str = "SCENEBIND_ORDERING";
pub const ENV_COMPENSATING_RELEASES: &str = "SCENEBIND_COMPENSATING_RELEASES";
pub const ENV_LOG: &str = "SCENEBIND_LOG";

/// Settings for the lifetime coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifetimeConfig {
    /// Extra base-type decrements issued on shutdown, on top of the lease's own.
    pub compensating_releases: usize,
}

impl Default for LifetimeConfig {
    fn default() -> Self {
        Self {
            compensating_releases: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub variant: Variant,
    pub ordering: OrderingPolicy,
    pub lifetime: LifetimeConfig,
    pub logging: LoggingConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            ordering: OrderingPolicy::default(),
            lifetime: LifetimeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl BridgeConfig {
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_compensating_releases(mut self, count: usize) -> Self {
        self.lifetime.compensating_releases = count;
        self
    }

    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Defaults overridden by `SCENEBIND_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_VARIANT) {
            config.variant = Variant::parse(&value).map_err(|err| ConfigError::InvalidValue {
                key: ENV_VARIANT,
                value: value.clone(),
                reason: err.to_string(),
            })?;
        }

        if let Some(value) = lookup(ENV_ORDERING) {
            config.ordering = value.parse().map_err(|reason| ConfigError::InvalidValue {
                key: ENV_ORDERING,
                value: value.clone(),
                reason,
            })?;
        }

        if let Some(value) = lookup(ENV_COMPENSATING_RELEASES) {
            config.lifetime.compensating_releases =
                value
                    .trim()
                    .parse()
                    .map_err(|err: std::num::ParseIntError| ConfigError::InvalidValue {
                        key: ENV_COMPENSATING_RELEASES,
                        value: value.clone(),
                        reason: err.to_string(),
                    })?;
        }

        if let Some(value) = lookup(ENV_LOG) {
            config.logging.env_filter = Some(value);
        }

        Ok(config)
    }
}
