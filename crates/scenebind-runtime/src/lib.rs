//! Host side of scenebind.
//!
//! - [`HostRuntime`]: loaded modules, host objects and weak observers
//! - [`NativeModule`] and [`LoadContext`]: the module load entry point
//! - [`LifetimeCoordinator`]: static teardown driven by root-object collection
//! - [`BridgeConfig`] and [`init_logging`]: configuration and logging

mod config;
mod error;
mod host;
mod lifetime;
mod loader;
mod logging;

pub use config::{
    BridgeConfig, ENV_COMPENSATING_RELEASES, ENV_LOG, ENV_ORDERING, ENV_VARIANT, LifetimeConfig,
};
pub use error::{BridgeError, ConfigError, LifetimeError};
pub use host::{BASE_INTERFACE, Collector, HostModule, HostObject, HostRuntime};
pub use lifetime::{LifecycleState, LifetimeCoordinator, ShutdownHook, ShutdownSequence};
pub use loader::{BUS_ATTRIBUTE, BUS_MODULE, LoadContext, NativeModule};
pub use logging::{DEFAULT_FILTER, LoggingConfig, init_logging};
