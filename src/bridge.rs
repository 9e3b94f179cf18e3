//! Top-level entry point.
//!
//! A `Bridge` owns the host runtime and the process-wide render statics, and
//! loads modules into it.
//!
//! # Example
//!
//! ```
//! use scenebind::{Bridge, BridgeConfig, Plugin};
//! use scenebind::modules::classes;
//!
//! let bridge = Bridge::with_default_modules(BridgeConfig::default()).unwrap();
//!
//! let mesh = Plugin::handle(&classes::MESH, "scalar_rgb", "bunny");
//! let wrapped = bridge.present(mesh).unwrap();
//! assert_eq!(wrapped.type_name(), "render_scalar_rgb::Mesh");
//!
//! bridge.shutdown();
//! ```

use std::sync::Arc;

use scenebind_core::{ObjectRef, Variant};
use scenebind_modules::{CoreModule, LIFETIME_ATTRIBUTE, RenderModule, RenderStatics};
use scenebind_registry::PluginBus;
use scenebind_runtime::{
    BUS_ATTRIBUTE, BUS_MODULE, BridgeConfig, BridgeError, HostModule, HostObject, HostRuntime,
    LifetimeCoordinator, NativeModule, init_logging,
};

/// Host runtime plus the statics its render modules share.
///
/// Dropping a bridge does not tear anything down; statics are shut down
/// either when a root scene is collected or by [`shutdown`](Self::shutdown).
#[derive(Debug)]
pub struct Bridge {
    config: BridgeConfig,
    runtime: HostRuntime,
    statics: Arc<RenderStatics>,
}

impl Bridge {
    /// Create a bridge with no modules loaded.
    ///
    /// Installs the logger on first use.
    pub fn new(config: BridgeConfig) -> Self {
        init_logging(config.logging.clone());
        Self {
            config,
            runtime: HostRuntime::new(),
            statics: RenderStatics::new(),
        }
    }

    /// Create a bridge with `core` and the configured variant's render module.
    ///
    /// # Errors
    ///
    /// Returns an error if either module fails to load.
    pub fn with_default_modules(config: BridgeConfig) -> Result<Self, BridgeError> {
        let bridge = Self::new(config);
        bridge.load(&CoreModule::new(bridge.config.ordering))?;
        bridge.load_variant(bridge.config.variant.clone())?;
        Ok(bridge)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn runtime(&self) -> &HostRuntime {
        &self.runtime
    }

    pub fn statics(&self) -> &Arc<RenderStatics> {
        &self.statics
    }

    /// Load any native module.
    pub fn load(&self, module: &dyn NativeModule) -> Result<Arc<HostModule>, BridgeError> {
        Ok(self.runtime.load_module(module)?)
    }

    /// Load the render module for one more variant.
    pub fn load_variant(&self, variant: Variant) -> Result<Arc<HostModule>, BridgeError> {
        let module = RenderModule::new(variant, self.config.lifetime, Arc::clone(&self.statics));
        self.load(&module)
    }

    /// The plugin bus published by `core`.
    pub fn bus(&self) -> Result<Arc<PluginBus>, BridgeError> {
        Ok(self
            .runtime
            .opaque::<PluginBus>(BUS_MODULE, BUS_ATTRIBUTE)?)
    }

    /// Wrap a native object as its most derived exposed host type.
    pub fn present(&self, object: ObjectRef) -> Result<HostObject, BridgeError> {
        let bus = self.bus()?;
        Ok(self.runtime.present(&bus, object)?)
    }

    /// Lifetime coordinator published by a loaded module, if it has one.
    pub fn coordinator(&self, module: &str) -> Option<Arc<LifetimeCoordinator>> {
        self.runtime
            .opaque::<LifetimeCoordinator>(module, LIFETIME_ATTRIBUTE)
            .ok()
    }

    /// Tear down every module that has not been torn down yet, most recently
    /// loaded first. Returns how many teardowns ran.
    pub fn shutdown(&self) -> usize {
        let mut ran = 0;
        for module in self.runtime.module_names().iter().rev() {
            if let Some(coordinator) = self.coordinator(module) {
                if coordinator.shutdown() {
                    ran += 1;
                }
            }
        }
        log::info!("bridge shutdown ran {} teardown(s)", ran);
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenebind_runtime::LifecycleState;

    #[test]
    fn default_modules_are_loaded() {
        let bridge = Bridge::with_default_modules(BridgeConfig::default()).unwrap();
        assert_eq!(
            bridge.runtime().module_names(),
            vec!["core", "render_scalar_rgb"]
        );
        assert!(bridge.bus().unwrap().has_domain("scalar_rgb"));
        assert!(bridge.statics().accel.is_active());
    }

    #[test]
    fn bus_missing_without_core() {
        let bridge = Bridge::new(BridgeConfig::default());
        assert!(matches!(
            bridge.bus(),
            Err(BridgeError::Registration(_))
        ));
    }

    #[test]
    fn shutdown_is_idempotent() {
        let bridge = Bridge::with_default_modules(BridgeConfig::default()).unwrap();
        assert_eq!(bridge.shutdown(), 1);
        assert_eq!(bridge.shutdown(), 0);

        let coordinator = bridge.coordinator("render_scalar_rgb").unwrap();
        assert_eq!(coordinator.state(), LifecycleState::BaseTypeRefcountRestored);
        assert_eq!(coordinator.teardowns(), 1);
        assert!(!bridge.statics().accel.is_active());
        assert!(bridge.coordinator("core").is_none());
    }
}
