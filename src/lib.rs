//! Bridges a polymorphic native renderer object model to a garbage-collected
//! host runtime.
//!
//! The workspace is split the way the bridge is layered:
//!
//! - [`core`] - interface identity, the native object model, errors
//! - [`registry`] - type-recovery probes, the registrar and the plugin bus
//! - [`runtime`] - the host model, module loading and lifetime coordination
//! - [`modules`] - the `core` module and the per-variant render modules
//!
//! [`Bridge`] ties them together.

mod bridge;

pub use bridge::Bridge;

pub use scenebind_core as core;
pub use scenebind_modules as modules;
pub use scenebind_registry as registry;
pub use scenebind_runtime as runtime;

pub use scenebind_modules::{CoreModule, Plugin, RenderModule, RenderStatics};
pub use scenebind_runtime::{BridgeConfig, BridgeError, LoggingConfig};

// Re-export main types
pub mod prelude {
    pub use crate::Bridge;
    pub use scenebind_core::{
        Class, DispatchError, InterfaceDescriptor, InterfaceFlags, InterfaceId, Object, ObjectRef,
        QualifiedName, RegistrationError, Variant,
    };
    pub use scenebind_modules::{CoreModule, Plugin, RenderModule, RenderStatics};
    pub use scenebind_registry::{
        Contribution, OrderingPolicy, PluginBus, Probe, Recovered, Registrar, TypeBinding,
        TypeRecoveryRegistry,
    };
    pub use scenebind_runtime::{
        BridgeConfig, BridgeError, HostObject, HostRuntime, LifecycleState, LifetimeConfig,
        LifetimeCoordinator, LoadContext, NativeModule,
    };
}
