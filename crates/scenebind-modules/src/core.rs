//! The base module.
//!
//! Owns what every other module builds on: the base `Object` type (the
//! interface objects degrade to when nothing more specific matches), its
//! shared type descriptor, and the plugin bus, published as `casters`.

use std::sync::Arc;

use scenebind_core::{InterfaceDescriptor, QualifiedName, RegistrationError, SharedTypeDescriptor};
use scenebind_registry::{FunctionBinding, OrderingPolicy, PluginBus, TypeBinding};
use scenebind_runtime::{BUS_ATTRIBUTE, BUS_MODULE, LoadContext, NativeModule};

use crate::classes;

pub const CORE_MODULE: &str = BUS_MODULE;
/// Attribute holding the base type's [`SharedTypeDescriptor`].
pub const OBJECT_DESCRIPTOR: &str = "object_type";

// =============================================================================
// MATH
// =============================================================================

/// Square root clamped to zero for slightly negative inputs.
pub fn safe_sqrt(value: f64) -> f64 {
    value.max(0.0).sqrt()
}

pub fn lerp(t: f64, a: f64, b: f64) -> f64 {
    a + t * (b - a)
}

/// Inclusive clamp that passes NaN through.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

// =============================================================================
// MODULE
// =============================================================================

/// The `core` module.
pub struct CoreModule {
    ordering: OrderingPolicy,
}

impl CoreModule {
    pub fn new(ordering: OrderingPolicy) -> Self {
        Self { ordering }
    }

    pub fn object_interface() -> InterfaceDescriptor {
        InterfaceDescriptor::new(
            QualifiedName::in_module(CORE_MODULE, classes::OBJECT.name()),
            &classes::OBJECT,
        )
    }
}

impl Default for CoreModule {
    fn default() -> Self {
        Self::new(OrderingPolicy::default())
    }
}

impl NativeModule for CoreModule {
    fn name(&self) -> &str {
        CORE_MODULE
    }

    fn load(&self, ctx: &mut LoadContext<'_>) -> Result<(), RegistrationError> {
        let registrar = ctx.registrar();

        registrar.bind_opaque(BUS_ATTRIBUTE, Arc::new(PluginBus::new(self.ordering)))?;
        let object = Self::object_interface();
        registrar.bind_opaque(
            OBJECT_DESCRIPTOR,
            Arc::new(SharedTypeDescriptor::new(object.name().clone())),
        )?;
        registrar.bind_type(
            &[],
            TypeBinding::new(object)
                .method("id")
                .method("class_name")
                .method("ref_count")
                .doc("Base of every native scene-graph object"),
        )?;

        registrar.submodule("math", "Scalar math helpers");
        for name in ["safe_sqrt", "lerp", "clamp"] {
            registrar.bind_function(&["math"], FunctionBinding::new(name))?;
        }
        registrar.submodule("color", "Color space helpers");
        registrar.bind_function(&["color"], FunctionBinding::new("luminance"))?;

        log::debug!("core module staged plugin bus ({} ordering)", self.ordering);
        Ok(())
    }
}
