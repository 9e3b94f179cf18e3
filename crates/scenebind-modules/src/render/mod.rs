//! Per-variant render module.
//!
//! Each variant of the renderer is its own host module, `render_<variant>`.
//! Loading one exposes the scene-graph interfaces for that variant, appends
//! a probe for each polymorphic interface to the plugin bus under a domain
//! named after the variant, and hands its static teardown to a
//! [`LifetimeCoordinator`] armed on the variant's `Scene` type.

mod functions;
pub mod mueller;
mod objects;
mod statics;

use std::sync::Arc;

use scenebind_core::{
    BaseTypeLease, Class, InterfaceDescriptor, InterfaceFlags, QualifiedName, RegistrationError,
    SharedTypeDescriptor, Variant,
};
use scenebind_registry::{FunctionBinding, Probe, ReturnPolicy, TypeBinding};
use scenebind_runtime::{
    LifetimeConfig, LifetimeCoordinator, LoadContext, NativeModule, ShutdownSequence,
};

use crate::classes::{self, PROBE_ORDER, RECORDS};
use crate::core::{CORE_MODULE, OBJECT_DESCRIPTOR};

pub use functions::{FresnelTerms, fresnel, linear_to_srgb, luminance, srgb_to_linear};
pub use objects::Plugin;
pub use statics::{RenderStatics, Subsystem};

/// Library name; the host module is `render_<variant>`.
pub const LIBRARY: &str = "render";
/// Attribute the module's lifetime coordinator is published under.
pub const LIFETIME_ATTRIBUTE: &str = "lifetime";
pub const MUELLER_DOC: &str = "Routines to manipulate Mueller matrices for polarized rendering.";

/// Declared operations and attributes of each exposed type.
fn members(class: &'static Class) -> &'static [&'static str] {
    match class.name() {
        "Scene" => &[
            "ray_intersect",
            "ray_test",
            "bbox",
            "shapes",
            "emitters",
            "sensors",
            "integrator",
            "environment",
        ],
        "Shape" | "Mesh" => &["bbox", "surface_area", "ray_intersect", "is_emitter", "bsdf"],
        "Texture" => &["eval", "sample_spectrum", "mean"],
        "Volume" => &["eval", "max", "resolution"],
        "ReconstructionFilter" => &["eval", "radius"],
        "Endpoint" | "Sensor" | "ProjectiveCamera" | "Emitter" => {
            &["sample_ray", "sample_direction", "pdf_direction", "world_transform"]
        }
        "BSDF" => &["sample", "eval", "pdf", "flags"],
        "Film" => &["prepare", "develop", "size", "rfilter"],
        "Integrator" | "SamplingIntegrator" | "MonteCarloIntegrator" | "AdjointIntegrator" => {
            &["render", "cancel", "aov_names"]
        }
        "Sampler" => &["next_1d", "next_2d", "seed", "sample_count"],
        "PhaseFunction" => &["sample", "eval"],
        "Medium" => &["sample_interaction", "eval_tr_and_pdf"],
        _ => &[],
    }
}

fn policy(class: &'static Class) -> ReturnPolicy {
    if RECORDS.iter().any(|record| record.same_as(class)) {
        ReturnPolicy::Copy
    } else {
        ReturnPolicy::Shared
    }
}

/// The render module for one variant.
pub struct RenderModule {
    variant: Variant,
    name: String,
    lifetime: LifetimeConfig,
    statics: Arc<RenderStatics>,
}

impl RenderModule {
    pub fn new(variant: Variant, lifetime: LifetimeConfig, statics: Arc<RenderStatics>) -> Self {
        let name = variant.module_name(LIBRARY);
        Self {
            variant,
            name,
            lifetime,
            statics,
        }
    }

    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    pub fn statics(&self) -> &Arc<RenderStatics> {
        &self.statics
    }

    /// Probe domain this module creates.
    pub fn domain(&self) -> &str {
        self.variant.name()
    }

    /// Descriptor of an exposed interface in this module.
    pub fn interface(&self, class: &'static Class) -> InterfaceDescriptor {
        let descriptor =
            InterfaceDescriptor::new(QualifiedName::in_module(&self.name, class.name()), class)
                .with_variant(self.variant.name());
        if class.same_as(&classes::SCENE) {
            descriptor.with_flags(InterfaceFlags::ROOT_CONTAINER)
        } else {
            descriptor
        }
    }

    fn bind_types(&self, ctx: &mut LoadContext<'_>) -> Result<(), RegistrationError> {
        for class in PROBE_ORDER {
            let mut binding = TypeBinding::new(self.interface(class)).policy(policy(class));
            for member in members(class) {
                binding = binding.method(member);
            }
            ctx.registrar().bind_type(&[], binding)?;
        }
        for class in RECORDS {
            let binding = TypeBinding::new(self.interface(class).record()).policy(policy(class));
            ctx.registrar().bind_type(&[], binding)?;
        }
        Ok(())
    }

    fn bind_functions(&self, ctx: &mut LoadContext<'_>) -> Result<(), RegistrationError> {
        let registrar = ctx.registrar();
        registrar.bind_function(
            &[],
            FunctionBinding::new("fresnel").doc("Unpolarized Fresnel reflectance of a dielectric"),
        )?;
        registrar.bind_function(&[], FunctionBinding::new("srgb_to_linear"))?;
        registrar.bind_function(&[], FunctionBinding::new("linear_to_srgb"))?;

        registrar.submodule("mueller", MUELLER_DOC);
        for name in mueller::FUNCTIONS {
            registrar.bind_function(&["mueller"], FunctionBinding::new(name))?;
        }
        Ok(())
    }

    fn append_probes(&self, ctx: &mut LoadContext<'_>) -> Result<(), RegistrationError> {
        ctx.create_domain(self.domain())?;
        for class in PROBE_ORDER {
            ctx.append_probe(self.domain(), Probe::new(self.interface(class)))?;
        }
        Ok(())
    }

    /// Lease the base type, build the shutdown sequence and publish the coordinator.
    fn coordinate_lifetime(&self, ctx: &mut LoadContext<'_>) -> Result<(), RegistrationError> {
        let descriptor = ctx
            .runtime()
            .opaque::<SharedTypeDescriptor>(CORE_MODULE, OBJECT_DESCRIPTOR)?;
        let lease = BaseTypeLease::acquire(descriptor, self.name.clone());

        let color = Arc::clone(&self.statics);
        let accel = Arc::clone(&self.statics);
        let sequence = ShutdownSequence::new()
            .then("color_management", move || color.color_management.shutdown())
            .then("accel", move || accel.accel.shutdown());

        let coordinator =
            LifetimeCoordinator::for_module(self.name.clone(), self.lifetime, lease, sequence);
        ctx.registrar()
            .bind_opaque(LIFETIME_ATTRIBUTE, Arc::clone(&coordinator))?;

        let statics = Arc::clone(&self.statics);
        let scene = self.interface(&classes::SCENE).id();
        ctx.on_commit(move |runtime| {
            statics.accel.initialize();
            statics.color_management.initialize();
            coordinator.arm(runtime, scene);
        });
        Ok(())
    }
}

impl NativeModule for RenderModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn dependencies(&self) -> Vec<String> {
        vec![CORE_MODULE.to_string()]
    }

    fn load(&self, ctx: &mut LoadContext<'_>) -> Result<(), RegistrationError> {
        self.bind_types(ctx)?;
        self.bind_functions(ctx)?;
        self.append_probes(ctx)?;
        self.coordinate_lifetime(ctx)?;
        log::debug!(
            "{} staged {} polymorphic interface(s) and {} record(s)",
            self.name,
            PROBE_ORDER.len(),
            RECORDS.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CoreModule;
    use scenebind_registry::{Binding, OrderingPolicy, PluginBus};
    use scenebind_runtime::{BUS_ATTRIBUTE, BUS_MODULE, HostRuntime, LifecycleState};

    fn load(variant: &str) -> (HostRuntime, RenderModule) {
        let runtime = HostRuntime::new();
        runtime
            .load_module(&CoreModule::new(OrderingPolicy::Verify))
            .unwrap();
        let module = RenderModule::new(
            Variant::parse(variant).unwrap(),
            LifetimeConfig::default(),
            RenderStatics::new(),
        );
        runtime.load_module(&module).unwrap();
        (runtime, module)
    }

    #[test]
    fn module_is_variant_qualified() {
        let (runtime, module) = load("scalar_rgb");
        assert_eq!(module.name(), "render_scalar_rgb");
        assert!(runtime.is_loaded("render_scalar_rgb"));
        assert_eq!(
            module.interface(&classes::MESH).name().to_string(),
            "render_scalar_rgb::Mesh"
        );
    }

    #[test]
    fn exposes_types_functions_and_mueller_submodule() {
        let (runtime, _) = load("scalar_rgb");
        let host = runtime.import("render_scalar_rgb").unwrap();
        assert!(host.get(&[], "Scene").and_then(Binding::as_type).is_some());
        assert!(host.get(&[], "BSDFSample").and_then(Binding::as_type).is_some());
        assert!(host.get(&[], "fresnel").and_then(Binding::as_function).is_some());
        assert!(host.get(&["mueller"], "rotator").is_some());
        assert_eq!(host.tree().doc(&["mueller"]), Some(MUELLER_DOC));
        assert_eq!(host.submodules(), vec!["mueller"]);

        let walked = host.tree().walk();
        assert_eq!(walked.len(), host.tree().binding_count());
        let in_mueller = walked
            .iter()
            .filter(|(path, _, _)| path.as_slice() == ["mueller"])
            .count();
        assert_eq!(in_mueller, mueller::FUNCTIONS.len());
    }

    #[test]
    fn probes_land_on_the_bus_in_order() {
        let (runtime, module) = load("scalar_rgb");
        let bus = runtime.opaque::<PluginBus>(BUS_MODULE, BUS_ATTRIBUTE).unwrap();
        assert!(bus.verify().is_ok());
        let names: Vec<String> = bus.with_registry(|registry| {
            registry
                .domain(module.domain())
                .map(|list| {
                    list.probes()
                        .iter()
                        .map(|p| p.interface().class().name().to_string())
                        .collect()
                })
                .unwrap_or_default()
        });
        let expected: Vec<String> = PROBE_ORDER.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn load_leases_base_type_and_arms_coordinator() {
        let (runtime, module) = load("llvm_ad_rgb");
        let descriptor = runtime
            .opaque::<SharedTypeDescriptor>(CORE_MODULE, OBJECT_DESCRIPTOR)
            .unwrap();
        assert_eq!(descriptor.ref_count(), 2);

        let coordinator = runtime
            .opaque::<LifetimeCoordinator>(module.name(), LIFETIME_ATTRIBUTE)
            .unwrap();
        assert_eq!(coordinator.state(), LifecycleState::ModuleLoaded);

        let scene = module.interface(&classes::SCENE).id();
        assert_eq!(runtime.collector().armed(scene), 1);
        assert_eq!(module.statics().accel.init_count(), 1);
        // The JIT runtime belongs to the compute backend, even for llvm variants.
        assert_eq!(module.statics().jit.init_count(), 0);
        assert!(!module.statics().jit.is_active());

        assert!(coordinator.shutdown());
        assert_eq!(module.statics().accel.shutdown_count(), 1);
        assert_eq!(module.statics().jit.shutdown_count(), 0);
    }

    #[test]
    fn two_variants_coexist() {
        let (runtime, _) = load("scalar_rgb");
        let spectral = RenderModule::new(
            Variant::parse("scalar_spectral").unwrap(),
            LifetimeConfig::default(),
            RenderStatics::new(),
        );
        runtime.load_module(&spectral).unwrap();

        let bus = runtime.opaque::<PluginBus>(BUS_MODULE, BUS_ATTRIBUTE).unwrap();
        assert_eq!(
            bus.contributors(),
            vec!["render_scalar_rgb", "render_scalar_spectral"]
        );
        let mesh = Plugin::handle(&classes::MESH, "scalar_spectral", "bunny");
        assert_eq!(
            bus.recover(mesh.as_ref()).map(|i| i.name().to_string()),
            Some("render_scalar_spectral::Mesh".to_string())
        );
    }
}
