//! Module load entry point.
//!
//! A [`NativeModule`] stages its bindings and probe contributions against a
//! [`LoadContext`]; [`HostRuntime::load_module`] then cross-checks the two and
//! commits them together. Any failure aborts the load with nothing kept.

use std::sync::Arc;

use scenebind_core::RegistrationError;
use scenebind_registry::{Binding, Contribution, PluginBus, Probe, Registrar};

use crate::{HostModule, HostRuntime};

/// Module that owns the plugin bus.
pub const BUS_MODULE: &str = "core";
/// Attribute the plugin bus is published under.
pub const BUS_ATTRIBUTE: &str = "casters";

/// A native extension module loadable into the host runtime.
pub trait NativeModule {
    fn name(&self) -> &str;

    /// Modules that must be loaded first.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }

    fn load(&self, ctx: &mut LoadContext<'_>) -> Result<(), RegistrationError>;
}

type CommitHook = Box<dyn FnOnce(&HostRuntime) + Send>;

/// Everything a module can touch while it loads.
pub struct LoadContext<'rt> {
    runtime: &'rt HostRuntime,
    registrar: Registrar,
    contribution: Contribution,
    bus: Option<Arc<PluginBus>>,
    on_commit: Vec<CommitHook>,
}

impl<'rt> LoadContext<'rt> {
    fn new(runtime: &'rt HostRuntime, module: &str) -> Self {
        Self {
            runtime,
            registrar: Registrar::new(module),
            contribution: Contribution::new(),
            bus: None,
            on_commit: Vec::new(),
        }
    }

    pub fn module_name(&self) -> &str {
        self.registrar.module()
    }

    pub fn runtime(&self) -> &'rt HostRuntime {
        self.runtime
    }

    pub fn registrar(&mut self) -> &mut Registrar {
        &mut self.registrar
    }

    pub fn import(&self, module: &str) -> Option<Arc<HostModule>> {
        self.runtime.import(module)
    }

    /// The shared plugin bus.
    ///
    /// The bus module finds it among its own staged bindings; everyone else
    /// fetches it from the loaded bus module.
    pub fn plugin_bus(&mut self) -> Result<Arc<PluginBus>, RegistrationError> {
        if let Some(bus) = &self.bus {
            return Ok(Arc::clone(bus));
        }

        let bus = if self.module_name() == BUS_MODULE {
            self.registrar
                .lookup(&[], BUS_ATTRIBUTE)
                .and_then(Binding::as_opaque)
                .and_then(|value| value.downcast::<PluginBus>())
                .ok_or_else(|| {
                    RegistrationError::BusNotInitialized(format!(
                        "'{BUS_MODULE}' has not published '{BUS_ATTRIBUTE}'"
                    ))
                })?
        } else {
            self.runtime
                .opaque::<PluginBus>(BUS_MODULE, BUS_ATTRIBUTE)
                .map_err(|err| {
                    RegistrationError::BusNotInitialized(format!(
                        "'{}' cannot fetch {BUS_MODULE}::{BUS_ATTRIBUTE}: {err}",
                        self.module_name()
                    ))
                })?
        };
        self.bus = Some(Arc::clone(&bus));
        Ok(bus)
    }

    /// Create a domain on the bus, owned by this module.
    pub fn create_domain(&mut self, domain: &str) -> Result<(), RegistrationError> {
        self.plugin_bus()?;
        self.contribution.create_domain(domain);
        Ok(())
    }

    /// Queue a probe for an existing domain.
    pub fn append_probe(&mut self, domain: &str, probe: Probe) -> Result<(), RegistrationError> {
        self.plugin_bus()?;
        self.contribution.append(domain, probe);
        Ok(())
    }

    /// Run `hook` after the module has been committed.
    pub fn on_commit(&mut self, hook: impl FnOnce(&HostRuntime) + Send + 'static) {
        self.on_commit.push(Box::new(hook));
    }
}

/// Every probe must name an exposed interface, and every polymorphic
/// binding must be reachable through some probe.
fn cross_check(
    runtime: &HostRuntime,
    registrar: &Registrar,
    contribution: &Contribution,
    bus: Option<&PluginBus>,
) -> Result<(), RegistrationError> {
    for probe in contribution.probes() {
        let id = probe.interface().id();
        if !registrar.exposes(id) && !runtime.exposes(id) {
            return Err(RegistrationError::ProbeWithoutBinding(
                probe.interface().name().to_string(),
            ));
        }
    }

    let base = runtime.base_interface().to_interface_id();
    for binding in registrar.polymorphic_bindings() {
        let id = binding.interface().id();
        if id == base {
            continue;
        }
        let probed = contribution.has_probe_for(id) || bus.is_some_and(|bus| bus.has_probe_for(id));
        if !probed {
            return Err(RegistrationError::BindingWithoutProbe(
                binding.interface().name().to_string(),
            ));
        }
    }
    Ok(())
}

impl HostRuntime {
    /// Load a native module.
    ///
    /// Steps, failing fast:
    /// 1. reject a module that is already loaded
    /// 2. check its dependencies are loaded
    /// 3. run its load function against staging
    /// 4. cross-check probes against bindings
    /// 5. commit the bus contribution, then the namespace
    pub fn load_module(&self, module: &dyn NativeModule) -> Result<Arc<HostModule>, RegistrationError> {
        let name = module.name().to_string();
        if self.is_loaded(&name) {
            return Err(RegistrationError::DuplicateModule(name));
        }

        let dependencies = module.dependencies();
        if let Some(missing) = dependencies.iter().find(|dep| !self.is_loaded(dep)) {
            return Err(RegistrationError::MissingDependency {
                module: name,
                dependency: missing.clone(),
            });
        }

        let mut ctx = LoadContext::new(self, &name);
        if let Err(err) = module.load(&mut ctx) {
            log::error!("module '{}' failed to load: {}", name, err);
            return Err(err);
        }

        let LoadContext {
            registrar,
            contribution,
            bus,
            on_commit,
            ..
        } = ctx;

        if let Err(err) = cross_check(self, &registrar, &contribution, bus.as_deref()) {
            log::error!("module '{}' failed cross-check: {}", name, err);
            return Err(err);
        }

        let probes = contribution.probes().count();
        if !contribution.is_empty() {
            let bus = bus.ok_or_else(|| RegistrationError::BusNotInitialized(name.clone()))?;
            if let Err(err) = bus.contribute(&name, contribution) {
                log::error!("module '{}' rejected by plugin bus: {}", name, err);
                return Err(err);
            }
        }

        let (_, tree, exposed) = registrar.into_parts();
        let interfaces = exposed.len();
        let committed = self.commit(HostModule::new(name, dependencies, tree, exposed));
        for hook in on_commit {
            hook(self);
        }

        log::info!(
            "loaded module '{}' ({} binding(s), {} interface(s), {} probe(s), submodules {:?})",
            committed.name(),
            committed.tree().binding_count(),
            interfaces,
            probes,
            committed.submodules()
        );
        if log::log_enabled!(log::Level::Trace) {
            for (path, binding_name, binding) in committed.tree().walk() {
                log::trace!(
                    "  {}::{} ({})",
                    committed.name(),
                    path.iter()
                        .map(String::as_str)
                        .chain(std::iter::once(binding_name))
                        .collect::<Vec<_>>()
                        .join("::"),
                    binding.kind()
                );
            }
        }
        Ok(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenebind_core::{Class, InterfaceDescriptor, QualifiedName};
    use scenebind_registry::{OrderingPolicy, TypeBinding};
    use std::sync::atomic::{AtomicBool, Ordering};

    static OBJECT: Class = Class::new_abstract("Object", None);
    static SHAPE: Class = Class::new("Shape", Some(&OBJECT));
    static MESH: Class = Class::new("Mesh", Some(&SHAPE));

    struct Base;

    impl NativeModule for Base {
        fn name(&self) -> &str {
            BUS_MODULE
        }

        fn load(&self, ctx: &mut LoadContext<'_>) -> Result<(), RegistrationError> {
            let registrar = ctx.registrar();
            registrar.bind_opaque(BUS_ATTRIBUTE, Arc::new(PluginBus::new(OrderingPolicy::Verify)))?;
            registrar.bind_type(
                &[],
                TypeBinding::new(InterfaceDescriptor::new(
                    QualifiedName::in_module(BUS_MODULE, "Object"),
                    &OBJECT,
                )),
            )?;
            Ok(())
        }
    }

    /// Exposes Shape and Mesh; the flags choose which defect to plant.
    #[derive(Default)]
    struct Shapes {
        skip_mesh_probe: bool,
        unexposed_probe: bool,
        foreign_domain: bool,
        committed: Arc<AtomicBool>,
    }

    fn iface(class: &'static Class) -> InterfaceDescriptor {
        InterfaceDescriptor::new(QualifiedName::in_module("shapes", class.name()), class)
    }

    impl NativeModule for Shapes {
        fn name(&self) -> &str {
            "shapes"
        }

        fn dependencies(&self) -> Vec<String> {
            vec![BUS_MODULE.to_string()]
        }

        fn load(&self, ctx: &mut LoadContext<'_>) -> Result<(), RegistrationError> {
            ctx.registrar().bind_type(&[], TypeBinding::new(iface(&SHAPE)))?;
            if !self.unexposed_probe {
                ctx.registrar().bind_type(&[], TypeBinding::new(iface(&MESH)))?;
            }

            let domain = if self.foreign_domain { "volume" } else { "shape" };
            if !self.foreign_domain {
                ctx.create_domain(domain)?;
            }
            if !self.skip_mesh_probe {
                ctx.append_probe(domain, Probe::new(iface(&MESH)))?;
            }
            ctx.append_probe(domain, Probe::new(iface(&SHAPE)))?;

            let committed = Arc::clone(&self.committed);
            ctx.on_commit(move |_| committed.store(true, Ordering::SeqCst));
            Ok(())
        }
    }

    fn runtime_with_base() -> HostRuntime {
        let runtime = HostRuntime::new();
        runtime.load_module(&Base).unwrap();
        runtime
    }

    #[test]
    fn loads_and_commits() {
        let runtime = runtime_with_base();
        let shapes = Shapes::default();
        let module = runtime.load_module(&shapes).unwrap();

        assert_eq!(module.name(), "shapes");
        assert!(module.exposes(iface(&MESH).id()));
        assert!(shapes.committed.load(Ordering::SeqCst));
        assert_eq!(runtime.module_names(), vec!["core", "shapes"]);

        let bus = runtime.opaque::<PluginBus>(BUS_MODULE, BUS_ATTRIBUTE).unwrap();
        assert_eq!(bus.contributors(), vec!["shapes"]);
    }

    #[test]
    fn duplicate_module_rejected() {
        let runtime = runtime_with_base();
        assert_eq!(
            runtime.load_module(&Base).unwrap_err(),
            RegistrationError::DuplicateModule("core".into())
        );
    }

    #[test]
    fn missing_dependency_rejected() {
        let runtime = HostRuntime::new();
        assert_eq!(
            runtime.load_module(&Shapes::default()).unwrap_err(),
            RegistrationError::MissingDependency {
                module: "shapes".into(),
                dependency: "core".into(),
            }
        );
    }

    #[test]
    fn binding_without_probe_rejected_and_nothing_committed() {
        let runtime = runtime_with_base();
        let shapes = Shapes {
            skip_mesh_probe: true,
            ..Default::default()
        };
        assert_eq!(
            runtime.load_module(&shapes).unwrap_err(),
            RegistrationError::BindingWithoutProbe("shapes::Mesh".into())
        );
        assert!(!runtime.is_loaded("shapes"));
        assert!(!shapes.committed.load(Ordering::SeqCst));

        let bus = runtime.opaque::<PluginBus>(BUS_MODULE, BUS_ATTRIBUTE).unwrap();
        assert!(!bus.has_domain("shape"));
    }

    #[test]
    fn probe_without_binding_rejected() {
        let runtime = runtime_with_base();
        let shapes = Shapes {
            unexposed_probe: true,
            ..Default::default()
        };
        assert_eq!(
            runtime.load_module(&shapes).unwrap_err(),
            RegistrationError::ProbeWithoutBinding("shapes::Mesh".into())
        );
    }

    #[test]
    fn append_to_uncreated_domain_fails_at_load() {
        let runtime = runtime_with_base();
        let shapes = Shapes {
            foreign_domain: true,
            ..Default::default()
        };
        assert_eq!(
            runtime.load_module(&shapes).unwrap_err(),
            RegistrationError::DomainNotFound("volume".into())
        );
        assert!(!runtime.is_loaded("shapes"));
    }

    #[test]
    fn missing_bus_is_fatal() {
        struct Orphan;
        impl NativeModule for Orphan {
            fn name(&self) -> &str {
                "orphan"
            }

            fn load(&self, ctx: &mut LoadContext<'_>) -> Result<(), RegistrationError> {
                ctx.append_probe("shape", Probe::new(iface(&SHAPE)))
            }
        }

        let runtime = HostRuntime::new();
        assert!(matches!(
            runtime.load_module(&Orphan),
            Err(RegistrationError::BusNotInitialized(_))
        ));
    }
}
