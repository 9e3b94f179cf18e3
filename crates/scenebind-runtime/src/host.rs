//! Host runtime model.
//!
//! The garbage-collected host is modeled by what the bridge needs from it:
//! loaded modules with their namespaces and opaque attributes, host objects
//! wrapping native handles, and weak observers that run when a host type's
//! instance is created or collected.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use rustc_hash::FxHashMap;
use scenebind_core::{
    DispatchError, InterfaceDescriptor, InterfaceId, ObjectRef, QualifiedName, RegistrationError,
};
use scenebind_registry::{Binding, NamespaceTree, PluginBus, TypeBinding};

/// Interface every native object degrades to when nothing more specific matches.
pub const BASE_INTERFACE: &str = "core::Object";

// ============================================================================
// Modules
// ============================================================================

/// A committed host module. Immutable once loaded.
#[derive(Debug)]
pub struct HostModule {
    name: String,
    dependencies: Vec<String>,
    tree: NamespaceTree,
    exposed: FxHashMap<InterfaceId, QualifiedName>,
}

impl HostModule {
    pub(crate) fn new(
        name: String,
        dependencies: Vec<String>,
        tree: NamespaceTree,
        exposed: FxHashMap<InterfaceId, QualifiedName>,
    ) -> Self {
        Self {
            name,
            dependencies,
            tree,
            exposed,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn tree(&self) -> &NamespaceTree {
        &self.tree
    }

    /// Direct sub-namespaces, in creation order.
    pub fn submodules(&self) -> Vec<&str> {
        self.tree.children(self.tree.root())
    }

    pub fn get(&self, path: &[&str], name: &str) -> Option<&Binding> {
        self.tree.get(path, name)
    }

    pub fn exposes(&self, id: InterfaceId) -> bool {
        self.exposed.contains_key(&id)
    }

    pub fn type_binding(&self, id: InterfaceId) -> Option<(&QualifiedName, &TypeBinding)> {
        let qualified = self.exposed.get(&id)?;
        let path = qualified.namespace_path().get(1..)?;
        let binding = self
            .tree
            .get(path, qualified.simple_name())
            .and_then(Binding::as_type)?;
        Some((qualified, binding))
    }

    /// Fetch an opaque attribute stored at module level.
    pub fn opaque<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>, RegistrationError> {
        let qualified = format!("{}::{}", self.name, name);
        let value = self
            .tree
            .get::<&str>(&[], name)
            .and_then(Binding::as_opaque)
            .ok_or_else(|| RegistrationError::InvalidNamespace(qualified.clone()))?;
        value
            .downcast::<T>()
            .ok_or(RegistrationError::OpaqueTypeMismatch(qualified))
    }
}

#[derive(Debug, Default)]
struct ModuleTable {
    by_name: FxHashMap<String, Arc<HostModule>>,
    order: Vec<String>,
}

// ============================================================================
// Collector
// ============================================================================

type CollectionObserver = Box<dyn FnOnce() + Send>;
type InstantiationObserver = Arc<dyn Fn() + Send + Sync>;

/// Tracks live host objects per host type and runs their observers.
#[derive(Default)]
pub struct Collector {
    on_collect: Mutex<FxHashMap<InterfaceId, Vec<CollectionObserver>>>,
    on_instantiate: Mutex<FxHashMap<InterfaceId, Vec<InstantiationObserver>>>,
    live: Mutex<FxHashMap<InterfaceId, usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Collector {
    /// Number of live host objects of a host type.
    pub fn live_count(&self, id: InterfaceId) -> usize {
        lock(&self.live).get(&id).copied().unwrap_or(0)
    }

    /// Number of armed one-shot collection observers for a host type.
    pub fn armed(&self, id: InterfaceId) -> usize {
        lock(&self.on_collect).get(&id).map_or(0, Vec::len)
    }

    fn instantiated(&self, id: InterfaceId) {
        *lock(&self.live).entry(id).or_default() += 1;
        let observers: Vec<InstantiationObserver> = lock(&self.on_instantiate)
            .get(&id)
            .cloned()
            .unwrap_or_default();
        for observer in observers {
            observer();
        }
    }

    fn collected(&self, id: InterfaceId, host_type: &QualifiedName) {
        let remaining = {
            let mut live = lock(&self.live);
            let count = live.entry(id).or_default();
            *count = count.saturating_sub(1);
            *count
        };
        if remaining > 0 {
            log::trace!("{} collected, {} still live", host_type, remaining);
            return;
        }
        // One-shot: taking the observers out disarms them before they run.
        let observers = lock(&self.on_collect).remove(&id).unwrap_or_default();
        if !observers.is_empty() {
            log::debug!(
                "{} collected, running {} weak observer(s)",
                host_type,
                observers.len()
            );
        }
        for observer in observers {
            observer();
        }
    }
}

impl fmt::Debug for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("live", &*lock(&self.live))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Host Objects
// ============================================================================

struct HostObjectInner {
    object: ObjectRef,
    binding: TypeBinding,
    host_type: QualifiedName,
    collector: Arc<Collector>,
}

impl Drop for HostObjectInner {
    fn drop(&mut self) {
        self.collector
            .collected(self.binding.interface().id(), &self.host_type);
    }
}

/// Host-side wrapper of a native handle.
///
/// Clones share one wrapper. The wrapper is collected when the last clone
/// drops, which releases its native reference and notifies observers.
#[derive(Clone)]
pub struct HostObject {
    inner: Arc<HostObjectInner>,
}

impl HostObject {
    pub fn object(&self) -> &ObjectRef {
        &self.inner.object
    }

    pub fn interface(&self) -> &InterfaceDescriptor {
        self.inner.binding.interface()
    }

    pub fn binding(&self) -> &TypeBinding {
        &self.inner.binding
    }

    /// Qualified name of the host type this object was wrapped as.
    pub fn host_type(&self) -> &QualifiedName {
        &self.inner.host_type
    }

    pub fn type_name(&self) -> String {
        self.inner.host_type.to_string()
    }

    /// Number of host references to this wrapper.
    pub fn host_refs(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostObject")
            .field("host_type", &self.type_name())
            .field("object", &self.inner.object)
            .finish()
    }
}

// ============================================================================
// Runtime
// ============================================================================

/// The host runtime's module table and object collector.
#[derive(Debug)]
pub struct HostRuntime {
    modules: RwLock<ModuleTable>,
    collector: Arc<Collector>,
    base_interface: QualifiedName,
}

impl Default for HostRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRuntime {
    pub fn new() -> Self {
        Self {
            modules: RwLock::new(ModuleTable::default()),
            collector: Arc::new(Collector::default()),
            base_interface: QualifiedName::from_qualified_string(BASE_INTERFACE),
        }
    }

    /// Use a different interface as the degrade target.
    pub fn with_base_interface(mut self, name: QualifiedName) -> Self {
        self.base_interface = name;
        self
    }

    pub fn base_interface(&self) -> &QualifiedName {
        &self.base_interface
    }

    pub fn collector(&self) -> &Arc<Collector> {
        &self.collector
    }

    pub fn is_loaded(&self, module: &str) -> bool {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_name
            .contains_key(module)
    }

    /// Loaded module names in load order.
    pub fn module_names(&self) -> Vec<String> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }

    pub fn import(&self, module: &str) -> Option<Arc<HostModule>> {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_name
            .get(module)
            .cloned()
    }

    /// Fetch an opaque attribute from a loaded module.
    pub fn opaque<T: Send + Sync + 'static>(
        &self,
        module: &str,
        name: &str,
    ) -> Result<Arc<T>, RegistrationError> {
        self.import(module)
            .ok_or_else(|| RegistrationError::InvalidNamespace(module.to_string()))?
            .opaque(name)
    }

    pub(crate) fn commit(&self, module: HostModule) -> Arc<HostModule> {
        let module = Arc::new(module);
        let mut table = self.modules.write().unwrap_or_else(PoisonError::into_inner);
        table.order.push(module.name().to_string());
        table
            .by_name
            .insert(module.name().to_string(), Arc::clone(&module));
        module
    }

    /// Type binding for an interface from any loaded module.
    pub fn find_type_binding(&self, id: InterfaceId) -> Option<(QualifiedName, TypeBinding)> {
        let table = self.modules.read().unwrap_or_else(PoisonError::into_inner);
        table
            .order
            .iter()
            .filter_map(|name| table.by_name.get(name))
            .find_map(|module| {
                module
                    .type_binding(id)
                    .map(|(qualified, binding)| (qualified.clone(), binding.clone()))
            })
    }

    pub fn exposes(&self, id: InterfaceId) -> bool {
        self.modules
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_name
            .values()
            .any(|module| module.exposes(id))
    }

    /// Run `callback` once, when a collection leaves no live instance of
    /// `host_type`.
    pub fn observe_collection(&self, host_type: InterfaceId, callback: impl FnOnce() + Send + 'static) {
        lock(&self.collector.on_collect)
            .entry(host_type)
            .or_default()
            .push(Box::new(callback));
    }

    /// Run `callback` every time an instance of `host_type` is wrapped.
    pub fn observe_instantiation(
        &self,
        host_type: InterfaceId,
        callback: impl Fn() + Send + Sync + 'static,
    ) {
        lock(&self.collector.on_instantiate)
            .entry(host_type)
            .or_default()
            .push(Arc::new(callback));
    }

    /// Wrap a native handle as its most derived exposed host type.
    ///
    /// A recovery miss degrades to the base interface.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn present(&self, bus: &PluginBus, object: ObjectRef) -> Result<HostObject, DispatchError> {
        let (host_type, binding) = match bus.recover(object.as_ref()) {
            Some(interface) => self
                .find_type_binding(interface.id())
                .ok_or_else(|| DispatchError::UnexposedInterface(interface.name().to_string()))?,
            None => {
                log::debug!(
                    "no probe matched {:?}, degrading to {}",
                    object,
                    self.base_interface
                );
                self.find_type_binding(self.base_interface.to_interface_id())
                    .ok_or_else(|| DispatchError::BaseNotExposed(format!("{:?}", object)))?
            }
        };
        Ok(self.wrap(object, host_type, binding))
    }

    fn wrap(&self, object: ObjectRef, host_type: QualifiedName, binding: TypeBinding) -> HostObject {
        let id = binding.interface().id();
        let wrapped = HostObject {
            inner: Arc::new(HostObjectInner {
                object,
                binding,
                host_type,
                collector: Arc::clone(&self.collector),
            }),
        };
        self.collector.instantiated(id);
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenebind_core::{Class, impl_object};
    use scenebind_registry::{Contribution, OrderingPolicy, Probe, Registrar};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static OBJECT: Class = Class::new_abstract("Object", None);
    static SCENE: Class = Class::new("Scene", Some(&OBJECT));
    static SAMPLER: Class = Class::new("Sampler", Some(&OBJECT));

    struct SceneObj;
    impl_object!(SceneObj, SCENE);

    struct Independent;
    impl_object!(Independent, SAMPLER);

    fn scene_iface() -> InterfaceDescriptor {
        InterfaceDescriptor::new(QualifiedName::in_module("render", "Scene"), &SCENE)
    }

    fn install(runtime: &HostRuntime, module: &str, bindings: Vec<TypeBinding>) {
        let mut registrar = Registrar::new(module);
        for binding in bindings {
            registrar.bind_type(&[], binding).unwrap();
        }
        let (name, tree, exposed) = registrar.into_parts();
        runtime.commit(HostModule::new(name, Vec::new(), tree, exposed));
    }

    fn runtime_with_scene() -> (HostRuntime, PluginBus) {
        let runtime = HostRuntime::new();
        install(
            &runtime,
            "core",
            vec![TypeBinding::new(InterfaceDescriptor::new(
                QualifiedName::in_module("core", "Object"),
                &OBJECT,
            ))],
        );
        install(&runtime, "render", vec![TypeBinding::new(scene_iface())]);

        let bus = PluginBus::new(OrderingPolicy::default());
        let mut contribution = Contribution::new();
        contribution
            .create_domain("scene")
            .append("scene", Probe::new(scene_iface()));
        bus.contribute("render", contribution).unwrap();
        (runtime, bus)
    }

    #[test]
    fn present_wraps_most_derived_type() {
        let (runtime, bus) = runtime_with_scene();
        let obj = runtime.present(&bus, Arc::new(SceneObj)).unwrap();
        assert_eq!(obj.type_name(), "render::Scene");
        assert_eq!(runtime.collector().live_count(scene_iface().id()), 1);
    }

    #[test]
    fn unknown_object_degrades_to_base() {
        let (runtime, bus) = runtime_with_scene();
        let obj = runtime.present(&bus, Arc::new(Independent)).unwrap();
        assert_eq!(obj.type_name(), "core::Object");
    }

    #[test]
    fn missing_base_binding_is_an_error() {
        let runtime = HostRuntime::new();
        let bus = PluginBus::default();
        assert!(matches!(
            runtime.present(&bus, Arc::new(Independent)),
            Err(DispatchError::BaseNotExposed(_))
        ));
    }

    #[test]
    fn recovered_interface_without_binding_is_an_error() {
        let runtime = HostRuntime::new();
        let (_, bus) = runtime_with_scene();
        assert_eq!(
            runtime.present(&bus, Arc::new(SceneObj)).unwrap_err(),
            DispatchError::UnexposedInterface("render::Scene".into())
        );
    }

    #[test]
    fn collection_observer_fires_once_on_last_drop() {
        let (runtime, bus) = runtime_with_scene();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        runtime.observe_collection(scene_iface().id(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let first = runtime.present(&bus, Arc::new(SceneObj)).unwrap();
        let alias = first.clone();
        drop(first);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        drop(alias);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.collector().armed(scene_iface().id()), 0);

        drop(runtime.present(&bus, Arc::new(SceneObj)).unwrap());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn collection_observer_waits_for_every_instance() {
        let (runtime, bus) = runtime_with_scene();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        runtime.observe_collection(scene_iface().id(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let first = runtime.present(&bus, Arc::new(SceneObj)).unwrap();
        let second = runtime.present(&bus, Arc::new(SceneObj)).unwrap();
        drop(first);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(runtime.collector().live_count(scene_iface().id()), 1);
        assert_eq!(runtime.collector().armed(scene_iface().id()), 1);

        drop(second);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(runtime.collector().live_count(scene_iface().id()), 0);
    }

    #[test]
    fn instantiation_observer_is_persistent() {
        let (runtime, bus) = runtime_with_scene();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        runtime.observe_instantiation(scene_iface().id(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let _a = runtime.present(&bus, Arc::new(SceneObj)).unwrap();
        let _b = runtime.present(&bus, Arc::new(SceneObj)).unwrap();
        let _c = runtime.present(&bus, Arc::new(Independent)).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn opaque_lookup_reports_missing_and_mismatched_values() {
        let runtime = HostRuntime::new();
        let mut registrar = Registrar::new("core");
        registrar.bind_opaque("answer", Arc::new(7u8)).unwrap();
        let (name, tree, exposed) = registrar.into_parts();
        runtime.commit(HostModule::new(name, Vec::new(), tree, exposed));

        assert_eq!(runtime.opaque::<u8>("core", "answer").as_deref(), Ok(&7));
        assert_eq!(
            runtime.opaque::<u16>("core", "answer"),
            Err(RegistrationError::OpaqueTypeMismatch("core::answer".into()))
        );
        assert!(runtime.opaque::<u8>("core", "missing").is_err());
        assert!(runtime.opaque::<u8>("render", "answer").is_err());
    }
}
