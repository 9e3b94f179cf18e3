//! Lifetime Coordinator.
//!
//! Sequences native static teardown against the host's object lifetimes.
//! A render module arms the coordinator on its root container type; once
//! no root object is left live (or on an explicit [`shutdown`]) it runs the
//! shutdown hooks in order and returns the module's base-type reference.
//! Everything after that is a no-op.
//!
//! [`shutdown`]: LifetimeCoordinator::shutdown

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scenebind_core::{BaseTypeLease, InterfaceId};

use crate::{HostRuntime, LifetimeConfig, LifetimeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecycleState {
    Uninitialized,
    ModuleLoaded,
    RootObjectLive,
    RootObjectCollected,
    StaticsShutDown,
    BaseTypeRefcountRestored,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::ModuleLoaded => "module-loaded",
            LifecycleState::RootObjectLive => "root-object-live",
            LifecycleState::RootObjectCollected => "root-object-collected",
            LifecycleState::StaticsShutDown => "statics-shut-down",
            LifecycleState::BaseTypeRefcountRestored => "base-type-refcount-restored",
        }
    }

    /// States from which teardown can still run.
    fn is_armed(self) -> bool {
        matches!(
            self,
            LifecycleState::ModuleLoaded | LifecycleState::RootObjectLive
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named step of static teardown.
pub struct ShutdownHook {
    name: String,
    run: Box<dyn FnOnce() + Send>,
}

impl ShutdownHook {
    pub fn new(name: impl Into<String>, run: impl FnOnce() + Send + 'static) -> Self {
        Self {
            name: name.into(),
            run: Box::new(run),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ShutdownHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShutdownHook").field(&self.name).finish()
    }
}

/// Ordered static teardown.
#[derive(Debug, Default)]
pub struct ShutdownSequence {
    hooks: Vec<ShutdownHook>,
}

impl ShutdownSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook; hooks run in the order they were added.
    pub fn then(mut self, name: impl Into<String>, run: impl FnOnce() + Send + 'static) -> Self {
        self.hooks.push(ShutdownHook::new(name, run));
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.hooks.iter().map(ShutdownHook::name).collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook, returning their names in execution order.
    pub fn run(self) -> Vec<String> {
        let mut ran = Vec::with_capacity(self.hooks.len());
        for hook in self.hooks {
            log::debug!("running shutdown hook '{}'", hook.name);
            (hook.run)();
            ran.push(hook.name);
        }
        ran
    }
}

#[derive(Debug)]
struct CoordinatorState {
    state: LifecycleState,
    lease: Option<BaseTypeLease>,
    sequence: Option<ShutdownSequence>,
    teardowns: usize,
}

/// Drives one module's lifecycle state machine.
#[derive(Debug)]
pub struct LifetimeCoordinator {
    owner: String,
    config: LifetimeConfig,
    inner: Mutex<CoordinatorState>,
}

impl LifetimeCoordinator {
    pub fn new(owner: impl Into<String>, config: LifetimeConfig) -> Arc<Self> {
        Arc::new(Self {
            owner: owner.into(),
            config,
            inner: Mutex::new(CoordinatorState {
                state: LifecycleState::Uninitialized,
                lease: None,
                sequence: None,
                teardowns: 0,
            }),
        })
    }

    /// A coordinator for a module that has just loaded.
    pub fn for_module(
        owner: impl Into<String>,
        config: LifetimeConfig,
        lease: BaseTypeLease,
        sequence: ShutdownSequence,
    ) -> Arc<Self> {
        let coordinator = Self::new(owner, config);
        if let Err(err) = coordinator.module_loaded(lease, sequence) {
            log::error!("{}", err);
        }
        coordinator
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn state(&self) -> LifecycleState {
        self.lock().state
    }

    /// How many times teardown has run. Never more than one.
    pub fn teardowns(&self) -> usize {
        self.lock().teardowns
    }

    /// Record the module load: keep its base-type lease and shutdown sequence.
    pub fn module_loaded(
        &self,
        lease: BaseTypeLease,
        sequence: ShutdownSequence,
    ) -> Result<(), LifetimeError> {
        let mut inner = self.lock();
        if inner.state != LifecycleState::Uninitialized {
            return Err(LifetimeError::InvalidTransition {
                owner: self.owner.clone(),
                from: inner.state,
                to: LifecycleState::ModuleLoaded,
            });
        }
        log::debug!(
            "'{}' loaded with shutdown sequence {:?}",
            self.owner,
            sequence.names()
        );
        inner.lease = Some(lease);
        inner.sequence = Some(sequence);
        inner.state = LifecycleState::ModuleLoaded;
        Ok(())
    }

    /// A root object was created. Roots created after teardown are tolerated.
    pub fn root_object_live(&self) {
        let mut inner = self.lock();
        let current = inner.state;
        match current {
            LifecycleState::ModuleLoaded => inner.state = LifecycleState::RootObjectLive,
            LifecycleState::RootObjectLive => {}
            state => log::debug!(
                "'{}' saw a root object in state {}, ignoring",
                self.owner,
                state
            ),
        }
    }

    /// The last live root object was collected. Only the first call tears
    /// down.
    pub fn root_object_collected(&self) -> bool {
        self.teardown("root object collected")
    }

    /// Tear down now. Idempotent with the collection path.
    pub fn shutdown(&self) -> bool {
        self.teardown("explicit shutdown")
    }

    fn teardown(&self, reason: &str) -> bool {
        let (sequence, lease) = {
            let mut inner = self.lock();
            if !inner.state.is_armed() {
                log::debug!(
                    "'{}': {} in state {}, nothing to do",
                    self.owner,
                    reason,
                    inner.state
                );
                return false;
            }
            inner.state = LifecycleState::RootObjectCollected;
            inner.teardowns += 1;
            (inner.sequence.take(), inner.lease.take())
        };

        log::info!("'{}': {}, shutting down statics", self.owner, reason);
        // Hooks run outside the lock so they may query the coordinator.
        if let Some(sequence) = sequence {
            sequence.run();
        }
        self.lock().state = LifecycleState::StaticsShutDown;

        if let Some(lease) = lease {
            let count = lease.release(self.config.compensating_releases);
            log::debug!(
                "'{}' restored base type refcount to {}",
                self.owner,
                count
            );
        }
        self.lock().state = LifecycleState::BaseTypeRefcountRestored;
        true
    }

    /// Watch `root_type` on the host: instantiation marks a root live, and the
    /// collection that leaves no root live runs teardown.
    pub fn arm(self: &Arc<Self>, runtime: &HostRuntime, root_type: InterfaceId) {
        let live = Arc::clone(self);
        runtime.observe_instantiation(root_type, move || live.root_object_live());
        let collected = Arc::clone(self);
        runtime.observe_collection(root_type, move || {
            collected.root_object_collected();
        });
        log::debug!("'{}' armed on root type {}", self.owner, root_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenebind_core::{QualifiedName, SharedTypeDescriptor};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn descriptor() -> Arc<SharedTypeDescriptor> {
        Arc::new(SharedTypeDescriptor::new(QualifiedName::in_module(
            "core", "Object",
        )))
    }

    fn recording_sequence(log: &Arc<Mutex<Vec<&'static str>>>) -> ShutdownSequence {
        let color = Arc::clone(log);
        let accel = Arc::clone(log);
        ShutdownSequence::new()
            .then("color_management", move || {
                color.lock().unwrap().push("color_management")
            })
            .then("accel", move || accel.lock().unwrap().push("accel"))
    }

    #[test]
    fn full_lifecycle() {
        let descriptor = descriptor();
        let pre = descriptor.ref_count();
        let log = Arc::new(Mutex::new(Vec::new()));

        let coordinator = LifetimeCoordinator::new("render", LifetimeConfig::default());
        assert_eq!(coordinator.state(), LifecycleState::Uninitialized);

        let lease = BaseTypeLease::acquire(descriptor.clone(), "render");
        coordinator
            .module_loaded(lease, recording_sequence(&log))
            .unwrap();
        assert_eq!(coordinator.state(), LifecycleState::ModuleLoaded);
        assert_eq!(descriptor.ref_count(), pre + 1);

        coordinator.root_object_live();
        assert_eq!(coordinator.state(), LifecycleState::RootObjectLive);

        assert!(coordinator.root_object_collected());
        assert_eq!(
            coordinator.state(),
            LifecycleState::BaseTypeRefcountRestored
        );
        assert_eq!(*log.lock().unwrap(), vec!["color_management", "accel"]);
        assert_eq!(descriptor.ref_count(), pre - 1);
    }

    #[test]
    fn teardown_runs_at_most_once() {
        let descriptor = descriptor();
        descriptor.inc_ref();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);

        let coordinator = LifetimeCoordinator::new("render", LifetimeConfig::default());
        coordinator
            .module_loaded(
                BaseTypeLease::acquire(descriptor.clone(), "render"),
                ShutdownSequence::new().then("accel", move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .unwrap();

        assert!(coordinator.root_object_collected());
        assert!(!coordinator.root_object_collected());
        assert!(!coordinator.shutdown());
        coordinator.root_object_live();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.teardowns(), 1);
        assert_eq!(descriptor.ref_count(), 1);
    }

    #[test]
    fn compensating_releases_are_configurable() {
        let descriptor = descriptor();
        descriptor.inc_ref();
        let pre = descriptor.ref_count();

        let coordinator = LifetimeCoordinator::new(
            "render",
            LifetimeConfig {
                compensating_releases: 0,
            },
        );
        coordinator
            .module_loaded(
                BaseTypeLease::acquire(descriptor.clone(), "render"),
                ShutdownSequence::new(),
            )
            .unwrap();
        assert!(coordinator.shutdown());
        assert_eq!(descriptor.ref_count(), pre);
    }

    #[test]
    fn for_module_starts_loaded() {
        let descriptor = descriptor();
        let pre = descriptor.ref_count();
        let coordinator = LifetimeCoordinator::for_module(
            "render",
            LifetimeConfig::default(),
            BaseTypeLease::acquire(descriptor.clone(), "render"),
            ShutdownSequence::new(),
        );
        assert_eq!(coordinator.state(), LifecycleState::ModuleLoaded);
        assert_eq!(descriptor.ref_count(), pre + 1);
        assert!(coordinator.shutdown());
    }

    #[test]
    fn shutdown_before_load_is_a_no_op() {
        let coordinator = LifetimeCoordinator::new("render", LifetimeConfig::default());
        assert!(!coordinator.shutdown());
        assert_eq!(coordinator.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn second_load_is_rejected() {
        let descriptor = descriptor();
        let coordinator = LifetimeCoordinator::new("render", LifetimeConfig::default());
        coordinator
            .module_loaded(
                BaseTypeLease::acquire(descriptor.clone(), "render"),
                ShutdownSequence::new(),
            )
            .unwrap();
        let err = coordinator
            .module_loaded(
                BaseTypeLease::acquire(descriptor.clone(), "render"),
                ShutdownSequence::new(),
            )
            .unwrap_err();
        assert_eq!(
            err,
            LifetimeError::InvalidTransition {
                owner: "render".into(),
                from: LifecycleState::ModuleLoaded,
                to: LifecycleState::ModuleLoaded,
            }
        );
        // The rejected lease was dropped and gave its reference back.
        assert_eq!(descriptor.ref_count(), 2);
    }
}
