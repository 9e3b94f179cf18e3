//! Cross-module plugin bus.
//!
//! One [`TypeRecoveryRegistry`] shared by every module in the process. The
//! base module creates it and publishes it as an opaque attribute; each later
//! module fetches it through the host's module lookup and contributes to it
//! once, during its own load. Dispatch only ever reads it.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use scenebind_core::{InterfaceDescriptor, InterfaceId, Object, RegistrationError};

use crate::{OrderingPolicy, Probe, TypeRecoveryRegistry};

/// Everything one module adds to the bus.
#[derive(Debug, Clone, Default)]
pub struct Contribution {
    domains: Vec<String>,
    appends: Vec<(String, Vec<Probe>)>,
}

impl Contribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a domain owned by the contributing module.
    pub fn create_domain(&mut self, domain: impl Into<String>) -> &mut Self {
        self.domains.push(domain.into());
        self
    }

    /// Queue a probe for `domain`. Probes for one domain keep their queue order.
    pub fn append(&mut self, domain: &str, probe: Probe) -> &mut Self {
        match self.appends.iter_mut().find(|(name, _)| name == domain) {
            Some((_, probes)) => probes.push(probe),
            None => self.appends.push((domain.to_string(), vec![probe])),
        }
        self
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn probes(&self) -> impl Iterator<Item = &Probe> {
        self.appends.iter().flat_map(|(_, probes)| probes.iter())
    }

    pub fn has_probe_for(&self, id: InterfaceId) -> bool {
        self.probes().any(|probe| probe.interface().id() == id)
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty() && self.appends.is_empty()
    }
}

#[derive(Debug)]
struct BusState {
    registry: TypeRecoveryRegistry,
    contributors: Vec<String>,
}

/// The shared registry, guarded for one writer at load time and many readers after.
#[derive(Debug)]
pub struct PluginBus {
    state: RwLock<BusState>,
}

impl Default for PluginBus {
    fn default() -> Self {
        Self::new(OrderingPolicy::default())
    }
}

impl PluginBus {
    pub fn new(policy: OrderingPolicy) -> Self {
        Self {
            state: RwLock::new(BusState {
                registry: TypeRecoveryRegistry::new(policy),
                contributors: Vec::new(),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BusState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BusState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.read().registry.policy()
    }

    /// Apply a module's contribution.
    ///
    /// Each module contributes at most once. The whole contribution is staged
    /// against a copy of the registry and swapped in only if every step
    /// succeeds, so a failed load leaves the bus untouched.
    pub fn contribute(
        &self,
        module: &str,
        contribution: Contribution,
    ) -> Result<(), RegistrationError> {
        let mut state = self.write();
        if state.contributors.iter().any(|name| name == module) {
            return Err(RegistrationError::DuplicateContribution(module.to_string()));
        }

        let mut staged = state.registry.clone();
        for domain in &contribution.domains {
            staged.create_domain(domain, module)?;
        }
        let mut count = 0;
        for (domain, mut probes) in contribution.appends {
            for probe in &mut probes {
                probe.set_origin(module);
            }
            count += probes.len();
            staged.append(&domain, probes)?;
        }

        state.registry = staged;
        state.contributors.push(module.to_string());
        log::info!(
            "module '{}' contributed {} domain(s) and {} probe(s) to the plugin bus",
            module,
            contribution.domains.len(),
            count
        );
        Ok(())
    }

    /// Most derived exposed interface of `obj` across all domains.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn recover(&self, obj: &dyn Object) -> Option<InterfaceDescriptor> {
        self.read().registry.recover_any(obj).interface().cloned()
    }

    pub fn recover_in(&self, domain: &str, obj: &dyn Object) -> Option<InterfaceDescriptor> {
        self.read().registry.recover(domain, obj).interface().cloned()
    }

    /// Run `f` against the registry under the read lock.
    pub fn with_registry<R>(&self, f: impl FnOnce(&TypeRecoveryRegistry) -> R) -> R {
        f(&self.read().registry)
    }

    pub fn contributors(&self) -> Vec<String> {
        self.read().contributors.clone()
    }

    pub fn has_contributed(&self, module: &str) -> bool {
        self.read().contributors.iter().any(|name| name == module)
    }

    pub fn has_domain(&self, domain: &str) -> bool {
        self.read().registry.has_domain(domain)
    }

    pub fn has_probe_for(&self, id: InterfaceId) -> bool {
        self.read().registry.has_probe_for(id)
    }

    /// Check every domain's order against the class hierarchy.
    pub fn verify(&self) -> Result<(), RegistrationError> {
        self.read().registry.verify_all()
    }
}
