//! Type-Recovery Registry.
//!
//! Maps an opaque base-typed handle to the most derived exposed interface its
//! object implements, by walking an ordered list of probes per domain and
//! taking the first match.
//!
//! Domains are scanned in creation order as if they were one list. Under
//! `Verify` an append that leaves a descendant behind its ancestor in an
//! earlier domain is rejected; under `Specificity` the most specific match
//! across domains wins.

use rustc_hash::{FxHashMap, FxHashSet};
use scenebind_core::{InterfaceDescriptor, InterfaceId, Object, RegistrationError};

use crate::ordering::{self, OrderingPolicy};
use crate::Probe;

/// Outcome of a recovery attempt.
///
/// A miss is an ordinary value: callers degrade to the base interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovered<'a> {
    Interface(&'a InterfaceDescriptor),
    NoMatch,
}

impl<'a> Recovered<'a> {
    pub fn is_match(&self) -> bool {
        matches!(self, Recovered::Interface(_))
    }

    pub fn interface(self) -> Option<&'a InterfaceDescriptor> {
        match self {
            Recovered::Interface(interface) => Some(interface),
            Recovered::NoMatch => None,
        }
    }
}

/// Ordered probes for one domain.
#[derive(Debug, Clone)]
pub struct ProbeList {
    domain: String,
    owner: Option<String>,
    probes: Vec<Probe>,
}

impl ProbeList {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            owner: None,
            probes: Vec::new(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The module that created this domain.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn contains(&self, id: InterfaceId) -> bool {
        self.probes.iter().any(|probe| probe.interface().id() == id)
    }

    /// First probe in list order whose downcast succeeds.
    pub fn recover(&self, obj: &dyn Object) -> Recovered<'_> {
        self.probes
            .iter()
            .find(|probe| probe.matches(obj))
            .map_or(Recovered::NoMatch, |probe| {
                Recovered::Interface(probe.interface())
            })
    }

    /// Check the list against the declared class hierarchy.
    pub fn verify(&self) -> Result<(), RegistrationError> {
        ordering::verify(&self.domain, &self.probes)
    }

    /// Append a batch, rejecting duplicates before anything changes.
    pub fn append(
        &mut self,
        probes: Vec<Probe>,
        policy: OrderingPolicy,
    ) -> Result<(), RegistrationError> {
        let mut seen: FxHashSet<InterfaceId> =
            self.probes.iter().map(|p| p.interface().id()).collect();
        for probe in &probes {
            if !seen.insert(probe.interface().id()) {
                return Err(RegistrationError::DuplicateProbe {
                    domain: self.domain.clone(),
                    interface: probe.interface().name().to_string(),
                });
            }
        }

        self.probes = policy.merge(&self.domain, &self.probes, probes)?;
        Ok(())
    }
}

/// Domains of probe lists, kept in creation order.
#[derive(Debug, Clone, Default)]
pub struct TypeRecoveryRegistry {
    domains: Vec<ProbeList>,
    index: FxHashMap<String, usize>,
    policy: OrderingPolicy,
}

impl TypeRecoveryRegistry {
    pub fn new(policy: OrderingPolicy) -> Self {
        Self {
            domains: Vec::new(),
            index: FxHashMap::default(),
            policy,
        }
    }

    pub fn policy(&self) -> OrderingPolicy {
        self.policy
    }

    /// Create an empty domain owned by `owner`.
    pub fn create_domain(&mut self, name: &str, owner: &str) -> Result<(), RegistrationError> {
        if self.index.contains_key(name) {
            return Err(RegistrationError::DuplicateDomain(name.to_string()));
        }
        let mut list = ProbeList::new(name);
        list.owner = Some(owner.to_string());
        self.index.insert(name.to_string(), self.domains.len());
        self.domains.push(list);
        Ok(())
    }

    /// Append probes to an existing domain.
    ///
    /// Appending to a domain nobody created is a load failure, not a no-op.
    pub fn append(&mut self, domain: &str, probes: Vec<Probe>) -> Result<(), RegistrationError> {
        let policy = self.policy;
        let list = self
            .index
            .get(domain)
            .and_then(|&i| self.domains.get_mut(i))
            .ok_or_else(|| RegistrationError::DomainNotFound(domain.to_string()))?;
        let count = probes.len();
        let previous = list.probes.clone();
        list.append(probes, policy)?;
        if policy == OrderingPolicy::Verify {
            if let Err(err) = self.verify_all() {
                if let Some(list) = self.index.get(domain).and_then(|&i| self.domains.get_mut(i)) {
                    list.probes = previous;
                }
                return Err(err);
            }
        }
        let len = self.domain(domain).map_or(0, ProbeList::len);
        log::debug!(
            "appended {} probe(s) to domain '{}' ({} total, {} ordering)",
            count,
            domain,
            len,
            policy
        );
        Ok(())
    }

    pub fn domain(&self, name: &str) -> Option<&ProbeList> {
        self.index.get(name).and_then(|&i| self.domains.get(i))
    }

    pub fn has_domain(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn domains(&self) -> impl Iterator<Item = &ProbeList> {
        self.domains.iter()
    }

    /// Recover within one domain. An unknown domain is a miss.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn recover(&self, domain: &str, obj: &dyn Object) -> Recovered<'_> {
        match self.domain(domain) {
            Some(list) => list.recover(obj),
            None => Recovered::NoMatch,
        }
    }

    /// Recover across every domain.
    ///
    /// `Unchecked` takes the first match in domain creation order. The other
    /// policies take the most specific of each domain's first match, so a
    /// later domain is never shadowed by an earlier one.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn recover_any(&self, obj: &dyn Object) -> Recovered<'_> {
        let mut matches = self
            .domains
            .iter()
            .filter_map(|list| list.recover(obj).interface());
        let Some(mut best) = matches.next() else {
            return Recovered::NoMatch;
        };
        if self.policy != OrderingPolicy::Unchecked {
            for candidate in matches {
                if candidate.is_more_specific_than(best) {
                    best = candidate;
                }
            }
        }
        Recovered::Interface(best)
    }

    /// Check that recovery cannot report an object as one of its ancestors.
    ///
    /// Each domain is checked on its own. Unless `Specificity` arbitrates
    /// between domains, the domains are also checked together in scan order.
    pub fn verify_all(&self) -> Result<(), RegistrationError> {
        if self.policy == OrderingPolicy::Specificity {
            return self.domains.iter().try_for_each(ProbeList::verify);
        }
        ordering::verify_sequence(self.domains.iter().flat_map(|list| {
            list.probes
                .iter()
                .map(move |probe| (list.domain.as_str(), probe))
        }))
    }

    pub fn probe_count(&self) -> usize {
        self.domains.iter().map(ProbeList::len).sum()
    }

    /// True if any domain holds a probe for this interface.
    pub fn has_probe_for(&self, id: InterfaceId) -> bool {
        self.domains.iter().any(|list| list.contains(id))
    }

    /// All probes across all domains.
    pub fn probes(&self) -> impl Iterator<Item = &Probe> {
        self.domains.iter().flat_map(|list| list.probes.iter())
    }
}
