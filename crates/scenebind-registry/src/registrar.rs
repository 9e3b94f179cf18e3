//! Capability Exposure Registrar.
//!
//! Collects everything one module exposes to the host runtime: type bindings
//! for native interfaces, free functions, documented sub-namespaces and
//! opaque values. It also indexes which interfaces are exposed so probes and
//! bindings can be cross-checked before the module is committed.

use std::any::Any;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use scenebind_core::{InterfaceId, QualifiedName, RegistrationError};

use crate::{Binding, FunctionBinding, NamespaceTree, OpaqueValue, TypeBinding};

/// Staging area for one module's bindings.
#[derive(Debug, Clone)]
pub struct Registrar {
    module: String,
    tree: NamespaceTree,
    exposed: FxHashMap<InterfaceId, QualifiedName>,
}

impl Registrar {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            tree: NamespaceTree::new(),
            exposed: FxHashMap::default(),
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn tree(&self) -> &NamespaceTree {
        &self.tree
    }

    fn qualify(&self, path: &[&str], name: &str) -> QualifiedName {
        let mut namespace = Vec::with_capacity(path.len() + 1);
        namespace.push(self.module.clone());
        namespace.extend(path.iter().map(|s| s.to_string()));
        QualifiedName::new(name, namespace)
    }

    /// Create a documented sub-namespace.
    pub fn submodule(&mut self, name: &str, doc: impl Into<String>) {
        self.tree.set_doc(&[name], doc);
    }

    /// Expose a native interface under `path`.
    pub fn bind_type(
        &mut self,
        path: &[&str],
        binding: TypeBinding,
    ) -> Result<QualifiedName, RegistrationError> {
        let qualified = self.qualify(path, binding.name());

        let mut members: Vec<&str> = binding.members().iter().map(|m| m.name.as_str()).collect();
        members.sort_unstable();
        if let Some(pair) = members.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(RegistrationError::DuplicateName(
                qualified.child(pair[0]).to_string(),
            ));
        }

        let id = binding.interface().id();
        if let Some(existing) = self.exposed.get(&id) {
            return Err(RegistrationError::DuplicateName(format!(
                "{} (already exposed as {})",
                binding.interface().name(),
                existing
            )));
        }

        let name = binding.name().to_string();
        self.tree.bind(path, &name, Binding::Type(binding))?;
        self.exposed.insert(id, qualified.clone());
        log::trace!("bound type {}", qualified);
        Ok(qualified)
    }

    pub fn bind_function(
        &mut self,
        path: &[&str],
        function: FunctionBinding,
    ) -> Result<QualifiedName, RegistrationError> {
        let qualified = self.qualify(path, &function.name);
        let name = function.name.clone();
        self.tree.bind(path, &name, Binding::Function(function))?;
        Ok(qualified)
    }

    /// Store a native value as a module attribute.
    pub fn bind_opaque<T: Any + Send + Sync>(
        &mut self,
        name: &str,
        value: Arc<T>,
    ) -> Result<QualifiedName, RegistrationError> {
        let qualified = self.qualify(&[], name);
        self.tree
            .bind::<&str>(&[], name, Binding::Opaque(OpaqueValue::new(value)))?;
        Ok(qualified)
    }

    pub fn lookup(&self, path: &[&str], name: &str) -> Option<&Binding> {
        self.tree.get(path, name)
    }

    pub fn exposes(&self, id: InterfaceId) -> bool {
        self.exposed.contains_key(&id)
    }

    /// Qualified host name of the binding for an interface.
    pub fn binding_name(&self, id: InterfaceId) -> Option<&QualifiedName> {
        self.exposed.get(&id)
    }

    pub fn type_binding(&self, id: InterfaceId) -> Option<&TypeBinding> {
        let qualified = self.exposed.get(&id)?;
        let path = qualified.namespace_path().get(1..)?;
        self.tree
            .get(path, qualified.simple_name())
            .and_then(Binding::as_type)
    }

    pub fn exposed(&self) -> impl Iterator<Item = (InterfaceId, &QualifiedName)> {
        self.exposed.iter().map(|(id, name)| (*id, name))
    }

    /// Bindings that polymorphic returns can produce; each needs a probe.
    pub fn polymorphic_bindings(&self) -> Vec<&TypeBinding> {
        self.exposed
            .keys()
            .filter_map(|id| self.type_binding(*id))
            .filter(|binding| binding.interface().is_polymorphic())
            .collect()
    }

    pub fn into_parts(self) -> (String, NamespaceTree, FxHashMap<InterfaceId, QualifiedName>) {
        (self.module, self.tree, self.exposed)
    }
}
