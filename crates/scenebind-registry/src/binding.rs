//! Bindings a module exposes to the host runtime.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use scenebind_core::{InterfaceDescriptor, InterfaceId};

/// Who owns a native object once it has been handed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReturnPolicy {
    /// The host shares ownership through the handle's reference count.
    #[default]
    Shared,
    /// The host borrows; the parent object keeps the native value alive.
    Borrowed,
    /// The value is copied into a host-owned record.
    Copy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Method,
    Attribute,
    Static,
}

/// A declared operation or attribute of an exposed type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub id: InterfaceId,
}

/// Binding of a native interface to a host type.
#[derive(Debug, Clone)]
pub struct TypeBinding {
    interface: InterfaceDescriptor,
    members: Vec<Member>,
    policy: ReturnPolicy,
    doc: Option<String>,
}

impl TypeBinding {
    pub fn new(interface: InterfaceDescriptor) -> Self {
        Self {
            interface,
            members: Vec::new(),
            policy: ReturnPolicy::default(),
            doc: None,
        }
    }

    pub fn method(self, name: &str) -> Self {
        self.member(name, MemberKind::Method)
    }

    pub fn attribute(self, name: &str) -> Self {
        self.member(name, MemberKind::Attribute)
    }

    pub fn static_method(self, name: &str) -> Self {
        self.member(name, MemberKind::Static)
    }

    fn member(mut self, name: &str, kind: MemberKind) -> Self {
        let id = InterfaceId::from_member(self.interface.id(), name);
        self.members.push(Member {
            name: name.to_string(),
            kind,
            id,
        });
        self
    }

    pub fn policy(mut self, policy: ReturnPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn interface(&self) -> &InterfaceDescriptor {
        &self.interface
    }

    pub fn name(&self) -> &str {
        self.interface.name().simple_name()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn find_member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn return_policy(&self) -> ReturnPolicy {
        self.policy
    }

    pub fn documentation(&self) -> Option<&str> {
        self.doc.as_deref()
    }
}

/// A free function bound under a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionBinding {
    pub name: String,
    pub doc: Option<String>,
}

impl FunctionBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// A native value stored in the host namespace without an exposed type.
///
/// Other modules retrieve it by name and downcast to the type they expect.
#[derive(Clone)]
pub struct OpaqueValue {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl OpaqueValue {
    pub fn new<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Shared handle to the value if it holds a `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpaqueValue<{}>", self.type_name)
    }
}

/// Anything bound under a name in a namespace.
#[derive(Debug, Clone)]
pub enum Binding {
    Type(TypeBinding),
    Function(FunctionBinding),
    Opaque(OpaqueValue),
}

impl Binding {
    pub fn as_type(&self) -> Option<&TypeBinding> {
        match self {
            Binding::Type(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionBinding> {
        match self {
            Binding::Function(binding) => Some(binding),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&OpaqueValue> {
        match self {
            Binding::Opaque(value) => Some(value),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Binding::Type(_) => "type",
            Binding::Function(_) => "function",
            Binding::Opaque(_) => "opaque",
        }
    }
}
