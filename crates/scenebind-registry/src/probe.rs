use std::fmt;

use scenebind_core::{InterfaceDescriptor, Object};

/// A custom downcast test.
pub type ProbeFn = fn(&dyn Object) -> bool;

/// How a probe decides whether an object implements its interface.
#[derive(Clone, Copy)]
pub enum ProbeTest {
    /// The object's class derives from the interface's class.
    Class,
    /// A caller-supplied check, e.g. a concrete `Any` downcast.
    Custom(ProbeFn),
}

/// A check-and-downcast test for one interface.
#[derive(Clone)]
pub struct Probe {
    interface: InterfaceDescriptor,
    test: ProbeTest,
    origin: Option<String>,
}

impl Probe {
    /// Probe by class derivation.
    pub fn new(interface: InterfaceDescriptor) -> Self {
        Self {
            interface,
            test: ProbeTest::Class,
            origin: None,
        }
    }

    /// Probe with a custom test.
    pub fn with_test(interface: InterfaceDescriptor, test: ProbeFn) -> Self {
        Self {
            interface,
            test: ProbeTest::Custom(test),
            origin: None,
        }
    }

    /// Probe that only matches the concrete Rust type `T`.
    pub fn concrete<T: Object>(interface: InterfaceDescriptor) -> Self {
        Self::with_test(interface, |obj: &dyn Object| obj.is::<T>())
    }

    pub fn interface(&self) -> &InterfaceDescriptor {
        &self.interface
    }

    pub fn test(&self) -> ProbeTest {
        self.test
    }

    /// The module that contributed this probe, once it is on the bus.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub(crate) fn set_origin(&mut self, module: &str) {
        self.origin = Some(module.to_string());
    }

    /// Attempt the checked downcast.
    pub fn matches(&self, obj: &dyn Object) -> bool {
        if let Some(variant) = self.interface.variant() {
            if obj.variant() != Some(variant) {
                return false;
            }
        }
        match self.test {
            ProbeTest::Class => obj.is_instance_of(self.interface.class()),
            ProbeTest::Custom(test) => test(obj),
        }
    }
}

impl fmt::Debug for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let test = match self.test {
            ProbeTest::Class => "class",
            ProbeTest::Custom(_) => "custom",
        };
        f.debug_struct("Probe")
            .field("interface", &self.interface.name().to_string())
            .field("test", &test)
            .field("origin", &self.origin)
            .finish()
    }
}
