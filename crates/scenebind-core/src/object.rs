//! Native object model.
//!
//! The renderer's scene-graph objects are owned by the native side and only
//! consumed here through [`ObjectRef`] handles. Every object reports its most
//! derived [`Class`]; classes form a single-parent chain up to the common base,
//! which is the "declared interface relationship" used for checked downcasts.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Runtime descriptor of a native class.
///
/// Classes are declared as statics and compared by address, so two classes
/// that happen to share a name in different modules stay distinct.
///
/// ```
/// use scenebind_core::Class;
///
/// static OBJECT: Class = Class::new_abstract("Object", None);
/// static SHAPE: Class = Class::new("Shape", Some(&OBJECT));
/// static MESH: Class = Class::new("Mesh", Some(&SHAPE));
///
/// assert!(MESH.derives_from(&OBJECT));
/// assert!(!SHAPE.derives_from(&MESH));
/// assert_eq!(MESH.depth(), 2);
/// ```
pub struct Class {
    name: &'static str,
    parent: Option<&'static Class>,
    is_abstract: bool,
}

impl Class {
    pub const fn new(name: &'static str, parent: Option<&'static Class>) -> Self {
        Self {
            name,
            parent,
            is_abstract: false,
        }
    }

    /// A class that is never instantiated directly.
    pub const fn new_abstract(name: &'static str, parent: Option<&'static Class>) -> Self {
        Self {
            name,
            parent,
            is_abstract: true,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn parent(&self) -> Option<&'static Class> {
        self.parent
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Identity comparison.
    pub fn same_as(&self, other: &Class) -> bool {
        std::ptr::eq(self, other)
    }

    /// True if `self` is `base` or one of its descendants.
    pub fn derives_from(&self, base: &Class) -> bool {
        self.ancestors().any(|class| class.same_as(base))
    }

    /// True if `self` derives from `base` and is not `base` itself.
    pub fn strictly_derives_from(&self, base: &Class) -> bool {
        !self.same_as(base) && self.derives_from(base)
    }

    /// Iterate from `self` up to the root class, `self` first.
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Number of parent links between this class and the root.
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("parent", &self.parent.map(Class::name))
            .field("is_abstract", &self.is_abstract)
            .finish()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator returned by [`Class::ancestors`].
pub struct Ancestors<'a> {
    next: Option<&'a Class>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Class;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

/// A polymorphic native object.
///
/// Reference counting is provided by the [`ObjectRef`] handle; the native side
/// keeps its own clones and the host runtime holds another one per wrapper.
pub trait Object: Any + Send + Sync + 'static {
    /// The most derived class of this object.
    fn class(&self) -> &'static Class;

    /// The render variant this object was instantiated for, if it is variant-specific.
    fn variant(&self) -> Option<&str> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a native object.
pub type ObjectRef = Arc<dyn Object>;

impl<'a> dyn Object + 'a {
    /// Checked class-level downcast: true if this object's class derives from `class`.
    pub fn is_instance_of(&self, class: &Class) -> bool {
        self.class().derives_from(class)
    }

    /// Checked concrete downcast.
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Object>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl<'a> fmt::Debug for dyn Object + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant() {
            Some(variant) => write!(f, "{}[{}]", self.class(), variant),
            None => write!(f, "{}", self.class()),
        }
    }
}

/// Implement [`Object`] for a type with a fixed class and no variant.
///
/// ```
/// use scenebind_core::{Class, impl_object};
///
/// static OBJECT: Class = Class::new_abstract("Object", None);
/// static SAMPLER: Class = Class::new("Sampler", Some(&OBJECT));
///
/// struct Independent;
/// impl_object!(Independent, SAMPLER);
/// ```
#[macro_export]
macro_rules! impl_object {
    ($ty:ty, $class:path) => {
        impl $crate::Object for $ty {
            fn class(&self) -> &'static $crate::Class {
                &$class
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    static OBJECT: Class = Class::new_abstract("Object", None);
    static INTEGRATOR: Class = Class::new_abstract("Integrator", Some(&OBJECT));
    static SAMPLING: Class = Class::new("SamplingIntegrator", Some(&INTEGRATOR));
    static MONTE_CARLO: Class = Class::new("MonteCarloIntegrator", Some(&SAMPLING));
    static ADJOINT: Class = Class::new("AdjointIntegrator", Some(&INTEGRATOR));

    struct PathTracer;
    impl_object!(PathTracer, MONTE_CARLO);

    struct ParticleTracer;
    impl_object!(ParticleTracer, ADJOINT);

    #[test]
    fn derivation_walks_parent_chain() {
        assert!(MONTE_CARLO.derives_from(&SAMPLING));
        assert!(MONTE_CARLO.derives_from(&INTEGRATOR));
        assert!(MONTE_CARLO.derives_from(&OBJECT));
        assert!(!MONTE_CARLO.derives_from(&ADJOINT));
        assert!(!INTEGRATOR.derives_from(&SAMPLING));
    }

    #[test]
    fn strict_derivation_excludes_self() {
        assert!(MONTE_CARLO.derives_from(&MONTE_CARLO));
        assert!(!MONTE_CARLO.strictly_derives_from(&MONTE_CARLO));
        assert!(MONTE_CARLO.strictly_derives_from(&INTEGRATOR));
    }

    #[test]
    fn ancestors_and_depth() {
        let names: Vec<_> = MONTE_CARLO.ancestors().map(Class::name).collect();
        assert_eq!(
            names,
            vec!["MonteCarloIntegrator", "SamplingIntegrator", "Integrator", "Object"]
        );
        assert_eq!(MONTE_CARLO.depth(), 3);
        assert_eq!(OBJECT.depth(), 0);
    }

    #[test]
    fn classes_with_equal_names_are_distinct() {
        static OTHER_OBJECT: Class = Class::new_abstract("Object", None);
        assert!(!OTHER_OBJECT.same_as(&OBJECT));
        assert!(!SAMPLING.derives_from(&OTHER_OBJECT));
    }

    #[test]
    fn checked_downcasts() {
        let obj: ObjectRef = Arc::new(PathTracer);
        assert!(obj.is_instance_of(&SAMPLING));
        assert!(!obj.is_instance_of(&ADJOINT));
        assert!(obj.is::<PathTracer>());
        assert!(obj.downcast_ref::<ParticleTracer>().is_none());
        assert_eq!(format!("{:?}", obj), "MonteCarloIntegrator");
    }
}
