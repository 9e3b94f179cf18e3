use std::any::Any;
use std::sync::Arc;

use scenebind_core::{Class, Object, ObjectRef};

use crate::classes;

/// A plugin instance created by the renderer for one variant.
///
/// The bridge never looks inside; it only needs the class and variant to
/// recover the instance's interface.
#[derive(Debug, Clone)]
pub struct Plugin {
    class: &'static Class,
    variant: String,
    id: String,
}

impl Plugin {
    pub fn new(class: &'static Class, variant: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            class,
            variant: variant.into(),
            id: id.into(),
        }
    }

    /// Shorthand for a shared handle.
    pub fn handle(
        class: &'static Class,
        variant: impl Into<String>,
        id: impl Into<String>,
    ) -> ObjectRef {
        Arc::new(Self::new(class, variant, id))
    }

    /// A scene container.
    pub fn scene(variant: impl Into<String>) -> ObjectRef {
        Self::handle(&classes::SCENE, variant, "scene")
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Object for Plugin {
    fn class(&self) -> &'static Class {
        self.class
    }

    fn variant(&self) -> Option<&str> {
        Some(&self.variant)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
