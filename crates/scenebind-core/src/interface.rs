use std::fmt;

use bitflags::bitflags;

use crate::{Class, InterfaceId, QualifiedName};

bitflags! {
    /// Properties of an exposed interface.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InterfaceFlags: u8 {
        /// Never the most derived class of a live object.
        const ABSTRACT = 0x01;
        /// Part of the common-base hierarchy: polymorphic returns can produce it,
        /// so it must be reachable through a probe.
        const POLYMORPHIC = 0x02;
        /// The top-level container whose collection drives static shutdown.
        const ROOT_CONTAINER = 0x04;
    }
}

/// Identifies one exposed native interface.
///
/// The descriptor ties together the host-side name, the native class that
/// implements it and, for variant-specific interfaces, the render variant.
#[derive(Clone)]
pub struct InterfaceDescriptor {
    id: InterfaceId,
    name: QualifiedName,
    class: &'static Class,
    variant: Option<String>,
    flags: InterfaceFlags,
}

impl InterfaceDescriptor {
    pub fn new(name: QualifiedName, class: &'static Class) -> Self {
        let mut flags = InterfaceFlags::POLYMORPHIC;
        if class.is_abstract() {
            flags |= InterfaceFlags::ABSTRACT;
        }
        Self {
            id: name.to_interface_id(),
            name,
            class,
            variant: None,
            flags,
        }
    }

    /// Restrict matches to objects of one render variant.
    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_flags(mut self, flags: InterfaceFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Plain record types (samples, interactions) are exposed but never
    /// returned polymorphically.
    pub fn record(mut self) -> Self {
        self.flags.remove(InterfaceFlags::POLYMORPHIC);
        self
    }

    pub fn id(&self) -> InterfaceId {
        self.id
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn class(&self) -> &'static Class {
        self.class
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn flags(&self) -> InterfaceFlags {
        self.flags
    }

    pub fn is_polymorphic(&self) -> bool {
        self.flags.contains(InterfaceFlags::POLYMORPHIC)
    }

    pub fn is_root_container(&self) -> bool {
        self.flags.contains(InterfaceFlags::ROOT_CONTAINER)
    }

    /// True if `self` sits strictly below `other` in the native hierarchy.
    pub fn is_more_specific_than(&self, other: &InterfaceDescriptor) -> bool {
        self.variant == other.variant && self.class.strictly_derives_from(other.class)
    }
}

impl PartialEq for InterfaceDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for InterfaceDescriptor {}

impl fmt::Debug for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceDescriptor")
            .field("name", &self.name.to_string())
            .field("class", &self.class.name())
            .field("variant", &self.variant)
            .field("flags", &self.flags)
            .finish()
    }
}

impl fmt::Display for InterfaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
