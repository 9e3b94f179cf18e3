//! Deterministic hash-based interface identity.
//!
//! [`InterfaceId`] is a 64-bit hash computed from an interface's qualified name.
//! Two modules that declare the same qualified name agree on the id without
//! talking to each other, which is what lets probes contributed by one module
//! be matched against bindings exposed by another.
//!
//! # Examples
//!
//! ```
//! use scenebind_core::InterfaceId;
//!
//! let shape = InterfaceId::from_name("render_scalar_rgb::Shape");
//! assert_eq!(shape, InterfaceId::from_name("render_scalar_rgb::Shape"));
//! assert_ne!(shape, InterfaceId::from_name("render_llvm_ad_rgb::Shape"));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Domain-specific mixing constants.
///
/// Interface ids and member ids are mixed with different constants so an
/// operation named like a type never collides with it.
pub mod hash_constants {
    /// Separator mixed between owner and member components.
    pub const SEP: u64 = 0x4bc94d6bd06053ad;

    /// Domain marker for interface ids.
    pub const INTERFACE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for member (operation/attribute) ids.
    pub const MEMBER: u64 = 0x7d3c8b4a92e15f6d;
}

/// A deterministic 64-bit id for an exposed interface or one of its members.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct InterfaceId(pub u64);

impl InterfaceId {
    /// Empty/invalid id.
    pub const EMPTY: InterfaceId = InterfaceId(0);

    /// Compute the id of an interface from its qualified name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        InterfaceId(hash_constants::INTERFACE ^ xxh64(name.as_bytes(), 0))
    }

    /// Compute the id of a member (operation or attribute) of an interface.
    #[inline]
    pub fn from_member(owner: InterfaceId, member: &str) -> Self {
        let hash = hash_constants::MEMBER ^ owner.0.wrapping_mul(hash_constants::SEP);
        InterfaceId(hash ^ xxh64(member.as_bytes(), 0))
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InterfaceId({:#018x})", self.0)
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}
