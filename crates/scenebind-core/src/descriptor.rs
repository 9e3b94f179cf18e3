//! Shared base-type descriptor and the lease that keeps it alive.
//!
//! The host runtime describes the common root type with a reference-counted
//! descriptor owned by the base module. A module whose objects derive from it
//! holds a [`BaseTypeLease`] for as long as it is loaded, so the base module
//! cannot be torn down underneath it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::QualifiedName;

/// Host-side descriptor of a native type with an explicit reference count.
#[derive(Debug)]
pub struct SharedTypeDescriptor {
    name: QualifiedName,
    refcount: AtomicUsize,
}

impl SharedTypeDescriptor {
    /// Create a descriptor owned by its defining module (count 1).
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            refcount: AtomicUsize::new(1),
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn ref_count(&self) -> usize {
        self.refcount.load(Ordering::Acquire)
    }

    /// True once every reference, including the defining module's, is gone.
    pub fn is_released(&self) -> bool {
        self.ref_count() == 0
    }

    /// Increment the count, returning the new value.
    pub fn inc_ref(&self) -> usize {
        self.refcount.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Decrement the count, returning the new value.
    ///
    /// The count saturates at zero; an extra decrement is logged and ignored.
    pub fn dec_ref(&self) -> usize {
        let result = self
            .refcount
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                count.checked_sub(1)
            });
        match result {
            Ok(previous) => {
                let count = previous - 1;
                if count == 0 {
                    log::debug!("type descriptor '{}' released", self.name);
                }
                count
            }
            Err(_) => {
                log::warn!(
                    "ignoring dec_ref on already released type descriptor '{}'",
                    self.name
                );
                0
            }
        }
    }
}

/// Ownership token for one dependent module's reference to the base type.
///
/// Acquiring increments the descriptor once. [`release`](Self::release) gives
/// that reference back plus `compensating` further references; dropping an
/// unreleased lease gives back only its own reference.
#[derive(Debug)]
pub struct BaseTypeLease {
    descriptor: Arc<SharedTypeDescriptor>,
    holder: String,
    released: bool,
}

impl BaseTypeLease {
    pub fn acquire(descriptor: Arc<SharedTypeDescriptor>, holder: impl Into<String>) -> Self {
        let holder = holder.into();
        let count = descriptor.inc_ref();
        log::debug!(
            "'{}' leased base type '{}' (refcount {})",
            holder,
            descriptor.name(),
            count
        );
        Self {
            descriptor,
            holder,
            released: false,
        }
    }

    pub fn descriptor(&self) -> &Arc<SharedTypeDescriptor> {
        &self.descriptor
    }

    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Give the lease back, returning the descriptor's final count.
    pub fn release(mut self, compensating: usize) -> usize {
        self.released = true;
        let mut count = self.descriptor.dec_ref();
        for _ in 0..compensating {
            count = self.descriptor.dec_ref();
        }
        log::debug!(
            "'{}' released base type '{}' with {} compensating release(s) (refcount {})",
            self.holder,
            self.descriptor.name(),
            compensating,
            count
        );
        count
    }
}

impl Drop for BaseTypeLease {
    fn drop(&mut self) {
        if !self.released {
            self.descriptor.dec_ref();
        }
    }
}
