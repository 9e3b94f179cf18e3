//! Process-wide native subsystems a render module depends on.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A native static subsystem with observable init/shutdown counts.
#[derive(Debug)]
pub struct Subsystem {
    name: &'static str,
    inits: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl Subsystem {
    const fn new(name: &'static str) -> Self {
        Self {
            name,
            inits: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn initialize(&self) {
        self.inits.fetch_add(1, Ordering::AcqRel);
        log::debug!("{} initialized", self.name);
    }

    pub fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::AcqRel);
        log::debug!("{} shut down", self.name);
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::Acquire)
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.init_count() > self.shutdown_count()
    }
}

/// Statics shared by a render module's objects.
///
/// The JIT runtime belongs to the compute backend; render modules neither
/// initialize nor shut it down.
#[derive(Debug)]
pub struct RenderStatics {
    pub accel: Subsystem,
    pub color_management: Subsystem,
    pub jit: Subsystem,
}

impl Default for RenderStatics {
    fn default() -> Self {
        Self {
            accel: Subsystem::new("accel"),
            color_management: Subsystem::new("color_management"),
            jit: Subsystem::new("jit"),
        }
    }
}

impl RenderStatics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_track_lifecycle() {
        let statics = RenderStatics::new();
        assert!(!statics.accel.is_active());
        statics.accel.initialize();
        assert!(statics.accel.is_active());
        statics.accel.shutdown();
        assert!(!statics.accel.is_active());
        assert_eq!(statics.accel.init_count(), 1);
        assert_eq!(statics.accel.shutdown_count(), 1);
        assert_eq!(statics.jit.name(), "jit");
    }
}
