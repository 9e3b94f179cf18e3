//! Registration side of scenebind.
//!
//! - [`Probe`], [`ProbeList`] and [`TypeRecoveryRegistry`]: ordered type recovery
//! - [`OrderingPolicy`]: what an append does about probe order
//! - [`Registrar`] and [`NamespaceTree`]: what a module exposes to the host
//! - [`PluginBus`] and [`Contribution`]: the registry shared across modules

mod binding;
mod bus;
mod namespace_tree;
pub mod ordering;
mod probe;
mod recovery;
mod registrar;

pub use binding::{
    Binding, FunctionBinding, Member, MemberKind, OpaqueValue, ReturnPolicy, TypeBinding,
};
pub use bus::{Contribution, PluginBus};
pub use namespace_tree::{NamespaceData, NamespaceEdge, NamespaceTree};
pub use ordering::OrderingPolicy;
pub use probe::{Probe, ProbeFn, ProbeTest};
pub use recovery::{ProbeList, Recovered, TypeRecoveryRegistry};
pub use registrar::Registrar;
