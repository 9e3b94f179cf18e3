//! Error types shared across the bridge.
//!
//! ## Error Hierarchy
//!
//! ```text
//! RegistrationError - configuration defects, fatal at module load
//! DispatchError     - failure to wrap a recovered object for the host
//! ```
//!
//! A classification miss is not an error: recovery returns `NoMatch` and the
//! caller degrades to the base interface. Misordered probes are not an error
//! either unless the ordering policy checks them; they misclassify silently.

use thiserror::Error;

// ============================================================================
// Registration Errors
// ============================================================================

/// Configuration defects surfaced while a module loads.
///
/// Any of these aborts the load; nothing the module staged is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A name was bound twice in the same namespace, or an interface was exposed twice.
    #[error("duplicate name: {0}")]
    DuplicateName(String),

    /// A probe domain was created twice.
    #[error("duplicate domain: {0}")]
    DuplicateDomain(String),

    /// An interface already has a probe in this domain.
    #[error("duplicate probe for interface '{interface}' in domain '{domain}'")]
    DuplicateProbe {
        /// The domain being appended to.
        domain: String,
        /// The interface that was probed twice.
        interface: String,
    },

    /// Probes were appended to a domain whose owning module never created it.
    #[error("domain not found: {0}")]
    DomainNotFound(String),

    /// A module was loaded before one of its dependencies.
    #[error("missing dependency: module '{module}' requires '{dependency}'")]
    MissingDependency {
        /// The module being loaded.
        module: String,
        /// The module it needs.
        dependency: String,
    },

    /// A module with this name is already loaded.
    #[error("module already loaded: {0}")]
    DuplicateModule(String),

    /// A module tried to extend the plugin bus a second time.
    #[error("module '{0}' already contributed to the plugin bus")]
    DuplicateContribution(String),

    /// The shared plugin bus could not be fetched from the base module.
    #[error("plugin bus not initialized: {0}")]
    BusNotInitialized(String),

    /// A probe names an interface that no module exposes.
    #[error("probe for '{0}' points to an interface with no exposed binding")]
    ProbeWithoutBinding(String),

    /// A polymorphic interface is exposed but nothing can ever recover it.
    #[error("interface '{0}' is exposed but never probed")]
    BindingWithoutProbe(String),

    /// An ancestor's probe would shadow a descendant's probe.
    #[error(
        "probe ordering violation in domain '{domain}': '{ancestor}' precedes its descendant '{descendant}'"
    )]
    OrderingViolation {
        /// The domain that would be misordered.
        domain: String,
        /// The less specific interface placed first.
        ancestor: String,
        /// The more specific interface it shadows.
        descendant: String,
    },

    /// A namespace path could not be resolved.
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),

    /// An opaque attribute exists but holds a different native type.
    #[error("opaque value '{0}' has an unexpected type")]
    OpaqueTypeMismatch(String),

    /// A render variant name does not follow `<backend>[_ad]_<color>[_polarized]`.
    #[error("invalid variant: '{0}'")]
    InvalidVariant(String),
}

// ============================================================================
// Dispatch Errors
// ============================================================================

/// Failures while presenting a native object to the host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// A probe recovered an interface that has no binding to wrap it with.
    #[error("interface '{0}' was recovered but has no exposed binding")]
    UnexposedInterface(String),

    /// Nothing matched and the base interface is not exposed either.
    #[error("no probe matched '{0}' and the base interface is not exposed")]
    BaseNotExposed(String),
}
