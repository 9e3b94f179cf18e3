//! Runtime error types.
//!
//! ## Error Hierarchy
//!
//! ```text
//! BridgeError (top-level)
//! ├── Registration(RegistrationError) - configuration defects at module load
//! ├── Dispatch(DispatchError)         - presenting an object to the host
//! ├── Lifetime(LifetimeError)         - lifecycle misuse
//! └── Config(ConfigError)             - bad configuration values
//! ```

use scenebind_core::{DispatchError, RegistrationError};
use thiserror::Error;

use crate::LifecycleState;

/// Top-level error for bridge operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("registration error: {0}")]
    Registration(#[from] RegistrationError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("lifetime error: {0}")]
    Lifetime(#[from] LifetimeError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

// ============================================================================
// Lifetime Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifetimeError {
    /// A transition was requested from a state that does not allow it.
    #[error("invalid lifecycle transition for '{owner}': {from} -> {to}")]
    InvalidTransition {
        owner: String,
        from: LifecycleState,
        to: LifecycleState,
    },
}

// ============================================================================
// Config Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}
