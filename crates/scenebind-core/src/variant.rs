//! Render variants.
//!
//! Every render module is compiled once per variant, and each variant is loaded
//! as its own host module (`render_scalar_rgb`, `render_llvm_ad_rgb`, ...).
//! A variant name has the form `<backend>[_ad]_<color>[_polarized]`.

use std::fmt;
use std::str::FromStr;

use crate::RegistrationError;

/// Numeric backend of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Scalar,
    Llvm,
    Cuda,
}

impl Backend {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "scalar" => Some(Backend::Scalar),
            "llvm" => Some(Backend::Llvm),
            "cuda" => Some(Backend::Cuda),
            _ => None,
        }
    }
}

/// Color representation of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorMode {
    Mono,
    Rgb,
    Spectral,
}

impl ColorMode {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "mono" => Some(ColorMode::Mono),
            "rgb" => Some(ColorMode::Rgb),
            "spectral" => Some(ColorMode::Spectral),
            _ => None,
        }
    }
}

/// A validated render variant.
///
/// ```
/// use scenebind_core::Variant;
///
/// let variant = Variant::parse("llvm_ad_rgb").unwrap();
/// assert!(variant.is_jit());
/// assert!(variant.is_ad());
/// assert_eq!(variant.module_name("render"), "render_llvm_ad_rgb");
///
/// assert!(Variant::parse("scalar_hdr").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
    name: String,
    backend: Backend,
    color: ColorMode,
    autodiff: bool,
    polarized: bool,
}

impl Variant {
    /// The variant used when none is configured.
    pub const DEFAULT: &'static str = "scalar_rgb";

    pub fn parse(name: &str) -> Result<Self, RegistrationError> {
        let invalid = || RegistrationError::InvalidVariant(name.to_string());

        let mut parts = name.split('_').peekable();
        let backend = parts.next().and_then(Backend::parse).ok_or_else(invalid)?;

        let autodiff = parts.peek() == Some(&"ad");
        if autodiff {
            if backend == Backend::Scalar {
                return Err(invalid());
            }
            parts.next();
        }

        let color = parts.next().and_then(ColorMode::parse).ok_or_else(invalid)?;

        let polarized = match parts.next() {
            None => false,
            Some("polarized") => true,
            Some(_) => return Err(invalid()),
        };
        if parts.next().is_some() || (polarized && color != ColorMode::Spectral) {
            return Err(invalid());
        }

        Ok(Self {
            name: name.to_string(),
            backend,
            color,
            autodiff,
            polarized,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn color(&self) -> ColorMode {
        self.color
    }

    /// JIT-compiled variants share a compute runtime owned outside this crate.
    pub fn is_jit(&self) -> bool {
        matches!(self.backend, Backend::Llvm | Backend::Cuda)
    }

    pub fn is_ad(&self) -> bool {
        self.autodiff
    }

    pub fn is_polarized(&self) -> bool {
        self.polarized
    }

    /// Host module name of a per-variant library, e.g. `render_scalar_rgb`.
    pub fn module_name(&self, library: &str) -> String {
        format!("{library}_{}", self.name)
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self {
            name: Self::DEFAULT.to_string(),
            backend: Backend::Scalar,
            color: ColorMode::Rgb,
            autodiff: false,
            polarized: false,
        }
    }
}

impl FromStr for Variant {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
