//! Native modules exposed through scenebind.
//!
//! - **core** - base `Object` type, its shared descriptor and the plugin bus
//! - **render** - per-variant scene-graph interfaces, probes, `fresnel`,
//!   sRGB helpers and the `mueller` sub-namespace
//!
//! # Usage
//!
//! ```
//! use scenebind_core::Variant;
//! use scenebind_modules::{CoreModule, RenderModule, RenderStatics};
//! use scenebind_runtime::{HostRuntime, LifetimeConfig};
//!
//! let runtime = HostRuntime::new();
//! runtime.load_module(&CoreModule::default()).unwrap();
//! runtime
//!     .load_module(&RenderModule::new(
//!         Variant::default(),
//!         LifetimeConfig::default(),
//!         RenderStatics::new(),
//!     ))
//!     .unwrap();
//! assert!(runtime.is_loaded("render_scalar_rgb"));
//! ```

pub mod classes;
pub mod core;
pub mod render;

pub use crate::core::{CORE_MODULE, CoreModule, OBJECT_DESCRIPTOR};
pub use render::{LIFETIME_ATTRIBUTE, Plugin, RenderModule, RenderStatics};
