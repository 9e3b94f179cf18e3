//! Core types for scenebind.
//!
//! This crate holds what every other crate agrees on:
//!
//! - **Identity**: [`InterfaceId`] and [`QualifiedName`]
//! - **Native object model**: [`Class`], [`Object`] and [`ObjectRef`] handles
//! - **Interfaces**: [`InterfaceDescriptor`] and [`InterfaceFlags`]
//! - **Variants**: [`Variant`] names for per-variant render modules
//! - **Base-type lifetime**: [`SharedTypeDescriptor`] and [`BaseTypeLease`]
//! - **Errors**: [`RegistrationError`] and [`DispatchError`]

mod descriptor;
mod error;
mod interface;
mod interface_id;
mod object;
mod qualified_name;
mod variant;

pub use descriptor::{BaseTypeLease, SharedTypeDescriptor};
pub use error::{DispatchError, RegistrationError};
pub use interface::{InterfaceDescriptor, InterfaceFlags};
pub use interface_id::{InterfaceId, hash_constants};
pub use object::{Ancestors, Class, Object, ObjectRef};
pub use qualified_name::QualifiedName;
pub use variant::{Backend, ColorMode, Variant};
