//! # spw-schema: Type Descriptors, Validation & Resolution
//!
//! ## Descriptors (`descriptor`)
//!
//! [`TypeDescriptor`] is the immutable tree describing a declared type.
//! [`Describe`] derives descriptors from Rust types so declarations can
//! name `Vec<Option<i64>>` instead of spelling out the tree.
//!
//! ## Validation (`validate`)
//!
//! [`validate`] matches a runtime `serde_json::Value` against a descriptor
//! under strict numeric rules (integers reject booleans, floats accept
//! integers) and reports every violation.
//!
//! ## Resolution (`resolve`)
//!
//! [`resolve`] turns a [`FunctionDecl`] into [`SpecMetadata`], failing fast
//! on a missing docstring or on unannotated parameters.
//!
//! ## Crate Policy
//!
//! - Depends only on `spw-core` internally.
//! - Validation is pure: no I/O, no logging, no panics.

pub mod descriptor;
pub mod resolve;
pub mod validate;

pub use descriptor::{Describe, DescriptorKind, FieldDescriptor, ScalarType, TypeDescriptor};
pub use resolve::{
    check_annotations, check_docstring, check_signature, resolve, FunctionDecl, ParamDecl,
    ParamKind, ResolvedContract, SpecMetadata,
};
pub use validate::{conforms, validate, validate_all, validate_parameter, value_kind};
