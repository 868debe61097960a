//! # spw-core: Foundational Types for specwright
//!
//! The leaf of the workspace. Every other `spw-*` crate depends on it; it
//! depends on nothing internal.
//!
//! - [`error`]: the single root error type, [`SpecwrightError`], with its
//!   declaration / call / raised tiers.
//! - [`kind`]: the closed [`ErrorKind`] category tree used for
//!   subclass-aware error matching.
//! - [`fault`]: [`Fault`], the error value user code raises through guarded
//!   calls.
//! - [`violation`]: [`Violation`] and [`Violations`], the structured output
//!   of value validation.
//! - [`registry`]: the write-once [`Registry`] that holds declaration
//!   metadata for external tooling.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code.
//! - No `.unwrap()` or `.expect()` outside tests.
//! - Libraries emit `tracing` events and never install a subscriber.

pub mod error;
pub mod fault;
pub mod kind;
pub mod registry;
pub mod violation;

pub use error::{ErrorTier, Result, SpecwrightError};
pub use fault::Fault;
pub use kind::{ErrorKind, UnknownErrorKind, ALL_ERROR_KINDS};
pub use registry::{Keyed, Registry};
pub use violation::{Violation, Violations, RETURN_PARAMETER};
