//! # spw-state: Declared State Machines
//!
//! ## Topology (`spec`)
//!
//! [`MachineSpec::builder`] declares the states, initial state, and
//! transition table of a machine type and validates them once. An invalid
//! topology is a [`spw_core::SpecwrightError::InvalidState`] and no
//! instance can be built from it.
//!
//! ## Instances (`machine`)
//!
//! [`Machine`] holds the current state and optional history of one
//! instance. [`StateMachine`] supplies `transition(name, body)`, which
//! guards the source state, runs the body, commits, and fires the
//! `on_exit`/`on_enter` hooks. A failing body leaves the state untouched.
//!
//! ## Crate Policy
//!
//! - No interior locking. Callers confine an instance to one thread or
//!   wrap it in a lock.
//! - Commits and rejected guards are logged at `debug` through `tracing`.

pub mod machine;
pub mod spec;

pub use machine::{Machine, StateMachine};
pub use spec::{MachineSpec, MachineSpecBuilder, TransitionMeta};
