//! # spw-contract: Runtime Contracts & Error Strategies
//!
//! ## Contracts (`contract`)
//!
//! [`Contract`] wraps a function body with its [`spw_schema::FunctionDecl`].
//! Declaration fails fast on an incomplete declaration; each call binds
//! arguments, validates them, runs the body, and validates the result.
//!
//! ## Error Strategies (`strategy`)
//!
//! [`ErrorHandled`] wraps any [`Callable`] with an ordered
//! [`ErrorStrategyMap`] that maps error categories to recovery strategies.
//!
//! ## Composition
//!
//! Both wrappers implement [`Callable`], so they nest in either order:
//!
//! - `ErrorHandled<Contract<_>>` lets the table catch validation errors
//!   (`InputValidation` is a category like any other).
//! - `Contract<_>` whose body calls an `ErrorHandled` validates whatever
//!   the recovery produced.
//!
//! ## Configuration (`config`)
//!
//! [`ContractConfig`] and [`StrategyConfig`] deserialize from YAML with
//! `serde_yaml`.
//!
//! ## Logging
//!
//! Events go through `tracing`: `trace` on declaration, `debug` on
//! rejected calls and strategy selection, `error` for `LogAndReraise`.
//! Installing a subscriber is the application's job.

pub mod bind;
pub mod callable;
pub mod config;
pub mod contract;
pub mod strategy;

pub use bind::{bind, BoundArgs, CallArgs};
pub use callable::{callable, Callable, FnCallable};
pub use config::{ContractConfig, StrategyConfig, StrategyRule};
pub use contract::Contract;
pub use strategy::{
    ErrorHandled, ErrorStrategyMap, ErrorStrategyMapBuilder, Handler, Strategy, StrategyEntry,
};
