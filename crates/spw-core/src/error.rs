//! # Error Types: Structured Error Hierarchy
//!
//! Every failure surfaced by specwright is a [`SpecwrightError`]. Variants
//! fall into three tiers:
//!
//! - **Declaration** errors abort a declaration (contract, strategy table,
//!   state machine, registry entry). Nothing is registered or constructed.
//! - **Call** errors reject a single guarded call and propagate to its
//!   immediate caller.
//! - **Raised** errors are [`Fault`]s produced by user code. They pass
//!   through every guard untouched.
//!
//! Validation messages enumerate every violation found in the call, not
//! only the first.

use std::backtrace::Backtrace;

use thiserror::Error;

use crate::fault::Fault;
use crate::kind::ErrorKind;
use crate::violation::Violations;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, SpecwrightError>;

/// Top-level error type for specwright.
#[derive(Error, Debug)]
pub enum SpecwrightError {
    /// A contract requires a description and none (or only whitespace) was given.
    #[error(
        "Function '{qualname}' is missing a docstring. All contract-wrapped functions \
         must have a docstring describing their behavior."
    )]
    MissingDocstring {
        /// Qualified name of the function.
        qualname: String,
    },

    /// Parameters or the return type were declared without a type descriptor.
    #[error(
        "Function '{qualname}' is missing type hints for: {}. All contract-wrapped \
         functions must have complete type annotations.",
        .missing.join(", ")
    )]
    MissingTypeHint {
        /// Qualified name of the function.
        qualname: String,
        /// Every unannotated parameter in declaration order, `return` last.
        missing: Vec<String>,
    },

    /// A parameter list repeats a name or orders parameter kinds in a way
    /// binding cannot honor.
    #[error("Function '{qualname}' has an invalid signature: {reason}")]
    InvalidSignature {
        /// Qualified name of the function.
        qualname: String,
        /// What is wrong with the parameter list.
        reason: String,
    },

    /// An error strategy table is malformed.
    #[error("invalid error handling strategy: {reason}")]
    HandlingStrategy {
        /// What is wrong with the table.
        reason: String,
    },

    /// A state machine declaration is inconsistent.
    #[error("invalid state machine '{machine}': {reason}")]
    InvalidState {
        /// Name of the machine being declared.
        machine: String,
        /// What is wrong with the declaration.
        reason: String,
    },

    /// A write-once registry already holds an entry under this key.
    #[error("{registry} registry already contains an entry for '{key}'")]
    AlreadyRegistered {
        /// Which registry rejected the entry.
        registry: String,
        /// The duplicate key.
        key: String,
    },

    /// Call arguments violate the declared parameter types.
    #[error("Input validation failed for '{qualname}':\n{violations}")]
    InputValidation {
        /// Qualified name of the function.
        qualname: String,
        /// Every violation found across all parameters.
        violations: Violations,
    },

    /// Call arguments could not be bound to the declared parameters.
    #[error("Argument binding failed for '{qualname}': {reason}")]
    ArgumentBinding {
        /// Qualified name of the function.
        qualname: String,
        /// Why binding failed.
        reason: String,
    },

    /// The return value violates the declared return type.
    #[error("Output validation failed for '{qualname}':\n{violations}")]
    OutputValidation {
        /// Qualified name of the function.
        qualname: String,
        /// Every violation found in the return value.
        violations: Violations,
    },

    /// A transition was invoked from a state it does not accept.
    #[error(
        "Cannot transition from '{current}' to '{to_state}' via '{transition}'. \
         Valid source state(s): {}",
        .valid_from.join(", ")
    )]
    InvalidTransition {
        /// Name of the machine.
        machine: String,
        /// State the instance was in.
        current: String,
        /// Transition that was attempted.
        transition: String,
        /// Target state of the transition.
        to_state: String,
        /// Accepted source states, sorted.
        valid_from: Vec<String>,
    },

    /// A transition name that the machine never declared.
    #[error("state machine '{machine}' declares no transition named '{transition}'")]
    UndeclaredTransition {
        /// Name of the machine.
        machine: String,
        /// The unknown transition name.
        transition: String,
    },

    /// An error raised by user code.
    #[error(transparent)]
    Raised(#[from] Fault),
}

/// When in the lifecycle an error is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTier {
    /// Produced while declaring a contract, table, machine, or registry entry.
    Declaration,
    /// Produced while guarding a single call.
    Call,
    /// Produced by user code.
    Raised,
}

impl SpecwrightError {
    /// The category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingDocstring { .. } => ErrorKind::MissingDocstring,
            Self::MissingTypeHint { .. } => ErrorKind::MissingTypeHint,
            Self::InvalidSignature { .. } => ErrorKind::InvalidSignature,
            Self::HandlingStrategy { .. } => ErrorKind::HandlingStrategy,
            Self::InvalidState { .. } => ErrorKind::InvalidState,
            Self::AlreadyRegistered { .. } => ErrorKind::Registry,
            Self::InputValidation { .. } | Self::ArgumentBinding { .. } => {
                ErrorKind::InputValidation
            }
            Self::OutputValidation { .. } => ErrorKind::OutputValidation,
            Self::InvalidTransition { .. } | Self::UndeclaredTransition { .. } => {
                ErrorKind::InvalidTransition
            }
            Self::Raised(fault) => fault.kind(),
        }
    }

    /// Whether this error belongs to `category`.
    pub fn is_a(&self, category: ErrorKind) -> bool {
        self.kind().is_a(category)
    }

    /// The lifecycle tier of this error.
    pub fn tier(&self) -> ErrorTier {
        match self {
            Self::MissingDocstring { .. }
            | Self::MissingTypeHint { .. }
            | Self::InvalidSignature { .. }
            | Self::HandlingStrategy { .. }
            | Self::InvalidState { .. }
            | Self::AlreadyRegistered { .. } => ErrorTier::Declaration,
            Self::InputValidation { .. }
            | Self::ArgumentBinding { .. }
            | Self::OutputValidation { .. }
            | Self::InvalidTransition { .. }
            | Self::UndeclaredTransition { .. } => ErrorTier::Call,
            Self::Raised(_) => ErrorTier::Raised,
        }
    }

    /// The raised fault, if this error came from user code.
    pub fn as_fault(&self) -> Option<&Fault> {
        match self {
            Self::Raised(fault) => Some(fault),
            _ => None,
        }
    }

    /// Violations carried by input/output validation errors.
    pub fn violations(&self) -> Option<&Violations> {
        match self {
            Self::InputValidation { violations, .. }
            | Self::OutputValidation { violations, .. } => Some(violations),
            _ => None,
        }
    }

    /// The cause chain followed by the backtrace captured where the fault
    /// was raised. `None` for errors that did not come from user code.
    pub fn trace(&self) -> Option<String> {
        self.as_fault()
            .filter(|f| f.has_backtrace())
            .map(|f| self.render_trace(f.backtrace()))
    }

    /// Render the cause chain, one `caused by:` line per source, followed by
    /// `backtrace`.
    pub fn render_trace(&self, backtrace: &Backtrace) -> String {
        let mut out = String::new();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            out.push_str("caused by: ");
            out.push_str(&err.to_string());
            out.push('\n');
            cause = err.source();
        }
        out.push_str(&backtrace.to_string());
        out
    }
}

impl From<std::io::Error> for SpecwrightError {
    fn from(err: std::io::Error) -> Self {
        Self::Raised(Fault::from(err))
    }
}
