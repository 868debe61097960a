//! # Error Kinds: Static Category Table
//!
//! Every error that crosses a guarded call carries an [`ErrorKind`]. Kinds
//! form a fixed tree: each kind has at most one parent, and a kind belongs
//! to a category when the category is the kind itself or one of its
//! ancestors. The error strategy dispatcher matches on category membership,
//! so a strategy registered for [`ErrorKind::Os`] also applies to
//! [`ErrorKind::FileNotFound`].
//!
//! ```text
//! Exception
//! ├─ Specwright
//! │  ├─ Spec ─ InputValidation, OutputValidation, MissingDocstring, MissingTypeHint,
//! │  │         InvalidSignature
//! │  └─ HandlingStrategy, Validation, InvalidTransition, InvalidState, Registry
//! ├─ Value, Type, Assertion
//! ├─ Lookup ─ Key, Index
//! ├─ Arithmetic ─ ZeroDivision, Overflow
//! ├─ Runtime ─ NotImplemented, Recursion
//! └─ Os ─ FileNotFound, FileExists, PermissionDenied, Connection, Timeout, Interrupted
//! ```
//!
//! The table is closed. Adding a kind means adding a variant, a parent
//! entry, and a name, and the exhaustive matches below force all three.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A node in the error category tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Root of every category.
    Exception,

    /// Root of every error produced by this library.
    Specwright,
    /// Contract (specification) violations.
    Spec,
    /// Call arguments do not satisfy the declared parameter types.
    InputValidation,
    /// A return value does not satisfy the declared return type.
    OutputValidation,
    /// A contract was declared without a description.
    MissingDocstring,
    /// A contract was declared with unannotated parameters or return.
    MissingTypeHint,
    /// A contract was declared with a malformed parameter list.
    InvalidSignature,
    /// An error strategy table is malformed.
    HandlingStrategy,
    /// General-purpose domain validation failure raised by user code.
    Validation,
    /// A transition was attempted from a state it does not accept.
    InvalidTransition,
    /// A state machine declaration references unknown states.
    InvalidState,
    /// A write-once registry rejected a duplicate entry.
    Registry,

    /// A value has the right type but an unacceptable content.
    Value,
    /// A value has the wrong type.
    Type,
    /// An internal assertion failed.
    Assertion,
    /// A lookup by key or index failed.
    Lookup,
    /// A mapping key was absent.
    Key,
    /// A sequence index was out of range.
    Index,
    /// Arithmetic failure.
    Arithmetic,
    /// Division or modulo by zero.
    ZeroDivision,
    /// Numeric overflow.
    Overflow,
    /// Generic runtime failure.
    Runtime,
    /// An operation has no implementation.
    NotImplemented,
    /// Recursion depth exceeded.
    Recursion,
    /// Operating-system level failure.
    Os,
    /// A file or directory does not exist.
    FileNotFound,
    /// A file or directory already exists.
    FileExists,
    /// Insufficient permissions.
    PermissionDenied,
    /// Connection refused, reset, or aborted.
    Connection,
    /// An operation timed out.
    Timeout,
    /// An operation was interrupted.
    Interrupted,
}

/// Every kind, in table order.
pub const ALL_ERROR_KINDS: [ErrorKind; 32] = [
    ErrorKind::Exception,
    ErrorKind::Specwright,
    ErrorKind::Spec,
    ErrorKind::InputValidation,
    ErrorKind::OutputValidation,
    ErrorKind::MissingDocstring,
    ErrorKind::MissingTypeHint,
    ErrorKind::InvalidSignature,
    ErrorKind::HandlingStrategy,
    ErrorKind::Validation,
    ErrorKind::InvalidTransition,
    ErrorKind::InvalidState,
    ErrorKind::Registry,
    ErrorKind::Value,
    ErrorKind::Type,
    ErrorKind::Assertion,
    ErrorKind::Lookup,
    ErrorKind::Key,
    ErrorKind::Index,
    ErrorKind::Arithmetic,
    ErrorKind::ZeroDivision,
    ErrorKind::Overflow,
    ErrorKind::Runtime,
    ErrorKind::NotImplemented,
    ErrorKind::Recursion,
    ErrorKind::Os,
    ErrorKind::FileNotFound,
    ErrorKind::FileExists,
    ErrorKind::PermissionDenied,
    ErrorKind::Connection,
    ErrorKind::Timeout,
    ErrorKind::Interrupted,
];

impl ErrorKind {
    /// The immediate parent category, or `None` for [`ErrorKind::Exception`].
    pub fn parent(self) -> Option<ErrorKind> {
        use ErrorKind::*;
        let parent = match self {
            Exception => return None,
            Specwright | Value | Type | Assertion | Lookup | Arithmetic | Runtime | Os => {
                Exception
            }
            Spec | HandlingStrategy | Validation | InvalidTransition | InvalidState
            | Registry => Specwright,
            InputValidation | OutputValidation | MissingDocstring | MissingTypeHint
            | InvalidSignature => Spec,
            Key | Index => Lookup,
            ZeroDivision | Overflow => Arithmetic,
            NotImplemented | Recursion => Runtime,
            FileNotFound | FileExists | PermissionDenied | Connection | Timeout
            | Interrupted => Os,
        };
        Some(parent)
    }

    /// Iterate from this kind up to the root, self first.
    pub fn lineage(self) -> impl Iterator<Item = ErrorKind> {
        std::iter::successors(Some(self), |k| k.parent())
    }

    /// Whether this kind belongs to `category` (itself or any ancestor).
    pub fn is_a(self, category: ErrorKind) -> bool {
        self.lineage().any(|k| k == category)
    }

    /// Stable snake_case name, used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        use ErrorKind::*;
        match self {
            Exception => "exception",
            Specwright => "specwright",
            Spec => "spec",
            InputValidation => "input_validation",
            OutputValidation => "output_validation",
            MissingDocstring => "missing_docstring",
            MissingTypeHint => "missing_type_hint",
            InvalidSignature => "invalid_signature",
            HandlingStrategy => "handling_strategy",
            Validation => "validation",
            InvalidTransition => "invalid_transition",
            InvalidState => "invalid_state",
            Registry => "registry",
            Value => "value",
            Type => "type",
            Assertion => "assertion",
            Lookup => "lookup",
            Key => "key",
            Index => "index",
            Arithmetic => "arithmetic",
            ZeroDivision => "zero_division",
            Overflow => "overflow",
            Runtime => "runtime",
            NotImplemented => "not_implemented",
            Recursion => "recursion",
            Os => "os",
            FileNotFound => "file_not_found",
            FileExists => "file_exists",
            PermissionDenied => "permission_denied",
            Connection => "connection",
            Timeout => "timeout",
            Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name that does not denote any [`ErrorKind`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown error kind '{0}'")]
pub struct UnknownErrorKind(pub String);

impl FromStr for ErrorKind {
    type Err = UnknownErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_ERROR_KINDS
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownErrorKind(s.to_string()))
    }
}

impl From<std::io::ErrorKind> for ErrorKind {
    fn from(kind: std::io::ErrorKind) -> Self {
        use std::io::ErrorKind as Io;
        match kind {
            Io::NotFound => ErrorKind::FileNotFound,
            Io::AlreadyExists => ErrorKind::FileExists,
            Io::PermissionDenied => ErrorKind::PermissionDenied,
            Io::ConnectionRefused
            | Io::ConnectionReset
            | Io::ConnectionAborted
            | Io::NotConnected
            | Io::BrokenPipe => ErrorKind::Connection,
            Io::TimedOut => ErrorKind::Timeout,
            Io::Interrupted => ErrorKind::Interrupted,
            _ => ErrorKind::Os,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_reaches_root() {
        for kind in ALL_ERROR_KINDS {
            assert_eq!(kind.lineage().last(), Some(ErrorKind::Exception), "{kind}");
        }
    }

    #[test]
    fn test_kind_is_a_itself() {
        for kind in ALL_ERROR_KINDS {
            assert!(kind.is_a(kind));
        }
    }

    #[test]
    fn test_subkind_is_a_parent() {
        assert!(ErrorKind::FileNotFound.is_a(ErrorKind::Os));
        assert!(ErrorKind::FileNotFound.is_a(ErrorKind::Exception));
        assert!(ErrorKind::InputValidation.is_a(ErrorKind::Spec));
        assert!(ErrorKind::InputValidation.is_a(ErrorKind::Specwright));
        assert!(ErrorKind::Key.is_a(ErrorKind::Lookup));
    }

    #[test]
    fn test_parent_is_not_a_subkind() {
        assert!(!ErrorKind::Os.is_a(ErrorKind::FileNotFound));
        assert!(!ErrorKind::Lookup.is_a(ErrorKind::Key));
        assert!(!ErrorKind::Value.is_a(ErrorKind::Type));
    }

    #[test]
    fn test_names_are_unique_and_parse_back() {
        let mut names: Vec<&str> = ALL_ERROR_KINDS.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL_ERROR_KINDS.len());

        for kind in ALL_ERROR_KINDS {
            assert_eq!(kind.as_str().parse::<ErrorKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = "ValueError".parse::<ErrorKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown error kind 'ValueError'");
    }

    #[test]
    fn test_io_kind_mapping() {
        assert_eq!(
            ErrorKind::from(std::io::ErrorKind::NotFound),
            ErrorKind::FileNotFound
        );
        assert_eq!(
            ErrorKind::from(std::io::ErrorKind::ConnectionReset),
            ErrorKind::Connection
        );
        assert_eq!(ErrorKind::from(std::io::ErrorKind::Other), ErrorKind::Os);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ErrorKind::FileNotFound).unwrap();
        assert_eq!(json, "\"file_not_found\"");
    }
}
