//! # Faults: Errors Raised by User Code
//!
//! A [`Fault`] is the value a guarded body returns when it fails for a
//! domain reason. It carries an [`ErrorKind`] so that error strategies can
//! match it by category, a message, an optional source error, and the
//! backtrace captured where it was created.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;

use thiserror::Error;

use crate::kind::ErrorKind;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error raised by a guarded body.
///
/// The backtrace is captured with [`Backtrace::force_capture`], so it is
/// populated whether or not `RUST_BACKTRACE` is set.
#[derive(Error)]
#[error("{kind}: {message}")]
pub struct Fault {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<BoxedSource>,
    backtrace: Box<Backtrace>,
}

impl Fault {
    /// Create a fault of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            backtrace: Box::new(Backtrace::force_capture()),
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Shorthand for an [`ErrorKind::Value`] fault.
    pub fn value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Value, message)
    }

    /// Shorthand for an [`ErrorKind::Type`] fault.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    /// Shorthand for an [`ErrorKind::Key`] fault.
    pub fn key(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Key, message)
    }

    /// Shorthand for an [`ErrorKind::Runtime`] fault.
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Runtime, message)
    }

    /// Shorthand for an [`ErrorKind::Validation`] fault.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// The category of this fault.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The backtrace captured at construction.
    pub fn backtrace(&self) -> &Backtrace {
        &self.backtrace
    }

    /// Whether a backtrace was actually captured.
    pub fn has_backtrace(&self) -> bool {
        self.backtrace.status() == BacktraceStatus::Captured
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl From<std::io::Error> for Fault {
    fn from(err: std::io::Error) -> Self {
        let kind = ErrorKind::from(err.kind());
        Fault::new(kind, err.to_string()).with_source(err)
    }
}
