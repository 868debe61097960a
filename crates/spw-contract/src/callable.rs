//! # Callable Seam
//!
//! [`Callable`] is the shape shared by everything that can wrap or be
//! wrapped: a [`crate::Contract`], an [`crate::ErrorHandled`] dispatcher,
//! and plain closures adapted with [`callable`]. Wrappers compose in either
//! order because each one both accepts and implements the trait.

use serde_json::Value;
use spw_core::Result;

use crate::bind::CallArgs;

/// A named operation invoked with dynamic arguments.
pub trait Callable: Send + Sync {
    /// Qualified name used in error messages and log events.
    fn qualname(&self) -> &str;

    /// Invoke the operation.
    fn call(&self, args: CallArgs) -> Result<Value>;
}

impl<C: Callable + ?Sized> Callable for Box<C> {
    fn qualname(&self) -> &str {
        (**self).qualname()
    }

    fn call(&self, args: CallArgs) -> Result<Value> {
        (**self).call(args)
    }
}

impl<C: Callable + ?Sized> Callable for std::sync::Arc<C> {
    fn qualname(&self) -> &str {
        (**self).qualname()
    }

    fn call(&self, args: CallArgs) -> Result<Value> {
        (**self).call(args)
    }
}

/// A closure with a name, checked by nothing.
pub struct FnCallable<F> {
    qualname: String,
    body: F,
}

impl<F> std::fmt::Debug for FnCallable<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCallable")
            .field("qualname", &self.qualname)
            .finish_non_exhaustive()
    }
}

impl<F> Callable for FnCallable<F>
where
    F: Fn(CallArgs) -> Result<Value> + Send + Sync,
{
    fn qualname(&self) -> &str {
        &self.qualname
    }

    fn call(&self, args: CallArgs) -> Result<Value> {
        (self.body)(args)
    }
}

/// Adapt a closure into a [`Callable`].
pub fn callable<F>(qualname: impl Into<String>, body: F) -> FnCallable<F>
where
    F: Fn(CallArgs) -> Result<Value> + Send + Sync,
{
    FnCallable {
        qualname: qualname.into(),
        body,
    }
}
