//! # Contract Wrapper
//!
//! A [`Contract`] pairs a function body with its resolved declaration and
//! enforces that declaration on every call:
//!
//! 1. Bind the call arguments to the declared parameters.
//! 2. With `validate_inputs`, validate every bound argument that carries a
//!    descriptor, defaults included, and report all violations together.
//! 3. Run the body exactly once.
//! 4. With `validate_output`, validate the return value.
//!
//! Errors from the body pass through unchanged. A failed input check means
//! the body never runs; a failed output check means the caller never sees
//! the value.
//!
//! ## Variadics
//!
//! A variadic positional descriptor applies to each collected element and
//! a variadic keyword descriptor applies to each collected value, so
//! violations point at `args[1]` or `kwargs["name"]`.

use std::sync::Arc;

use serde_json::Value;
use spw_core::{Fault, Result, SpecwrightError, Violations, RETURN_PARAMETER};
use spw_schema::{
    resolve, validate_parameter, FunctionDecl, ParamDecl, ParamKind, SpecMetadata, TypeDescriptor,
};

use crate::bind::{bind, BoundArgs, CallArgs};
use crate::callable::Callable;
use crate::config::ContractConfig;

/// A function body guarded by its declared types.
///
/// ```
/// use serde_json::json;
/// use spw_contract::{CallArgs, Callable, Contract};
/// use spw_schema::{FunctionDecl, TypeDescriptor};
///
/// let add = Contract::new(
///     FunctionDecl::new("add")
///         .doc("Add two integers.")
///         .param("x", TypeDescriptor::int())
///         .param("y", TypeDescriptor::int())
///         .returns(TypeDescriptor::int()),
///     |args| Ok(json!(args.get_as::<i64>("x")? + args.get_as::<i64>("y")?)),
/// )
/// .unwrap();
/// assert_eq!(add.call(CallArgs::positional([2, 3])).unwrap(), json!(5));
/// assert!(add.call(CallArgs::positional([json!("2"), json!(3)])).is_err());
/// ```
pub struct Contract<F> {
    metadata: Arc<SpecMetadata>,
    config: ContractConfig,
    signature: Vec<ParamDecl>,
    body: F,
}

impl<F> std::fmt::Debug for Contract<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("qualname", &self.metadata.qualname)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<F> Contract<F>
where
    F: Fn(&BoundArgs) -> Result<Value> + Send + Sync,
{
    /// Bare form: every check enabled.
    ///
    /// # Errors
    ///
    /// [`SpecwrightError::MissingDocstring`] or
    /// [`SpecwrightError::MissingTypeHint`] when the declaration is
    /// incomplete.
    pub fn new(decl: FunctionDecl, body: F) -> Result<Self> {
        Self::with_config(decl, ContractConfig::default(), body)
    }

    /// Explicit form. `require_docstring = false` skips only the docstring
    /// check; type annotations are always required.
    pub fn with_config(decl: FunctionDecl, config: ContractConfig, body: F) -> Result<Self> {
        let resolved = resolve(decl, config.require_docstring)?;
        tracing::trace!(
            function = %resolved.metadata.qualname,
            parameters = resolved.metadata.parameters.len(),
            "contract declared"
        );
        Ok(Self {
            metadata: resolved.metadata,
            config,
            signature: resolved.signature,
            body,
        })
    }

    /// Published metadata.
    pub fn metadata(&self) -> &Arc<SpecMetadata> {
        &self.metadata
    }

    /// Runtime switches.
    pub fn config(&self) -> ContractConfig {
        self.config
    }

    fn bind_args(&self, args: CallArgs) -> Result<BoundArgs> {
        bind(&self.signature, args).map_err(|reason| {
            tracing::debug!(function = %self.metadata.qualname, %reason, "argument binding failed");
            if self.config.validate_inputs {
                SpecwrightError::ArgumentBinding {
                    qualname: self.metadata.qualname.clone(),
                    reason,
                }
            } else {
                Fault::type_error(format!("{}() {reason}", self.metadata.name)).into()
            }
        })
    }

    fn check_inputs(&self, bound: &BoundArgs) -> Result<()> {
        let mut violations = Violations::default();
        for param in &self.signature {
            let (Some(descriptor), Some(value)) = (&param.annotation, bound.get(&param.name))
            else {
                continue;
            };
            let found = match param.kind {
                ParamKind::VarPositional => validate_parameter(
                    &param.name,
                    value,
                    &TypeDescriptor::list(descriptor.clone()),
                ),
                ParamKind::VarKeyword => validate_parameter(
                    &param.name,
                    value,
                    &TypeDescriptor::mapping(TypeDescriptor::str(), descriptor.clone()),
                ),
                _ => validate_parameter(&param.name, value, descriptor),
            };
            violations.extend(found);
        }
        if violations.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            function = %self.metadata.qualname,
            count = violations.len(),
            "input validation failed"
        );
        Err(SpecwrightError::InputValidation {
            qualname: self.metadata.qualname.clone(),
            violations,
        })
    }

    fn check_output(&self, value: &Value) -> Result<()> {
        let violations: Violations =
            validate_parameter(RETURN_PARAMETER, value, &self.metadata.return_type).into();
        if violations.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            function = %self.metadata.qualname,
            count = violations.len(),
            "output validation failed"
        );
        Err(SpecwrightError::OutputValidation {
            qualname: self.metadata.qualname.clone(),
            violations,
        })
    }
}

impl<F> Callable for Contract<F>
where
    F: Fn(&BoundArgs) -> Result<Value> + Send + Sync,
{
    fn qualname(&self) -> &str {
        &self.metadata.qualname
    }

    fn call(&self, args: CallArgs) -> Result<Value> {
        let bound = self.bind_args(args)?;
        if self.config.validate_inputs {
            self.check_inputs(&bound)?;
        }
        let value = (self.body)(&bound)?;
        if self.config.validate_output {
            self.check_output(&value)?;
        }
        Ok(value)
    }
}
