//! # Contract Resolution
//!
//! Turns a [`FunctionDecl`] (the explicit declaration of a function's
//! parameters, return type, and description) into immutable
//! [`SpecMetadata`]. Resolution runs once, when a contract is declared, and
//! fails fast:
//!
//! 1. With `require_docstring`, a missing or whitespace-only docstring is a
//!    [`SpecwrightError::MissingDocstring`].
//! 2. Every parameter except receivers and variadics must carry a
//!    descriptor, and so must the return. All gaps are reported together in
//!    one [`SpecwrightError::MissingTypeHint`], in declaration order with
//!    `return` last.
//! 3. Parameter names are unique and kinds follow binding order (receiver,
//!    positional, `*args`, keyword-only, `**kwargs`), otherwise
//!    [`SpecwrightError::InvalidSignature`].

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use spw_core::{Keyed, Result, SpecwrightError, RETURN_PARAMETER};

use crate::descriptor::{Describe, TypeDescriptor};

/// How a parameter receives its argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// The receiver (`self`). Captured by the body, never bound from call
    /// arguments, exempt from annotation checks.
    Receiver,
    /// Positional-or-keyword.
    Positional,
    /// Keyword only.
    KeywordOnly,
    /// Collects surplus positional arguments. Exempt from annotation checks.
    VarPositional,
    /// Collects surplus keyword arguments. Exempt from annotation checks.
    VarKeyword,
}

impl ParamKind {
    /// Whether an annotation is optional for this kind.
    pub fn is_exempt(self) -> bool {
        matches!(
            self,
            ParamKind::Receiver | ParamKind::VarPositional | ParamKind::VarKeyword
        )
    }

    // Kinds that may appear at most once.
    fn is_singular(self) -> bool {
        self.is_exempt()
    }

    fn rank(self) -> u8 {
        match self {
            ParamKind::Receiver => 0,
            ParamKind::Positional => 1,
            ParamKind::VarPositional => 2,
            ParamKind::KeywordOnly => 3,
            ParamKind::VarKeyword => 4,
        }
    }

    fn label(self) -> &'static str {
        match self {
            ParamKind::Receiver => "receiver",
            ParamKind::Positional => "positional",
            ParamKind::VarPositional => "variadic positional",
            ParamKind::KeywordOnly => "keyword-only",
            ParamKind::VarKeyword => "variadic keyword",
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamDecl {
    /// Parameter name.
    pub name: String,
    /// Binding kind.
    pub kind: ParamKind,
    /// Declared type, if any.
    pub annotation: Option<TypeDescriptor>,
    /// Default value used when the argument is not supplied.
    pub default: Option<Value>,
}

/// Explicit declaration of a function, populated alongside the function.
///
/// ```
/// use spw_schema::{FunctionDecl, TypeDescriptor};
///
/// let decl = FunctionDecl::new("add")
///     .module(module_path!())
///     .doc("Add two integers.")
///     .param("x", TypeDescriptor::int())
///     .param_of::<i64>("y")
///     .returns(TypeDescriptor::int());
/// assert_eq!(decl.params().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionDecl {
    name: String,
    qualname: Option<String>,
    module: Option<String>,
    docstring: Option<String>,
    params: Vec<ParamDecl>,
    returns: Option<TypeDescriptor>,
}

impl FunctionDecl {
    /// Start a declaration for the function `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Qualified name (defaults to the simple name).
    pub fn qualname(mut self, qualname: impl Into<String>) -> Self {
        self.qualname = Some(qualname.into());
        self
    }

    /// Defining module, usually `module_path!()`.
    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Description of the function's behavior.
    pub fn doc(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    /// Append a fully described parameter.
    pub fn push(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    fn add(
        self,
        name: impl Into<String>,
        kind: ParamKind,
        annotation: Option<TypeDescriptor>,
        default: Option<Value>,
    ) -> Self {
        self.push(ParamDecl {
            name: name.into(),
            kind,
            annotation,
            default,
        })
    }

    /// Positional-or-keyword parameter.
    pub fn param(self, name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        self.add(name, ParamKind::Positional, Some(descriptor), None)
    }

    /// Positional-or-keyword parameter described by a Rust type.
    pub fn param_of<T: Describe + ?Sized>(self, name: impl Into<String>) -> Self {
        self.param(name, T::descriptor())
    }

    /// Positional-or-keyword parameter with a default value.
    pub fn param_with_default(
        self,
        name: impl Into<String>,
        descriptor: TypeDescriptor,
        default: impl Into<Value>,
    ) -> Self {
        self.add(
            name,
            ParamKind::Positional,
            Some(descriptor),
            Some(default.into()),
        )
    }

    /// Positional-or-keyword parameter without a declared type.
    pub fn untyped(self, name: impl Into<String>) -> Self {
        self.add(name, ParamKind::Positional, None, None)
    }

    /// Keyword-only parameter.
    pub fn keyword_only(self, name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        self.add(name, ParamKind::KeywordOnly, Some(descriptor), None)
    }

    /// Receiver parameter.
    pub fn receiver(self, name: impl Into<String>) -> Self {
        self.add(name, ParamKind::Receiver, None, None)
    }

    /// Variadic positional parameter; the descriptor applies per element.
    pub fn var_args(self, name: impl Into<String>, element: Option<TypeDescriptor>) -> Self {
        self.add(name, ParamKind::VarPositional, element, None)
    }

    /// Variadic keyword parameter; the descriptor applies per value.
    pub fn var_kwargs(self, name: impl Into<String>, value: Option<TypeDescriptor>) -> Self {
        self.add(name, ParamKind::VarKeyword, value, None)
    }

    /// Declared return type.
    pub fn returns(mut self, descriptor: TypeDescriptor) -> Self {
        self.returns = Some(descriptor);
        self
    }

    /// Declared return type described by a Rust type.
    pub fn returns_of<T: Describe + ?Sized>(self) -> Self {
        self.returns(T::descriptor())
    }

    /// Simple name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified name, falling back to the simple name.
    pub fn resolved_qualname(&self) -> &str {
        self.qualname.as_deref().unwrap_or(&self.name)
    }

    /// Declared parameters, in order.
    pub fn params(&self) -> &[ParamDecl] {
        &self.params
    }
}

/// Immutable metadata of a declared contract, read by documentation and
/// coverage tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecMetadata {
    /// Simple name.
    pub name: String,
    /// Qualified name.
    pub qualname: String,
    /// Defining module.
    pub module: Option<String>,
    /// Description; empty when none was given and none was required.
    pub docstring: String,
    /// Annotated parameters, in declaration order.
    pub parameters: Vec<(String, TypeDescriptor)>,
    /// Declared return type.
    pub return_type: TypeDescriptor,
}

impl SpecMetadata {
    /// Descriptor of the named parameter.
    pub fn parameter(&self, name: &str) -> Option<&TypeDescriptor> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }
}

impl Keyed for SpecMetadata {
    fn registry_key(&self) -> &str {
        &self.qualname
    }
}

/// A resolved declaration: the published metadata plus the parameter list
/// needed to bind call arguments.
#[derive(Debug, Clone)]
pub struct ResolvedContract {
    /// Published metadata.
    pub metadata: Arc<SpecMetadata>,
    /// Parameter list, receivers and variadics included.
    pub signature: Vec<ParamDecl>,
}

/// Check that a description is present and not blank.
pub fn check_docstring(decl: &FunctionDecl) -> Result<()> {
    match decl.docstring.as_deref() {
        Some(doc) if !doc.trim().is_empty() => Ok(()),
        _ => Err(SpecwrightError::MissingDocstring {
            qualname: decl.resolved_qualname().to_string(),
        }),
    }
}

/// Check that every non-exempt parameter and the return are annotated.
pub fn check_annotations(decl: &FunctionDecl) -> Result<()> {
    let mut missing: Vec<String> = decl
        .params
        .iter()
        .filter(|p| !p.kind.is_exempt() && p.annotation.is_none())
        .map(|p| p.name.clone())
        .collect();
    if decl.returns.is_none() {
        missing.push(RETURN_PARAMETER.to_string());
    }
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SpecwrightError::MissingTypeHint {
            qualname: decl.resolved_qualname().to_string(),
            missing,
        })
    }
}

/// Check that parameter names are unique, that kinds appear in binding
/// order, and that no required positional parameter follows one with a
/// default.
pub fn check_signature(decl: &FunctionDecl) -> Result<()> {
    let invalid = |reason: String| SpecwrightError::InvalidSignature {
        qualname: decl.resolved_qualname().to_string(),
        reason,
    };

    let mut seen = HashSet::new();
    if let Some(dup) = decl.params.iter().find(|p| !seen.insert(p.name.as_str())) {
        return Err(invalid(format!("duplicate parameter '{}'", dup.name)));
    }

    for pair in decl.params.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let misplaced = next.kind.rank() < prev.kind.rank()
            || (next.kind == prev.kind && next.kind.is_singular());
        if misplaced {
            return Err(invalid(format!(
                "{} parameter '{}' cannot follow {} parameter '{}'",
                next.kind.label(),
                next.name,
                prev.kind.label(),
                prev.name
            )));
        }
    }
    let mut defaulted: Option<&str> = None;
    for param in decl.params.iter().filter(|p| p.kind == ParamKind::Positional) {
        match (&param.default, defaulted) {
            (Some(_), None) => defaulted = Some(param.name.as_str()),
            (None, Some(first)) => {
                return Err(invalid(format!(
                    "non-default parameter '{}' follows default parameter '{first}'",
                    param.name
                )));
            }
            _ => {}
        }
    }
    Ok(())
}

/// Resolve a declaration into metadata.
///
/// # Errors
///
/// [`SpecwrightError::MissingDocstring`] (only when `require_docstring`),
/// [`SpecwrightError::MissingTypeHint`], or
/// [`SpecwrightError::InvalidSignature`].
pub fn resolve(decl: FunctionDecl, require_docstring: bool) -> Result<ResolvedContract> {
    if require_docstring {
        check_docstring(&decl)?;
    }
    check_annotations(&decl)?;
    check_signature(&decl)?;

    let qualname = decl.resolved_qualname().to_string();
    let parameters = decl
        .params
        .iter()
        .filter_map(|p| p.annotation.clone().map(|d| (p.name.clone(), d)))
        .collect();
    let metadata = SpecMetadata {
        name: decl.name,
        qualname,
        module: decl.module,
        docstring: decl.docstring.unwrap_or_default(),
        parameters,
        // check_annotations guarantees a return descriptor.
        return_type: decl.returns.unwrap_or_else(TypeDescriptor::any),
    };
    Ok(ResolvedContract {
        metadata: Arc::new(metadata),
        signature: decl.params,
    })
}
