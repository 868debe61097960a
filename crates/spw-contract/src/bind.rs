//! # Argument Binding
//!
//! Maps the arguments of one call ([`CallArgs`]) onto a declared parameter
//! list, producing [`BoundArgs`] in declaration order.
//!
//! Positional arguments fill positional parameters in order, with any
//! surplus collected by a variadic positional parameter. Keywords bind by
//! name, with unknown names collected by a variadic keyword parameter.
//! Unbound parameters take their defaults. Receivers are never bound: the
//! body captures its receiver itself.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use spw_core::{Fault, Result};
use spw_schema::{ParamDecl, ParamKind};

/// Arguments of one call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    /// Positional arguments, in order.
    pub positional: Vec<Value>,
    /// Keyword arguments, in order.
    pub keyword: Vec<(String, Value)>,
}

impl CallArgs {
    /// No arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only positional arguments.
    pub fn positional<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keyword: Vec::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Append a keyword argument.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.keyword.push((name.into(), value.into()));
        self
    }
}

/// Arguments bound to parameter names, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    entries: Vec<(String, Value)>,
}

impl BoundArgs {
    /// The value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Deserialize the value bound to `name`.
    ///
    /// # Errors
    ///
    /// A [`spw_core::ErrorKind::Type`] fault when the parameter is unbound
    /// or its value does not deserialize into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| Fault::type_error(format!("no argument bound to '{name}'")))?;
        serde_json::from_value(value.clone()).map_err(|e| {
            Fault::type_error(format!("argument '{name}' cannot be read: {e}"))
                .with_source(e)
                .into()
        })
    }

    /// Iterate `(name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of bound parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Bind `args` to `signature`. The error is a human-readable reason.
pub fn bind(signature: &[ParamDecl], args: CallArgs) -> std::result::Result<BoundArgs, String> {
    let mut slots: Vec<Option<Value>> = vec![None; signature.len()];
    let mut positional = args.positional.into_iter();

    let var_positional = signature
        .iter()
        .position(|p| p.kind == ParamKind::VarPositional);
    let var_keyword = signature
        .iter()
        .position(|p| p.kind == ParamKind::VarKeyword);

    for (i, param) in signature.iter().enumerate() {
        if param.kind != ParamKind::Positional {
            continue;
        }
        match positional.next() {
            Some(value) => slots[i] = Some(value),
            None => break,
        }
    }

    let surplus: Vec<Value> = positional.collect();
    match var_positional {
        Some(i) => slots[i] = Some(Value::Array(surplus)),
        None if !surplus.is_empty() => {
            let accepted = signature
                .iter()
                .filter(|p| p.kind == ParamKind::Positional)
                .count();
            return Err(format!(
                "too many positional arguments: expected at most {accepted}, got {}",
                accepted + surplus.len()
            ));
        }
        None => {}
    }

    let mut extra_keywords = Map::new();
    for (name, value) in args.keyword {
        let target = signature.iter().position(|p| {
            p.name == name && matches!(p.kind, ParamKind::Positional | ParamKind::KeywordOnly)
        });
        match target {
            Some(i) if slots[i].is_some() => {
                return Err(format!("multiple values for argument '{name}'"));
            }
            Some(i) => slots[i] = Some(value),
            None if var_keyword.is_some() => {
                if extra_keywords.insert(name.clone(), value).is_some() {
                    return Err(format!("multiple values for argument '{name}'"));
                }
            }
            None => return Err(format!("got an unexpected keyword argument '{name}'")),
        }
    }
    if let Some(i) = var_keyword {
        slots[i] = Some(Value::Object(extra_keywords));
    }

    let mut entries = Vec::with_capacity(signature.len());
    for (param, slot) in signature.iter().zip(slots) {
        if param.kind == ParamKind::Receiver {
            continue;
        }
        let value = match slot.or_else(|| param.default.clone()) {
            Some(value) => value,
            None => return Err(format!("missing a required argument: '{}'", param.name)),
        };
        entries.push((param.name.clone(), value));
    }
    Ok(BoundArgs { entries })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use spw_schema::{FunctionDecl, TypeDescriptor};

    fn signature(decl: FunctionDecl) -> Vec<ParamDecl> {
        decl.params().to_vec()
    }

    fn xy() -> Vec<ParamDecl> {
        signature(
            FunctionDecl::new("f")
                .param("x", TypeDescriptor::int())
                .param_with_default("y", TypeDescriptor::int(), 10),
        )
    }

    #[test]
    fn test_positional_and_default() {
        let bound = bind(&xy(), CallArgs::positional([1])).unwrap();
        assert_eq!(bound.get("x"), Some(&json!(1)));
        assert_eq!(bound.get("y"), Some(&json!(10)));
    }

    #[test]
    fn test_keyword_binding() {
        let bound = bind(&xy(), CallArgs::new().kwarg("y", 2).kwarg("x", 1)).unwrap();
        let names: Vec<&str> = bound.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(bound.get_as::<i64>("y").unwrap(), 2);
    }

    #[test]
    fn test_missing_required() {
        let err = bind(&xy(), CallArgs::new()).unwrap_err();
        assert_eq!(err, "missing a required argument: 'x'");
    }

    #[test]
    fn test_too_many_positional() {
        let err = bind(&xy(), CallArgs::positional([1, 2, 3])).unwrap_err();
        assert!(err.starts_with("too many positional arguments"));
    }

    #[test]
    fn test_multiple_values() {
        let err = bind(&xy(), CallArgs::positional([1]).kwarg("x", 2)).unwrap_err();
        assert_eq!(err, "multiple values for argument 'x'");
    }

    #[test]
    fn test_unexpected_keyword() {
        let err = bind(&xy(), CallArgs::positional([1]).kwarg("z", 2)).unwrap_err();
        assert_eq!(err, "got an unexpected keyword argument 'z'");
    }

    #[test]
    fn test_variadics_collect_surplus() {
        let sig = signature(
            FunctionDecl::new("f")
                .receiver("self")
                .param("first", TypeDescriptor::int())
                .var_args("rest", None)
                .keyword_only("flag", TypeDescriptor::bool())
                .var_kwargs("options", None),
        );
        let bound = bind(
            &sig,
            CallArgs::positional([1, 2, 3])
                .kwarg("flag", true)
                .kwarg("color", "red"),
        )
        .unwrap();
        assert!(bound.get("self").is_none());
        assert_eq!(bound.get("rest"), Some(&json!([2, 3])));
        assert_eq!(bound.get("flag"), Some(&json!(true)));
        assert_eq!(bound.get("options"), Some(&json!({"color": "red"})));
        assert_eq!(bound.len(), 4);
    }

    #[test]
    fn test_keyword_only_rejects_positional() {
        let sig = signature(FunctionDecl::new("f").keyword_only("flag", TypeDescriptor::bool()));
        let err = bind(&sig, CallArgs::positional([true])).unwrap_err();
        assert!(err.starts_with("too many positional arguments"));
    }

    #[test]
    fn test_empty_variadics_bound_empty() {
        let sig = signature(
            FunctionDecl::new("f")
                .var_args("args", None)
                .var_kwargs("kwargs", None),
        );
        let bound = bind(&sig, CallArgs::new()).unwrap();
        assert_eq!(bound.get("args"), Some(&json!([])));
        assert_eq!(bound.get("kwargs"), Some(&json!({})));
    }

    #[test]
    fn test_get_as_type_mismatch_is_type_fault() {
        let bound = bind(&xy(), CallArgs::positional([json!("one")])).unwrap();
        let err = bound.get_as::<i64>("x").unwrap_err();
        assert_eq!(err.kind(), spw_core::ErrorKind::Type);
    }
}
