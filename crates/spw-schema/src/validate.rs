//! # Value Validation
//!
//! Matches a runtime [`serde_json::Value`] against a [`TypeDescriptor`]
//! and returns every mismatch found. Validation is pure, deterministic, and
//! total: it never panics, never short-circuits, and depends only on its
//! two inputs.
//!
//! ## Strict Numeric Rules
//!
//! - `bool` accepts only booleans.
//! - `int` accepts only integers. Booleans are rejected even where a host
//!   language would treat them as integers.
//! - `float` accepts floats and integers (widening promotion).
//! - `str`, `None` require an exact kind match; `Any` accepts everything.
//!
//! Optionals and unions succeed when any branch succeeds; a failing
//! optional/union reports one violation for the whole node. Lists,
//! mappings, and structured records are checked element by element.

use serde_json::Value;
use spw_core::{Violation, Violations};

use crate::descriptor::{ScalarType, TypeDescriptor};

/// Kind name of a runtime value, as reported in violations.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "None",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Validate a standalone value. Violations carry an empty parameter name.
pub fn validate(value: &Value, descriptor: &TypeDescriptor) -> Vec<Violation> {
    validate_parameter("", value, descriptor)
}

/// Validate the value bound to `parameter`.
pub fn validate_parameter(
    parameter: &str,
    value: &Value,
    descriptor: &TypeDescriptor,
) -> Vec<Violation> {
    let mut walker = Walker {
        parameter,
        path: String::new(),
        out: Vec::new(),
    };
    walker.check(value, descriptor);
    walker.out
}

/// Whether `value` satisfies `descriptor`.
pub fn conforms(value: &Value, descriptor: &TypeDescriptor) -> bool {
    validate(value, descriptor).is_empty()
}

/// Validate several `(parameter, value, descriptor)` triples and collect
/// every violation, in order.
pub fn validate_all<'a, I>(items: I) -> Violations
where
    I: IntoIterator<Item = (&'a str, &'a Value, &'a TypeDescriptor)>,
{
    let mut all = Violations::default();
    for (parameter, value, descriptor) in items {
        all.extend(validate_parameter(parameter, value, descriptor));
    }
    all
}

fn scalar_accepts(scalar: ScalarType, value: &Value) -> bool {
    match scalar {
        ScalarType::Bool => value.is_boolean(),
        // `Value::Bool` is a distinct variant, so booleans never reach the
        // integer arm.
        ScalarType::Int => value.is_i64() || value.is_u64(),
        ScalarType::Float => value.is_number(),
        ScalarType::Str => value.is_string(),
        ScalarType::Null => value.is_null(),
        ScalarType::Any => true,
    }
}

struct Walker<'p> {
    parameter: &'p str,
    path: String,
    out: Vec<Violation>,
}

impl Walker<'_> {
    fn check(&mut self, value: &Value, descriptor: &TypeDescriptor) {
        match descriptor {
            TypeDescriptor::Scalar { scalar } => {
                if !scalar_accepts(*scalar, value) {
                    self.reject(descriptor, value);
                }
            }
            TypeDescriptor::Optional { inner } => {
                if !value.is_null() && !conforms(value, inner) {
                    self.reject(descriptor, value);
                }
            }
            TypeDescriptor::Union { branches } => {
                if !branches.iter().any(|b| conforms(value, b)) {
                    self.reject(descriptor, value);
                }
            }
            TypeDescriptor::List { item } => match value {
                Value::Array(items) => {
                    for (i, element) in items.iter().enumerate() {
                        self.nested(&format!("[{i}]"), element, item);
                    }
                }
                _ => self.reject(descriptor, value),
            },
            TypeDescriptor::Mapping {
                key: key_desc,
                value: value_desc,
            } => match value {
                Value::Object(map) => {
                    for (key, entry) in map {
                        let segment = format!("[{}]", Value::String(key.clone()));
                        self.nested(&segment, &Value::String(key.clone()), key_desc);
                        self.nested(&segment, entry, value_desc);
                    }
                }
                _ => self.reject(descriptor, value),
            },
            TypeDescriptor::Structured { fields, .. } => match value {
                Value::Object(map) => {
                    for field in fields {
                        let segment = format!(".{}", field.name);
                        match map.get(&field.name) {
                            Some(v) => self.nested(&segment, v, &field.descriptor),
                            None => self.missing(&segment, &field.descriptor),
                        }
                    }
                }
                _ => self.reject(descriptor, value),
            },
        }
    }

    fn nested(&mut self, segment: &str, value: &Value, descriptor: &TypeDescriptor) {
        let len = self.path.len();
        self.path.push_str(segment);
        self.check(value, descriptor);
        self.path.truncate(len);
    }

    fn reject(&mut self, descriptor: &TypeDescriptor, value: &Value) {
        self.out.push(Violation {
            parameter: self.parameter.to_string(),
            path: self.path.clone(),
            expected: descriptor.to_string(),
            actual: value_kind(value).to_string(),
            repr: value.to_string(),
        });
    }

    fn missing(&mut self, segment: &str, descriptor: &TypeDescriptor) {
        self.out.push(Violation {
            parameter: self.parameter.to_string(),
            path: format!("{}{segment}", self.path),
            expected: descriptor.to_string(),
            actual: "missing".to_string(),
            repr: "<absent>".to_string(),
        });
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
