//! # Validation Violations
//!
//! A [`Violation`] records one mismatch between a runtime value and a
//! declared type: which parameter, where inside it, what was expected, and
//! what was found. Validation never stops at the first mismatch, so
//! violations travel as a [`Violations`] collection and are reported
//! together.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Parameter name used for violations of a return value.
pub const RETURN_PARAMETER: &str = "return";

/// A single type mismatch with structured context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// The parameter (or `return`) whose value is at fault. Empty when the
    /// value was validated on its own.
    pub parameter: String,
    /// Position inside the value, e.g. `[2]`, `.address.city`, `["a"]`.
    /// Empty for the value itself.
    pub path: String,
    /// Display name of the expected descriptor.
    pub expected: String,
    /// Kind name of the value actually found.
    pub actual: String,
    /// Rendering of the value actually found.
    pub repr: String,
}

impl Violation {
    /// Full location: parameter followed by the nested path.
    pub fn location(&self) -> String {
        format!("{}{}", self.parameter, self.path)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.parameter.is_empty() {
            write!(f, "  - (value)")?;
        } else if self.parameter == RETURN_PARAMETER {
            write!(f, "  - Return value")?;
        } else {
            write!(f, "  - Parameter '{}'", self.parameter)?;
        }
        if !self.path.is_empty() {
            write!(f, " at {}", self.path)?;
        }
        write!(
            f,
            ": expected {}, got {} ({})",
            self.expected, self.actual, self.repr
        )
    }
}

/// Collection of violations from one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Iterate over the violations in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    /// Names of the parameters that have at least one violation, deduplicated,
    /// in discovery order.
    pub fn parameters(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for v in &self.violations {
            if !out.contains(&v.parameter.as_str()) {
                out.push(&v.parameter);
            }
        }
        out
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl Extend<Violation> for Violations {
    fn extend<I: IntoIterator<Item = Violation>>(&mut self, iter: I) {
        self.violations.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Violations {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}
