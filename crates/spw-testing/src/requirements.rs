//! # Test Requirements
//!
//! A [`TestRequirements`] lists the tests a function is expected to have:
//! an optional happy-path test plus one test per named edge case and error
//! case. [`RequiresTests`] collects the lists and declares them into the
//! process-wide [`crate::registry`].

use std::sync::Arc;

use serde::Serialize;
use spw_core::{Keyed, Registry, Result};

/// Expected tests for one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRequirements {
    /// Simple name of the function.
    pub function_name: String,
    /// Qualified name, the registry key.
    pub qualname: String,
    /// Defining module.
    pub module: String,
    /// Whether a happy-path test is expected.
    pub happy_path: bool,
    /// Edge cases, in declaration order.
    pub edge_cases: Vec<String>,
    /// Error cases, in declaration order.
    pub error_cases: Vec<String>,
}

impl TestRequirements {
    /// Test names that satisfy these requirements, in order:
    /// `test_<name>_happy_path` (when expected), then
    /// `test_<name>_<case>` for each edge case and each error case.
    pub fn expected_test_names(&self) -> Vec<String> {
        let name = &self.function_name;
        let happy = self
            .happy_path
            .then(|| format!("test_{name}_happy_path"));
        happy
            .into_iter()
            .chain(
                self.edge_cases
                    .iter()
                    .chain(&self.error_cases)
                    .map(|case| format!("test_{name}_{case}")),
            )
            .collect()
    }
}

impl Keyed for TestRequirements {
    fn registry_key(&self) -> &str {
        &self.qualname
    }
}

/// Builder for a [`TestRequirements`] declaration. A happy-path test is
/// expected unless disabled.
#[derive(Debug, Clone)]
pub struct RequiresTests {
    happy_path: bool,
    edge_cases: Vec<String>,
    error_cases: Vec<String>,
}

impl Default for RequiresTests {
    fn default() -> Self {
        Self {
            happy_path: true,
            edge_cases: Vec::new(),
            error_cases: Vec::new(),
        }
    }
}

impl RequiresTests {
    /// Start a declaration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a happy-path test is expected.
    pub fn happy_path(mut self, expected: bool) -> Self {
        self.happy_path = expected;
        self
    }

    /// Append edge cases.
    pub fn edge_cases<I, S>(mut self, cases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.edge_cases.extend(cases.into_iter().map(Into::into));
        self
    }

    /// Append error cases.
    pub fn error_cases<I, S>(mut self, cases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.error_cases.extend(cases.into_iter().map(Into::into));
        self
    }

    /// Build the requirements without registering them.
    pub fn build(
        self,
        function_name: impl Into<String>,
        qualname: impl Into<String>,
        module: impl Into<String>,
    ) -> TestRequirements {
        TestRequirements {
            function_name: function_name.into(),
            qualname: qualname.into(),
            module: module.into(),
            happy_path: self.happy_path,
            edge_cases: self.edge_cases,
            error_cases: self.error_cases,
        }
    }

    /// Build and append to `registry`.
    pub fn declare_in(
        self,
        registry: &Registry<TestRequirements>,
        function_name: impl Into<String>,
        qualname: impl Into<String>,
        module: impl Into<String>,
    ) -> Result<Arc<TestRequirements>> {
        registry.register(self.build(function_name, qualname, module))
    }

    /// Build and append to the process-wide registry.
    ///
    /// # Errors
    ///
    /// [`spw_core::SpecwrightError::AlreadyRegistered`] if `qualname` was
    /// declared before; the registry keeps the first declaration.
    pub fn declare(
        self,
        function_name: impl Into<String>,
        qualname: impl Into<String>,
        module: impl Into<String>,
    ) -> Result<Arc<TestRequirements>> {
        self.declare_in(crate::registry::global(), function_name, qualname, module)
    }
}
