//! # Process-Wide Requirements Registry
//!
//! Created on first use and never reset. Declarations append; external
//! test-collection and coverage tooling read snapshots.

use std::sync::Arc;

use once_cell::sync::Lazy;
use spw_core::Registry;

use crate::requirements::TestRequirements;

static TEST_REQUIREMENTS: Lazy<Registry<TestRequirements>> =
    Lazy::new(|| Registry::new("test requirements"));

/// The process-wide registry.
pub fn global() -> &'static Registry<TestRequirements> {
    &TEST_REQUIREMENTS
}

/// Every declaration so far, in declaration order.
pub fn snapshot() -> Vec<Arc<TestRequirements>> {
    TEST_REQUIREMENTS.snapshot()
}

/// The declaration for `qualname`.
pub fn get(qualname: &str) -> Option<Arc<TestRequirements>> {
    TEST_REQUIREMENTS.get(qualname)
}

/// Expected test names for `qualname`, if it was declared.
pub fn expected_test_names(qualname: &str) -> Option<Vec<String>> {
    get(qualname).map(|req| req.expected_test_names())
}
