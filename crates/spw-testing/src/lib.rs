//! # spw-testing: Test Requirement Declarations
//!
//! Functions declare which tests they need with [`RequiresTests`]; the
//! declarations land in a process-wide, write-once-per-qualname
//! [`registry`]. Reading the registry, collecting tests, and reporting
//! coverage gaps are left to external tooling, which only needs
//! [`registry::snapshot`] and [`TestRequirements::expected_test_names`].

pub mod registry;
pub mod requirements;

pub use requirements::{RequiresTests, TestRequirements};
