//! # Configuration
//!
//! [`ContractConfig`] switches the runtime checks of a contract.
//! [`StrategyConfig`] declares an error strategy table as data, so the
//! same table can live in a YAML policy file next to other settings.
//!
//! Both deserialize with `serde`; missing fields fall back to defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Runtime switches of a contract. Immutable once the contract is built.
///
/// `ContractConfig::default()` is the bare form (every check on);
/// [`ContractConfig::new`] is the explicit form. Equal values behave
/// identically however they were built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Validate every bound argument before the body runs.
    pub validate_inputs: bool,
    /// Validate the return value after the body returns.
    pub validate_output: bool,
    /// Reject declarations without a docstring.
    pub require_docstring: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            validate_inputs: true,
            validate_output: true,
            require_docstring: true,
        }
    }
}

impl ContractConfig {
    /// Explicit form: every field supplied.
    pub fn new(validate_inputs: bool, validate_output: bool, require_docstring: bool) -> Self {
        Self {
            validate_inputs,
            validate_output,
            require_docstring,
        }
    }

    /// Parse from a YAML document; absent keys keep their defaults.
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }
}

/// One rule of a declarative strategy table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRule {
    /// Error kind name, e.g. `value` or `file_not_found`.
    pub error: String,
    /// Strategy name: `suppress`, `log_and_reraise`, or `return_value`.
    pub strategy: String,
    /// Value returned by the `return_value` strategy (null when absent).
    #[serde(default)]
    pub value: Option<Value>,
}

/// An ordered strategy table as data.
///
/// ```yaml
/// - error: file_not_found
///   strategy: return_value
///   value: []
/// - error: os
///   strategy: log_and_reraise
/// - error: value
///   strategy: suppress
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyConfig {
    /// Rules in declaration order.
    pub rules: Vec<StrategyRule>,
}

impl StrategyConfig {
    /// Parse from a YAML sequence of rules.
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }
}
