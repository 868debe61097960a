//! # Machine Topology
//!
//! A [`MachineSpec`] is the declared topology of one machine type: its
//! states, initial state, and transition table. The builder validates the
//! topology exactly once; a spec that exists is consistent, and instances
//! can only be built from a spec.
//!
//! ## Validation Order
//!
//! 1. The state list is non-empty.
//! 2. An initial state is set and is a declared state.
//! 3. No transition name is declared twice.
//! 4. Each transition, in name order, names only declared source states
//!    (unknown ones listed sorted) and a declared target state.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use spw_core::{Keyed, Result, SpecwrightError};

/// Source states and target of one transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionMeta {
    /// States the transition may start from.
    pub from_states: BTreeSet<String>,
    /// State entered on success.
    pub to_state: String,
}

impl TransitionMeta {
    /// Whether the transition accepts `state` as its source.
    pub fn accepts(&self, state: &str) -> bool {
        self.from_states.contains(state)
    }
}

/// Validated, immutable topology of a machine type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MachineSpec {
    name: String,
    states: Vec<String>,
    initial_state: String,
    transitions: BTreeMap<String, TransitionMeta>,
    track_history: bool,
}

impl MachineSpec {
    /// Start declaring the machine type `name`.
    pub fn builder(name: impl Into<String>) -> MachineSpecBuilder {
        MachineSpecBuilder {
            name: name.into(),
            ..MachineSpecBuilder::default()
        }
    }

    /// Machine type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared states, in declaration order.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Whether `state` is declared.
    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state)
    }

    /// State every instance starts in.
    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    /// Transition table, ordered by name.
    pub fn transitions(&self) -> &BTreeMap<String, TransitionMeta> {
        &self.transitions
    }

    /// Metadata of the named transition.
    pub fn transition(&self, name: &str) -> Option<&TransitionMeta> {
        self.transitions.get(name)
    }

    /// Whether instances record their visited states.
    pub fn tracks_history(&self) -> bool {
        self.track_history
    }
}

impl Keyed for MachineSpec {
    fn registry_key(&self) -> &str {
        &self.name
    }
}

/// Collects a machine declaration; [`build`](Self::build) validates it.
#[derive(Debug, Clone, Default)]
pub struct MachineSpecBuilder {
    name: String,
    states: Vec<String>,
    initial_state: Option<String>,
    transitions: Vec<(String, TransitionMeta)>,
    track_history: bool,
}

impl MachineSpecBuilder {
    /// Append states. Repeated names keep their first position.
    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for state in states {
            let state = state.into();
            if !self.states.contains(&state) {
                self.states.push(state);
            }
        }
        self
    }

    /// Set the initial state.
    pub fn initial_state(mut self, state: impl Into<String>) -> Self {
        self.initial_state = Some(state.into());
        self
    }

    /// Declare a transition.
    pub fn transition<I, S>(
        mut self,
        name: impl Into<String>,
        from: I,
        to: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transitions.push((
            name.into(),
            TransitionMeta {
                from_states: from.into_iter().map(Into::into).collect(),
                to_state: to.into(),
            },
        ));
        self
    }

    /// Record visited states on every instance.
    pub fn track_history(mut self, enabled: bool) -> Self {
        self.track_history = enabled;
        self
    }

    fn invalid(&self, reason: String) -> SpecwrightError {
        SpecwrightError::InvalidState {
            machine: self.name.clone(),
            reason,
        }
    }

    /// Validate and freeze the topology.
    ///
    /// # Errors
    ///
    /// [`SpecwrightError::InvalidState`] describing the first problem found.
    pub fn build(self) -> Result<MachineSpec> {
        if self.states.is_empty() {
            return Err(self.invalid("no states declared".to_string()));
        }
        let initial_state = match &self.initial_state {
            Some(initial) => initial.clone(),
            None => return Err(self.invalid("no initial state declared".to_string())),
        };
        if !self.states.contains(&initial_state) {
            return Err(self.invalid(format!(
                "initial state '{initial_state}' is not a declared state"
            )));
        }

        let mut transitions = BTreeMap::new();
        for (name, meta) in &self.transitions {
            if transitions.insert(name.clone(), meta.clone()).is_some() {
                return Err(self.invalid(format!("transition '{name}' is declared more than once")));
            }
        }
        for (name, meta) in &transitions {
            let unknown: Vec<&str> = meta
                .from_states
                .iter()
                .filter(|s| !self.states.contains(s))
                .map(String::as_str)
                .collect();
            if !unknown.is_empty() {
                return Err(self.invalid(format!(
                    "transition '{name}' references unknown source state(s): {}",
                    unknown.join(", ")
                )));
            }
            if !self.states.contains(&meta.to_state) {
                return Err(self.invalid(format!(
                    "transition '{name}' references unknown target state '{}'",
                    meta.to_state
                )));
            }
        }

        Ok(MachineSpec {
            name: self.name,
            states: self.states,
            initial_state,
            transitions,
            track_history: self.track_history,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spw_core::ErrorKind;

    fn order() -> MachineSpecBuilder {
        MachineSpec::builder("Order")
            .states(["pending", "paid", "shipped"])
            .initial_state("pending")
            .transition("pay", ["pending"], "paid")
            .transition("ship", ["paid"], "shipped")
    }

    fn reason(builder: MachineSpecBuilder) -> String {
        match builder.build().unwrap_err() {
            SpecwrightError::InvalidState { reason, .. } => reason,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_valid_topology() {
        let spec = order().build().unwrap();
        assert_eq!(spec.name(), "Order");
        assert_eq!(spec.states(), ["pending", "paid", "shipped"]);
        assert_eq!(spec.initial_state(), "pending");
        assert!(spec.transition("pay").unwrap().accepts("pending"));
        assert!(!spec.tracks_history());
        assert_eq!(spec.registry_key(), "Order");
    }

    #[test]
    fn test_empty_states_rejected() {
        let err = MachineSpec::builder("Empty").initial_state("a").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert!(err.to_string().contains("'Empty'"));
    }

    #[test]
    fn test_initial_state_checks() {
        assert_eq!(
            reason(MachineSpec::builder("M").states(["a"])),
            "no initial state declared"
        );
        assert_eq!(
            reason(MachineSpec::builder("M").states(["a"]).initial_state("b")),
            "initial state 'b' is not a declared state"
        );
    }

    #[test]
    fn test_unknown_sources_listed_sorted() {
        let builder = order().transition("refund", ["zeta", "paid", "alpha"], "pending");
        assert_eq!(
            reason(builder),
            "transition 'refund' references unknown source state(s): alpha, zeta"
        );
    }

    #[test]
    fn test_unknown_target() {
        let builder = order().transition("cancel", ["pending"], "cancelled");
        assert_eq!(
            reason(builder),
            "transition 'cancel' references unknown target state 'cancelled'"
        );
    }

    #[test]
    fn test_transitions_checked_in_name_order() {
        let builder = order()
            .transition("zap", ["nowhere"], "paid")
            .transition("abort", ["pending"], "void");
        assert!(reason(builder).starts_with("transition 'abort'"));
    }

    #[test]
    fn test_duplicate_transition_rejected() {
        let builder = order().transition("pay", ["paid"], "shipped");
        assert_eq!(reason(builder), "transition 'pay' is declared more than once");
    }

    #[test]
    fn test_repeated_states_collapse() {
        let spec = MachineSpec::builder("M")
            .states(["a", "b", "a"])
            .initial_state("a")
            .build()
            .unwrap();
        assert_eq!(spec.states(), ["a", "b"]);
    }

    #[test]
    fn test_spec_serializes_for_tooling() {
        let spec = order().track_history(true).build().unwrap();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["initial_state"], "pending");
        assert_eq!(json["transitions"]["ship"]["from_states"][0], "paid");
        assert_eq!(json["track_history"], true);
    }
}
