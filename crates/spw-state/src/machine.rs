//! # Transition Guard
//!
//! A [`Machine`] is the per-instance state of a declared [`MachineSpec`].
//! Types embed one and implement [`StateMachine`] to get guarded
//! transitions with lifecycle hooks:
//!
//! ```text
//! transition(name, body)
//!   ├─ undeclared name ─────────────▶ UndeclaredTransition
//!   ├─ current ∉ from_states ───────▶ InvalidTransition (state unchanged)
//!   ├─ body(self) fails ─────────────▶ error returned as-is (state unchanged, no hooks)
//!   └─ body(self) succeeds
//!        on_exit(old) ─▶ commit(to) ─▶ on_enter(to) ─▶ body's value
//! ```
//!
//! Hooks are infallible and cannot change the result. A hook that panics
//! unwinds through `transition`: from `on_exit` the state is still the
//! old one, from `on_enter` the new state is already committed.
//!
//! ## Concurrency
//!
//! A machine is plain data mutated through `&mut self`; sharing one across
//! threads requires wrapping it in a lock, which also makes the
//! guard-then-commit sequence atomic.

use std::sync::Arc;

use spw_core::SpecwrightError;

use crate::spec::{MachineSpec, TransitionMeta};

/// Current state and optional history of one machine instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    spec: Arc<MachineSpec>,
    current: String,
    history: Option<Vec<String>>,
}

impl Machine {
    /// A fresh instance in the spec's initial state.
    pub fn new(spec: Arc<MachineSpec>) -> Self {
        let current = spec.initial_state().to_string();
        let history = spec.tracks_history().then(|| vec![current.clone()]);
        Self {
            spec,
            current,
            history,
        }
    }

    /// The declared topology.
    pub fn spec(&self) -> &Arc<MachineSpec> {
        &self.spec
    }

    /// Current state.
    pub fn state(&self) -> &str {
        &self.current
    }

    /// Copy of the visited states, initial state first. Empty when the
    /// spec does not track history.
    pub fn history(&self) -> Vec<String> {
        self.history.clone().unwrap_or_default()
    }

    fn guard(&self, name: &str) -> Result<TransitionMeta, SpecwrightError> {
        let Some(meta) = self.spec.transition(name) else {
            return Err(SpecwrightError::UndeclaredTransition {
                machine: self.spec.name().to_string(),
                transition: name.to_string(),
            });
        };
        if meta.accepts(&self.current) {
            return Ok(meta.clone());
        }
        tracing::debug!(
            machine = self.spec.name(),
            transition = name,
            current = %self.current,
            "transition rejected"
        );
        Err(SpecwrightError::InvalidTransition {
            machine: self.spec.name().to_string(),
            current: self.current.clone(),
            transition: name.to_string(),
            to_state: meta.to_state.clone(),
            valid_from: meta.from_states.iter().cloned().collect(),
        })
    }

    fn commit(&mut self, name: &str, to_state: &str) {
        tracing::debug!(
            machine = self.spec.name(),
            transition = name,
            from = %self.current,
            to = to_state,
            "transition committed"
        );
        self.current = to_state.to_string();
        if let Some(history) = self.history.as_mut() {
            history.push(to_state.to_string());
        }
    }
}

/// A type whose lifecycle follows a declared [`MachineSpec`].
///
/// ```
/// use std::sync::Arc;
/// use spw_core::SpecwrightError;
/// use spw_state::{Machine, MachineSpec, StateMachine};
///
/// struct Door {
///     machine: Machine,
///     opened: u32,
/// }
///
/// impl StateMachine for Door {
///     fn machine(&self) -> &Machine { &self.machine }
///     fn machine_mut(&mut self) -> &mut Machine { &mut self.machine }
///     fn on_enter(&mut self, state: &str) {
///         if state == "open" { self.opened += 1; }
///     }
/// }
///
/// let spec = MachineSpec::builder("Door")
///     .states(["closed", "open"])
///     .initial_state("closed")
///     .transition("open", ["closed"], "open")
///     .build()
///     .unwrap();
/// let mut door = Door { machine: Machine::new(Arc::new(spec)), opened: 0 };
/// door.transition("open", |_| Ok::<_, SpecwrightError>(())).unwrap();
/// assert_eq!(door.state(), "open");
/// assert_eq!(door.opened, 1);
/// assert!(door.transition("open", |_| Ok::<_, SpecwrightError>(())).is_err());
/// ```
pub trait StateMachine {
    /// The embedded instance state.
    fn machine(&self) -> &Machine;

    /// The embedded instance state, mutably.
    fn machine_mut(&mut self) -> &mut Machine;

    /// Called before leaving `state` on a successful transition.
    fn on_exit(&mut self, _state: &str) {}

    /// Called after entering `state` on a successful transition.
    fn on_enter(&mut self, _state: &str) {}

    /// Current state.
    fn state(&self) -> &str {
        self.machine().state()
    }

    /// Copy of the visited states (empty without history tracking).
    fn state_history(&self) -> Vec<String> {
        self.machine().history()
    }

    /// Run `body` as the transition `name`.
    ///
    /// # Errors
    ///
    /// Guard failures ([`SpecwrightError::UndeclaredTransition`],
    /// [`SpecwrightError::InvalidTransition`]) converted into `E`, or the
    /// body's own error. The state is unchanged in every error case.
    fn transition<T, E, F>(&mut self, name: &str, body: F) -> Result<T, E>
    where
        Self: Sized,
        E: From<SpecwrightError>,
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let meta = self.machine().guard(name)?;
        let value = body(self)?;
        let old = self.state().to_string();
        self.on_exit(&old);
        self.machine_mut().commit(name, &meta.to_state);
        self.on_enter(&meta.to_state);
        Ok(value)
    }
}

impl StateMachine for Machine {
    fn machine(&self) -> &Machine {
        self
    }

    fn machine_mut(&mut self) -> &mut Machine {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spw_core::{ErrorKind, Fault};

    fn order_spec(track: bool) -> Arc<MachineSpec> {
        Arc::new(
            MachineSpec::builder("Order")
                .states(["pending", "paid", "shipped"])
                .initial_state("pending")
                .transition("pay", ["pending"], "paid")
                .transition("ship", ["paid"], "shipped")
                .transition("reset", ["paid", "shipped"], "pending")
                .track_history(track)
                .build()
                .unwrap(),
        )
    }

    struct Order {
        machine: Machine,
        events: Vec<String>,
        total: u32,
    }

    impl Order {
        fn new(track: bool) -> Self {
            Self {
                machine: Machine::new(order_spec(track)),
                events: Vec::new(),
                total: 0,
            }
        }
    }

    impl StateMachine for Order {
        fn machine(&self) -> &Machine {
            &self.machine
        }

        fn machine_mut(&mut self) -> &mut Machine {
            &mut self.machine
        }

        fn on_exit(&mut self, state: &str) {
            self.events.push(format!("exit:{state}:{}", self.state()));
        }

        fn on_enter(&mut self, state: &str) {
            self.events.push(format!("enter:{state}:{}", self.state()));
        }
    }

    fn ok<T>(value: T) -> impl FnOnce(&mut Order) -> Result<T, SpecwrightError> {
        move |_| Ok(value)
    }

    #[test]
    fn test_successful_transition_runs_hooks_in_order() {
        let mut order = Order::new(false);
        let result = order
            .transition("pay", |o: &mut Order| {
                o.total = 42;
                Ok::<_, SpecwrightError>("receipt")
            })
            .unwrap();
        assert_eq!(result, "receipt");
        assert_eq!(order.state(), "paid");
        assert_eq!(order.total, 42);
        assert_eq!(order.events, vec!["exit:pending:pending", "enter:paid:paid"]);
    }

    #[test]
    fn test_guard_rejects_invalid_source() {
        let mut order = Order::new(true);
        let err = order.transition("ship", ok(())).unwrap_err();
        match &err {
            SpecwrightError::InvalidTransition {
                current,
                transition,
                to_state,
                valid_from,
                ..
            } => {
                assert_eq!(current, "pending");
                assert_eq!(transition, "ship");
                assert_eq!(to_state, "shipped");
                assert_eq!(valid_from, &vec!["paid".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            err.to_string(),
            "Cannot transition from 'pending' to 'shipped' via 'ship'. Valid source state(s): paid"
        );
        assert_eq!(order.state(), "pending");
        assert_eq!(order.state_history(), vec!["pending"]);
        assert!(order.events.is_empty());
    }

    #[test]
    fn test_guard_runs_before_body() {
        let mut order = Order::new(false);
        let mut ran = false;
        let _ = order.transition("ship", |_| {
            ran = true;
            Ok::<_, SpecwrightError>(())
        });
        assert!(!ran);
    }

    #[test]
    fn test_valid_sources_sorted() {
        let mut order = Order::new(false);
        let err = order.transition("reset", ok(())).unwrap_err();
        assert!(err.to_string().ends_with("Valid source state(s): paid, shipped"));
    }

    #[test]
    fn test_body_error_rolls_back() {
        let mut order = Order::new(true);
        let err = order
            .transition("pay", |_| -> Result<(), SpecwrightError> {
                Err(Fault::value("card declined").into())
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert_eq!(order.state(), "pending");
        assert_eq!(order.state_history(), vec!["pending"]);
        assert!(order.events.is_empty());
    }

    #[test]
    fn test_undeclared_transition() {
        let mut order = Order::new(false);
        let err = order.transition("teleport", ok(())).unwrap_err();
        assert!(matches!(err, SpecwrightError::UndeclaredTransition { .. }));
        assert!(err.is_a(ErrorKind::InvalidTransition));
    }

    #[test]
    fn test_history_tracking() {
        let mut order = Order::new(true);
        order.transition("pay", ok(())).unwrap();
        order.transition("ship", ok(())).unwrap();
        assert_eq!(order.state_history(), vec!["pending", "paid", "shipped"]);

        let mut copy = order.state_history();
        copy.clear();
        assert_eq!(order.state_history().len(), 3);
    }

    #[test]
    fn test_history_empty_when_untracked() {
        let mut order = Order::new(false);
        order.transition("pay", ok(())).unwrap();
        assert!(order.state_history().is_empty());
    }

    #[derive(Debug)]
    enum ShopError {
        Guard(SpecwrightError),
        OutOfStock,
    }

    impl From<SpecwrightError> for ShopError {
        fn from(err: SpecwrightError) -> Self {
            Self::Guard(err)
        }
    }

    #[test]
    fn test_domain_error_type() {
        let mut machine = Machine::new(order_spec(false));
        let err = machine
            .transition("pay", |_| Err::<(), _>(ShopError::OutOfStock))
            .unwrap_err();
        assert!(matches!(err, ShopError::OutOfStock));

        let err = machine
            .transition("ship", |_| Ok::<(), ShopError>(()))
            .unwrap_err();
        match err {
            ShopError::Guard(inner) => assert_eq!(inner.kind(), ErrorKind::InvalidTransition),
            ShopError::OutOfStock => panic!("guard error expected"),
        }
        assert_eq!(machine.state(), "pending");
    }

    struct Fragile {
        machine: Machine,
        panic_on_exit: bool,
        panic_on_enter: bool,
    }

    impl StateMachine for Fragile {
        fn machine(&self) -> &Machine {
            &self.machine
        }

        fn machine_mut(&mut self) -> &mut Machine {
            &mut self.machine
        }

        fn on_exit(&mut self, state: &str) {
            if self.panic_on_exit {
                panic!("exit hook failed in {state}");
            }
        }

        fn on_enter(&mut self, state: &str) {
            if self.panic_on_enter {
                panic!("enter hook failed in {state}");
            }
        }
    }

    fn run_pay(fragile: &mut Fragile) -> std::thread::Result<Result<(), SpecwrightError>> {
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            fragile.transition("pay", |_| Ok::<_, SpecwrightError>(()))
        }))
    }

    #[test]
    fn test_panicking_exit_hook_leaves_state_uncommitted() {
        let mut fragile = Fragile {
            machine: Machine::new(order_spec(true)),
            panic_on_exit: true,
            panic_on_enter: false,
        };
        assert!(run_pay(&mut fragile).is_err());
        assert_eq!(fragile.state(), "pending");
        assert_eq!(fragile.state_history(), vec!["pending"]);
    }

    #[test]
    fn test_panicking_enter_hook_keeps_commit() {
        let mut fragile = Fragile {
            machine: Machine::new(order_spec(true)),
            panic_on_exit: false,
            panic_on_enter: true,
        };
        assert!(run_pay(&mut fragile).is_err());
        assert_eq!(fragile.state(), "paid");
        assert_eq!(fragile.state_history(), vec!["pending", "paid"]);
    }

    #[test]
    fn test_instances_are_independent() {
        let spec = order_spec(false);
        let mut a = Machine::new(Arc::clone(&spec));
        let b = Machine::new(spec);
        a.transition("pay", |_| Ok::<_, SpecwrightError>(())).unwrap();
        assert_eq!(a.state(), "paid");
        assert_eq!(b.state(), "pending");
    }
}
