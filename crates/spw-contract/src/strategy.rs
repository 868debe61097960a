//! # Error Strategy Dispatch
//!
//! An [`ErrorStrategyMap`] is an ordered table from error categories to
//! recovery strategies. [`ErrorHandled`] wraps any [`Callable`] and, when
//! the call fails, applies the strategy of the first entry whose category
//! the error belongs to (by [`ErrorKind::is_a`]). Unmatched errors
//! propagate unchanged.
//!
//! Order matters: put specific categories before their ancestors, or the
//! ancestor entry shadows them.
//!
//! ## Strategies
//!
//! | Strategy | Result of the call |
//! |----------|--------------------|
//! | `Suppress` | `null` |
//! | `LogAndReraise` | error event logged, original error returned |
//! | `Invoke(handler)` | whatever `handler(&error)` returns |
//! | `ReturnValue(v)` | a clone of `v` |

use std::backtrace::Backtrace;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use spw_core::{ErrorKind, Result, SpecwrightError};

use crate::bind::CallArgs;
use crate::callable::Callable;
use crate::config::StrategyConfig;

/// Handler invoked with the caught error.
pub type Handler = Arc<dyn Fn(&SpecwrightError) -> Result<Value> + Send + Sync>;

/// Recovery applied to a caught error.
#[derive(Clone)]
pub enum Strategy {
    /// Swallow the error and return `null`.
    Suppress,
    /// Log the error with its trace, then return it.
    LogAndReraise,
    /// Delegate to a handler; its result becomes the call's result.
    Invoke(Handler),
    /// Return a fixed value.
    ReturnValue(Value),
}

impl Strategy {
    /// Wrap a closure as an [`Strategy::Invoke`].
    pub fn invoke<H>(handler: H) -> Self
    where
        H: Fn(&SpecwrightError) -> Result<Value> + Send + Sync + 'static,
    {
        Self::Invoke(Arc::new(handler))
    }

    /// Parse a declarative strategy name. `return_value` uses `value`.
    pub fn from_name(name: &str, value: Option<Value>) -> Result<Self> {
        match name {
            "suppress" => Ok(Self::Suppress),
            "log_and_reraise" => Ok(Self::LogAndReraise),
            "return_value" => Ok(Self::ReturnValue(value.unwrap_or(Value::Null))),
            other => Err(SpecwrightError::HandlingStrategy {
                reason: format!(
                    "unknown strategy '{other}' \
                     (expected suppress, log_and_reraise, or return_value)"
                ),
            }),
        }
    }

    /// Short name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Suppress => "suppress",
            Self::LogAndReraise => "log_and_reraise",
            Self::Invoke(_) => "invoke",
            Self::ReturnValue(_) => "return_value",
        }
    }
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suppress => f.write_str("Suppress"),
            Self::LogAndReraise => f.write_str("LogAndReraise"),
            Self::Invoke(_) => f.write_str("Invoke(..)"),
            Self::ReturnValue(v) => f.debug_tuple("ReturnValue").field(v).finish(),
        }
    }
}

/// One row of a strategy table.
#[derive(Debug, Clone)]
pub struct StrategyEntry {
    /// Category matched by `is_a`.
    pub kind: ErrorKind,
    /// Recovery applied on a match.
    pub strategy: Strategy,
}

/// Ordered, validated strategy table. Each category appears at most once.
#[derive(Debug, Clone, Default)]
pub struct ErrorStrategyMap {
    entries: Vec<StrategyEntry>,
}

impl ErrorStrategyMap {
    /// Start an empty table.
    pub fn builder() -> ErrorStrategyMapBuilder {
        ErrorStrategyMapBuilder::default()
    }

    /// Build from `(kind name, strategy)` pairs, e.g. `("value", Strategy::Suppress)`.
    pub fn from_names<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Strategy)>,
    {
        let mut builder = Self::builder();
        for (name, strategy) in pairs {
            let kind = parse_kind(name)?;
            builder = builder.on(kind, strategy);
        }
        builder.build()
    }

    /// Build from a declarative table.
    pub fn from_config(config: &StrategyConfig) -> Result<Self> {
        let mut builder = Self::builder();
        for rule in &config.rules {
            let kind = parse_kind(&rule.error)?;
            let strategy = Strategy::from_name(&rule.strategy, rule.value.clone())?;
            builder = builder.on(kind, strategy);
        }
        builder.build()
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> &[StrategyEntry] {
        &self.entries
    }

    /// The first entry whose category `kind` belongs to.
    pub fn select(&self, kind: ErrorKind) -> Option<&StrategyEntry> {
        self.entries.iter().find(|e| kind.is_a(e.kind))
    }
}

fn parse_kind(name: &str) -> Result<ErrorKind> {
    name.parse::<ErrorKind>()
        .map_err(|e| SpecwrightError::HandlingStrategy {
            reason: e.to_string(),
        })
}

/// Accumulates entries; duplicates are detected in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct ErrorStrategyMapBuilder {
    entries: Vec<StrategyEntry>,
}

impl ErrorStrategyMapBuilder {
    /// Append an entry.
    pub fn on(mut self, kind: ErrorKind, strategy: Strategy) -> Self {
        self.entries.push(StrategyEntry { kind, strategy });
        self
    }

    /// Validate and freeze the table.
    ///
    /// # Errors
    ///
    /// [`SpecwrightError::HandlingStrategy`] if a category appears twice.
    pub fn build(self) -> Result<ErrorStrategyMap> {
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|e| e.kind == entry.kind) {
                return Err(SpecwrightError::HandlingStrategy {
                    reason: format!("error kind '{}' is mapped more than once", entry.kind),
                });
            }
        }
        Ok(ErrorStrategyMap {
            entries: self.entries,
        })
    }
}

/// A callable guarded by a strategy table.
#[derive(Debug)]
pub struct ErrorHandled<C> {
    inner: C,
    strategies: ErrorStrategyMap,
}

impl<C: Callable> ErrorHandled<C> {
    /// Guard `inner` with `strategies`.
    pub fn new(inner: C, strategies: ErrorStrategyMap) -> Self {
        Self { inner, strategies }
    }

    /// The guarded callable.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// The strategy table.
    pub fn strategies(&self) -> &ErrorStrategyMap {
        &self.strategies
    }

    fn recover(&self, error: SpecwrightError) -> Result<Value> {
        let kind = error.kind();
        let Some(entry) = self.strategies.select(kind) else {
            return Err(error);
        };
        tracing::debug!(
            function = %self.inner.qualname(),
            %kind,
            matched = %entry.kind,
            strategy = entry.strategy.name(),
            "error strategy selected"
        );
        match &entry.strategy {
            Strategy::Suppress => Ok(Value::Null),
            Strategy::LogAndReraise => {
                let trace = error
                    .trace()
                    .unwrap_or_else(|| error.render_trace(&Backtrace::force_capture()));
                tracing::error!(
                    function = %self.inner.qualname(),
                    %kind,
                    error = %error,
                    trace = %trace,
                    "Error in '{}': {}",
                    self.inner.qualname(),
                    error
                );
                Err(error)
            }
            Strategy::Invoke(handler) => handler(&error),
            Strategy::ReturnValue(value) => Ok(value.clone()),
        }
    }
}

impl<C: Callable> Callable for ErrorHandled<C> {
    fn qualname(&self) -> &str {
        self.inner.qualname()
    }

    fn call(&self, args: CallArgs) -> Result<Value> {
        self.inner.call(args).or_else(|error| self.recover(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::callable;
    use serde_json::json;
    use spw_core::Fault;
    use std::io;
    use std::sync::Mutex;

    fn failing(kind: ErrorKind) -> impl Callable {
        callable("op", move |_| Err(Fault::new(kind, "failed").into()))
    }

    #[test]
    fn test_suppress_returns_null() {
        let table = ErrorStrategyMap::builder()
            .on(ErrorKind::Value, Strategy::Suppress)
            .build()
            .unwrap();
        let guarded = ErrorHandled::new(failing(ErrorKind::Value), table);
        assert_eq!(guarded.call(CallArgs::new()).unwrap(), Value::Null);
    }

    #[test]
    fn test_first_matching_entry_wins() {
        let table = ErrorStrategyMap::builder()
            .on(ErrorKind::FileNotFound, Strategy::ReturnValue(json!([])))
            .on(ErrorKind::Os, Strategy::ReturnValue(json!("os")))
            .build()
            .unwrap();
        let not_found = ErrorHandled::new(failing(ErrorKind::FileNotFound), table.clone());
        assert_eq!(not_found.call(CallArgs::new()).unwrap(), json!([]));
        let denied = ErrorHandled::new(failing(ErrorKind::PermissionDenied), table);
        assert_eq!(denied.call(CallArgs::new()).unwrap(), json!("os"));
    }

    #[test]
    fn test_ancestor_first_shadows_descendant() {
        let table = ErrorStrategyMap::builder()
            .on(ErrorKind::Os, Strategy::ReturnValue(json!("os")))
            .on(ErrorKind::FileNotFound, Strategy::ReturnValue(json!([])))
            .build()
            .unwrap();
        let guarded = ErrorHandled::new(failing(ErrorKind::FileNotFound), table);
        assert_eq!(guarded.call(CallArgs::new()).unwrap(), json!("os"));
    }

    #[test]
    fn test_unmatched_error_propagates() {
        let table = ErrorStrategyMap::builder()
            .on(ErrorKind::Value, Strategy::Suppress)
            .build()
            .unwrap();
        let guarded = ErrorHandled::new(failing(ErrorKind::Key), table);
        let err = guarded.call(CallArgs::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Key);
    }

    #[test]
    fn test_invoke_receives_error() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let table = ErrorStrategyMap::builder()
            .on(
                ErrorKind::Exception,
                Strategy::invoke(move |e| {
                    sink.lock().unwrap().push(e.kind());
                    Ok(json!("handled"))
                }),
            )
            .build()
            .unwrap();
        let guarded = ErrorHandled::new(failing(ErrorKind::ZeroDivision), table);
        assert_eq!(guarded.call(CallArgs::new()).unwrap(), json!("handled"));
        assert_eq!(*seen.lock().unwrap(), vec![ErrorKind::ZeroDivision]);
    }

    #[test]
    fn test_handler_error_propagates() {
        let table = ErrorStrategyMap::builder()
            .on(
                ErrorKind::Value,
                Strategy::invoke(|_| Err(Fault::runtime("handler failed").into())),
            )
            .build()
            .unwrap();
        let guarded = ErrorHandled::new(failing(ErrorKind::Value), table);
        assert_eq!(
            guarded.call(CallArgs::new()).unwrap_err().kind(),
            ErrorKind::Runtime
        );
    }

    #[test]
    fn test_success_bypasses_table() {
        let table = ErrorStrategyMap::builder()
            .on(ErrorKind::Exception, Strategy::ReturnValue(json!("fallback")))
            .build()
            .unwrap();
        let guarded = ErrorHandled::new(callable("ok", |_| Ok(json!(7))), table);
        assert_eq!(guarded.call(CallArgs::new()).unwrap(), json!(7));
    }

    #[test]
    fn test_log_and_reraise_returns_original() {
        let table = ErrorStrategyMap::builder()
            .on(ErrorKind::Os, Strategy::LogAndReraise)
            .build()
            .unwrap();
        let guarded = ErrorHandled::new(
            callable("read", |_| {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied").into())
            }),
            table,
        );
        let err = guarded.call(CallArgs::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture_errors<T>(f: impl FnOnce() -> T) -> (T, String) {
        let capture = Capture::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::ERROR)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        let output = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        (result, output)
    }

    #[test]
    fn test_log_and_reraise_emits_error_event() {
        let table = ErrorStrategyMap::builder()
            .on(ErrorKind::Value, Strategy::LogAndReraise)
            .build()
            .unwrap();
        let guarded = ErrorHandled::new(
            callable("parse_amount", |_| Err(Fault::value("not a number").into())),
            table,
        );

        let (result, output) = capture_errors(|| guarded.call(CallArgs::new()));

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Value);
        assert!(output.contains("ERROR"));
        assert!(output.contains("Error in 'parse_amount': value: not a number"));
        assert!(output.contains("trace="));
        assert!(!output.contains("unavailable"));
    }

    #[test]
    fn test_log_and_reraise_trace_includes_cause_chain() {
        let table = ErrorStrategyMap::builder()
            .on(ErrorKind::Runtime, Strategy::LogAndReraise)
            .build()
            .unwrap();
        let guarded = ErrorHandled::new(
            callable("flush", |_| {
                let disk = io::Error::new(io::ErrorKind::Other, "disk full");
                Err(Fault::runtime("flush failed").with_source(disk).into())
            }),
            table,
        );

        let (result, output) = capture_errors(|| guarded.call(CallArgs::new()));

        assert_eq!(result.unwrap_err().kind(), ErrorKind::Runtime);
        assert!(output.contains("trace=caused by: disk full"));
    }

    #[test]
    fn test_log_and_reraise_traces_call_tier_errors() {
        let table = ErrorStrategyMap::builder()
            .on(ErrorKind::InvalidTransition, Strategy::LogAndReraise)
            .build()
            .unwrap();
        let guarded = ErrorHandled::new(
            callable("ship", |_| {
                Err(SpecwrightError::UndeclaredTransition {
                    machine: "Order".to_string(),
                    transition: "refund".to_string(),
                })
            }),
            table,
        );

        let (result, output) = capture_errors(|| guarded.call(CallArgs::new()));

        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidTransition);
        assert!(output.contains("trace="));
        assert!(!output.contains("unavailable"));
        assert!(!output.contains("disabled backtrace"));
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let err = ErrorStrategyMap::builder()
            .on(ErrorKind::Value, Strategy::Suppress)
            .on(ErrorKind::Value, Strategy::LogAndReraise)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HandlingStrategy);
    }

    #[test]
    fn test_from_names_and_config() {
        let table = ErrorStrategyMap::from_names([
            ("value", Strategy::Suppress),
            ("key", Strategy::LogAndReraise),
        ])
        .unwrap();
        assert_eq!(table.entries().len(), 2);
        assert!(ErrorStrategyMap::from_names([("nonsense", Strategy::Suppress)]).is_err());

        let cfg = StrategyConfig::from_yaml(
            "- error: file_not_found\n  strategy: return_value\n  value: []\n\
             - error: os\n  strategy: log_and_reraise\n",
        )
        .unwrap();
        let table = ErrorStrategyMap::from_config(&cfg).unwrap();
        assert_eq!(
            table.select(ErrorKind::FileNotFound).map(|e| e.kind),
            Some(ErrorKind::FileNotFound)
        );
        assert_eq!(table.select(ErrorKind::Timeout).map(|e| e.kind), Some(ErrorKind::Os));
        assert!(table.select(ErrorKind::Value).is_none());

        let bad = StrategyConfig::from_yaml("- error: value\n  strategy: retry\n").unwrap();
        assert_eq!(
            ErrorStrategyMap::from_config(&bad).unwrap_err().kind(),
            ErrorKind::HandlingStrategy
        );
    }
}
