//! Suites and states: the declared units of capture work.

use crate::browser::{ActionSequence, FindFn};
use crate::error::HookError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// State-preparation hook: composes the browser actions that drive the
/// page into the state being captured.
///
/// Invoked synchronously with the per-capture [`HookContext`], the action
/// sequence to fill, and the [`find`](crate::browser::find) selector
/// helper. Returning an `Err` aborts the capture.
pub type StateHook = Arc<
    dyn Fn(&mut HookContext, &mut dyn ActionSequence, FindFn) -> Result<(), HookError>
        + Send
        + Sync,
>;

/// Identity of the suite a state belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteRef {
    pub id: String,
    pub name: String,
}

/// A named group of states.
#[derive(Debug)]
pub struct Suite {
    pub id: String,
    pub name: String,
    states: Vec<State>,
}

impl Suite {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            states: Vec::new(),
        }
    }

    /// Declare a state; the suite identity is copied into it.
    pub fn add_state(
        &mut self,
        name: impl Into<String>,
        capture_selectors: Vec<String>,
        hook: StateHook,
    ) -> &State {
        let state = State {
            name: name.into(),
            suite: SuiteRef {
                id: self.id.clone(),
                name: self.name.clone(),
            },
            hook,
            capture_selectors,
        };
        self.states.push(state);
        &self.states[self.states.len() - 1]
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }
}

/// A named page configuration to capture and compare.
///
/// Immutable once the suite tree is built.
pub struct State {
    name: String,
    suite: SuiteRef,
    hook: StateHook,
    capture_selectors: Vec<String>,
}

impl State {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn suite(&self) -> &SuiteRef {
        &self.suite
    }

    pub fn hook(&self) -> &StateHook {
        &self.hook
    }

    /// Selectors of the elements whose union defines the capture region.
    pub fn capture_selectors(&self) -> &[String] {
        &self.capture_selectors
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name)
            .field("suite", &self.suite)
            .field("capture_selectors", &self.capture_selectors)
            .finish_non_exhaustive()
    }
}

/// Per-capture scratch space handed to hooks.
///
/// A fresh context is created for every capture call; nothing is shared
/// across calls or sessions.
#[derive(Debug, Default)]
pub struct HookContext {
    values: HashMap<String, Value>,
}

impl HookContext {
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_hook() -> StateHook {
        Arc::new(|_, _, _| Ok(()))
    }

    #[test]
    fn test_add_state_copies_suite_identity() {
        let mut suite = Suite::new("0", "header");
        suite.add_state("plain", vec!["#header".to_string()], noop_hook());

        let state = &suite.states()[0];
        assert_eq!(state.name(), "plain");
        assert_eq!(state.suite().id, "0");
        assert_eq!(state.suite().name, "header");
        assert_eq!(state.capture_selectors(), ["#header".to_string()]);
    }

    #[test]
    fn test_context_stores_values() {
        let mut context = HookContext::default();
        assert!(context.get("step").is_none());

        context.set("step", serde_json::json!(2));
        assert_eq!(context.get("step"), Some(&serde_json::json!(2)));
    }
}
