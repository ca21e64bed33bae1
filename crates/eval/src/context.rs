//! Per-evaluation context.

use rex_foundation::Value;

use crate::state::State;

/// Reusable evaluation scratch: the execution state plus the eval
/// stash inside it.
///
/// A context is cheap to construct and meant to be kept around — one
/// per worker is the intended pattern. It must not be shared between
/// functions of different arity without resetting the parameters, and
/// never between threads concurrently. The reference returned by
/// [`crate::CompiledFunction::eval`] borrows the context, so the
/// borrow checker enforces "read the result before the next eval".
#[derive(Debug, Default)]
pub struct Context {
    pub(crate) state: State,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all parameters.
    pub fn clear_params(&mut self) {
        self.state.params.clear();
    }

    /// Append one parameter; parameters are indexed in insertion
    /// order.
    pub fn add_param(&mut self, value: Value) {
        self.state.params.push(value);
    }

    /// Replace the full parameter vector.
    pub fn set_params(&mut self, params: Vec<Value>) {
        self.state.params = params;
    }

    pub fn params(&self) -> &[Value] {
        &self.state.params
    }

    /// Conditional branches executed by the most recent evaluation.
    pub fn if_count(&self) -> u64 {
        self.state.if_cnt
    }
}
