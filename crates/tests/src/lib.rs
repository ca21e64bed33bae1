//! Test harness for end-to-end REX evaluation.
//!
//! Small conveniences shared by the integration tests: one-shot
//! compile-and-eval helpers and an instrumented tensor engine that
//! counts reductions, used to observe VM-level short-circuiting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rex_eval::{CompiledFunction, Context};
use rex_expr::ExprNode;
use rex_foundation::{ReduceOp, TensorHandle, Value};
use rex_tensor::{SimpleTensorEngine, TensorEngine, TensorError, TensorSpec};

/// Install a fmt subscriber honoring `RUST_LOG`, once per process.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Compile `root` against the reference engine and evaluate it once.
pub fn eval_expr(root: &ExprNode, params: Vec<Value>) -> Value {
    eval_with(Arc::new(SimpleTensorEngine::new()), root, params)
}

/// Compile `root` against the given engine and evaluate it once.
pub fn eval_with(engine: Arc<dyn TensorEngine>, root: &ExprNode, params: Vec<Value>) -> Value {
    let function = CompiledFunction::compile(engine, root, params.len());
    let mut ctx = Context::new();
    ctx.set_params(params);
    function.eval(&mut ctx).clone()
}

/// Reference engine wrapper that counts `reduce` calls.
///
/// Reductions are the only runtime work an expression can delegate to
/// the engine, which makes the counter a reliable witness for "this
/// subexpression never ran".
#[derive(Debug, Default)]
pub struct CountingEngine {
    inner: SimpleTensorEngine,
    reductions: AtomicUsize,
}

impl CountingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reductions(&self) -> usize {
        self.reductions.load(Ordering::SeqCst)
    }
}

impl TensorEngine for CountingEngine {
    fn create(&self, spec: &TensorSpec) -> Result<TensorHandle, TensorError> {
        self.inner.create(spec)
    }

    fn reduce(&self, tensor: &TensorHandle, op: ReduceOp, dimensions: &[String]) -> Value {
        self.reductions.fetch_add(1, Ordering::SeqCst);
        self.inner.reduce(tensor, op, dimensions)
    }

    fn multiply(&self, lhs: &TensorHandle, rhs: &TensorHandle) -> Value {
        self.inner.multiply(lhs, rhs)
    }
}
