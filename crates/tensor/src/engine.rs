//! Tensor engine interface.

use rex_foundation::{ReduceOp, TensorHandle, Value};

use crate::spec::TensorSpec;

/// Errors produced while materializing a tensor from a spec.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TensorError {
    /// A cell address does not bind exactly the spec's dimensions.
    #[error("cell address {{{address}}} does not bind dimensions {expected:?}")]
    AddressMismatch {
        /// The offending address, rendered as `dim:label` pairs.
        address: String,
        /// The dimensions the spec declares.
        expected: Vec<String>,
    },
}

/// Abstract tensor backend.
///
/// One engine instance backs every tensor of a compiled function. The
/// VM performs no locking; implementations must be safe to call from
/// many threads at once.
pub trait TensorEngine: Send + Sync + std::fmt::Debug {
    /// Materialize a tensor from a spec.
    ///
    /// # Errors
    ///
    /// Returns an error when the spec is inconsistent (e.g. a cell
    /// address that does not match the declared dimensions). The
    /// compiler degrades such failures to error constants.
    fn create(&self, spec: &TensorSpec) -> Result<TensorHandle, TensorError>;

    /// Reduce a tensor over the given dimensions.
    ///
    /// An empty dimension list reduces everything to a `Double`;
    /// otherwise the result is a tensor over the surviving dimensions.
    /// Handles from another engine and unknown dimension names reduce
    /// to [`Value::Error`].
    fn reduce(&self, tensor: &TensorHandle, op: ReduceOp, dimensions: &[String]) -> Value;

    /// Element-wise multiply of two tensors, the tensor match
    /// operation.
    ///
    /// Both operands must share one dimension set; anything else,
    /// including handles from another engine, multiplies to
    /// [`Value::Error`].
    fn multiply(&self, lhs: &TensorHandle, rhs: &TensorHandle) -> Value;
}
