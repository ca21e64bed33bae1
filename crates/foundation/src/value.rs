//! Runtime value model.
//!
//! Every expression evaluates to a [`Value`]. Values are cheap to
//! clone: scalars and string hashes are plain data, tensors are shared
//! handles. The `Error` variant is a propagation marker, never a
//! panic: operations on unsupported operands return it and subsequent
//! operations absorb it.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::stable_hash::fnv1a64_str;

/// Opaque shared handle to an engine-owned tensor.
///
/// The VM never looks inside a tensor; it only moves handles around
/// and passes them back to the engine for reductions. Cloning is a
/// refcount bump.
#[derive(Clone)]
pub struct TensorHandle(Arc<dyn Any + Send + Sync>);

impl TensorHandle {
    /// Wrap an engine-defined tensor representation.
    pub fn new<T: Any + Send + Sync>(tensor: T) -> Self {
        Self(Arc::new(tensor))
    }

    /// Downcast to the concrete representation of the owning engine.
    ///
    /// Returns `None` when the handle was produced by a different
    /// engine implementation.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Identity comparison: two handles are the same iff they share
    /// the underlying allocation.
    pub fn ptr_eq(&self, other: &TensorHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for TensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TensorHandle({:p})", Arc::as_ptr(&self.0))
    }
}

/// Runtime value of a ranking expression.
#[derive(Debug, Clone)]
pub enum Value {
    /// Numeric scalar. Carries the truthiness used by `if` and the
    /// logical operators.
    Double(f64),
    /// A string, represented solely by its stable 64-bit hash. No
    /// string payload survives into the VM.
    Str(u64),
    /// Shared handle to an engine-owned tensor.
    Tensor(TensorHandle),
    /// Propagation marker for undefined operations.
    Error,
}

impl Value {
    /// Build a string value from text by hashing it.
    pub fn string(s: &str) -> Self {
        Value::Str(fnv1a64_str(s))
    }

    /// Scalar truthiness: strictly positive and finite. Every
    /// non-`Double` variant is false.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Double(d) => d.is_finite() && *d > 0.0,
            _ => false,
        }
    }

    /// Checked scalar projection.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Checked tensor projection.
    pub fn as_tensor(&self) -> Option<&TensorHandle> {
        match self {
            Value::Tensor(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error)
    }

    /// Variant-aware equality, used by set membership.
    ///
    /// `Double` compares IEEE-equal, `Str` compares hashes, `Tensor`
    /// compares handle identity. Cross-variant comparisons are false,
    /// and `Error` equals nothing, itself included.
    pub fn equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Tensor(a), Value::Tensor(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}
