//! Sparse reference tensor engine.
//!
//! [`SimpleTensor`] stores labeled cells in insertion order; values
//! are never reordered, so reductions are deterministic by
//! construction. The engine is stateless and therefore trivially
//! shareable across threads.

use indexmap::IndexMap;

use rex_foundation::{ReduceOp, TensorHandle, Value};

use crate::engine::{TensorEngine, TensorError};
use crate::spec::{TensorAddress, TensorSpec};

/// Sparse tensor with string-labeled dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleTensor {
    dimensions: Vec<String>,
    cells: IndexMap<TensorAddress, f64>,
}

impl SimpleTensor {
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = (&TensorAddress, f64)> {
        self.cells.iter().map(|(address, value)| (address, *value))
    }

    /// Look up a cell value by address.
    pub fn cell(&self, address: &TensorAddress) -> Option<f64> {
        self.cells.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Fold every cell value into a single scalar.
    fn reduce_all(&self, op: ReduceOp) -> f64 {
        self.cells
            .values()
            .fold(op.identity(), |acc, value| op.combine(acc, *value))
    }

    /// Reduce the named dimensions away, grouping cells by the
    /// surviving bindings.
    fn reduce_dimensions(&self, op: ReduceOp, reduced: &[String]) -> SimpleTensor {
        let surviving: Vec<String> = self
            .dimensions
            .iter()
            .filter(|dim| !reduced.contains(dim))
            .cloned()
            .collect();
        let mut cells: IndexMap<TensorAddress, f64> = IndexMap::new();
        for (address, value) in &self.cells {
            let group = address.retain_dimensions(&surviving);
            let acc = cells.entry(group).or_insert_with(|| op.identity());
            *acc = op.combine(*acc, *value);
        }
        SimpleTensor {
            dimensions: surviving,
            cells,
        }
    }
}

/// Stateless engine over [`SimpleTensor`] values.
#[derive(Debug, Default)]
pub struct SimpleTensorEngine;

impl SimpleTensorEngine {
    pub fn new() -> Self {
        SimpleTensorEngine
    }
}

impl TensorEngine for SimpleTensorEngine {
    fn create(&self, spec: &TensorSpec) -> Result<TensorHandle, TensorError> {
        let dimensions = spec.dimensions().to_vec();
        let mut cells = IndexMap::with_capacity(spec.len());
        for (address, value) in spec.cells() {
            let bound: Vec<&str> = address.dimensions().collect();
            if bound != dimensions.iter().map(String::as_str).collect::<Vec<_>>() {
                return Err(TensorError::AddressMismatch {
                    address: address
                        .bindings()
                        .iter()
                        .map(|(dim, label)| format!("{dim}:{label}"))
                        .collect::<Vec<_>>()
                        .join(","),
                    expected: dimensions,
                });
            }
            cells.insert(address.clone(), value);
        }
        Ok(TensorHandle::new(SimpleTensor { dimensions, cells }))
    }

    fn reduce(&self, tensor: &TensorHandle, op: ReduceOp, dimensions: &[String]) -> Value {
        let Some(tensor) = tensor.downcast_ref::<SimpleTensor>() else {
            return Value::Error;
        };
        if dimensions
            .iter()
            .any(|dim| !tensor.dimensions.contains(dim))
        {
            return Value::Error;
        }
        if dimensions.is_empty() || dimensions.len() == tensor.dimensions.len() {
            return Value::Double(tensor.reduce_all(op));
        }
        Value::Tensor(TensorHandle::new(tensor.reduce_dimensions(op, dimensions)))
    }

    fn multiply(&self, lhs: &TensorHandle, rhs: &TensorHandle) -> Value {
        let (Some(lhs), Some(rhs)) = (
            lhs.downcast_ref::<SimpleTensor>(),
            rhs.downcast_ref::<SimpleTensor>(),
        ) else {
            return Value::Error;
        };
        if lhs.dimensions != rhs.dimensions {
            return Value::Error;
        }
        // Sparse match: only cells present on both sides survive.
        let mut cells = IndexMap::new();
        for (address, value) in &lhs.cells {
            if let Some(other) = rhs.cells.get(address) {
                cells.insert(address.clone(), value * other);
            }
        }
        Value::Tensor(TensorHandle::new(SimpleTensor {
            dimensions: lhs.dimensions.clone(),
            cells,
        }))
    }
}
