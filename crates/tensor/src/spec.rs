//! Tensor exchange format.
//!
//! A [`TensorSpec`] is the engine-independent description of a sparse
//! tensor: a sorted dimension list plus labeled cells. The compiler
//! builds one per tensor literal and hands it to the engine; engines
//! may also accept them directly from callers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Sparse cell address: dimension name to label bindings.
///
/// Bindings are kept sorted by dimension name so addresses compare and
/// hash canonically regardless of source order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TensorAddress {
    bindings: Vec<(String, String)>,
}

impl TensorAddress {
    /// Build an address from `(dimension, label)` bindings, in any
    /// order.
    pub fn new(mut bindings: Vec<(String, String)>) -> Self {
        bindings.sort();
        Self { bindings }
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(dim, label)| (dim.to_string(), label.to_string()))
                .collect(),
        )
    }

    /// The dimension names bound by this address, sorted.
    pub fn dimensions(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(dim, _)| dim.as_str())
    }

    /// Look up the label bound to a dimension.
    pub fn label(&self, dimension: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(dim, _)| dim == dimension)
            .map(|(_, label)| label.as_str())
    }

    pub fn bindings(&self) -> &[(String, String)] {
        &self.bindings
    }

    /// Project the address onto a subset of dimensions, dropping the
    /// rest. Used when reducing dimensions away.
    pub fn retain_dimensions(&self, keep: &[String]) -> TensorAddress {
        TensorAddress {
            bindings: self
                .bindings
                .iter()
                .filter(|(dim, _)| keep.contains(dim))
                .cloned()
                .collect(),
        }
    }
}

/// Engine-independent description of a sparse tensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorSpec {
    dimensions: Vec<String>,
    cells: IndexMap<TensorAddress, f64>,
}

impl TensorSpec {
    /// Create a spec over the given dimensions. Names are sorted and
    /// deduplicated; an empty list describes a degenerate scalar
    /// tensor.
    pub fn new(dimensions: impl IntoIterator<Item = String>) -> Self {
        let mut dimensions: Vec<String> = dimensions.into_iter().collect();
        dimensions.sort();
        dimensions.dedup();
        Self {
            dimensions,
            cells: IndexMap::new(),
        }
    }

    /// Add a cell. A repeated address overwrites the earlier value,
    /// keeping its original position.
    pub fn add(&mut self, address: TensorAddress, value: f64) {
        self.cells.insert(address, value);
    }

    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    /// Cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = (&TensorAddress, f64)> {
        self.cells.iter().map(|(address, value)| (address, *value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
