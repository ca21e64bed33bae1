//! REX tensor backend.
//!
//! The VM treats tensors as opaque handles and delegates construction
//! and reduction to a [`TensorEngine`]. This crate defines the engine
//! interface, the [`TensorSpec`] exchange format used to materialize
//! tensor literals, and [`SimpleTensorEngine`], a sparse reference
//! implementation used by tests and as the default backend.

pub mod engine;
pub mod simple;
pub mod spec;

pub use engine::{TensorEngine, TensorError};
pub use simple::{SimpleTensor, SimpleTensorEngine};
pub use spec::{TensorAddress, TensorSpec};
