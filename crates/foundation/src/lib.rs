//! REX Foundation
//!
//! Core foundational types for the REX ranking-expression engine.
//! Provides the runtime value model, the operator enums shared by the
//! AST and the VM, and stable hashing for string values.

pub mod operators;
pub mod stable_hash;
pub mod value;

pub use operators::{BinaryOp, ReduceOp, UnaryOp};
pub use stable_hash::{fnv1a64, fnv1a64_mix, fnv1a64_str, FNV1A_OFFSET_BASIS_64, FNV1A_PRIME_64};
pub use value::{TensorHandle, Value};
