//! REX expression trees.
//!
//! The node catalog the parser produces and the compiler consumes.
//! This crate carries no evaluation semantics; it is the contract
//! between the front end and the VM.

pub mod node;

pub use node::{ExprNode, TensorCellNode};
