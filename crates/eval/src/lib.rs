//! REX expression VM.
//!
//! This crate turns a parsed expression tree into a linear program of
//! instructions and executes that program against a caller-supplied
//! parameter vector, producing a single scalar or tensor value.
//!
//! # Execution Model
//!
//! Compilation happens once per function: [`CompiledFunction::compile`]
//! walks the tree in post-order, lowering control flow (`if`, `let`,
//! `in`) to skip instructions and retaining constants in a
//! compile-time stash. Evaluation is a plain fetch/dispatch loop over
//! a [`Context`] that owns the operand stack, the let-binding stack,
//! and a per-evaluation stash for temporaries.
//!
//! Errors are values, not panics: an operation on unsupported
//! operands produces the error value, and every later operation
//! absorbs it. Panics are reserved for VM bugs that no
//! parser-accepted input can trigger.

mod builder;

pub mod context;
pub mod function;
pub mod instr;
pub mod ops;
pub mod stash;
pub mod state;

pub use context::Context;
pub use function::CompiledFunction;
pub use instr::{Instr, Program};
pub use stash::Stash;
pub use state::{State, ValueRef};
