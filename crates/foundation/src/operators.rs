//! Operators for ranking expressions.
//!
//! These operator enums are used consistently across the AST and the
//! VM to avoid duplication and 1:1 conversion boilerplate. Their
//! numeric semantics live in the evaluator's operation table.

use serde::{Deserialize, Serialize};

/// Unary operators and single-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Numeric negation: `-x`.
    Neg,
    /// Logical not: `!x`.
    Not,
    Cos,
    Sin,
    Tan,
    Cosh,
    Sinh,
    Tanh,
    Acos,
    Asin,
    Atan,
    Exp,
    /// Natural logarithm.
    Log,
    Log10,
    Sqrt,
    Ceil,
    Floor,
    /// Absolute value.
    Fabs,
    /// NaN test: 1 when the operand is NaN, else 0.
    IsNan,
    /// Rectifier: `max(x, 0)`.
    Relu,
}

/// Binary operators and two-argument functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition: `a + b`.
    Add,
    /// Subtraction: `a - b`.
    Sub,
    /// Multiplication: `a * b`.
    Mul,
    /// Division: `a / b`.
    Div,
    /// Exponentiation via the `pow(a, b)` function form.
    Pow,
    /// Exponentiation via the infix `a ^ b` form; same semantics as
    /// [`BinaryOp::Pow`] and lowered to the same instruction.
    Pow2,
    Atan2,
    /// Scale by a power of two: `a * 2^b`, with `b` truncated to an
    /// integer exponent.
    Ldexp,
    /// Floating-point remainder with the sign of the dividend.
    Fmod,
    Min,
    Max,
    /// Equality: `a == b`.
    Equal,
    /// Inequality: `a != b`.
    NotEqual,
    /// Approximate equality: `a ~ b`, within a fixed relative
    /// tolerance.
    Approx,
    /// Less than: `a < b`.
    Less,
    /// Less than or equal: `a <= b`.
    LessEqual,
    /// Greater than: `a > b`.
    Greater,
    /// Greater than or equal: `a >= b`.
    GreaterEqual,
    /// Logical and. Strict: both operands are always computed.
    And,
    /// Logical or. Strict: both operands are always computed.
    Or,
}

/// Reduction operators carried to the tensor engine.
///
/// The VM only emits `Add` (for `sum`), but engines implement the full
/// set so dimension reductions stay a single code path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReduceOp {
    /// Sum of cell values.
    Add,
    /// Product of cell values.
    Mul,
    /// Minimum cell value.
    Min,
    /// Maximum cell value.
    Max,
}

impl ReduceOp {
    /// The accumulator a reduction starts from.
    pub fn identity(self) -> f64 {
        match self {
            ReduceOp::Add => 0.0,
            ReduceOp::Mul => 1.0,
            ReduceOp::Min => f64::INFINITY,
            ReduceOp::Max => f64::NEG_INFINITY,
        }
    }

    /// Combine an accumulator with the next cell value.
    pub fn combine(self, acc: f64, value: f64) -> f64 {
        match self {
            ReduceOp::Add => acc + value,
            ReduceOp::Mul => acc * value,
            ReduceOp::Min => acc.min(value),
            ReduceOp::Max => acc.max(value),
        }
    }
}
