//! Operation table.
//!
//! Total functions over values: every operation returns a value for
//! every input, with unsupported operands mapping to the error value.
//! All numeric operations are defined over the `Double` variant only;
//! strings and tensors reach this table solely through errors, since
//! the builder lowers strings to hashes and routes tensor work to the
//! engine.

use rex_foundation::{BinaryOp, UnaryOp, Value};

/// Relative tolerance of the `~` operator.
pub const APPROX_TOLERANCE: f64 = 1e-6;

/// Approximate equality within [`APPROX_TOLERANCE`], relative to the
/// larger operand magnitude. Exact equality short-circuits so that
/// zero compares equal to zero; non-finite operands compare exactly,
/// since the relative-tolerance term would otherwise swallow any
/// finite distance to an infinity.
pub fn approx_equal(a: f64, b: f64) -> bool {
    if a == b {
        return true;
    }
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    (a - b).abs() <= APPROX_TOLERANCE * a.abs().max(b.abs())
}

fn truthy(x: f64) -> bool {
    Value::Double(x).as_bool()
}

fn boolean(b: bool) -> Value {
    Value::Double(if b { 1.0 } else { 0.0 })
}

/// Apply a unary operation. Non-scalar operands produce the error
/// value.
pub fn apply_unary(op: UnaryOp, value: &Value) -> Value {
    let Some(a) = value.as_double() else {
        return Value::Error;
    };
    match op {
        UnaryOp::Neg => Value::Double(-a),
        UnaryOp::Not => boolean(!truthy(a)),
        UnaryOp::Cos => Value::Double(a.cos()),
        UnaryOp::Sin => Value::Double(a.sin()),
        UnaryOp::Tan => Value::Double(a.tan()),
        UnaryOp::Cosh => Value::Double(a.cosh()),
        UnaryOp::Sinh => Value::Double(a.sinh()),
        UnaryOp::Tanh => Value::Double(a.tanh()),
        UnaryOp::Acos => Value::Double(a.acos()),
        UnaryOp::Asin => Value::Double(a.asin()),
        UnaryOp::Atan => Value::Double(a.atan()),
        UnaryOp::Exp => Value::Double(a.exp()),
        UnaryOp::Log => Value::Double(a.ln()),
        UnaryOp::Log10 => Value::Double(a.log10()),
        UnaryOp::Sqrt => Value::Double(a.sqrt()),
        UnaryOp::Ceil => Value::Double(a.ceil()),
        UnaryOp::Floor => Value::Double(a.floor()),
        UnaryOp::Fabs => Value::Double(a.abs()),
        UnaryOp::IsNan => boolean(a.is_nan()),
        UnaryOp::Relu => Value::Double(a.max(0.0)),
    }
}

/// Apply a binary operation. A non-scalar operand on either side
/// produces the error value.
pub fn apply_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    let (Some(a), Some(b)) = (lhs.as_double(), rhs.as_double()) else {
        return Value::Error;
    };
    match op {
        BinaryOp::Add => Value::Double(a + b),
        BinaryOp::Sub => Value::Double(a - b),
        BinaryOp::Mul => Value::Double(a * b),
        BinaryOp::Div => Value::Double(a / b),
        BinaryOp::Pow | BinaryOp::Pow2 => Value::Double(a.powf(b)),
        BinaryOp::Atan2 => Value::Double(a.atan2(b)),
        BinaryOp::Ldexp => Value::Double(a * 2.0f64.powi(b as i32)),
        BinaryOp::Fmod => Value::Double(a % b),
        BinaryOp::Min => Value::Double(a.min(b)),
        BinaryOp::Max => Value::Double(a.max(b)),
        BinaryOp::Equal => boolean(a == b),
        BinaryOp::NotEqual => boolean(a != b),
        BinaryOp::Approx => boolean(approx_equal(a, b)),
        BinaryOp::Less => boolean(a < b),
        BinaryOp::LessEqual => boolean(a <= b),
        BinaryOp::Greater => boolean(a > b),
        BinaryOp::GreaterEqual => boolean(a >= b),
        BinaryOp::And => boolean(truthy(a) && truthy(b)),
        BinaryOp::Or => boolean(truthy(a) || truthy(b)),
    }
}
