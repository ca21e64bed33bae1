//! Expression node catalog.
//!
//! An [`ExprNode`] tree is the compiler's input. The parser owns
//! symbol resolution: parameters arrive as `Symbol(id)` with `id >= 0`
//! being a parameter index and `id < 0` encoding a let binding at
//! depth `-id - 1`.

use serde::{Deserialize, Serialize};

use rex_foundation::{BinaryOp, UnaryOp};

/// One cell of a tensor literal: a sparse address (dimension name to
/// label bindings) and the cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorCellNode {
    /// Dimension name / label pairs, in source order.
    pub address: Vec<(String, String)>,
    /// The cell value.
    pub value: f64,
}

/// A node of a parsed ranking expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExprNode {
    /// Numeric literal.
    Number(f64),
    /// String literal. Collapsed to a hash at compile time; the text
    /// never reaches the VM.
    String(String),
    /// Array literal. Outside an `in` expression its value is its
    /// length; inside an `in` it is the candidate set.
    Array(Vec<ExprNode>),
    /// Parse-error placeholder; evaluates to the error value.
    Error,
    /// Tensor literal given as sparse cells.
    Tensor(Vec<TensorCellNode>),
    /// Parameter reference (`id >= 0`) or let binding (`id < 0`,
    /// depth `-id - 1`).
    Symbol(i32),
    /// Unary operator application.
    Unary {
        op: UnaryOp,
        child: Box<ExprNode>,
    },
    /// Binary operator application.
    Binary {
        op: BinaryOp,
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
    /// Conditional; exactly one branch is evaluated.
    If {
        cond: Box<ExprNode>,
        true_expr: Box<ExprNode>,
        false_expr: Box<ExprNode>,
    },
    /// Local binding: evaluate `value`, bind it, evaluate `body`.
    Let {
        value: Box<ExprNode>,
        body: Box<ExprNode>,
    },
    /// Set membership with short-circuit over the candidates.
    In {
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
    /// Tensor reduction with `+`; `dimension: None` sums everything.
    TensorSum {
        child: Box<ExprNode>,
        dimension: Option<String>,
    },
    /// Element-wise tensor match (multiply).
    TensorMatch {
        lhs: Box<ExprNode>,
        rhs: Box<ExprNode>,
    },
}

impl ExprNode {
    pub fn number(value: f64) -> Self {
        ExprNode::Number(value)
    }

    pub fn string(text: impl Into<String>) -> Self {
        ExprNode::String(text.into())
    }

    pub fn symbol(id: i32) -> Self {
        ExprNode::Symbol(id)
    }

    pub fn unary(op: UnaryOp, child: ExprNode) -> Self {
        ExprNode::Unary {
            op,
            child: Box::new(child),
        }
    }

    pub fn binary(op: BinaryOp, lhs: ExprNode, rhs: ExprNode) -> Self {
        ExprNode::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn add(lhs: ExprNode, rhs: ExprNode) -> Self {
        Self::binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn mul(lhs: ExprNode, rhs: ExprNode) -> Self {
        Self::binary(BinaryOp::Mul, lhs, rhs)
    }

    pub fn if_(cond: ExprNode, true_expr: ExprNode, false_expr: ExprNode) -> Self {
        ExprNode::If {
            cond: Box::new(cond),
            true_expr: Box::new(true_expr),
            false_expr: Box::new(false_expr),
        }
    }

    pub fn let_(value: ExprNode, body: ExprNode) -> Self {
        ExprNode::Let {
            value: Box::new(value),
            body: Box::new(body),
        }
    }

    pub fn in_(lhs: ExprNode, rhs: ExprNode) -> Self {
        ExprNode::In {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn tensor_sum(child: ExprNode) -> Self {
        ExprNode::TensorSum {
            child: Box::new(child),
            dimension: None,
        }
    }

    pub fn tensor_sum_dim(child: ExprNode, dimension: impl Into<String>) -> Self {
        ExprNode::TensorSum {
            child: Box::new(child),
            dimension: Some(dimension.into()),
        }
    }

    pub fn tensor_match(lhs: ExprNode, rhs: ExprNode) -> Self {
        ExprNode::TensorMatch {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Build a tensor literal from `(address, value)` cells, where an
    /// address is a list of `(dimension, label)` bindings.
    pub fn tensor(cells: Vec<(Vec<(&str, &str)>, f64)>) -> Self {
        ExprNode::Tensor(
            cells
                .into_iter()
                .map(|(address, value)| TensorCellNode {
                    address: address
                        .into_iter()
                        .map(|(dim, label)| (dim.to_string(), label.to_string()))
                        .collect(),
                    value,
                })
                .collect(),
        )
    }
}
