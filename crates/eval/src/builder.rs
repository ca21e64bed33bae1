//! Program builder: expression tree to instruction lowering.
//!
//! An explicit recursive compiler over [`ExprNode`]. Most nodes emit
//! their children in post-order followed by a single instruction;
//! control-flow nodes (`if`, `let`, `in`) and array literals
//! interleave child emission with skip instructions and backpatch the
//! offsets once the branch targets are known.

use std::collections::BTreeSet;

use rex_expr::{ExprNode, TensorCellNode};
use rex_foundation::{fnv1a64_str, BinaryOp, Value};
use rex_tensor::{TensorAddress, TensorEngine, TensorSpec};

use crate::instr::{Instr, Program};
use crate::stash::Stash;

/// Stateful lowering pass. One builder compiles one expression tree
/// into one program, stashing constants as it goes.
pub(crate) struct ProgramBuilder<'a> {
    program: &'a mut Program,
    stash: &'a mut Stash,
    engine: &'a dyn TensorEngine,
}

impl<'a> ProgramBuilder<'a> {
    pub(crate) fn new(
        program: &'a mut Program,
        stash: &'a mut Stash,
        engine: &'a dyn TensorEngine,
    ) -> Self {
        Self {
            program,
            stash,
            engine,
        }
    }

    pub(crate) fn compile(&mut self, node: &ExprNode) {
        match node {
            ExprNode::Number(value) => self.emit_const(Value::Double(*value)),
            // Strings never reach the VM as text; the hash is widened
            // to a double so membership and equality stay plain
            // scalar comparisons.
            ExprNode::String(text) => self.emit_const(Value::Double(fnv1a64_str(text) as f64)),
            // A bare array evaluates to its length.
            ExprNode::Array(items) => self.emit_const(Value::Double(items.len() as f64)),
            ExprNode::Error => self.emit_const(Value::Error),
            ExprNode::Tensor(cells) => self.compile_tensor(cells),
            ExprNode::Symbol(id) => {
                if *id >= 0 {
                    self.program.emit(Instr::LoadParam(*id as u32));
                } else {
                    let let_offset = -(id + 1);
                    self.program.emit(Instr::LoadLet(let_offset as u32));
                }
            }
            ExprNode::Unary { op, child } => {
                self.compile(child);
                self.program.emit(Instr::UnaryFn(*op));
            }
            ExprNode::Binary { op, lhs, rhs } => {
                self.compile(lhs);
                self.compile(rhs);
                // The infix power operator shares the pow instruction.
                let op = match op {
                    BinaryOp::Pow2 => BinaryOp::Pow,
                    other => *other,
                };
                self.program.emit(Instr::BinaryFn(op));
            }
            ExprNode::If {
                cond,
                true_expr,
                false_expr,
            } => self.compile_if(cond, true_expr, false_expr),
            ExprNode::Let { value, body } => {
                self.compile(value);
                self.program.emit(Instr::StoreLet);
                self.compile(body);
                self.program.emit(Instr::EvictLet);
            }
            ExprNode::In { lhs, rhs } => self.compile_in(lhs, rhs),
            ExprNode::TensorSum { child, dimension } => {
                self.compile(child);
                match dimension {
                    None => self.program.emit(Instr::TensorSum),
                    Some(name) => {
                        let index = self.program.add_dim_name(name);
                        self.program.emit(Instr::TensorSumDim(index));
                    }
                }
            }
            ExprNode::TensorMatch { lhs, rhs } => {
                self.compile(lhs);
                self.compile(rhs);
                self.program.emit(Instr::BinaryFn(BinaryOp::Mul));
            }
        }
    }

    fn emit_const(&mut self, value: Value) {
        let index = self.stash.put(value);
        self.program.emit(Instr::LoadConst(index));
    }

    /// Lower a conditional to single-branch evaluation: the condition
    /// skips over the true body on false, and the true body skips over
    /// the false body on completion.
    fn compile_if(&mut self, cond: &ExprNode, true_expr: &ExprNode, false_expr: &ExprNode) {
        self.compile(cond);
        let branch = self.program.offset();
        self.program.emit(Instr::SkipIfFalse(0));
        self.compile(true_expr);
        let jump = self.program.offset();
        self.program.emit(Instr::Skip(0));
        self.compile(false_expr);
        // Offsets are relative to the already-advanced program
        // counter: the branch lands just past the Skip, the Skip lands
        // at the end of the false body.
        self.program.patch_skip(branch, (jump - branch) as i32);
        let end = self.program.offset();
        self.program.patch_skip(jump, (end - jump - 1) as i32);
    }

    /// Lower set membership: the lhs is compared against one
    /// candidate at a time, and the first match skips past every
    /// remaining candidate and the final not-member marker.
    fn compile_in(&mut self, lhs: &ExprNode, rhs: &ExprNode) {
        self.compile(lhs);
        let mut checks = Vec::new();
        let candidates: &[ExprNode] = match rhs {
            ExprNode::Array(items) => items.as_slice(),
            single => std::slice::from_ref(single),
        };
        for candidate in candidates {
            self.compile(candidate);
            checks.push(self.program.offset());
            self.program.emit(Instr::CheckMember(0));
        }
        let end_of_checks = self.program.offset();
        for check in checks {
            self.program.patch_skip(check, (end_of_checks - check) as i32);
        }
        self.program.emit(Instr::NotMember);
    }

    /// Materialize a tensor literal at compile time. The dimension
    /// set is the union over all cell addresses; a spec the engine
    /// rejects degrades to an error constant instead of aborting the
    /// compilation.
    fn compile_tensor(&mut self, cells: &[TensorCellNode]) {
        let mut dimension_names = BTreeSet::new();
        for cell in cells {
            for (dim, _) in &cell.address {
                dimension_names.insert(dim.clone());
            }
        }
        let mut spec = TensorSpec::new(dimension_names);
        for cell in cells {
            spec.add(TensorAddress::new(cell.address.clone()), cell.value);
        }
        let constant = match self.engine.create(&spec) {
            Ok(handle) => Value::Tensor(handle),
            Err(error) => {
                tracing::debug!(%error, "tensor literal rejected by engine");
                Value::Error
            }
        };
        self.emit_const(constant);
    }
}
