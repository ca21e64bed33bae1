//! Compiled function and evaluation driver.
//!
//! A [`CompiledFunction`] is immutable after construction: the
//! instruction sequence, the compile stash holding its constants, and
//! the tensor engine handle. Evaluation mutates only the caller's
//! [`Context`], so one function may be shared by any number of
//! threads, each with its own context.

use std::sync::Arc;

use tracing::{debug, trace};

use rex_expr::ExprNode;
use rex_foundation::{BinaryOp, ReduceOp, Value};
use rex_tensor::TensorEngine;

use crate::builder::ProgramBuilder;
use crate::context::Context;
use crate::instr::{Instr, Program};
use crate::ops;
use crate::stash::Stash;
use crate::state::{State, ValueRef};

/// A compiled ranking expression: program, constants, and the engine
/// backing its tensor operations.
#[derive(Debug)]
pub struct CompiledFunction {
    program: Program,
    stash: Stash,
    num_params: usize,
    engine: Arc<dyn TensorEngine>,
}

impl CompiledFunction {
    /// Compile an expression tree.
    ///
    /// Compilation is deterministic: structurally identical trees
    /// produce identical programs. It never fails; malformed tensor
    /// literals become error constants.
    pub fn compile(engine: Arc<dyn TensorEngine>, root: &ExprNode, num_params: usize) -> Self {
        let mut program = Program::new();
        let mut stash = Stash::new();
        ProgramBuilder::new(&mut program, &mut stash, engine.as_ref()).compile(root);
        debug!(
            instructions = program.len(),
            constants = stash.len(),
            num_params,
            "expression compiled"
        );
        Self {
            program,
            stash,
            num_params,
            engine,
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        program: Program,
        stash: Stash,
        num_params: usize,
        engine: Arc<dyn TensorEngine>,
    ) -> Self {
        Self {
            program,
            stash,
            num_params,
            engine,
        }
    }

    pub fn num_params(&self) -> usize {
        self.num_params
    }

    pub fn instruction_count(&self) -> usize {
        self.program.len()
    }

    /// The compiled instruction sequence, usable as a disassembly.
    pub fn instructions(&self) -> &[Instr] {
        self.program.instrs()
    }

    /// Evaluate against the parameters in `ctx`.
    ///
    /// The returned reference stays valid until the next `eval` on the
    /// same context; the borrow checker enforces exactly that. A
    /// program that terminates with anything but a single stack entry
    /// yields the error value.
    ///
    /// # Panics
    ///
    /// Panics when the context holds a different number of parameters
    /// than the function was compiled for.
    pub fn eval<'c>(&'c self, ctx: &'c mut Context) -> &'c Value {
        let top = {
            let state = &mut ctx.state;
            state.reset();
            assert_eq!(
                state.params.len(),
                self.num_params,
                "context holds {} params but function takes {}",
                state.params.len(),
                self.num_params
            );
            let mut machine = Machine {
                function: self,
                state,
            };
            while machine.state.program_offset < self.program.len() {
                let instr = self.program.instr(machine.state.program_offset);
                machine.state.program_offset += 1;
                machine.step(instr);
            }
            if machine.state.stack.len() != 1 {
                let index = machine.state.stash.put(Value::Error);
                machine.state.stack.push(ValueRef::Temp(index));
            }
            trace!(
                if_cnt = machine.state.if_cnt,
                temps = machine.state.stash.len(),
                "evaluation finished"
            );
            *machine
                .state
                .stack
                .last()
                .expect("vm bug: empty stack after evaluation")
        };
        match top {
            ValueRef::Const(index) => self.stash.get(index),
            ValueRef::Param(index) => &ctx.state.params[index as usize],
            ValueRef::Temp(index) => ctx.state.stash.get(index),
        }
    }
}

/// One in-flight evaluation: the immutable function plus the mutable
/// state, with ref resolution across the three value pools.
struct Machine<'a> {
    function: &'a CompiledFunction,
    state: &'a mut State,
}

impl Machine<'_> {
    fn value(&self, vref: ValueRef) -> &Value {
        match vref {
            ValueRef::Const(index) => self.function.stash.get(index),
            ValueRef::Param(index) => &self.state.params[index as usize],
            ValueRef::Temp(index) => self.state.stash.get(index),
        }
    }

    fn peek_ref(&self, depth: usize) -> ValueRef {
        let index = self
            .state
            .stack
            .len()
            .checked_sub(1 + depth)
            .expect("vm bug: stack underflow");
        self.state.stack[index]
    }

    fn peek(&self, depth: usize) -> &Value {
        self.value(self.peek_ref(depth))
    }

    fn pop(&mut self) -> ValueRef {
        self.state.stack.pop().expect("vm bug: stack underflow")
    }

    fn push_temp(&mut self, value: Value) {
        let index = self.state.stash.put(value);
        self.state.stack.push(ValueRef::Temp(index));
    }

    fn replace(&mut self, count: usize, value: Value) {
        for _ in 0..count {
            self.pop();
        }
        self.push_temp(value);
    }

    fn jump(&mut self, offset: i32) {
        let target = self
            .state
            .program_offset
            .checked_add_signed(offset as isize)
            .expect("vm bug: jump before program start");
        assert!(
            target <= self.function.program.len(),
            "vm bug: jump past end of program"
        );
        self.state.program_offset = target;
    }

    fn step(&mut self, instr: Instr) {
        match instr {
            Instr::LoadConst(index) => self.state.stack.push(ValueRef::Const(index)),
            Instr::LoadParam(index) => {
                assert!(
                    (index as usize) < self.state.params.len(),
                    "vm bug: parameter index out of range"
                );
                self.state.stack.push(ValueRef::Param(index));
            }
            Instr::LoadLet(offset) => {
                let vref = *self
                    .state
                    .let_values
                    .get(offset as usize)
                    .expect("vm bug: let binding out of range");
                self.state.stack.push(vref);
            }
            Instr::UnaryFn(op) => {
                let result = ops::apply_unary(op, self.peek(0));
                self.replace(1, result);
            }
            Instr::BinaryFn(op) => {
                let result = self.binary(op);
                self.replace(2, result);
            }
            Instr::Skip(offset) => self.jump(offset),
            Instr::SkipIfFalse(offset) => {
                self.state.if_cnt += 1;
                let skip = !self.peek(0).as_bool();
                self.pop();
                if skip {
                    self.jump(offset);
                }
            }
            Instr::StoreLet => {
                let vref = self.pop();
                self.state.let_values.push(vref);
            }
            Instr::EvictLet => {
                self.state
                    .let_values
                    .pop()
                    .expect("vm bug: let stack underflow");
            }
            Instr::CheckMember(offset) => {
                if self.peek(1).equal(self.peek(0)) {
                    self.replace(2, Value::Double(1.0));
                    self.jump(offset);
                } else {
                    self.pop();
                }
            }
            Instr::NotMember => {
                self.pop();
                self.push_temp(Value::Double(0.0));
            }
            Instr::TensorSum => self.tensor_sum(&[]),
            Instr::TensorSumDim(index) => {
                let function = self.function;
                let dimension = std::slice::from_ref(function.program.dim_name(index));
                self.tensor_sum(dimension);
            }
        }
    }

    /// Element-wise multiply of two tensor operands is the tensor
    /// match semantics and belongs to the engine; every other operand
    /// mix goes through the scalar operation table, which maps
    /// non-doubles to the error value.
    fn binary(&self, op: BinaryOp) -> Value {
        if matches!(op, BinaryOp::Mul) {
            if let (Some(lhs), Some(rhs)) = (self.peek(1).as_tensor(), self.peek(0).as_tensor()) {
                return self.function.engine.multiply(lhs, rhs);
            }
        }
        ops::apply_binary(op, self.peek(1), self.peek(0))
    }

    fn tensor_sum(&mut self, dimensions: &[String]) {
        let tensor = self.peek(0).as_tensor().cloned();
        let result = match tensor {
            Some(handle) => self
                .function
                .engine
                .reduce(&handle, ReduceOp::Add, dimensions),
            None => Value::Error,
        };
        self.replace(1, result);
    }
}
