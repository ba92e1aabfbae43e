//! Bytecode compiler.
//!
//! Walks the resolved AST and appends instructions to the code segment and
//! constants to the data segment. Every expression compiles to code that
//! leaves exactly one value on the stack; blocks discard all but the last
//! statement's value. Jump offsets are patched in once branch extents are
//! known and are relative to the jump instruction itself.

pub mod resolve;

pub use resolve::resolve;

use std::rc::Rc;

use calc_vm_parser::ast::{BinOp, Node, UnOp};
use thiserror::Error;

use crate::vm::instr::{Instr, OpCode, Operand};
use crate::vm::value::{RuntimeError, Value};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("cannot assign to '{0}'")]
    AssignTarget(String),
}

/// Compile one resolved top-level statement into the given segments.
pub fn compile(
    node: &Node,
    code: &mut Vec<Instr>,
    data: &mut Vec<Value>,
) -> Result<(), CompileError> {
    Compiler {
        code,
        data,
        fn_depth: 0,
    }
    .node(node)
}

#[derive(Debug)]
struct Compiler<'a> {
    code: &'a mut Vec<Instr>,
    data: &'a mut Vec<Value>,
    fn_depth: usize,
}

fn binop_code(op: BinOp) -> OpCode {
    match op {
        BinOp::Add => OpCode::Add,
        BinOp::Sub => OpCode::Sub,
        BinOp::Mul => OpCode::Mul,
        BinOp::Div => OpCode::Div,
        BinOp::Mod => OpCode::Mod,
        BinOp::And => OpCode::And,
        BinOp::Or => OpCode::Or,
        BinOp::Lt => OpCode::Lt,
        BinOp::Gt => OpCode::Gt,
        BinOp::Le => OpCode::Le,
        BinOp::Ge => OpCode::Ge,
        BinOp::Eq => OpCode::Eq,
        BinOp::Ne => OpCode::Ne,
    }
}

impl Compiler<'_> {
    fn emit(&mut self, instr: Instr) -> usize {
        self.code.push(instr);
        self.code.len() - 1
    }

    fn here(&self) -> usize {
        self.code.len()
    }

    /// Intern a constant, reusing an existing data-segment entry when one
    /// compares equal (global names in particular appear many times).
    fn data_index(&mut self, value: Value) -> usize {
        if let Some(index) = self.data.iter().position(|v| *v == value) {
            return index;
        }
        self.data.push(value);
        self.data.len() - 1
    }

    fn push_const(&mut self, value: Value) {
        let index = self.data_index(value);
        self.emit(Instr::unary(OpCode::Push, Operand::data(index)));
    }

    fn global_operand(&mut self, name: &str) -> Operand {
        Operand::global(self.data_index(Value::Str(name.to_string())))
    }

    fn offset(&self, from: usize, to: usize) -> i64 {
        to as i64 - from as i64
    }

    fn node(&mut self, node: &Node) -> Result<(), CompileError> {
        match node {
            Node::Int(i) => self.push_const(Value::Int(*i)),
            Node::Float(f) => self.push_const(Value::Float(*f)),
            Node::Str(s) => self.push_const(Value::Str(s.clone())),
            Node::Bool(b) => self.push_const(Value::Bool(*b)),

            Node::Array(elems) => {
                self.push_const(Value::Array(Rc::new(Vec::new())));
                for elem in elems {
                    self.node(elem)?;
                    self.emit(Instr::binary(OpCode::Arr, Operand::stack(), Operand::stack()));
                }
            }

            Node::Name(name) => {
                let operand = self.global_operand(name);
                self.emit(Instr::unary(OpCode::Push, operand));
            }
            Node::Local(slot) => {
                self.emit(Instr::unary(OpCode::Push, Operand::local(*slot)));
            }
            Node::Captured(slot) => {
                self.emit(Instr::unary(OpCode::Push, Operand::closure(*slot)));
            }

            Node::BinOp { op, left, right } => {
                self.node(left)?;
                self.node(right)?;
                self.emit(Instr::binary(
                    binop_code(*op),
                    Operand::stack(),
                    Operand::stack(),
                ));
            }

            Node::UnOp { op, target } => match op {
                UnOp::Not => {
                    self.node(target)?;
                    self.emit(Instr::unary(OpCode::Not, Operand::stack()));
                }
                UnOp::Len => {
                    self.node(target)?;
                    self.emit(Instr::unary(OpCode::Len, Operand::stack()));
                }
                UnOp::Neg => {
                    // no negation opcode; -x is 0 - x
                    self.push_const(Value::Int(0));
                    self.node(target)?;
                    self.emit(Instr::binary(OpCode::Sub, Operand::stack(), Operand::stack()));
                }
            },

            Node::IndexAt { target, at } => {
                self.node(target)?;
                self.node(at)?;
                self.emit(Instr::binary(OpCode::Ix1, Operand::stack(), Operand::stack()));
            }

            Node::IndexFromTo { target, from, to } => {
                self.node(target)?;
                self.node(from)?;
                self.node(to)?;
                self.emit(Instr::ternary(
                    OpCode::Ix2,
                    Operand::stack(),
                    Operand::stack(),
                    Operand::stack(),
                ));
            }

            Node::If { cond, then } => {
                self.node(cond)?;
                let jmpf = self.emit(Instr::ternary(
                    OpCode::Jmpf,
                    Operand::stack(),
                    Operand::imm(0),
                    Operand::imm(0),
                ));
                self.node(then)?;
                let jmp = self.emit(Instr::unary(OpCode::Jmp, Operand::imm(0)));
                let no_result = self.here();
                self.push_const(Value::Error(RuntimeError::no_result()));
                let end = self.here();
                self.code[jmpf].src1 = Operand::imm(self.offset(jmpf, no_result));
                self.code[jmpf].src2 = Operand::imm(self.offset(jmpf, end));
                self.code[jmp].src0 = Operand::imm(self.offset(jmp, end));
            }

            Node::IfElse {
                cond,
                then,
                otherwise,
            } => {
                self.node(cond)?;
                let jmpf = self.emit(Instr::ternary(
                    OpCode::Jmpf,
                    Operand::stack(),
                    Operand::imm(0),
                    Operand::imm(0),
                ));
                self.node(then)?;
                let jmp = self.emit(Instr::unary(OpCode::Jmp, Operand::imm(0)));
                let else_at = self.here();
                self.node(otherwise)?;
                let end = self.here();
                self.code[jmpf].src1 = Operand::imm(self.offset(jmpf, else_at));
                self.code[jmpf].src2 = Operand::imm(self.offset(jmpf, end));
                self.code[jmp].src0 = Operand::imm(self.offset(jmp, end));
            }

            Node::While { cond, body } => {
                let head = self.here();
                self.node(cond)?;
                let jmpf = self.emit(Instr::ternary(
                    OpCode::Jmpf,
                    Operand::stack(),
                    Operand::imm(0),
                    Operand::imm(0),
                ));
                self.node(body)?;
                // each iteration's value is discarded; the loop itself
                // yields no result
                self.emit(Instr::nullary(OpCode::Pop));
                let back = self.here();
                let offset = self.offset(back, head);
                self.emit(Instr::unary(OpCode::Jmp, Operand::imm(offset)));
                let done = self.here();
                self.push_const(Value::Error(RuntimeError::no_result()));
                let end = self.here();
                self.code[jmpf].src1 = Operand::imm(self.offset(jmpf, done));
                self.code[jmpf].src2 = Operand::imm(self.offset(jmpf, end));
            }

            Node::Block(stmts) => {
                if stmts.is_empty() {
                    self.push_const(Value::Error(RuntimeError::no_result()));
                } else {
                    for (i, stmt) in stmts.iter().enumerate() {
                        self.node(stmt)?;
                        if i + 1 < stmts.len() {
                            self.emit(Instr::nullary(OpCode::Pop));
                        }
                    }
                }
            }

            Node::Assign { target, value } => {
                self.node(value)?;
                let dst = match target.as_ref() {
                    Node::Local(slot) => Operand::local(*slot),
                    Node::Name(name) => self.global_operand(name),
                    other => return Err(CompileError::AssignTarget(other.token())),
                };
                self.emit(Instr::binary(OpCode::Mov, Operand::stack(), dst));
                // the assignment's value is re-read from its destination
                self.emit(Instr::unary(OpCode::Push, dst));
            }

            Node::Call { callee, args } => {
                for arg in args {
                    self.node(arg)?;
                }
                let callee_op = match callee.as_ref() {
                    Node::Local(slot) => Operand::local(*slot),
                    Node::Captured(slot) => Operand::closure(*slot),
                    Node::Name(name) => self.global_operand(name),
                    other => {
                        self.node(other)?;
                        Operand::stack()
                    }
                };
                self.emit(Instr::binary(
                    OpCode::Call,
                    callee_op,
                    Operand::imm(args.len() as i64),
                ));
            }

            Node::Function {
                params,
                body,
                local_cnt,
            } => {
                // the body is compiled in line; top-level flow jumps over it
                let jmp = self.emit(Instr::unary(OpCode::Jmp, Operand::imm(0)));
                let entry = self.here();
                self.fn_depth += 1;
                self.node(body)?;
                self.fn_depth -= 1;
                self.emit(Instr::unary(OpCode::Ret, Operand::stack()));
                let after = self.here();
                self.code[jmp].src0 = Operand::imm(self.offset(jmp, after));
                self.emit(Instr::ternary(
                    OpCode::Func,
                    Operand::imm(entry as i64),
                    Operand::imm(params.len() as i64),
                    Operand::imm(*local_cnt as i64),
                ));
            }

            Node::Return(value) => {
                self.node(value)?;
                // at the top level there is no frame to return from; the
                // value simply becomes the statement's result
                if self.fn_depth > 0 {
                    self.emit(Instr::unary(OpCode::Ret, Operand::stack()));
                }
            }

            Node::Write(value) => {
                self.node(value)?;
                self.emit(Instr::unary(OpCode::Write, Operand::stack()));
            }
            Node::Aton(value) => {
                self.node(value)?;
                self.emit(Instr::unary(OpCode::Aton, Operand::stack()));
            }
            Node::Toa(value) => {
                self.node(value)?;
                self.emit(Instr::unary(OpCode::Toa, Operand::stack()));
            }
            Node::ErrorNode(value) => {
                self.node(value)?;
                self.emit(Instr::unary(OpCode::Err, Operand::stack()));
            }
        }
        Ok(())
    }
}
