//! VM execution loop.
//!
//! Each iteration decodes the instruction under the instruction pointer,
//! fetches operands per their addressing mode, performs the operation, and
//! advances. Binary operations fetch src0 (the right operand) before src1
//! (the left), so stack operands are pushed left first. The loop halts when
//! the instruction pointer reaches the end of the code segment; the value
//! left on top of the stack is the result.

use std::rc::Rc;

use super::error::VmError;
use super::instr::{AddrMode, Instr, OpCode, Operand};
use super::value::{ArithOp, FunctionValue, LogicOp, RelOp, RuntimeError, Value};
use super::Vm;

impl Vm {
    /// Run until the instruction pointer reaches the end of the code
    /// segment, then pop the result.
    pub fn run(&mut self) -> Result<Value, VmError> {
        while self.ip < self.code.len() {
            let instr = self.code[self.ip];
            match self.step(instr)? {
                Some(target) => self.ip = target,
                None => self.ip += 1,
            }
        }
        self.mem.pop()
    }

    /// Execute one instruction. Returns the next instruction pointer for
    /// control transfers, `None` to fall through.
    fn step(&mut self, instr: Instr) -> Result<Option<usize>, VmError> {
        match instr.op {
            OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div => {
                let op = match instr.op {
                    OpCode::Add => ArithOp::Add,
                    OpCode::Sub => ArithOp::Sub,
                    OpCode::Mul => ArithOp::Mul,
                    _ => ArithOp::Div,
                };
                let right = self.fetch(instr.src0)?;
                let left = self.fetch(instr.src1)?;
                self.mem.push(left.arith(op, &right));
            }

            OpCode::Mod => {
                let right = self.fetch(instr.src0)?;
                let left = self.fetch(instr.src1)?;
                self.mem.push(left.modulo(&right));
            }

            OpCode::And | OpCode::Or => {
                let op = if instr.op == OpCode::And {
                    LogicOp::And
                } else {
                    LogicOp::Or
                };
                let right = self.fetch(instr.src0)?;
                let left = self.fetch(instr.src1)?;
                self.mem.push(left.logic(op, &right));
            }

            OpCode::Not => {
                let target = self.fetch(instr.src0)?;
                self.mem.push(target.not());
            }

            OpCode::Lt | OpCode::Gt | OpCode::Le | OpCode::Ge => {
                let op = match instr.op {
                    OpCode::Lt => RelOp::Lt,
                    OpCode::Gt => RelOp::Gt,
                    OpCode::Le => RelOp::Le,
                    _ => RelOp::Ge,
                };
                let right = self.fetch(instr.src0)?;
                let left = self.fetch(instr.src1)?;
                self.mem.push(left.relational(op, &right));
            }

            OpCode::Eq | OpCode::Ne => {
                let right = self.fetch(instr.src0)?;
                let left = self.fetch(instr.src1)?;
                self.mem.push(left.equality(instr.op == OpCode::Ne, &right));
            }

            OpCode::Len => {
                let target = self.fetch(instr.src0)?;
                self.mem.push(target.length());
            }

            OpCode::Ix1 => {
                let at = self.fetch(instr.src0)?;
                let target = self.fetch(instr.src1)?;
                self.mem.push(target.index_at(&at));
            }

            OpCode::Ix2 => {
                let to = self.fetch(instr.src0)?;
                let from = self.fetch(instr.src1)?;
                let target = self.fetch(instr.src2)?;
                self.mem.push(target.index_range(&from, &to));
            }

            OpCode::Jmp => return Ok(Some(self.jump_target(instr.src0)?)),

            OpCode::Jmpf => {
                match self.fetch(instr.src0)? {
                    Value::Bool(true) => {}
                    Value::Bool(false) => return Ok(Some(self.jump_target(instr.src1)?)),
                    err @ Value::Error(_) => {
                        // a failing condition propagates through the
                        // non-bool exit so the conditional yields it
                        self.mem.push(err);
                        return Ok(Some(self.jump_target(instr.src2)?));
                    }
                    _ => {
                        self.mem.push(Value::Error(RuntimeError::type_error()));
                        return Ok(Some(self.jump_target(instr.src2)?));
                    }
                }
            }

            OpCode::Push => {
                let value = self.fetch(instr.src0)?;
                self.mem.push(value);
            }

            OpCode::Pop => {
                self.mem.pop()?;
            }

            OpCode::Mov => {
                let value = self.fetch(instr.src0)?;
                match instr.src1.mode {
                    AddrMode::Local => self.mem.set_local(instr.src1.addr as usize, value)?,
                    AddrMode::Global => {
                        let name = self.global_name(instr.src1.addr as usize)?;
                        self.mem.set_global(name, value);
                    }
                    _ => return Err(VmError::BadMovDestination),
                }
            }

            OpCode::Arr => {
                let value = self.fetch(instr.src0)?;
                let target = self.fetch(instr.src1)?;
                let Some(elems) = target.as_array() else {
                    // the compiler always seeds ARR with an array literal
                    return Err(VmError::BadArrayAppend);
                };
                let mut out = elems.as_ref().clone();
                out.push(value);
                self.mem.push(Value::Array(Rc::new(out)));
            }

            OpCode::Func => {
                let entry = self.imm(instr.src0)? as usize;
                let param_cnt = self.imm(instr.src1)? as usize;
                let local_cnt = self.imm(instr.src2)? as usize;
                let snapshot = Rc::new(self.mem.frame_slots().to_vec());
                self.mem.push(Value::Function(Rc::new(FunctionValue {
                    entry,
                    param_cnt,
                    local_cnt,
                    snapshot,
                })));
            }

            OpCode::Call => {
                let callee = self.fetch(instr.src0)?;
                let arg_cnt = self.imm(instr.src1)? as usize;
                let func = match callee {
                    Value::Function(f) => f,
                    err @ Value::Error(_) => {
                        self.discard(arg_cnt)?;
                        self.mem.push(err);
                        return Ok(None);
                    }
                    _ => {
                        self.discard(arg_cnt)?;
                        self.mem.push(Value::Error(RuntimeError::type_error()));
                        return Ok(None);
                    }
                };
                if func.param_cnt != arg_cnt {
                    self.discard(arg_cnt)?;
                    self.mem.push(Value::Error(RuntimeError::argument()));
                    return Ok(None);
                }
                if self.mem.frame_depth() >= self.max_depth {
                    self.discard(arg_cnt)?;
                    self.mem.push(Value::Error(RuntimeError::stack_overflow()));
                    return Ok(None);
                }
                self.mem.push_frame(arg_cnt, func.local_cnt)?;
                self.mem.push_closure(Rc::clone(&func.snapshot));
                // the return ip lands exactly at the new frame's base
                self.mem.push(Value::Int(self.ip as i64));
                return Ok(Some(func.entry));
            }

            OpCode::Ret => {
                let saved = self.mem.saved_ip()?;
                let Value::Int(return_ip) = saved else {
                    return Err(VmError::BadReturnAddress);
                };
                let value = self.fetch(instr.src0)?;
                self.mem.pop_closure()?;
                self.mem.pop_frame()?;
                self.mem.push(value);
                return Ok(Some(return_ip as usize + 1));
            }

            OpCode::Write => {
                let value = self.fetch(instr.src0)?;
                self.output.push_str(&format!("{value}\n"));
                self.mem.push(Value::Error(RuntimeError::no_result()));
            }

            OpCode::Aton => {
                let result = match self.fetch(instr.src0)? {
                    err @ Value::Error(_) => err,
                    Value::Str(s) => {
                        if let Ok(i) = s.parse::<i64>() {
                            Value::Int(i)
                        } else if let Ok(f) = s.parse::<f64>() {
                            Value::Float(f)
                        } else {
                            Value::Error(RuntimeError::conversion())
                        }
                    }
                    _ => Value::Error(RuntimeError::type_error()),
                };
                self.mem.push(result);
            }

            OpCode::Toa => {
                let value = self.fetch(instr.src0)?;
                self.mem.push(Value::Str(value.to_string()));
            }

            OpCode::Err => {
                let result = match self.fetch(instr.src0)? {
                    err @ Value::Error(_) => err,
                    Value::Str(s) => Value::Error(RuntimeError::user(s)),
                    _ => Value::Error(RuntimeError::type_error()),
                };
                self.mem.push(result);
            }
        }
        Ok(None)
    }

    /// Fetch an operand value per its addressing mode. Stack operands pop.
    fn fetch(&mut self, operand: Operand) -> Result<Value, VmError> {
        match operand.mode {
            AddrMode::Stack => self.mem.pop(),
            AddrMode::Data => self
                .data
                .get(operand.addr as usize)
                .cloned()
                .ok_or(VmError::BadDataIndex(operand.addr as usize)),
            AddrMode::Local => self.mem.local(operand.addr as usize),
            AddrMode::Closure => self.mem.closure(operand.addr as usize),
            AddrMode::Global => {
                let name = self.global_name(operand.addr as usize)?;
                Ok(self
                    .mem
                    .global(&name)
                    .unwrap_or_else(|| Value::Error(RuntimeError::undefined(&name))))
            }
            AddrMode::Imm => Err(VmError::ImmediateFetched),
        }
    }

    fn imm(&self, operand: Operand) -> Result<i64, VmError> {
        if operand.mode != AddrMode::Imm {
            return Err(VmError::ImmediateExpected);
        }
        Ok(operand.addr)
    }

    /// Resolve a relative jump offset to an absolute instruction index.
    /// Landing one past the end of the code segment halts the VM.
    fn jump_target(&self, operand: Operand) -> Result<usize, VmError> {
        let offset = self.imm(operand)?;
        let target = self.ip as i64 + offset;
        if target < 0 || target as usize > self.code.len() {
            return Err(VmError::BadJumpTarget(target));
        }
        Ok(target as usize)
    }

    fn global_name(&self, index: usize) -> Result<String, VmError> {
        let value = self.data.get(index).ok_or(VmError::BadDataIndex(index))?;
        match value.as_str() {
            Some(name) => Ok(name.to_string()),
            None => Err(VmError::BadGlobalName(index)),
        }
    }

    /// Drop the arguments of a call that will not happen, keeping the
    /// one-result-per-expression stack discipline.
    fn discard(&mut self, count: usize) -> Result<(), VmError> {
        for _ in 0..count {
            self.mem.pop()?;
        }
        Ok(())
    }
}
