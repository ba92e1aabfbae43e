//! Evaluation session.
//!
//! A session owns one VM for its whole lifetime and compiles incrementally:
//! each evaluation appends code to the shared code and data segments and
//! resumes the VM from its saved instruction pointer. Globals, and function
//! values created on earlier lines, therefore stay alive across evaluations.

use calc_vm_parser::parse;

use crate::api::EvalError;
use crate::builtins;
use crate::compile::{self, resolve};
use crate::vm::{RuntimeError, Value, Vm};

#[derive(Debug)]
pub struct Session {
    vm: Vm,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a session with the builtins installed.
    pub fn new() -> Self {
        Self::with_vm(Vm::new())
    }

    /// Create a session around a pre-configured VM (e.g. with a custom
    /// call-depth bound).
    pub fn with_vm(vm: Vm) -> Self {
        let mut session = Self { vm };
        for decl in builtins::declarations() {
            session
                .eval_node(decl)
                .expect("builtin declarations always compile and run");
        }
        session
    }

    /// Parse, resolve, compile and run `src`, returning the last
    /// statement's value. Empty input yields the no-result error value.
    pub fn eval(&mut self, src: &str) -> Result<Value, EvalError> {
        let stmts = parse(src)?;
        let mut result = Value::Error(RuntimeError::no_result());
        for stmt in stmts {
            result = self.eval_node(stmt)?;
        }
        Ok(result)
    }

    fn eval_node(&mut self, stmt: calc_vm_parser::ast::Node) -> Result<Value, EvalError> {
        let stmt = resolve::resolve(stmt);
        let (code, data) = self.vm.segments_mut();
        compile::compile(&stmt, code, data)?;
        Ok(self.vm.run()?)
    }

    /// Everything `write` printed since the last take.
    pub fn output(&self) -> &str {
        self.vm.output()
    }

    pub fn take_output(&mut self) -> String {
        self.vm.take_output()
    }

    pub fn vm(&self) -> &Vm {
        &self.vm
    }
}
