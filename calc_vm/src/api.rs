//! Rust API for evaluating calc code programmatically.

use calc_vm_parser::ParseError;
use thiserror::Error;

use crate::compile::CompileError;
use crate::repl::Session;
use crate::vm::{Value, VmError};

/// Everything that can stop an evaluation before it produces a value.
/// Runtime failures do not appear here: they are `Value::Error` results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Compile(#[from] CompileError),
    #[error("internal vm error: {0}")]
    Vm(#[from] VmError),
}

/// Evaluate calc source in a fresh session, returning the final value.
pub fn eval_str(src: &str) -> Result<Value, EvalError> {
    Session::new().eval(src)
}

/// Evaluate calc source in a fresh session, returning the final value and
/// everything the program wrote.
pub fn eval_str_with_output(src: &str) -> Result<(Value, String), EvalError> {
    let mut session = Session::new();
    let value = session.eval(src)?;
    Ok((value, session.take_output()))
}
