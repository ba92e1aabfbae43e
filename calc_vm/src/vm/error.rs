//! Fatal VM conditions.
//!
//! User-visible failures travel through the stack as `Value::Error` data;
//! the variants here indicate compiler bugs or corrupted state and abort
//! execution.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("value stack underflow")]
    StackUnderflow,

    #[error("local slot {0} out of range")]
    BadLocalSlot(usize),

    #[error("closure slot {0} out of range")]
    BadClosureSlot(usize),

    #[error("data segment index {0} out of range")]
    BadDataIndex(usize),

    #[error("global name at data index {0} is not a string")]
    BadGlobalName(usize),

    #[error("immediate operand expected")]
    ImmediateExpected,

    #[error("operand fetched from an immediate")]
    ImmediateFetched,

    #[error("jump target {0} out of range")]
    BadJumpTarget(i64),

    #[error("MOV destination must be a local slot or a global")]
    BadMovDestination,

    #[error("ARR target is not an array")]
    BadArrayAppend,

    #[error("return address is not an integer")]
    BadReturnAddress,

    #[error("return outside of a call frame")]
    ReturnOutsideCall,

    #[error("closure stack underflow")]
    ClosureUnderflow,
}
