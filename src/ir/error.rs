use crate::ir::entities::{BasicBlock, Value};
use thiserror::Error;

/// Errors of the recoverable IR mutations.
///
/// Malformed construction (wrong operand types, missing values and so
/// on) is a bug of the caller and panics instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IrError {
  #[error("operand index {index} is out of range for {user:?} with {len} operands")]
  OperandOutOfRange {
    user: Value,
    index: usize,
    len: usize,
  },
  #[error("{value:?} is still used by {users} user(s)")]
  ValueInUse { value: Value, users: usize },
  #[error("{0:?} is not an instruction")]
  NotInstruction(Value),
  #[error("instruction {inst:?} is already attached to {bb:?}")]
  AlreadyAttached { inst: Value, bb: BasicBlock },
  #[error("{0:?} is not a basic block")]
  NotBasicBlock(Value),
  #[error("{0:?} is not a function")]
  NotFunction(Value),
}

/// Result type of the recoverable IR mutations.
pub type Result<T> = std::result::Result<T, IrError>;
