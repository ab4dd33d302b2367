//! Non-instruction value kinds: constants, arguments and globals.

use crate::ir::entities::{Value, ValueData, ValueKind};
use crate::ir::types::Type;

/// Integer constant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Integer {
  value: i32,
}

impl Integer {
  /// Creates a new integer constant with the given type.
  pub(in crate::ir) fn new_data(value: i32, ty: Type) -> ValueData {
    ValueData::new(ty, ValueKind::Integer(Self { value }))
  }

  /// Returns the integer value.
  pub fn value(&self) -> i32 {
    self.value
  }
}

/// Undefined value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Undef;

impl Undef {
  pub(in crate::ir) fn new_data(ty: Type) -> ValueData {
    ValueData::new(ty, ValueKind::Undef(Self))
  }
}

/// Function argument reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FuncArgRef {
  index: usize,
}

impl FuncArgRef {
  pub(in crate::ir) fn new_data(index: usize, ty: Type) -> ValueData {
    ValueData::new(ty, ValueKind::FuncArgRef(Self { index }))
  }

  /// Returns the index of the argument.
  pub fn index(&self) -> usize {
    self.index
  }
}

/// Global variable.
///
/// The initializer is operand 0, the type of the global value is a
/// pointer to the type of the initializer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlobalAlloc {
  is_const: bool,
}

impl GlobalAlloc {
  pub(in crate::ir) fn new_data(init: Value, ty: Type, is_const: bool) -> ValueData {
    ValueData::with_operands(ty, ValueKind::GlobalAlloc(Self { is_const }), vec![init])
  }

  /// Checks if the global variable is a constant.
  pub fn is_const(&self) -> bool {
    self.is_const
  }
}
