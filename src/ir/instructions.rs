//! Instruction kinds, opcodes and operators.
//!
//! Operands of instructions are not stored here. They live in the
//! operand table of the instruction's [`ValueData`], so that every
//! operand slot goes through the use-def bookkeeping of the
//! [`DataFlowGraph`](crate::ir::dfg::DataFlowGraph). The structs in this
//! module only hold what is not an operand: operators, the allocated
//! type, and so on. The operand layout of every instruction is listed
//! on its struct.

use crate::ir::entities::{Value, ValueData, ValueKind};
use crate::ir::types::Type;
use std::fmt;

/// Opcode of instructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
  Add,
  Sub,
  Mul,
  SDiv,
  Mod,
  Cmp,
  Call,
  Br,
  Ret,
  GetElementPtr,
  Store,
  Load,
  Alloca,
  Zext,
  Phi,
}

impl fmt::Display for Opcode {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(match self {
      Opcode::Add => "add",
      Opcode::Sub => "sub",
      Opcode::Mul => "mul",
      Opcode::SDiv => "sdiv",
      Opcode::Mod => "mod",
      Opcode::Cmp => "cmp",
      Opcode::Call => "call",
      Opcode::Br => "br",
      Opcode::Ret => "ret",
      Opcode::GetElementPtr => "getelementptr",
      Opcode::Store => "store",
      Opcode::Load => "load",
      Opcode::Alloca => "alloca",
      Opcode::Zext => "zext",
      Opcode::Phi => "phi",
    })
  }
}

/// Supported binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  SDiv,
  Mod,
}

impl BinaryOp {
  /// Returns the opcode of the operator.
  pub fn opcode(self) -> Opcode {
    match self {
      BinaryOp::Add => Opcode::Add,
      BinaryOp::Sub => Opcode::Sub,
      BinaryOp::Mul => Opcode::Mul,
      BinaryOp::SDiv => Opcode::SDiv,
      BinaryOp::Mod => Opcode::Mod,
    }
  }

  /// Evaluates the operator on two constants.
  ///
  /// Arithmetic wraps on overflow. Division and modulo truncate toward
  /// zero, and produce `0` when `rhs` is zero instead of trapping.
  pub fn eval(self, lhs: i32, rhs: i32) -> i32 {
    match self {
      BinaryOp::Add => lhs.wrapping_add(rhs),
      BinaryOp::Sub => lhs.wrapping_sub(rhs),
      BinaryOp::Mul => lhs.wrapping_mul(rhs),
      BinaryOp::SDiv if rhs == 0 => 0,
      BinaryOp::SDiv => lhs.wrapping_div(rhs),
      BinaryOp::Mod if rhs == 0 => 0,
      BinaryOp::Mod => lhs.wrapping_rem(rhs),
    }
  }
}

impl fmt::Display for BinaryOp {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.opcode())
  }
}

/// Supported comparison kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
  Gt,
  Ge,
  Eq,
  Ne,
  Lt,
  Le,
}

impl CmpOp {
  /// Evaluates the comparison on two constants.
  pub fn eval(self, lhs: i32, rhs: i32) -> bool {
    match self {
      CmpOp::Gt => lhs > rhs,
      CmpOp::Ge => lhs >= rhs,
      CmpOp::Eq => lhs == rhs,
      CmpOp::Ne => lhs != rhs,
      CmpOp::Lt => lhs < rhs,
      CmpOp::Le => lhs <= rhs,
    }
  }
}

impl fmt::Display for CmpOp {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(match self {
      CmpOp::Gt => "gt",
      CmpOp::Ge => "ge",
      CmpOp::Eq => "eq",
      CmpOp::Ne => "ne",
      CmpOp::Lt => "lt",
      CmpOp::Le => "le",
    })
  }
}

/// Binary operation.
///
/// Operands: `[lhs, rhs]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binary {
  op: BinaryOp,
}

impl Binary {
  pub(in crate::ir) fn new_data(op: BinaryOp, lhs: Value, rhs: Value) -> ValueData {
    ValueData::with_operands(
      Type::get_i32(),
      ValueKind::Binary(Self { op }),
      vec![lhs, rhs],
    )
  }

  /// Returns the binary operator.
  pub fn op(&self) -> BinaryOp {
    self.op
  }
}

/// Comparison.
///
/// Operands: `[lhs, rhs]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cmp {
  op: CmpOp,
}

impl Cmp {
  pub(in crate::ir) fn new_data(op: CmpOp, lhs: Value, rhs: Value) -> ValueData {
    ValueData::with_operands(Type::get_i1(), ValueKind::Cmp(Self { op }), vec![lhs, rhs])
  }

  /// Returns the comparison kind.
  pub fn op(&self) -> CmpOp {
    self.op
  }
}

/// Function call.
///
/// Operands: `[callee, arg0, arg1, ...]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Call;

impl Call {
  pub(in crate::ir) fn new_data(callee: Value, args: Vec<Value>, ty: Type) -> ValueData {
    let mut operands = Vec::with_capacity(args.len() + 1);
    operands.push(callee);
    operands.extend(args);
    ValueData::with_operands(ty, ValueKind::Call(Self), operands)
  }
}

/// Branch.
///
/// Operands: `[cond, true_bb, false_bb]` for conditional branches,
/// `[target]` for unconditional ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Branch;

impl Branch {
  pub(in crate::ir) fn new_cond_data(cond: Value, true_bb: Value, false_bb: Value) -> ValueData {
    ValueData::with_operands(
      Type::get_void(),
      ValueKind::Branch(Self),
      vec![cond, true_bb, false_bb],
    )
  }

  pub(in crate::ir) fn new_data(target: Value) -> ValueData {
    ValueData::with_operands(Type::get_void(), ValueKind::Branch(Self), vec![target])
  }
}

/// Function return.
///
/// Operands: `[value]`, or `[]` for returns without a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Return;

impl Return {
  pub(in crate::ir) fn new_data(value: Option<Value>) -> ValueData {
    ValueData::with_operands(
      Type::get_void(),
      ValueKind::Return(Self),
      value.into_iter().collect(),
    )
  }
}

/// Element pointer calculation.
///
/// Operands: `[ptr, index0, index1, ...]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetElemPtr {
  elem_ty: Type,
}

impl GetElemPtr {
  pub(in crate::ir) fn new_data(ptr: Value, idxs: Vec<Value>, elem_ty: Type) -> ValueData {
    let mut operands = Vec::with_capacity(idxs.len() + 1);
    operands.push(ptr);
    operands.extend(idxs);
    ValueData::with_operands(
      Type::get_pointer(elem_ty.clone()),
      ValueKind::GetElemPtr(Self { elem_ty }),
      operands,
    )
  }

  /// Returns the element type that the result points to.
  pub fn elem_ty(&self) -> &Type {
    &self.elem_ty
  }
}

/// Memory store.
///
/// Operands: `[value, dest]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Store;

impl Store {
  pub(in crate::ir) fn new_data(value: Value, dest: Value) -> ValueData {
    ValueData::with_operands(Type::get_void(), ValueKind::Store(Self), vec![value, dest])
  }
}

/// Memory load.
///
/// Operands: `[src]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Load;

impl Load {
  pub(in crate::ir) fn new_data(src: Value, ty: Type) -> ValueData {
    ValueData::with_operands(ty, ValueKind::Load(Self), vec![src])
  }
}

/// Local memory allocation.
///
/// No operands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alloca {
  ty: Type,
}

impl Alloca {
  pub(in crate::ir) fn new_data(ty: Type) -> ValueData {
    ValueData::new(Type::get_pointer(ty.clone()), ValueKind::Alloca(Self { ty }))
  }

  /// Returns the allocated type.
  pub fn alloca_ty(&self) -> &Type {
    &self.ty
  }
}

/// Zero extension.
///
/// Operands: `[value]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Zext {
  dest_ty: Type,
}

impl Zext {
  pub(in crate::ir) fn new_data(value: Value, dest_ty: Type) -> ValueData {
    ValueData::with_operands(
      dest_ty.clone(),
      ValueKind::Zext(Self { dest_ty }),
      vec![value],
    )
  }

  /// Returns the destination type.
  pub fn dest_ty(&self) -> &Type {
    &self.dest_ty
  }
}

/// Phi function.
///
/// Operands: `[value0, bb0, value1, bb1, ...]`, grown pair by pair as
/// incoming edges are discovered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Phi;

impl Phi {
  pub(in crate::ir) fn new_data(ty: Type) -> ValueData {
    ValueData::new(ty, ValueKind::Phi(Self))
  }
}
