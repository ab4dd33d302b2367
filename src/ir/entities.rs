//! IR entities, including modules ([`Module`]), functions ([`Function`],
//! [`FunctionData`]), basic blocks ([`BasicBlock`], [`BasicBlockData`])
//! and values ([`Value`], [`ValueData`]).
//!
//! Basic blocks and functions are values as well: a branch refers to
//! its targets and a call refers to its callee through ordinary operand
//! slots, so they take part in the use-def bookkeeping like any other
//! value. [`BasicBlock`] and [`Function`] are typed wrappers of the
//! underlying [`Value`] handle.

use crate::ir::dfg::DataFlowGraph;
use crate::ir::idman::ValueId;
use crate::ir::instructions::{self, Opcode};
use crate::ir::layout::{new_inst_list, InstList};
use crate::ir::types::Type;
use crate::ir::values;
use std::collections::HashSet;

/// An IR module.
///
/// Modules hold global variables and functions, and own the data flow
/// graph that stores every value of the module.
pub struct Module {
  name: String,
  dfg: DataFlowGraph,
  func_layout: Vec<Function>,
  global_layout: Vec<Value>,
}

impl Module {
  /// Creates a new module with the given name.
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      dfg: DataFlowGraph::new(),
      func_layout: Vec::new(),
      global_layout: Vec::new(),
    }
  }

  /// Returns the name of the module.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Creates a new function definition with parameter names.
  ///
  /// # Panics
  ///
  /// Panics if the given names are invalid, or any parameter is `void`.
  pub fn new_func(
    &mut self,
    name: &str,
    params: Vec<(Option<String>, Type)>,
    ret_ty: Type,
  ) -> Function {
    let func = self.dfg.new_func_data(name, params, ret_ty, false);
    self.func_layout.push(func);
    func
  }

  /// Creates a new function declaration.
  ///
  /// # Panics
  ///
  /// Panics if the given name is invalid, or any parameter is `void`.
  pub fn new_decl(&mut self, name: &str, params_ty: Vec<Type>, ret_ty: Type) -> Function {
    let params = params_ty.into_iter().map(|ty| (None, ty)).collect();
    let func = self.dfg.new_func_data(name, params, ret_ty, true);
    self.func_layout.push(func);
    func
  }

  /// Creates a new global variable initialized by `init`.
  /// The type of the global value is a pointer to `ty`.
  ///
  /// # Panics
  ///
  /// Panics if the name is invalid, `init` is not a constant, or the type
  /// of `init` is not `ty`.
  pub fn new_global(&mut self, name: &str, ty: Type, is_const: bool, init: Value) -> Value {
    check_name(name);
    let init_data = self.dfg.value(init);
    assert!(init_data.kind().is_const(), "`init` must be a constant");
    assert!(init_data.ty() == &ty, "the type of `init` must be `ty`");
    let global = self.dfg.new_value_data(values::GlobalAlloc::new_data(
      init,
      Type::get_pointer(ty),
      is_const,
    ));
    self.dfg.set_value_name(global, Some(name.into()));
    self.global_layout.push(global);
    global
  }

  /// Returns a reference to the data flow graph.
  pub fn dfg(&self) -> &DataFlowGraph {
    &self.dfg
  }

  /// Returns a mutable reference to the data flow graph.
  pub fn dfg_mut(&mut self) -> &mut DataFlowGraph {
    &mut self.dfg
  }

  /// Returns a reference to the function data by the given handle.
  ///
  /// # Panics
  ///
  /// Panics if the given function does not exist.
  pub fn func(&self, func: Function) -> &FunctionData {
    self.dfg.func(func)
  }

  /// Returns the layout of all functions, in creation order.
  pub fn func_layout(&self) -> &[Function] {
    &self.func_layout
  }

  /// Returns the layout of all global variables, in creation order.
  pub fn global_layout(&self) -> &[Value] {
    &self.global_layout
  }
}

/// Checks if the given name is a valid entity name.
///
/// Names are stored without the `%`/`@` sigil, the printer adds it.
///
/// # Panics
///
/// Panics if the given name is empty or starts with a sigil.
pub(in crate::ir) fn check_name(name: &str) {
  assert!(
    !name.is_empty() && !name.starts_with('%') && !name.starts_with('@'),
    "invalid name `{}`",
    name
  );
}

/// A handle of IR value.
///
/// You can fetch [`ValueData`] from [`DataFlowGraph`] by using this handle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Value(pub(in crate::ir) ValueId);

/// A handle of IR basic block.
///
/// You can fetch [`BasicBlockData`] from [`DataFlowGraph`] by using this
/// handle. The block is also a value of type `label`, see
/// [`BasicBlock::value`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct BasicBlock(pub(in crate::ir) Value);

impl BasicBlock {
  /// Returns the value handle of the current basic block.
  pub fn value(self) -> Value {
    self.0
  }
}

impl From<BasicBlock> for Value {
  fn from(bb: BasicBlock) -> Self {
    bb.0
  }
}

/// A handle of IR function.
///
/// You can fetch [`FunctionData`] from [`DataFlowGraph`] by using this
/// handle. The function is also a value of its function type, see
/// [`Function::value`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Function(pub(in crate::ir) Value);

impl Function {
  /// Returns the value handle of the current function.
  pub fn value(self) -> Value {
    self.0
  }
}

impl From<Function> for Value {
  fn from(func: Function) -> Self {
    func.0
  }
}

/// A use of a value: operand slot `index` of instruction `user`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Use {
  user: Value,
  index: usize,
}

impl Use {
  pub(in crate::ir) fn new(user: Value, index: usize) -> Self {
    Self { user, index }
  }

  /// Returns the user.
  pub fn user(&self) -> Value {
    self.user
  }

  /// Returns the operand index in the user.
  pub fn index(&self) -> usize {
    self.index
  }
}

/// Data of IR function.
///
/// The name and the type of the function are held by the [`ValueData`]
/// of the function value.
pub struct FunctionData {
  ty: Type,
  params: Vec<Value>,
  bbs: Vec<BasicBlock>,
  is_decl: bool,
}

impl FunctionData {
  pub(in crate::ir) fn new(ty: Type, params: Vec<Value>, is_decl: bool) -> Self {
    Self {
      ty,
      params,
      bbs: Vec::new(),
      is_decl,
    }
  }

  /// Returns a reference to the function's type.
  pub fn ty(&self) -> &Type {
    &self.ty
  }

  /// Returns a reference to the declared return type.
  pub fn ret_ty(&self) -> &Type {
    self.ty.fn_ret().expect("function must have a function type")
  }

  /// Returns the declared number of arguments.
  pub fn arity(&self) -> usize {
    self.ty.fn_params().map_or(0, |p| p.len())
  }

  /// Returns the parameter values, empty for declarations.
  pub fn params(&self) -> &[Value] {
    &self.params
  }

  /// Returns the basic blocks of the function, in creation order.
  pub fn bbs(&self) -> &[BasicBlock] {
    &self.bbs
  }

  pub(in crate::ir) fn bbs_mut(&mut self) -> &mut Vec<BasicBlock> {
    &mut self.bbs
  }

  /// Checks if the function is a declaration.
  pub fn is_decl(&self) -> bool {
    self.is_decl
  }
}

/// Data of IR basic block.
///
/// `BasicBlockData` holds the instructions of the block in order, and
/// the control flow edges of the block. Edges are only added when a
/// branch is created, and the predecessor and successor lists of all
/// blocks are kept symmetric.
pub struct BasicBlockData {
  func: Function,
  insts: InstList,
  pub(in crate::ir) preds: Vec<BasicBlock>,
  pub(in crate::ir) succs: Vec<BasicBlock>,
}

impl BasicBlockData {
  pub(in crate::ir) fn new(func: Function) -> Self {
    Self {
      func,
      insts: new_inst_list(),
      preds: Vec::new(),
      succs: Vec::new(),
    }
  }

  /// Returns the function that the basic block belongs to.
  pub fn func(&self) -> Function {
    self.func
  }

  /// Returns a reference to the instruction list.
  pub fn insts(&self) -> &InstList {
    &self.insts
  }

  pub(in crate::ir) fn insts_mut(&mut self) -> &mut InstList {
    &mut self.insts
  }

  /// Returns the predecessors of the basic block.
  pub fn preds(&self) -> &[BasicBlock] {
    &self.preds
  }

  /// Returns the successors of the basic block.
  pub fn succs(&self) -> &[BasicBlock] {
    &self.succs
  }
}

/// Data of IR value.
///
/// `ValueData` can hold the type and the kind of the value, the operands
/// that the value uses, and the uses of the value itself.
#[derive(Debug)]
pub struct ValueData {
  ty: Type,
  name: Option<String>,
  kind: ValueKind,
  pub(in crate::ir) operands: Vec<Value>,
  pub(in crate::ir) parent: Option<BasicBlock>,
  pub(in crate::ir) used_by: HashSet<Use>,
}

impl ValueData {
  /// Creates a new `ValueData` with the given type and kind.
  pub(in crate::ir) fn new(ty: Type, kind: ValueKind) -> Self {
    Self::with_operands(ty, kind, Vec::new())
  }

  /// Creates a new `ValueData` with the given type, kind and operands.
  ///
  /// The operands are registered to their use lists when the data is
  /// inserted into a data flow graph.
  pub(in crate::ir) fn with_operands(ty: Type, kind: ValueKind, operands: Vec<Value>) -> Self {
    Self {
      ty,
      name: None,
      kind,
      operands,
      parent: None,
      used_by: HashSet::new(),
    }
  }

  /// Returns a reference to the value's type.
  pub fn ty(&self) -> &Type {
    &self.ty
  }

  /// Returns a reference to the value's name.
  pub fn name(&self) -> &Option<String> {
    &self.name
  }

  pub(in crate::ir) fn set_name(&mut self, name: Option<String>) {
    if let Some(name) = &name {
      check_name(name);
    }
    self.name = name;
  }

  /// Returns a reference to the value's kind.
  pub fn kind(&self) -> &ValueKind {
    &self.kind
  }

  /// Returns the operands of the value.
  pub fn operands(&self) -> &[Value] {
    &self.operands
  }

  /// Returns the operand at slot `index`.
  ///
  /// # Panics
  ///
  /// Panics if `index` is out of range.
  pub fn operand(&self, index: usize) -> Value {
    self.operands[index]
  }

  /// Returns the number of operands.
  pub fn num_operands(&self) -> usize {
    self.operands.len()
  }

  /// Returns the parent basic block of an instruction, `None` if the
  /// value is not an instruction or is still detached.
  pub fn parent_bb(&self) -> Option<BasicBlock> {
    self.parent
  }

  /// Returns the uses of the current value.
  pub fn used_by(&self) -> &HashSet<Use> {
    &self.used_by
  }

  /// Returns all distinct users of the current value.
  pub fn users(&self) -> HashSet<Value> {
    self.used_by.iter().map(Use::user).collect()
  }

  /// Checks if the value returns nothing.
  pub fn is_void(&self) -> bool {
    self.ty.is_void()
  }

  /// Checks if the current branch is a conditional branch.
  ///
  /// # Panics
  ///
  /// Panics if the value is not a branch.
  pub fn is_cond_br(&self) -> bool {
    assert!(matches!(self.kind, ValueKind::Branch(_)), "expected a branch");
    self.operands.len() == 3
  }

  /// Returns the target of an unconditional branch, or the true target
  /// of a conditional one.
  ///
  /// # Panics
  ///
  /// Panics if the value is not a branch.
  pub fn true_bb(&self) -> BasicBlock {
    if self.is_cond_br() {
      BasicBlock(self.operands[1])
    } else {
      BasicBlock(self.operands[0])
    }
  }

  /// Returns the false target of a conditional branch.
  ///
  /// # Panics
  ///
  /// Panics if the value is not a conditional branch.
  pub fn false_bb(&self) -> BasicBlock {
    assert!(self.is_cond_br(), "only conditional branches have a false target");
    BasicBlock(self.operands[2])
  }

  /// Checks if the current return returns nothing.
  ///
  /// # Panics
  ///
  /// Panics if the value is not a return.
  pub fn is_void_ret(&self) -> bool {
    assert!(matches!(self.kind, ValueKind::Return(_)), "expected a return");
    self.operands.is_empty()
  }

  /// Returns the callee of a call.
  ///
  /// # Panics
  ///
  /// Panics if the value is not a call.
  pub fn callee(&self) -> Function {
    assert!(matches!(self.kind, ValueKind::Call(_)), "expected a call");
    Function(self.operands[0])
  }

  /// Returns the arguments of a call.
  ///
  /// # Panics
  ///
  /// Panics if the value is not a call.
  pub fn args(&self) -> &[Value] {
    assert!(matches!(self.kind, ValueKind::Call(_)), "expected a call");
    &self.operands[1..]
  }

  /// Returns the recorded incoming (value, basic block) pairs of a phi.
  ///
  /// # Panics
  ///
  /// Panics if the value is not a phi.
  pub fn incomings(&self) -> Vec<(Value, BasicBlock)> {
    assert!(matches!(self.kind, ValueKind::Phi(_)), "expected a phi");
    self
      .operands
      .chunks_exact(2)
      .map(|p| (p[0], BasicBlock(p[1])))
      .collect()
  }

  /// Checks if operand slot `index` of the current value must hold a
  /// basic block.
  pub(in crate::ir) fn is_bb_slot(&self, index: usize) -> bool {
    match self.kind {
      ValueKind::Branch(_) => self.operands.len() != 3 || index != 0,
      ValueKind::Phi(_) => index % 2 == 1,
      _ => false,
    }
  }

  /// Checks if operand slot `index` of the current value must hold a
  /// function.
  pub(in crate::ir) fn is_func_slot(&self, index: usize) -> bool {
    matches!(self.kind, ValueKind::Call(_)) && index == 0
  }
}

/// Kind of IR value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
  /// Integer constant.
  Integer(values::Integer),
  /// Undefined value.
  Undef(values::Undef),
  /// Function argument reference.
  FuncArgRef(values::FuncArgRef),
  /// Global variable.
  GlobalAlloc(values::GlobalAlloc),
  /// Function, used as the callee of calls.
  Function,
  /// Basic block, used as the target of branches and phis.
  BasicBlock,
  /// Binary operation.
  Binary(instructions::Binary),
  /// Comparison.
  Cmp(instructions::Cmp),
  /// Function call.
  Call(instructions::Call),
  /// Conditional or unconditional branch.
  Branch(instructions::Branch),
  /// Function return.
  Return(instructions::Return),
  /// Element pointer calculation.
  GetElemPtr(instructions::GetElemPtr),
  /// Memory store.
  Store(instructions::Store),
  /// Memory load.
  Load(instructions::Load),
  /// Local memory allocation.
  Alloca(instructions::Alloca),
  /// Zero extension.
  Zext(instructions::Zext),
  /// Phi function.
  Phi(instructions::Phi),
}

impl ValueKind {
  /// Returns `true` if the `ValueKind` represents a compile-time constant.
  pub fn is_const(&self) -> bool {
    matches!(self, ValueKind::Integer(..) | ValueKind::Undef(..))
  }

  /// Returns `true` if the `ValueKind` represents an instruction.
  pub fn is_inst(&self) -> bool {
    self.opcode().is_some()
  }

  /// Returns `true` if the `ValueKind` represents a terminator.
  pub fn is_terminator(&self) -> bool {
    matches!(self, ValueKind::Branch(..) | ValueKind::Return(..))
  }

  /// Returns the opcode of an instruction, or `None` if the `ValueKind`
  /// is not an instruction.
  pub fn opcode(&self) -> Option<Opcode> {
    Some(match self {
      ValueKind::Binary(b) => b.op().opcode(),
      ValueKind::Cmp(_) => Opcode::Cmp,
      ValueKind::Call(_) => Opcode::Call,
      ValueKind::Branch(_) => Opcode::Br,
      ValueKind::Return(_) => Opcode::Ret,
      ValueKind::GetElemPtr(_) => Opcode::GetElementPtr,
      ValueKind::Store(_) => Opcode::Store,
      ValueKind::Load(_) => Opcode::Load,
      ValueKind::Alloca(_) => Opcode::Alloca,
      ValueKind::Zext(_) => Opcode::Zext,
      ValueKind::Phi(_) => Opcode::Phi,
      _ => return None,
    })
  }
}
