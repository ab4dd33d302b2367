use crate::ir::dfg::DataFlowGraph;
use crate::ir::entities::{BasicBlock, Function, Value, ValueData};
use crate::ir::instructions::*;
use crate::ir::types::Type;
use crate::ir::values::*;

/// A trait that provides methods for querying entity information.
pub trait EntityInfoQuerier {
  /// Returns the type information of the given value.
  ///
  /// # Panics
  ///
  /// Panics if the given value does not exist.
  fn value_type(&self, value: Value) -> Type;

  /// Returns the type information of the given function.
  ///
  /// # Panics
  ///
  /// Panics if the given function does not exist.
  fn func_type(&self, func: Function) -> Type;
}

/// A builder trait that provides method for inserting value data
/// to the value storage.
pub trait ValueInserter {
  /// Inserts the given value data to the value storage,
  /// returns the handle of the inserted value.
  fn insert_value(&mut self, data: ValueData) -> Value;
}

/// A builder trait that provides method for building constants.
///
/// Constants are never placed in basic blocks.
pub trait ValueBuilder: Sized + EntityInfoQuerier + ValueInserter {
  /// Creates a new `i32` integer constant.
  fn integer(self, value: i32) -> Value {
    self.integer_of(Type::get_i32(), value)
  }

  /// Creates a new integer constant of the given integer type.
  ///
  /// # Panics
  ///
  /// Panics if the given type is not an integer type.
  fn integer_of(mut self, ty: Type, value: i32) -> Value {
    assert!(ty.is_int(), "`ty` must be an integer type");
    self.insert_value(Integer::new_data(value, ty))
  }

  /// Creates a new undefined value.
  ///
  /// # Panics
  ///
  /// Panics if the given type is `void` or `label`.
  fn undef(mut self, ty: Type) -> Value {
    assert!(
      !ty.is_void() && !ty.is_label(),
      "`ty` can not be `void` or `label`"
    );
    self.insert_value(Undef::new_data(ty))
  }
}

/// A builder for building instructions.
pub trait LocalInstBuilder: ValueBuilder {
  /// Creates a binary operation.
  ///
  /// # Panics
  ///
  /// Panics in debug builds if `lhs` and `rhs` are not integers of the
  /// same width.
  fn binary(mut self, op: BinaryOp, lhs: Value, rhs: Value) -> Value {
    debug_assert!(
      check_int_operands(&self, lhs, rhs),
      "`lhs` and `rhs` must be integers of the same width"
    );
    self.insert_value(Binary::new_data(op, lhs, rhs))
  }

  /// Creates a comparison.
  ///
  /// # Panics
  ///
  /// Panics in debug builds if `lhs` and `rhs` are not integers of the
  /// same width.
  fn cmp(mut self, op: CmpOp, lhs: Value, rhs: Value) -> Value {
    debug_assert!(
      check_int_operands(&self, lhs, rhs),
      "`lhs` and `rhs` must be integers of the same width"
    );
    self.insert_value(Cmp::new_data(op, lhs, rhs))
  }

  /// Creates a function call. The result type is the return type of
  /// the callee.
  ///
  /// # Panics
  ///
  /// Panics if the number of arguments does not match the arity of
  /// the callee.
  fn call(mut self, callee: Function, args: Vec<Value>) -> Value {
    let ty = self.func_type(callee);
    let (params, ret) = match (ty.fn_params(), ty.fn_ret()) {
      (Some(params), Some(ret)) => (params, ret.clone()),
      _ => panic!("expected a function type"),
    };
    assert!(params.len() == args.len(), "argument count mismatch");
    self.insert_value(Call::new_data(callee.value(), args, ret))
  }

  /// Creates a conditional branch with the given condition and targets.
  ///
  /// # Panics
  ///
  /// Panics if the condition type is not an integer type.
  fn branch(mut self, cond: Value, true_bb: BasicBlock, false_bb: BasicBlock) -> Value {
    assert!(self.value_type(cond).is_int(), "`cond` must be an integer");
    self.insert_value(Branch::new_cond_data(
      cond,
      true_bb.value(),
      false_bb.value(),
    ))
  }

  /// Creates an unconditional jump with the given target.
  fn jump(mut self, target: BasicBlock) -> Value {
    self.insert_value(Branch::new_data(target.value()))
  }

  /// Creates a new return instruction.
  ///
  /// # Panics
  ///
  /// Panics if the value type (if value is not `None`) is `void`.
  fn ret(mut self, value: Option<Value>) -> Value {
    assert!(
      value.map_or(true, |v| !self.value_type(v).is_void()),
      "the type of `value` must not be `void`"
    );
    self.insert_value(Return::new_data(value))
  }

  /// Creates an element pointer calculation.
  ///
  /// The first index steps over `ptr` itself, every following index
  /// steps into one array dimension. The result points to the element
  /// type reached after the last index.
  ///
  /// # Panics
  ///
  /// Panics if `ptr` is not a pointer to an array, integer or float,
  /// any index is not an integer, or an index steps into a type that is
  /// not an array.
  fn get_elem_ptr(mut self, ptr: Value, idxs: Vec<Value>) -> Value {
    let ptr_ty = self.value_type(ptr);
    let mut elem_ty = match ptr_ty.pointee() {
      Some(ty) if ty.is_array() || ty.is_int() || ty.is_float() => ty.clone(),
      _ => panic!("`ptr` must be a pointer to an array, integer or float"),
    };
    assert!(
      idxs.iter().all(|i| self.value_type(*i).is_int()),
      "indices must be integers"
    );
    for _ in idxs.iter().skip(1) {
      elem_ty = match elem_ty.array_elem() {
        Some(base) => base.clone(),
        None => panic!("index error: `{}` is not an array", elem_ty),
      };
    }
    self.insert_value(GetElemPtr::new_data(ptr, idxs, elem_ty))
  }

  /// Creates a memory store with the given value and destination.
  ///
  /// # Panics
  ///
  /// Panics if the destination is not a pointer.
  fn store(mut self, value: Value, dest: Value) -> Value {
    assert!(
      self.value_type(dest).is_pointer(),
      "`dest` must be a pointer"
    );
    self.insert_value(Store::new_data(value, dest))
  }

  /// Creates a memory load of type `ty` with the given source.
  ///
  /// `ty` is expected to be the pointee type of `src`.
  ///
  /// # Panics
  ///
  /// Panics if the source is not a pointer.
  fn load(mut self, ty: Type, src: Value) -> Value {
    assert!(self.value_type(src).is_pointer(), "`src` must be a pointer");
    self.insert_value(Load::new_data(src, ty))
  }

  /// Creates a local memory allocation.
  ///
  /// # Panics
  ///
  /// Panics if the given type is `void` or `label`.
  fn alloca(mut self, ty: Type) -> Value {
    assert!(
      !ty.is_void() && !ty.is_label(),
      "`ty` can not be `void` or `label`"
    );
    self.insert_value(Alloca::new_data(ty))
  }

  /// Creates a zero extension of `value` to type `ty`.
  ///
  /// # Panics
  ///
  /// Panics if `value` or `ty` is not an integer type, or they are the
  /// same type.
  fn zext(mut self, value: Value, ty: Type) -> Value {
    let src_ty = self.value_type(value);
    assert!(
      src_ty.is_int() && ty.is_int(),
      "zext only works on integer types"
    );
    assert!(src_ty != ty, "destination type must differ from `{}`", src_ty);
    self.insert_value(Zext::new_data(value, ty))
  }

  /// Creates a phi function without incoming values, see
  /// [`DataFlowGraph::add_incoming`].
  ///
  /// # Panics
  ///
  /// Panics if the given type is `void` or `label`.
  fn phi(mut self, ty: Type) -> Value {
    assert!(
      !ty.is_void() && !ty.is_label(),
      "`ty` can not be `void` or `label`"
    );
    self.insert_value(Phi::new_data(ty))
  }
}

/// A builder trait that provides method for building basic blocks.
pub trait BasicBlockBuilder: Sized {
  /// Creates a new basic block with the given name.
  ///
  /// # Panics
  ///
  /// Panics if the given name (if exists) is empty or starts with `%`
  /// or `@`, or the function is a declaration.
  fn basic_block(self, name: Option<String>) -> BasicBlock;
}

/// Checks if both operands are integers of the same width.
fn check_int_operands(querier: &impl EntityInfoQuerier, lhs: Value, rhs: Value) -> bool {
  let lhs_ty = querier.value_type(lhs);
  lhs_ty.is_int() && lhs_ty.bits() == querier.value_type(rhs).bits()
}

/// An entity information querier based on data flow graph.
pub trait DfgBasedInfoQuerier {
  fn dfg(&self) -> &DataFlowGraph;
}

impl<T: DfgBasedInfoQuerier> EntityInfoQuerier for T {
  fn value_type(&self, value: Value) -> Type {
    self.dfg().value(value).ty().clone()
  }

  fn func_type(&self, func: Function) -> Type {
    self.dfg().func(func).ty().clone()
  }
}

/// A value builder that builds a new value and inserts it to the data
/// flow graph, detached from any basic block.
pub struct LocalBuilder<'a> {
  pub(in crate::ir) dfg: &'a mut DataFlowGraph,
}

impl<'a> DfgBasedInfoQuerier for LocalBuilder<'a> {
  fn dfg(&self) -> &DataFlowGraph {
    self.dfg
  }
}

impl<'a> ValueInserter for LocalBuilder<'a> {
  fn insert_value(&mut self, data: ValueData) -> Value {
    self.dfg.new_value_data(data)
  }
}

impl<'a> ValueBuilder for LocalBuilder<'a> {}
impl<'a> LocalInstBuilder for LocalBuilder<'a> {}

/// A value builder that builds a new value and inserts it to the data
/// flow graph. Instructions are appended to the basic block, phis are
/// placed after the existing phis at the head of the block.
pub struct InstBuilder<'a> {
  pub(in crate::ir) dfg: &'a mut DataFlowGraph,
  pub(in crate::ir) bb: BasicBlock,
}

impl<'a> DfgBasedInfoQuerier for InstBuilder<'a> {
  fn dfg(&self) -> &DataFlowGraph {
    self.dfg
  }
}

impl<'a> ValueInserter for InstBuilder<'a> {
  fn insert_value(&mut self, data: ValueData) -> Value {
    let is_inst = data.kind().is_inst();
    let value = self.dfg.new_value_data(data);
    if is_inst {
      if let Err(e) = self.dfg.push_inst(value, self.bb) {
        panic!("{}", e);
      }
    }
    value
  }
}

impl<'a> ValueBuilder for InstBuilder<'a> {}
impl<'a> LocalInstBuilder for InstBuilder<'a> {}

/// A basic block builder that builds a new basic block and appends it
/// to the function.
pub struct BlockBuilder<'a> {
  pub(in crate::ir) dfg: &'a mut DataFlowGraph,
  pub(in crate::ir) func: Function,
}

impl<'a> BasicBlockBuilder for BlockBuilder<'a> {
  fn basic_block(self, name: Option<String>) -> BasicBlock {
    self.dfg.new_bb_data(self.func, name)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::ir::{Module, ValueKind};

  fn entry() -> (Module, BasicBlock) {
    let mut module = Module::new("test");
    let func = module.new_func("f", Vec::new(), Type::get_void());
    let bb = module.dfg_mut().new_bb(func).basic_block(Some("entry".into()));
    (module, bb)
  }

  #[test]
  fn result_types() {
    let (mut module, bb) = entry();
    let dfg = module.dfg_mut();
    let one = dfg.new_value().integer(1);
    let add = dfg.new_inst(bb).binary(BinaryOp::Add, one, one);
    assert_eq!(dfg.value(add).ty(), &Type::get_i32());
    let lt = dfg.new_inst(bb).cmp(CmpOp::Lt, one, add);
    assert_eq!(dfg.value(lt).ty(), &Type::get_i1());
    let ext = dfg.new_inst(bb).zext(lt, Type::get_i32());
    assert_eq!(dfg.value(ext).ty(), &Type::get_i32());
    let slot = dfg.new_inst(bb).alloca(Type::get_i32());
    assert_eq!(dfg.value(slot).ty(), &Type::get_pointer(Type::get_i32()));
    let st = dfg.new_inst(bb).store(one, slot);
    assert!(dfg.value(st).is_void());
    let ld = dfg.new_inst(bb).load(Type::get_i32(), slot);
    assert_eq!(dfg.load_ty(ld), &Type::get_i32());
    let ret = dfg.new_inst(bb).ret(None);
    assert!(dfg.value(ret).is_void_ret());
    // constants stay out of the block
    assert_eq!(dfg.bb(bb).insts().len(), 7);
    assert_eq!(dfg.inst_bb(one), None);
  }

  #[test]
  fn call_result() {
    let mut module = Module::new("test");
    let callee = module.new_decl("g", vec![Type::get_i32()], Type::get_i32());
    let func = module.new_func("f", Vec::new(), Type::get_void());
    let dfg = module.dfg_mut();
    let bb = dfg.new_bb(func).basic_block(None);
    let one = dfg.new_value().integer(1);
    let call = dfg.new_inst(bb).call(callee, vec![one]);
    assert_eq!(dfg.value(call).ty(), &Type::get_i32());
    assert_eq!(dfg.value(call).callee(), callee);
    assert_eq!(dfg.value(call).args(), &[one]);
    assert!(dfg.value(callee.value()).users().contains(&call));
  }

  #[test]
  #[should_panic]
  fn call_arity_mismatch() {
    let mut module = Module::new("test");
    let callee = module.new_decl("g", vec![Type::get_i32()], Type::get_void());
    let func = module.new_func("f", Vec::new(), Type::get_void());
    let dfg = module.dfg_mut();
    let bb = dfg.new_bb(func).basic_block(None);
    dfg.new_inst(bb).call(callee, Vec::new());
  }

  #[test]
  fn gep_element_type() {
    let (mut module, bb) = entry();
    let dfg = module.dfg_mut();
    let arr = Type::get_array(Type::get_array(Type::get_i32(), 3), 2);
    let slot = dfg.new_inst(bb).alloca(arr.clone());
    let zero = dfg.new_value().integer(0);
    let one = dfg.new_value().integer(1);
    let whole = dfg.new_inst(bb).get_elem_ptr(slot, vec![zero]);
    assert_eq!(dfg.value(whole).ty(), &Type::get_pointer(arr));
    let row = dfg.new_inst(bb).get_elem_ptr(slot, vec![zero, one]);
    assert_eq!(
      dfg.value(row).ty(),
      &Type::get_pointer(Type::get_array(Type::get_i32(), 3))
    );
    let elem = dfg.new_inst(bb).get_elem_ptr(slot, vec![zero, one, one]);
    assert_eq!(dfg.value(elem).ty(), &Type::get_pointer(Type::get_i32()));
    match dfg.value(elem).kind() {
      ValueKind::GetElemPtr(gep) => assert_eq!(gep.elem_ty(), &Type::get_i32()),
      _ => unreachable!(),
    }
  }

  #[test]
  #[should_panic]
  fn gep_index_error() {
    let (mut module, bb) = entry();
    let dfg = module.dfg_mut();
    let slot = dfg.new_inst(bb).alloca(Type::get_array(Type::get_i32(), 3));
    let zero = dfg.new_value().integer(0);
    dfg.new_inst(bb).get_elem_ptr(slot, vec![zero, zero, zero]);
  }

  #[test]
  #[should_panic]
  fn gep_bad_pointee() {
    let (mut module, bb) = entry();
    let dfg = module.dfg_mut();
    let slot = dfg
      .new_inst(bb)
      .alloca(Type::get_pointer(Type::get_i32()));
    let zero = dfg.new_value().integer(0);
    dfg.new_inst(bb).get_elem_ptr(slot, vec![zero]);
  }

  #[test]
  #[should_panic]
  fn store_to_non_pointer() {
    let (mut module, bb) = entry();
    let dfg = module.dfg_mut();
    let one = dfg.new_value().integer(1);
    dfg.new_inst(bb).store(one, one);
  }

  #[test]
  #[should_panic]
  fn zext_same_type() {
    let (mut module, bb) = entry();
    let dfg = module.dfg_mut();
    let one = dfg.new_value().integer(1);
    dfg.new_inst(bb).zext(one, Type::get_i32());
  }

  #[cfg(debug_assertions)]
  #[test]
  #[should_panic]
  fn binary_width_mismatch() {
    let (mut module, bb) = entry();
    let dfg = module.dfg_mut();
    let one = dfg.new_value().integer(1);
    let t = dfg.new_value().integer_of(Type::get_i1(), 1);
    dfg.new_inst(bb).binary(BinaryOp::Add, one, t);
  }

  #[test]
  #[should_panic]
  fn block_in_declaration() {
    let mut module = Module::new("test");
    let decl = module.new_decl("g", Vec::new(), Type::get_void());
    module.dfg_mut().new_bb(decl).basic_block(None);
  }
}
