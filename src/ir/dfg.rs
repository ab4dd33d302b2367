use crate::ir::builder::{BlockBuilder, InstBuilder, LocalBuilder};
use crate::ir::entities::*;
use crate::ir::error::{IrError, Result};
use crate::ir::idman::IdAllocator;
use crate::ir::types::Type;
use crate::ir::values::FuncArgRef;
use std::collections::HashMap;

/// Data flow graph of a module.
///
/// `DataFlowGraph` holds all data of values ([`ValueData`]), basic
/// blocks ([`BasicBlockData`]) and functions ([`FunctionData`]), and
/// maintains their use-define and define-use chain, together with the
/// control flow edges between basic blocks.
///
/// Every operand slot is tracked: for any value `v`, `v.used_by()`
/// contains `Use { user, index }` if and only if operand `index` of
/// `user` is `v`. All mutations below keep this relation, and the
/// predecessor/successor lists of basic blocks, symmetric.
pub struct DataFlowGraph {
  ids: IdAllocator,
  values: HashMap<Value, ValueData>,
  bbs: HashMap<BasicBlock, BasicBlockData>,
  funcs: HashMap<Function, FunctionData>,
}

/// Returns a mutable reference of the value data by the given value handle.
macro_rules! data_mut {
  ($self:ident, $value:expr) => {
    $self
      .values
      .get_mut(&$value)
      .expect("value does not exist")
  };
}

impl DataFlowGraph {
  /// Creates a new data flow graph.
  pub(in crate::ir) fn new() -> Self {
    Self {
      ids: IdAllocator::new(),
      values: HashMap::new(),
      bbs: HashMap::new(),
      funcs: HashMap::new(),
    }
  }

  /// Creates a new value builder, the built instructions are detached
  /// from any basic block.
  pub fn new_value(&mut self) -> LocalBuilder {
    LocalBuilder { dfg: self }
  }

  /// Creates a new instruction builder, the built instructions are
  /// appended to basic block `bb`.
  ///
  /// # Panics
  ///
  /// Panics if the given basic block does not exist.
  pub fn new_inst(&mut self, bb: BasicBlock) -> InstBuilder {
    assert!(self.bbs.contains_key(&bb), "`bb` does not exist");
    InstBuilder { dfg: self, bb }
  }

  /// Creates a new basic block builder, the built basic blocks belong
  /// to function `func`.
  ///
  /// # Panics
  ///
  /// Panics if the given function does not exist.
  pub fn new_bb(&mut self, func: Function) -> BlockBuilder {
    assert!(self.funcs.contains_key(&func), "`func` does not exist");
    BlockBuilder { dfg: self, func }
  }

  /// Creates a new value by the given value data, registers all of its
  /// operands. Returns the handle of the created value.
  ///
  /// # Panics
  ///
  /// Panics if the given value data uses values that do not exist.
  pub(in crate::ir) fn new_value_data(&mut self, data: ValueData) -> Value {
    let value = Value(self.ids.next_value_id());
    for (i, op) in data.operands().iter().enumerate() {
      data_mut!(self, *op).used_by.insert(Use::new(value, i));
    }
    self.values.insert(value, data);
    value
  }

  /// Creates a new basic block named `name` in function `func`.
  ///
  /// # Panics
  ///
  /// Panics if the function does not exist or is a declaration, or the
  /// name is invalid.
  pub(in crate::ir) fn new_bb_data(&mut self, func: Function, name: Option<String>) -> BasicBlock {
    let func_data = self.funcs.get(&func).expect("`func` does not exist");
    assert!(
      !func_data.is_decl(),
      "can not add basic blocks to a declaration"
    );
    let bb = BasicBlock(self.new_value_data(ValueData::new(Type::get_label(), ValueKind::BasicBlock)));
    self.set_value_name(bb.0, name);
    self.bbs.insert(bb, BasicBlockData::new(func));
    self.func_mut(func).bbs_mut().push(bb);
    bb
  }

  /// Creates a new function. Declarations do not get parameter values.
  ///
  /// # Panics
  ///
  /// Panics if any name is invalid, or any parameter is `void`.
  pub(in crate::ir) fn new_func_data(
    &mut self,
    name: &str,
    params: Vec<(Option<String>, Type)>,
    ret_ty: Type,
    is_decl: bool,
  ) -> Function {
    check_name(name);
    let ty = Type::get_function(params.iter().map(|(_, t)| t.clone()).collect(), ret_ty);
    let func = Function(self.new_value_data(ValueData::new(ty.clone(), ValueKind::Function)));
    self.set_value_name(func.0, Some(name.into()));
    let params = if is_decl {
      Vec::new()
    } else {
      params
        .into_iter()
        .enumerate()
        .map(|(i, (name, ty))| {
          let arg = self.new_value_data(FuncArgRef::new_data(i, ty));
          self.set_value_name(arg, name);
          arg
        })
        .collect()
    };
    self.funcs.insert(func, FunctionData::new(ty, params, is_decl));
    func
  }

  /// Returns a reference to the value data by the given value handle.
  ///
  /// # Panics
  ///
  /// Panics if the given value does not exist.
  pub fn value(&self, value: Value) -> &ValueData {
    self.values.get(&value).expect("value does not exist")
  }

  /// Returns a reference to the value map.
  pub fn values(&self) -> &HashMap<Value, ValueData> {
    &self.values
  }

  /// Sets the name of the given value.
  ///
  /// # Panics
  ///
  /// Panics if the value does not exist or the name is invalid.
  pub fn set_value_name(&mut self, value: Value, name: Option<String>) {
    data_mut!(self, value).set_name(name);
  }

  /// Returns operand `index` of `user`.
  ///
  /// # Panics
  ///
  /// Panics if `user` does not exist or `index` is out of range.
  pub fn operand(&self, user: Value, index: usize) -> Value {
    self.value(user).operand(index)
  }

  /// Sets operand `index` of `user` to `value`, returns the old operand.
  ///
  /// Branch targets and phi incoming blocks only accept basic blocks,
  /// the callee of calls only accepts functions. Retargeting an attached
  /// branch also moves its control flow edge.
  ///
  /// On error the graph is left untouched.
  ///
  /// # Panics
  ///
  /// Panics if `user` or `value` does not exist.
  pub fn set_operand(&mut self, user: Value, index: usize, value: Value) -> Result<Value> {
    assert!(self.values.contains_key(&value), "`value` does not exist");
    self.check_slot(user, index, value)?;
    Ok(self.write_operand(user, index, value))
  }

  /// Replaces every use of `old` with `new`.
  ///
  /// Either all uses are replaced, or nothing changes and an error is
  /// returned.
  ///
  /// # Panics
  ///
  /// Panics if `old` or `new` does not exist.
  pub fn replace_all_uses_with(&mut self, old: Value, new: Value) -> Result<()> {
    assert!(self.values.contains_key(&new), "`new` does not exist");
    if old == new {
      return Ok(());
    }
    let uses: Vec<_> = self.value(old).used_by().iter().copied().collect();
    for u in &uses {
      self.check_slot(u.user(), u.index(), new)?;
    }
    for u in uses {
      self.write_operand(u.user(), u.index(), new);
    }
    Ok(())
  }

  /// Appends an incoming pair to the given phi.
  ///
  /// # Panics
  ///
  /// Panics if `phi` is not a phi, any handle does not exist, or the
  /// type of `value` differs from the type of `phi`.
  pub fn add_incoming(&mut self, phi: Value, value: Value, bb: BasicBlock) {
    let phi_data = self.value(phi);
    assert!(matches!(phi_data.kind(), ValueKind::Phi(_)), "`phi` must be a phi");
    assert!(self.bbs.contains_key(&bb), "`bb` does not exist");
    assert!(
      self.value(value).ty() == phi_data.ty(),
      "the type of `value` must be the type of `phi`"
    );
    self.push_operand(phi, value);
    self.push_operand(phi, bb.0);
  }

  /// Removes the given value. Returns the corresponding value data.
  ///
  /// An attached instruction is detached from its basic block first,
  /// removing a branch also removes its control flow edges.
  ///
  /// # Panics
  ///
  /// Panics if the given value does not exist, or is a basic block or
  /// a function.
  pub fn remove_value(&mut self, value: Value) -> Result<ValueData> {
    let data = self.value(value);
    assert!(
      !matches!(data.kind(), ValueKind::BasicBlock | ValueKind::Function),
      "basic blocks and functions can not be removed"
    );
    if !data.used_by().is_empty() {
      return Err(IrError::ValueInUse {
        value,
        users: data.used_by().len(),
      });
    }
    if data.parent_bb().is_some() {
      self.detach_inst(value)?;
    }
    let data = self.values.remove(&value).expect("value does not exist");
    for (i, op) in data.operands().iter().enumerate() {
      data_mut!(self, *op).used_by.remove(&Use::new(value, i));
    }
    Ok(data)
  }

  /// Removes the given instruction, see [`remove_value`](Self::remove_value).
  ///
  /// # Panics
  ///
  /// Panics if the given instruction does not exist.
  pub fn remove_inst(&mut self, inst: Value) -> Result<ValueData> {
    if !self.value(inst).kind().is_inst() {
      return Err(IrError::NotInstruction(inst));
    }
    self.remove_value(inst)
  }

  /// Appends a detached instruction to basic block `bb`.
  ///
  /// Phis are placed after the existing phis at the head of the block.
  /// Attaching a branch adds its control flow edges.
  ///
  /// # Panics
  ///
  /// Panics if `inst` or `bb` does not exist.
  pub fn attach_inst(&mut self, inst: Value, bb: BasicBlock) -> Result<()> {
    let data = self.value(inst);
    if !data.kind().is_inst() {
      return Err(IrError::NotInstruction(inst));
    }
    if let Some(bb) = data.parent_bb() {
      return Err(IrError::AlreadyAttached { inst, bb });
    }
    assert!(self.bbs.contains_key(&bb), "`bb` does not exist");
    self.push_inst(inst, bb)
  }

  /// Detaches an instruction from its basic block, returns the block.
  /// Detaching a branch removes its control flow edges.
  ///
  /// # Panics
  ///
  /// Panics if `inst` does not exist or is not attached.
  pub fn detach_inst(&mut self, inst: Value) -> Result<BasicBlock> {
    let data = self.value(inst);
    if !data.kind().is_inst() {
      return Err(IrError::NotInstruction(inst));
    }
    let bb = data.parent_bb().expect("`inst` is not attached");
    if matches!(data.kind(), ValueKind::Branch(_)) {
      for target in branch_targets(data) {
        if !self.has_branch_to(bb, target, Some(inst)) {
          self.unlink(bb, target);
        }
      }
    }
    self.bb_mut(bb).insts_mut().remove(&inst);
    data_mut!(self, inst).parent = None;
    Ok(bb)
  }

  /// Returns the parent basic block of the given instruction.
  ///
  /// # Panics
  ///
  /// Panics if the given instruction does not exist.
  pub fn inst_bb(&self, inst: Value) -> Option<BasicBlock> {
    self.value(inst).parent_bb()
  }

  /// Returns the function that the given instruction belongs to.
  ///
  /// # Panics
  ///
  /// Panics if the given instruction does not exist.
  pub fn inst_func(&self, inst: Value) -> Option<Function> {
    self.inst_bb(inst).map(|bb| self.bb(bb).func())
  }

  /// Returns the type that a load reads, the pointee of its source.
  ///
  /// # Panics
  ///
  /// Panics if `load` is not a load.
  pub fn load_ty(&self, load: Value) -> &Type {
    let data = self.value(load);
    assert!(matches!(data.kind(), ValueKind::Load(_)), "`load` must be a load");
    self
      .value(data.operand(0))
      .ty()
      .pointee()
      .expect("the source of a load must be a pointer")
  }

  /// Returns the payload of an integer constant, or `None` if the value
  /// is not an integer constant.
  ///
  /// # Panics
  ///
  /// Panics if the given value does not exist.
  pub fn const_int(&self, value: Value) -> Option<i32> {
    match self.value(value).kind() {
      ValueKind::Integer(i) => Some(i.value()),
      _ => None,
    }
  }

  /// Checks if the given instruction can be evaluated at compile time.
  ///
  /// Only binary operations and comparisons whose operands are both
  /// integer constants are foldable.
  ///
  /// # Panics
  ///
  /// Panics if the given value does not exist.
  pub fn is_foldable(&self, inst: Value) -> bool {
    let data = self.value(inst);
    matches!(data.kind(), ValueKind::Binary(_) | ValueKind::Cmp(_))
      && data.operands().iter().all(|op| self.const_int(*op).is_some())
  }

  /// Evaluates the given instruction at compile time. Comparisons
  /// produce `0` or `1`.
  ///
  /// Returns `None` if the instruction is not foldable.
  ///
  /// # Panics
  ///
  /// Panics if the given value does not exist.
  pub fn fold(&self, inst: Value) -> Option<i32> {
    let data = self.value(inst);
    let (lhs, rhs) = match data.operands() {
      [lhs, rhs] => (self.const_int(*lhs)?, self.const_int(*rhs)?),
      _ => return None,
    };
    match data.kind() {
      ValueKind::Binary(b) => Some(b.op().eval(lhs, rhs)),
      ValueKind::Cmp(c) => Some(c.op().eval(lhs, rhs) as i32),
      _ => None,
    }
  }

  /// Returns a reference to the basic block data by the given handle.
  ///
  /// # Panics
  ///
  /// Panics if the given basic block does not exist.
  pub fn bb(&self, bb: BasicBlock) -> &BasicBlockData {
    self.bbs.get(&bb).expect("basic block does not exist")
  }

  /// Returns a reference to the basic block map.
  pub fn bbs(&self) -> &HashMap<BasicBlock, BasicBlockData> {
    &self.bbs
  }

  /// Returns a reference to the function data by the given handle.
  ///
  /// # Panics
  ///
  /// Panics if the given function does not exist.
  pub fn func(&self, func: Function) -> &FunctionData {
    self.funcs.get(&func).expect("function does not exist")
  }

  /// Returns a reference to the function map.
  pub fn funcs(&self) -> &HashMap<Function, FunctionData> {
    &self.funcs
  }

  /// Appends `inst` to `bb` without checking, links control flow edges
  /// if `inst` is a branch.
  pub(in crate::ir) fn push_inst(&mut self, inst: Value, bb: BasicBlock) -> Result<()> {
    let data = self.value(inst);
    let is_phi = matches!(data.kind(), ValueKind::Phi(_));
    let targets = match data.kind() {
      ValueKind::Branch(_) => branch_targets(data),
      _ => Vec::new(),
    };
    let err = || IrError::AlreadyAttached { inst, bb };
    if is_phi {
      // keep phis grouped at the head, in creation order
      let tail: Vec<_> = {
        let insts = self.bb(bb).insts();
        insts
          .keys()
          .skip_while(|i| matches!(self.value(**i).kind(), ValueKind::Phi(_)))
          .copied()
          .collect()
      };
      let insts = self.bb_mut(bb).insts_mut();
      for i in &tail {
        insts.remove(i);
      }
      insts.push_key_back(inst).map_err(|_| err())?;
      for i in tail {
        insts.push_key_back(i).map_err(|_| err())?;
      }
    } else {
      self.bb_mut(bb).insts_mut().push_key_back(inst).map_err(|_| err())?;
    }
    data_mut!(self, inst).parent = Some(bb);
    // preds of all targets first, then succs from the last target
    for target in &targets {
      let preds = &mut self.bb_mut(*target).preds;
      if !preds.contains(&bb) {
        preds.push(bb);
      }
    }
    for target in targets.iter().rev() {
      let succs = &mut self.bb_mut(bb).succs;
      if !succs.contains(target) {
        succs.push(*target);
      }
    }
    Ok(())
  }

  /// Appends a new operand to `user`.
  pub(in crate::ir) fn push_operand(&mut self, user: Value, value: Value) {
    let index = self.value(user).num_operands();
    data_mut!(self, value).used_by.insert(Use::new(user, index));
    data_mut!(self, user).operands.push(value);
  }

  fn bb_mut(&mut self, bb: BasicBlock) -> &mut BasicBlockData {
    self.bbs.get_mut(&bb).expect("basic block does not exist")
  }

  fn func_mut(&mut self, func: Function) -> &mut FunctionData {
    self.funcs.get_mut(&func).expect("function does not exist")
  }

  /// Checks if `value` can be written to operand `index` of `user`.
  fn check_slot(&self, user: Value, index: usize, value: Value) -> Result<()> {
    let data = self.value(user);
    let len = data.num_operands();
    if index >= len {
      Err(IrError::OperandOutOfRange { user, index, len })
    } else if data.is_bb_slot(index) && !self.bbs.contains_key(&BasicBlock(value)) {
      Err(IrError::NotBasicBlock(value))
    } else if data.is_func_slot(index) && !self.funcs.contains_key(&Function(value)) {
      Err(IrError::NotFunction(value))
    } else {
      Ok(())
    }
  }

  /// Writes operand `index` of `user` and updates the uses of both the
  /// old and the new operand. Returns the old operand.
  fn write_operand(&mut self, user: Value, index: usize, value: Value) -> Value {
    let data = data_mut!(self, user);
    let old = std::mem::replace(&mut data.operands[index], value);
    if old == value {
      return old;
    }
    let retarget = match (data.kind(), data.parent_bb()) {
      (ValueKind::Branch(_), Some(bb)) if data.is_bb_slot(index) => Some(bb),
      _ => None,
    };
    data_mut!(self, old).used_by.remove(&Use::new(user, index));
    data_mut!(self, value).used_by.insert(Use::new(user, index));
    if let Some(bb) = retarget {
      if !self.has_branch_to(bb, BasicBlock(old), None) {
        self.unlink(bb, BasicBlock(old));
      }
      self.link(bb, BasicBlock(value));
    }
    old
  }

  /// Checks if any branch attached to `src`, other than `except`,
  /// still targets `dst`.
  fn has_branch_to(&self, src: BasicBlock, dst: BasicBlock, except: Option<Value>) -> bool {
    self.bb(src).insts().keys().any(|inst| {
      let data = self.value(*inst);
      Some(*inst) != except
        && matches!(data.kind(), ValueKind::Branch(_))
        && branch_targets(data).contains(&dst)
    })
  }

  fn link(&mut self, src: BasicBlock, dst: BasicBlock) {
    let preds = &mut self.bb_mut(dst).preds;
    if !preds.contains(&src) {
      preds.push(src);
    }
    let succs = &mut self.bb_mut(src).succs;
    if !succs.contains(&dst) {
      succs.push(dst);
    }
  }

  fn unlink(&mut self, src: BasicBlock, dst: BasicBlock) {
    self.bb_mut(dst).preds.retain(|bb| *bb != src);
    self.bb_mut(src).succs.retain(|bb| *bb != dst);
  }
}

/// Returns the targets of a branch, the true target comes first.
fn branch_targets(data: &ValueData) -> Vec<BasicBlock> {
  if data.is_cond_br() {
    vec![data.true_bb(), data.false_bb()]
  } else {
    vec![data.true_bb()]
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::ir::builder_traits::*;
  use crate::ir::{BinaryOp, CmpOp, Module, Opcode};
  use proptest::prelude::*;
  use std::collections::HashSet;

  fn single_block() -> (Module, BasicBlock) {
    let mut module = Module::new("test");
    let func = module.new_func("f", Vec::new(), Type::get_void());
    let bb = module.dfg_mut().new_bb(func).basic_block(Some("entry".into()));
    (module, bb)
  }

  /// Checks that every use recorded on a value matches an operand slot
  /// and the other way around.
  fn check_use_def(dfg: &DataFlowGraph) {
    for (v, data) in dfg.values() {
      for u in data.used_by() {
        assert_eq!(dfg.value(u.user()).operand(u.index()), *v);
      }
      for (i, op) in data.operands().iter().enumerate() {
        assert!(dfg.value(*op).used_by().contains(&Use::new(*v, i)));
      }
    }
  }

  fn check_cfg(dfg: &DataFlowGraph) {
    for (bb, data) in dfg.bbs() {
      for succ in data.succs() {
        assert!(dfg.bb(*succ).preds().contains(bb));
      }
      for pred in data.preds() {
        assert!(dfg.bb(*pred).succs().contains(bb));
      }
    }
  }

  /// Checks that the edges of every block are exactly the targets of
  /// the branches attached to it.
  fn check_cfg_edges(dfg: &DataFlowGraph) {
    let mut succs: HashMap<BasicBlock, HashSet<BasicBlock>> = HashMap::new();
    let mut preds: HashMap<BasicBlock, HashSet<BasicBlock>> = HashMap::new();
    for (bb, data) in dfg.bbs() {
      for inst in data.insts().keys() {
        let inst = dfg.value(*inst);
        if matches!(inst.kind(), ValueKind::Branch(_)) {
          for target in branch_targets(inst) {
            succs.entry(*bb).or_default().insert(target);
            preds.entry(target).or_default().insert(*bb);
          }
        }
      }
    }
    for (bb, data) in dfg.bbs() {
      let expected = succs.remove(bb).unwrap_or_default();
      assert_eq!(data.succs().iter().copied().collect::<HashSet<_>>(), expected);
      assert_eq!(data.succs().len(), expected.len());
      let expected = preds.remove(bb).unwrap_or_default();
      assert_eq!(data.preds().iter().copied().collect::<HashSet<_>>(), expected);
      assert_eq!(data.preds().len(), expected.len());
    }
  }

  #[test]
  fn operands_register_uses() {
    let (mut module, bb) = single_block();
    let dfg = module.dfg_mut();
    let a = dfg.new_value().integer(1);
    let b = dfg.new_value().integer(2);
    let add = dfg.new_inst(bb).binary(BinaryOp::Add, a, a);
    assert_eq!(dfg.value(a).used_by().len(), 2);
    assert_eq!(dfg.set_operand(add, 1, b), Ok(a));
    assert_eq!(dfg.value(a).used_by().len(), 1);
    assert!(dfg.value(b).used_by().contains(&Use::new(add, 1)));
    assert_eq!(dfg.operand(add, 1), b);
    check_use_def(dfg);
  }

  #[test]
  fn set_operand_out_of_range() {
    let (mut module, bb) = single_block();
    let dfg = module.dfg_mut();
    let a = dfg.new_value().integer(1);
    let add = dfg.new_inst(bb).binary(BinaryOp::Add, a, a);
    assert_eq!(
      dfg.set_operand(add, 2, a),
      Err(IrError::OperandOutOfRange {
        user: add,
        index: 2,
        len: 2
      })
    );
    check_use_def(dfg);
  }

  #[test]
  #[should_panic]
  fn get_operand_out_of_range() {
    let (mut module, bb) = single_block();
    let dfg = module.dfg_mut();
    let a = dfg.new_value().integer(1);
    let add = dfg.new_inst(bb).binary(BinaryOp::Add, a, a);
    dfg.operand(add, 2);
  }

  #[test]
  fn rauw_and_remove() {
    let (mut module, bb) = single_block();
    let dfg = module.dfg_mut();
    let a = dfg.new_value().integer(1);
    let b = dfg.new_value().integer(2);
    let add = dfg.new_inst(bb).binary(BinaryOp::Add, a, b);
    let mul = dfg.new_inst(bb).binary(BinaryOp::Mul, add, add);
    assert!(matches!(
      dfg.remove_value(add),
      Err(IrError::ValueInUse { users: 2, .. })
    ));
    dfg.replace_all_uses_with(add, b).unwrap();
    assert!(dfg.value(add).used_by().is_empty());
    assert_eq!(dfg.value(mul).operands(), &[b, b]);
    dfg.remove_inst(add).unwrap();
    assert!(!dfg.values().contains_key(&add));
    assert_eq!(dfg.bb(bb).insts().keys().copied().collect::<Vec<_>>(), vec![mul]);
    assert_eq!(dfg.value(a).used_by().len(), 0);
    check_use_def(dfg);
  }

  #[test]
  fn branch_links_cfg() {
    let mut module = Module::new("test");
    let func = module.new_func("f", Vec::new(), Type::get_void());
    let dfg = module.dfg_mut();
    let entry = dfg.new_bb(func).basic_block(Some("entry".into()));
    let then = dfg.new_bb(func).basic_block(Some("then".into()));
    let els = dfg.new_bb(func).basic_block(Some("else".into()));
    let cond = dfg.new_value().integer_of(Type::get_i1(), 1);
    let br = dfg.new_inst(entry).branch(cond, then, els);
    assert_eq!(dfg.bb(then).preds(), &[entry]);
    assert_eq!(dfg.bb(els).preds(), &[entry]);
    assert_eq!(dfg.bb(entry).succs(), &[els, then]);
    assert!(dfg.value(br).is_cond_br());
    assert_eq!(dfg.value(br).true_bb(), then);
    assert_eq!(dfg.value(br).false_bb(), els);
    assert_eq!(dfg.inst_func(br), Some(func));

    // retarget the false edge
    let exit = dfg.new_bb(func).basic_block(Some("exit".into()));
    assert_eq!(
      dfg.set_operand(br, 2, cond),
      Err(IrError::NotBasicBlock(cond))
    );
    dfg.set_operand(br, 2, exit.value()).unwrap();
    assert!(dfg.bb(els).preds().is_empty());
    assert_eq!(dfg.bb(exit).preds(), &[entry]);
    assert_eq!(dfg.bb(entry).succs(), &[then, exit]);

    dfg.remove_inst(br).unwrap();
    assert!(dfg.bb(entry).succs().is_empty());
    assert!(dfg.bb(then).preds().is_empty());
    check_cfg(dfg);
    check_use_def(dfg);
  }

  #[test]
  fn shared_target_survives_removal() {
    let mut module = Module::new("test");
    let func = module.new_func("f", Vec::new(), Type::get_void());
    let dfg = module.dfg_mut();
    let a = dfg.new_bb(func).basic_block(Some("a".into()));
    let b = dfg.new_bb(func).basic_block(Some("b".into()));
    let c = dfg.new_bb(func).basic_block(Some("c".into()));
    let d = dfg.new_bb(func).basic_block(Some("d".into()));
    let cond = dfg.new_value().integer_of(Type::get_i1(), 1);
    let br = dfg.new_inst(a).branch(cond, b, c);
    let jump = dfg.new_inst(a).jump(b);
    assert_eq!(dfg.bb(b).preds(), &[a]);

    // `br` still targets `b`
    dfg.remove_inst(jump).unwrap();
    assert_eq!(dfg.value(br).true_bb(), b);
    assert_eq!(dfg.bb(b).preds(), &[a]);
    assert!(dfg.bb(a).succs().contains(&b));
    check_cfg_edges(dfg);

    // retargeting one of two branches to `b` keeps the edge
    let jump = dfg.new_inst(a).jump(b);
    dfg.set_operand(br, 1, d.value()).unwrap();
    assert_eq!(dfg.bb(b).preds(), &[a]);
    assert_eq!(dfg.bb(d).preds(), &[a]);
    check_cfg_edges(dfg);
    dfg.set_operand(jump, 0, c.value()).unwrap();
    assert!(dfg.bb(b).preds().is_empty());
    check_cfg_edges(dfg);
    check_cfg(dfg);
  }

  #[test]
  fn value_kind_predicates() {
    let (mut module, bb) = single_block();
    let dfg = module.dfg_mut();
    let one = dfg.new_value().integer(1);
    let add = dfg.new_inst(bb).binary(BinaryOp::Add, one, one);
    let ret = dfg.new_inst(bb).ret(None);
    assert!(dfg.value(one).kind().is_const());
    assert!(!dfg.value(one).kind().is_inst());
    assert_eq!(dfg.value(one).kind().opcode(), None);
    assert!(dfg.value(add).kind().is_inst());
    assert!(!dfg.value(add).kind().is_terminator());
    assert_eq!(dfg.value(add).kind().opcode(), Some(Opcode::Add));
    assert!(dfg.value(ret).kind().is_terminator());
    assert_eq!(dfg.value(ret).kind().opcode(), Some(Opcode::Ret));
  }

  #[test]
  fn attach_detached() {
    let (mut module, bb) = single_block();
    let dfg = module.dfg_mut();
    let one = dfg.new_value().integer(1);
    let add = dfg.new_value().binary(BinaryOp::Add, one, one);
    assert_eq!(dfg.inst_bb(add), None);
    assert_eq!(dfg.attach_inst(one, bb), Err(IrError::NotInstruction(one)));
    dfg.attach_inst(add, bb).unwrap();
    assert_eq!(dfg.inst_bb(add), Some(bb));
    assert_eq!(
      dfg.attach_inst(add, bb),
      Err(IrError::AlreadyAttached { inst: add, bb })
    );
    let phi = dfg.new_value().phi(Type::get_i32());
    dfg.attach_inst(phi, bb).unwrap();
    let phi2 = dfg.new_inst(bb).phi(Type::get_i32());
    let order: Vec<_> = dfg.bb(bb).insts().keys().copied().collect();
    assert_eq!(order, vec![phi, phi2, add]);
    assert_eq!(dfg.detach_inst(phi), Ok(bb));
    assert_eq!(dfg.bb(bb).insts().len(), 2);
  }

  #[test]
  fn phi_incomings() {
    let mut module = Module::new("test");
    let func = module.new_func("f", Vec::new(), Type::get_void());
    let dfg = module.dfg_mut();
    let b1 = dfg.new_bb(func).basic_block(None);
    let b2 = dfg.new_bb(func).basic_block(None);
    let merge = dfg.new_bb(func).basic_block(None);
    let one = dfg.new_value().integer(1);
    let two = dfg.new_value().integer(2);
    let phi = dfg.new_inst(merge).phi(Type::get_i32());
    dfg.add_incoming(phi, one, b1);
    dfg.add_incoming(phi, two, b2);
    assert_eq!(dfg.value(phi).incomings(), vec![(one, b1), (two, b2)]);
    assert_eq!(dfg.set_operand(phi, 1, one), Err(IrError::NotBasicBlock(one)));
    assert!(dfg.value(b1.value()).users().contains(&phi));
    check_use_def(dfg);
  }

  #[test]
  fn fold_scenarios() {
    let (mut module, bb) = single_block();
    let dfg = module.dfg_mut();
    let three = dfg.new_value().integer(3);
    let four = dfg.new_value().integer(4);
    let add = dfg.new_inst(bb).binary(BinaryOp::Add, three, four);
    assert!(dfg.is_foldable(add));
    assert_eq!(dfg.fold(add), Some(7));
    let ten = dfg.new_value().integer(10);
    let zero = dfg.new_value().integer(0);
    let div = dfg.new_inst(bb).binary(BinaryOp::SDiv, ten, zero);
    assert_eq!(dfg.fold(div), Some(0));
    let cmp = dfg.new_inst(bb).cmp(CmpOp::Lt, three, four);
    assert_eq!(dfg.fold(cmp), Some(1));
    let non_const = dfg.new_inst(bb).binary(BinaryOp::Add, add, four);
    assert!(!dfg.is_foldable(non_const));
    assert_eq!(dfg.fold(non_const), None);
    let alloc = dfg.new_inst(bb).alloca(Type::get_i32());
    assert!(!dfg.is_foldable(alloc));
  }

  #[derive(Clone, Debug)]
  enum Mutation {
    Set(usize, usize, usize),
    Replace(usize, usize),
  }

  fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
      (0..8usize, 0..2usize, 0..12usize).prop_map(|(u, i, v)| Mutation::Set(u, i, v)),
      (0..12usize, 0..12usize).prop_map(|(a, b)| Mutation::Replace(a, b)),
    ]
  }

  proptest! {
    #[test]
    fn use_def_stays_symmetric(muts in proptest::collection::vec(mutation(), 0..64)) {
      let (mut module, bb) = single_block();
      let dfg = module.dfg_mut();
      let mut values: Vec<_> = (0..4).map(|i| dfg.new_value().integer(i)).collect();
      let mut users = Vec::new();
      for i in 0..8 {
        let user = dfg
          .new_inst(bb)
          .binary(BinaryOp::Add, values[i % 4], values[(i + 1) % values.len()]);
        users.push(user);
        values.push(user);
      }
      for m in muts {
        match m {
          Mutation::Set(u, i, v) => {
            prop_assert!(dfg.set_operand(users[u], i, values[v]).is_ok());
          }
          Mutation::Replace(a, b) => {
            prop_assert!(dfg.replace_all_uses_with(values[a], values[b]).is_ok());
          }
        }
        check_use_def(dfg);
      }
    }

    #[test]
    fn cfg_stays_symmetric(
      edges in proptest::collection::vec((0..6usize, 0..6usize, proptest::option::of(0..6usize)), 0..32),
      removals in proptest::collection::vec(any::<proptest::sample::Index>(), 0..8),
    ) {
      let mut module = Module::new("test");
      let func = module.new_func("f", Vec::new(), Type::get_void());
      let dfg = module.dfg_mut();
      let bbs: Vec<_> = (0..6).map(|_| dfg.new_bb(func).basic_block(None)).collect();
      let cond = dfg.new_value().integer_of(Type::get_i1(), 0);
      let mut brs = Vec::new();
      for (src, t, f) in edges {
        let br = match f {
          Some(f) => dfg.new_inst(bbs[src]).branch(cond, bbs[t], bbs[f]),
          None => dfg.new_inst(bbs[src]).jump(bbs[t]),
        };
        brs.push(br);
        check_cfg(dfg);
        check_cfg_edges(dfg);
      }
      for r in removals {
        if brs.is_empty() {
          break;
        }
        let br = brs.swap_remove(r.index(brs.len()));
        prop_assert!(dfg.remove_inst(br).is_ok());
        check_cfg(dfg);
        check_cfg_edges(dfg);
      }
      check_use_def(dfg);
    }

    #[test]
    fn folding_matches_i32_arithmetic(a in any::<i32>(), b in any::<i32>()) {
      let (mut module, bb) = single_block();
      let dfg = module.dfg_mut();
      let lhs = dfg.new_value().integer(a);
      let rhs = dfg.new_value().integer(b);
      let ops = [BinaryOp::Add, BinaryOp::Sub, BinaryOp::Mul, BinaryOp::SDiv, BinaryOp::Mod];
      for op in ops {
        let inst = dfg.new_inst(bb).binary(op, lhs, rhs);
        let expected = match op {
          BinaryOp::Add => a.wrapping_add(b),
          BinaryOp::Sub => a.wrapping_sub(b),
          BinaryOp::Mul => a.wrapping_mul(b),
          BinaryOp::SDiv if b == 0 => 0,
          BinaryOp::SDiv => a.wrapping_div(b),
          BinaryOp::Mod if b == 0 => 0,
          BinaryOp::Mod => a.wrapping_rem(b),
        };
        prop_assert_eq!(dfg.fold(inst), Some(expected));
      }
    }
  }
}
