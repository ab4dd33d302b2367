//! Instruction list of basic blocks ([`InstList`]).
//!
//! The parent basic block of every instruction is recorded in its
//! [`ValueData`](crate::ir::entities::ValueData), the list only keeps
//! the order.

use crate::ir::entities::Value;
use key_node_list::{impl_node, KeyNodeList};
use std::collections::HashMap;

/// Instruction list, stores the order of all instructions in a basic
/// block.
///
/// Instruction list is a [`KeyNodeList`], with the key is [`Value`],
/// and the node is [`InstNode`].
pub type InstList = KeyNodeList<Value, InstNode, HashMap<Value, InstNode>>;

/// Creates a new empty instruction list.
pub(in crate::ir) fn new_inst_list() -> InstList {
  InstList::with_map(HashMap::new())
}

/// The node in [`InstList`].
pub struct InstNode {
  prev: Option<Value>,
  next: Option<Value>,
}

impl_node!(InstNode { Key = Value, prev = prev, next = next });

impl From<()> for InstNode {
  fn from(_: ()) -> Self {
    Self {
      prev: None,
      next: None,
    }
  }
}
