//! The in-memory form of the IR.
//!
//! This module provides:
//!
//! * Modules ([`Module`]), functions ([`Function`], [`FunctionData`]),
//!   basic blocks ([`BasicBlock`], [`BasicBlockData`]) and values
//!   ([`Value`], [`ValueData`]).
//! * The data flow graph ([`DataFlowGraph`]), which keeps the use-def
//!   chains and the control flow edges consistent.
//! * Types of IR values ([`Type`]).
//! * IR builders and IR builder traits ([`builder`]).
//!
//! # Example
//!
//! Here is a Fibonacci function:
//!
//! ```llvm
//! define i32 @fib(i32 %n) {
//! entry:
//!   %cond = cmp le i32 %n, 2
//!   br i1 %cond, label %then, label %else
//! then:
//!   ret i32 1
//! else:
//!   %0 = sub i32 %n, 1
//!   %x = call i32 @fib(i32 %0)
//!   %1 = sub i32 %n, 2
//!   %y = call i32 @fib(i32 %1)
//!   %ans = add i32 %x, %y
//!   ret i32 %ans
//! }
//! ```
//!
//! You can build it like this:
//!
//! ```
//! use minir::ir::*;
//! use minir::ir::builder_traits::*;
//!
//! let mut module = Module::new("fib");
//! let fib = module.new_func(
//!   "fib",
//!   vec![(Some("n".into()), Type::get_i32())],
//!   Type::get_i32(),
//! );
//! let n = module.func(fib).params()[0];
//! let dfg = module.dfg_mut();
//!
//! let entry = dfg.new_bb(fib).basic_block(Some("entry".into()));
//! let then = dfg.new_bb(fib).basic_block(Some("then".into()));
//! let else_bb = dfg.new_bb(fib).basic_block(Some("else".into()));
//!
//! let one = dfg.new_value().integer(1);
//! let two = dfg.new_value().integer(2);
//! let cond = dfg.new_inst(entry).cmp(CmpOp::Le, n, two);
//! dfg.set_value_name(cond, Some("cond".into()));
//! dfg.new_inst(entry).branch(cond, then, else_bb);
//! assert_eq!(dfg.bb(then).preds(), &[entry]);
//!
//! dfg.new_inst(then).ret(Some(one));
//!
//! let sub1 = dfg.new_inst(else_bb).binary(BinaryOp::Sub, n, one);
//! let x = dfg.new_inst(else_bb).call(fib, vec![sub1]);
//! let sub2 = dfg.new_inst(else_bb).binary(BinaryOp::Sub, n, two);
//! let y = dfg.new_inst(else_bb).call(fib, vec![sub2]);
//! let ans = dfg.new_inst(else_bb).binary(BinaryOp::Add, x, y);
//! dfg.new_inst(else_bb).ret(Some(ans));
//! ```

pub mod builder;
pub mod dfg;
pub mod entities;
pub mod error;
pub mod instructions;
pub mod layout;
pub mod types;
pub mod values;

mod idman;

pub mod builder_traits {
  //! Re-exportations of IR builder traits.
  //!
  //! # Usage
  //!
  //! ```
  //! use minir::ir::Module;
  //! use minir::ir::builder_traits::*;
  //!
  //! let mut module = Module::new("test");
  //! // builder traits required
  //! let zero = module.dfg_mut().new_value().integer(0);
  //! ```

  pub use super::builder::{BasicBlockBuilder, LocalInstBuilder, ValueBuilder};
}

pub use dfg::DataFlowGraph;
pub use entities::{
  BasicBlock, BasicBlockData, Function, FunctionData, Module, Use, Value, ValueData, ValueKind,
};
pub use error::IrError;
pub use instructions::{BinaryOp, CmpOp, Opcode};
pub use types::{Type, TypeKind};
