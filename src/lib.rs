//! Library for building, folding and printing an LLVM-like SSA IR.
//!
//! The IR is built by a front end one instruction at a time. Every
//! builder call checks the operand types of the instruction, derives its
//! result type, records the instruction in the use lists of its operands,
//! and, for branches, links the control flow edges of the basic blocks.
//! Later passes walk and rewrite the graph through the
//! [`DataFlowGraph`](ir::DataFlowGraph), and the [`back`] module prints
//! it in the text form:
//!
//! ```text
//! @count = global i32 0
//!
//! declare i32 @getint()
//!
//! define i32 @main(i32 %n) {
//! entry:
//!   %0 = call i32 @getint()
//!   %1 = add i32 %0, %n
//!   %2 = cmp gt i32 %1, 0
//!   br i1 %2, label %then, label %end
//!
//! then:
//!   store i32 %1, i32* @count
//!   br label %end
//!
//! end:
//!   %3 = phi i32 [ %1, %then ], [ 0, %entry ]
//!   ret i32 %3
//! }
//! ```
//!
//! # Features
//!
//! * `no-logger`: disables the diagnostic logger of the generators,
//!   diagnostics are only counted.

pub mod back;
pub mod ir;
pub mod logger;
