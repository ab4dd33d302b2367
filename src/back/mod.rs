//! The backend of the in-memory IR.
//!
//! This modules provides generators for generating the in-memory IR
//! to other forms, including:
//!
//! * The generator ([`Generator`]), name manager ([`NameManager`])
//!   and the visitor trait ([`Visitor`]).
//! * The text form IR generator ([`TextGenerator`]).
//!
//! # Examples
//!
//! Convert the in-memory IR module into the text form:
//!
//! ```
//! use minir::ir::{*, builder_traits::*};
//! use minir::back::TextGenerator;
//!
//! let mut module = Module::new("demo");
//! let main = module.new_func("main", Vec::new(), Type::get_i32());
//! let dfg = module.dfg_mut();
//! let bb = dfg.new_bb(main).basic_block(Some("entry".into()));
//! let lhs = dfg.new_value().integer(11);
//! let rhs = dfg.new_value().integer(31);
//! let add = dfg.new_inst(bb).binary(BinaryOp::Add, lhs, rhs);
//! assert_eq!(dfg.fold(add), Some(42));
//! dfg.new_inst(bb).ret(Some(add));
//!
//! // convert to text form
//! let mut gen = TextGenerator::new(Vec::new());
//! gen.generate_on(&module).unwrap();
//! let text = std::str::from_utf8(&gen.writer()).unwrap().to_string();
//! assert_eq!(text, "define i32 @main() {\nentry:\n  %0 = add i32 11, 31\n  ret i32 %0\n}\n");
//! ```
//!
//! Save the text form to a file:
//!
//! ```no_run
//! use minir::back::TextGenerator;
//!
//! # fn main() -> std::io::Result<()> {
//! # let module = minir::ir::Module::new("demo");
//! let mut gen = TextGenerator::from_path("/path/to/the/output/file")?;
//! gen.generate_on(&module)?;
//! # Ok(())
//! # }
//! ```

pub mod generator;
pub mod text;

pub use generator::{Generator, NameManager, Visitor};
pub use text::inst_to_string;

/// Generator for generating the in-memory IR into the text form.
pub type TextGenerator<W> = Generator<W, text::Visitor>;
