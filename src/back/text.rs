//! Implementations of the visitor for the text form IR generator.
//!
//! Every instruction is rendered on one line:
//!
//! ```text
//! %n = add i32 %a, %b
//! %n = cmp lt i32 %a, 0
//! %n = call i32 @f(i32 %x, i32 %y)
//! br i1 %c, label %then, label %else
//! ret i32 %n
//! %n = getelementptr [4 x i32], [4 x i32]* %arr, i32 0, i32 1
//! store i32 %v, i32* %p
//! %n = load i32, i32* %p
//! %n = alloca i32
//! %n = zext i1 %c to i32
//! %n = phi i32 [ %a, %b1 ], [ %b, %b2 ]
//! ```

use crate::back::{self, NameManager};
use crate::ir::{BasicBlock, DataFlowGraph, FunctionData, Module, Value, ValueData, ValueKind};
use crate::logger::Logger;
use std::io::{Result, Write};

/// Visitor for generating the in-memory IR module into the text form.
///
/// The visitor logs a warning every time it has to complete a phi
/// with `undef` entries, see [`Visitor::inst_to_string`].
#[derive(Default)]
pub struct Visitor {
  logger: Logger,
}

impl<W: Write> back::Visitor<W> for Visitor {
  type Output = ();

  fn visit(&mut self, w: &mut W, nm: &mut NameManager, module: &Module) -> Result<()> {
    let mut visitor = VisitorImpl {
      w,
      nm,
      dfg: module.dfg(),
      logger: &mut self.logger,
    };
    visitor.visit(module)
  }
}

impl Visitor {
  /// Returns a reference to the logger of the visitor.
  pub fn logger(&self) -> &Logger {
    &self.logger
  }

  /// Renders the given instruction, without indentation and line break.
  ///
  /// A phi with fewer incoming pairs than the predecessors of its block
  /// gets an extra `[ undef, %bk ]` entry for every predecessor that has
  /// no incoming pair.
  ///
  /// # Panics
  ///
  /// Panics if the given value does not exist or is not an instruction.
  pub fn inst_to_string(&mut self, dfg: &DataFlowGraph, nm: &mut NameManager, inst: Value) -> String {
    let mut r = Renderer {
      nm,
      dfg,
      logger: &mut self.logger,
    };
    r.inst(inst)
  }
}

/// Renders the given instruction with a temporary visitor, see
/// [`Visitor::inst_to_string`].
pub fn inst_to_string(dfg: &DataFlowGraph, nm: &mut NameManager, inst: Value) -> String {
  Visitor::default().inst_to_string(dfg, nm, inst)
}

/// The implementation of text form IR generator.
struct VisitorImpl<'a, W: Write> {
  w: &'a mut W,
  nm: &'a mut NameManager,
  dfg: &'a DataFlowGraph,
  logger: &'a mut Logger,
}

impl<'a, W: Write> VisitorImpl<'a, W> {
  /// Visits the module.
  fn visit(&mut self, module: &Module) -> Result<()> {
    // global variables
    for global in module.global_layout() {
      let line = self.renderer().global(*global);
      writeln!(self.w, "{}", line)?;
    }
    // functions
    for (i, func) in module.func_layout().iter().enumerate() {
      if i != 0 || !module.global_layout().is_empty() {
        writeln!(self.w)?;
      }
      self.nm.enter_func_scope();
      self.visit_func(func.value(), module.func(*func))?;
      self.nm.exit_func_scope();
    }
    self.logger.log_global();
    Ok(())
  }

  /// Generates the given function.
  fn visit_func(&mut self, func: Value, data: &FunctionData) -> Result<()> {
    let name = self.nm.value_name(func, self.dfg.value(func));
    let ret_ty = data.ret_ty();
    if data.is_decl() {
      let params = data.ty().fn_params().unwrap_or_default();
      let params: Vec<_> = params.iter().map(|p| p.to_string()).collect();
      return writeln!(self.w, "declare {} {}({})", ret_ty, name, params.join(", "));
    }
    let params: Vec<_> = data
      .params()
      .iter()
      .map(|p| self.renderer().operand(*p, true))
      .collect();
    writeln!(self.w, "define {} {}({}) {{", ret_ty, name, params.join(", "))?;
    for (i, bb) in data.bbs().iter().enumerate() {
      if i != 0 {
        writeln!(self.w)?;
      }
      self.visit_bb(*bb)?;
    }
    writeln!(self.w, "}}")
  }

  /// Generates the given basic block.
  fn visit_bb(&mut self, bb: BasicBlock) -> Result<()> {
    let label = self.nm.value_name(bb.value(), self.dfg.value(bb.value()));
    writeln!(self.w, "{}:", &label[1..])?;
    let dfg = self.dfg;
    for inst in dfg.bb(bb).insts().keys() {
      let line = self.renderer().inst(*inst);
      writeln!(self.w, "  {}", line)?;
    }
    Ok(())
  }

  fn renderer(&mut self) -> Renderer {
    Renderer {
      nm: &mut *self.nm,
      dfg: self.dfg,
      logger: &mut *self.logger,
    }
  }
}

/// Renders values and instructions to strings.
struct Renderer<'a> {
  nm: &'a mut NameManager,
  dfg: &'a DataFlowGraph,
  logger: &'a mut Logger,
}

impl<'a> Renderer<'a> {
  /// Renders the given global variable definition.
  fn global(&mut self, global: Value) -> String {
    let dfg = self.dfg;
    let data = dfg.value(global);
    let init = data.operand(0);
    let kw = match data.kind() {
      ValueKind::GlobalAlloc(g) if g.is_const() => "constant",
      ValueKind::GlobalAlloc(_) => "global",
      _ => panic!("invalid global variable"),
    };
    let name = self.nm.value_name(global, data);
    format!("{} = {} {}", name, kw, self.operand(init, true))
  }

  /// Renders the given instruction.
  fn inst(&mut self, inst: Value) -> String {
    let dfg = self.dfg;
    let data = dfg.value(inst);
    if data.parent_bb().is_none() {
      self
        .logger
        .log_warning("printing an instruction that is not attached to any basic block");
    }
    let op = match data.kind().opcode() {
      Some(op) => op,
      None => panic!("invalid instruction"),
    };
    let body = match data.kind() {
      ValueKind::Binary(_) => format!("{} {}", op, self.binary_operands(data)),
      ValueKind::Cmp(c) => format!("{} {} {}", op, c.op(), self.binary_operands(data)),
      ValueKind::Call(_) => {
        let callee = data.callee().value();
        let callee = self.nm.value_name(callee, dfg.value(callee));
        let args: Vec<_> = data.args().iter().map(|a| self.operand(*a, true)).collect();
        format!("{} {} {}({})", op, data.ty(), callee, args.join(", "))
      }
      ValueKind::Branch(_) => {
        let ops: Vec<_> = data
          .operands()
          .iter()
          .map(|v| self.operand(*v, true))
          .collect();
        format!("{} {}", op, ops.join(", "))
      }
      ValueKind::Return(_) => match data.operands().first() {
        Some(v) => format!("{} {}", op, self.operand(*v, true)),
        None => format!("{} void", op),
      },
      ValueKind::GetElemPtr(_) => {
        let base = match dfg.value(data.operand(0)).ty().pointee() {
          Some(base) => base,
          None => panic!("invalid pointer type"),
        };
        let ops: Vec<_> = data
          .operands()
          .iter()
          .map(|v| self.operand(*v, true))
          .collect();
        format!("{} {}, {}", op, base, ops.join(", "))
      }
      ValueKind::Store(_) => format!(
        "{} {}, {}",
        op,
        self.operand(data.operand(0), true),
        self.operand(data.operand(1), true)
      ),
      ValueKind::Load(_) => format!(
        "{} {}, {}",
        op,
        dfg.load_ty(inst),
        self.operand(data.operand(0), true)
      ),
      ValueKind::Alloca(a) => format!("{} {}", op, a.alloca_ty()),
      ValueKind::Zext(z) => format!(
        "{} {} to {}",
        op,
        self.operand(data.operand(0), true),
        z.dest_ty()
      ),
      ValueKind::Phi(_) => match self.phi_entries(inst, data) {
        entries if entries.is_empty() => format!("{} {}", op, data.ty()),
        entries => format!("{} {} {}", op, data.ty(), entries),
      },
      _ => unreachable!(),
    };
    if data.is_void() {
      body
    } else {
      format!("{} = {}", self.nm.value_name(inst, data), body)
    }
  }

  /// Renders `T a, [T2 ]b`, the type of `b` is omitted if it equals the
  /// type of `a`.
  fn binary_operands(&mut self, data: &ValueData) -> String {
    let dfg = self.dfg;
    let (lhs, rhs) = (data.operand(0), data.operand(1));
    let same_ty = dfg.value(lhs).ty() == dfg.value(rhs).ty();
    format!(
      "{}, {}",
      self.operand(lhs, true),
      self.operand(rhs, !same_ty)
    )
  }

  /// Renders the incoming entries of a phi, completing missing
  /// predecessors with `undef`.
  fn phi_entries(&mut self, inst: Value, data: &ValueData) -> String {
    let incomings = data.incomings();
    let mut entries: Vec<_> = incomings
      .iter()
      .map(|(v, bb)| {
        format!(
          "[ {}, {} ]",
          self.operand(*v, false),
          self.operand(bb.value(), false)
        )
      })
      .collect();
    let dfg = self.dfg;
    let preds = match data.parent_bb() {
      Some(bb) => dfg.bb(bb).preds(),
      None => return entries.join(", "),
    };
    for (_, bb) in &incomings {
      if !preds.contains(bb) {
        let bb = self.operand(bb.value(), false);
        let phi = self.nm.value_name(inst, data);
        self.logger.log_error(&format!(
          "incoming block {} of phi {} is not a predecessor",
          bb, phi
        ));
      }
    }
    if incomings.len() < preds.len() {
      let missing: Vec<_> = preds
        .iter()
        .filter(|p| !incomings.iter().any(|(_, bb)| bb == *p))
        .copied()
        .collect();
      for pred in missing {
        let pred = self.operand(pred.value(), false);
        entries.push(format!("[ undef, {} ]", pred));
      }
      let phi = self.nm.value_name(inst, data);
      self.logger.log_warning(&format!(
        "phi {} has fewer incoming values than predecessors, completed with `undef`",
        phi
      ));
    }
    entries.join(", ")
  }

  /// Renders the given operand, optionally prefixed with its type.
  fn operand(&mut self, value: Value, with_ty: bool) -> String {
    let dfg = self.dfg;
    let data = dfg.value(value);
    let text = match data.kind() {
      ValueKind::Integer(i) => i.value().to_string(),
      ValueKind::Undef(_) => "undef".into(),
      _ => self.nm.value_name(value, data),
    };
    if with_ty {
      format!("{} {}", data.ty(), text)
    } else {
      text
    }
  }
}
