use crate::ir::{Module, Value, ValueData, ValueKind};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{Result, Write};
use std::path::Path;

/// A manager for storing names and allocating unique temporary
/// names of values.
///
/// Functions and global variables live in the global scope and are
/// printed with `@`, everything else lives in the scope of the current
/// function and is printed with `%`. Unnamed values get numeric
/// temporary names (`%0`, `%1`, ...) in first-use order, and a name that
/// is already taken in its scope gets a `_k` suffix.
#[derive(Default)]
pub struct NameManager {
  global: Scope,
  local: Scope,
}

/// Names of one scope.
#[derive(Default)]
struct Scope {
  names: HashMap<Value, String>,
  used: HashSet<String>,
  next_temp: usize,
}

impl Scope {
  fn name(&mut self, value: Value, data: &ValueData) -> &str {
    if !self.names.contains_key(&value) {
      let name = match data.name() {
        Some(name) => self.unique(name),
        None => self.temp(),
      };
      self.used.insert(name.clone());
      self.names.insert(value, name);
    }
    &self.names[&value]
  }

  fn unique(&self, name: &str) -> String {
    if !self.used.contains(name) {
      return name.into();
    }
    let mut k = 0;
    loop {
      let suffixed = format!("{}_{}", name, k);
      if !self.used.contains(&suffixed) {
        return suffixed;
      }
      k += 1;
    }
  }

  fn temp(&mut self) -> String {
    loop {
      let name = self.next_temp.to_string();
      self.next_temp += 1;
      if !self.used.contains(&name) {
        return name;
      }
    }
  }
}

impl NameManager {
  /// Creates a new `NameManager`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Enters a new function scope, local names and temporary numbering
  /// start over.
  pub fn enter_func_scope(&mut self) {
    self.local = Scope::default();
  }

  /// Exits the current function scope.
  pub fn exit_func_scope(&mut self) {
    self.local = Scope::default();
  }

  /// Returns the name of the given value, with its `@`/`%` sigil.
  pub fn value_name(&mut self, value: Value, data: &ValueData) -> String {
    if matches!(data.kind(), ValueKind::Function | ValueKind::GlobalAlloc(_)) {
      format!("@{}", self.global.name(value, data))
    } else {
      format!("%{}", self.local.name(value, data))
    }
  }
}

/// A visitor trait for all IR text generators.
pub trait Visitor<W: Write> {
  /// The output type of all visitor methods.
  type Output;

  /// Visits the given module.
  fn visit(&mut self, w: &mut W, nm: &mut NameManager, module: &Module) -> Result<Self::Output>;
}

/// A generator for traversing and generating the in-memory IR into
/// other forms.
pub struct Generator<W: Write, V: Visitor<W>> {
  writer: W,
  visitor: V,
}

impl<W: Write, V: Visitor<W>> Generator<W, V> {
  /// Creates a new generator with the given writer and visitor.
  pub fn with_visitor(writer: W, visitor: V) -> Self {
    Self { writer, visitor }
  }

  /// Generates on the given module, names are allocated from scratch.
  pub fn generate_on(&mut self, module: &Module) -> Result<V::Output> {
    let mut nm = NameManager::new();
    self.visitor.visit(&mut self.writer, &mut nm, module)
  }

  /// Returns a reference to the visitor.
  pub fn visitor(&self) -> &V {
    &self.visitor
  }

  /// Consumes the generator and returns the writer.
  pub fn writer(self) -> W {
    self.writer
  }
}

impl<W: Write, V: Visitor<W> + Default> Generator<W, V> {
  /// Creates a new generator with the given writer.
  pub fn new(writer: W) -> Self {
    Self::with_visitor(writer, V::default())
  }
}

impl<V: Visitor<File> + Default> Generator<File, V> {
  /// Creates a new generator that writes to the file at the given path.
  pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
    File::create(path).map(Self::new)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::ir::Type;

  #[test]
  fn scoped_names() {
    let mut module = Module::new("test");
    let f = module.new_func(
      "f",
      vec![
        (Some("x".into()), Type::get_i32()),
        (Some("x".into()), Type::get_i32()),
        (None, Type::get_i32()),
      ],
      Type::get_void(),
    );
    let g = module.new_decl("g", Vec::new(), Type::get_void());
    let dfg = module.dfg();
    let params = dfg.func(f).params();
    let mut nm = NameManager::new();
    nm.enter_func_scope();
    assert_eq!(nm.value_name(f.value(), dfg.value(f.value())), "@f");
    assert_eq!(nm.value_name(g.value(), dfg.value(g.value())), "@g");
    assert_eq!(nm.value_name(params[0], dfg.value(params[0])), "%x");
    assert_eq!(nm.value_name(params[1], dfg.value(params[1])), "%x_0");
    assert_eq!(nm.value_name(params[2], dfg.value(params[2])), "%0");
    // names are stable
    assert_eq!(nm.value_name(params[1], dfg.value(params[1])), "%x_0");
    nm.exit_func_scope();
    nm.enter_func_scope();
    assert_eq!(nm.value_name(params[2], dfg.value(params[2])), "%0");
    assert_eq!(nm.value_name(f.value(), dfg.value(f.value())), "@f");
  }
}
