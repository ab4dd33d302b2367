//! Types of IR values ([`Type`], [`TypeKind`]).
//!
//! Types are compared structurally: two separately created `i32*` types
//! are equal.

use std::fmt;
use std::rc::Rc;

/// Types of IR values.
///
/// `Type` is a cheap handle, cloning it only bumps a reference count.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Type(Rc<TypeKind>);

/// Kind of IR types.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum TypeKind {
  /// Integer with the given bit width, `i1` is used as boolean.
  Int(u32),
  /// 32-bit floating point number.
  Float,
  /// Void, the type of values that produce nothing.
  Void,
  /// Basic block label.
  Label,
  /// Array (with base type and length).
  Array(Type, usize),
  /// Pointer (with base type).
  Pointer(Type),
  /// Function (with parameter types and return type).
  Function(Vec<Type>, Type),
}

impl Type {
  /// Returns a type by the given kind.
  pub fn get(kind: TypeKind) -> Type {
    Type(Rc::new(kind))
  }

  /// Returns an integer type with the given bit width.
  ///
  /// # Panics
  ///
  /// Panics if `bits` is zero.
  pub fn get_int(bits: u32) -> Type {
    assert!(bits != 0, "bit width can not be zero");
    Type::get(TypeKind::Int(bits))
  }

  /// Returns an `i1` type.
  pub fn get_i1() -> Type {
    Type::get_int(1)
  }

  /// Returns an `i32` type.
  pub fn get_i32() -> Type {
    Type::get_int(32)
  }

  /// Returns a `float` type.
  pub fn get_float() -> Type {
    Type::get(TypeKind::Float)
  }

  /// Returns a `void` type.
  pub fn get_void() -> Type {
    Type::get(TypeKind::Void)
  }

  /// Returns a `label` type.
  pub fn get_label() -> Type {
    Type::get(TypeKind::Label)
  }

  /// Returns an array type with the given base type and length.
  ///
  /// # Panics
  ///
  /// Panics if the base type is `void` or `label`.
  pub fn get_array(base: Type, len: usize) -> Type {
    assert!(
      !base.is_void() && !base.is_label(),
      "base type must not be `void` or `label`"
    );
    Type::get(TypeKind::Array(base, len))
  }

  /// Returns a pointer type with the given base type.
  pub fn get_pointer(base: Type) -> Type {
    Type::get(TypeKind::Pointer(base))
  }

  /// Returns a function type with the given parameter types and return type.
  ///
  /// # Panics
  ///
  /// Panics if any parameter type is `void`.
  pub fn get_function(params: Vec<Type>, ret: Type) -> Type {
    assert!(
      params.iter().all(|p| !p.is_void()),
      "parameter type must not be `void`"
    );
    Type::get(TypeKind::Function(params, ret))
  }

  /// Returns a reference to the kind of the current type.
  pub fn kind(&self) -> &TypeKind {
    &self.0
  }

  /// Checks if the current type is an integer type.
  pub fn is_int(&self) -> bool {
    matches!(self.kind(), TypeKind::Int(_))
  }

  /// Checks if the current type is `i1`.
  pub fn is_i1(&self) -> bool {
    matches!(self.kind(), TypeKind::Int(1))
  }

  /// Checks if the current type is `i32`.
  pub fn is_i32(&self) -> bool {
    matches!(self.kind(), TypeKind::Int(32))
  }

  /// Checks if the current type is `float`.
  pub fn is_float(&self) -> bool {
    matches!(self.kind(), TypeKind::Float)
  }

  /// Checks if the current type is `void`.
  pub fn is_void(&self) -> bool {
    matches!(self.kind(), TypeKind::Void)
  }

  /// Checks if the current type is `label`.
  pub fn is_label(&self) -> bool {
    matches!(self.kind(), TypeKind::Label)
  }

  /// Checks if the current type is an array type.
  pub fn is_array(&self) -> bool {
    matches!(self.kind(), TypeKind::Array(..))
  }

  /// Checks if the current type is a pointer type.
  pub fn is_pointer(&self) -> bool {
    matches!(self.kind(), TypeKind::Pointer(_))
  }

  /// Checks if the current type is a function type.
  pub fn is_function(&self) -> bool {
    matches!(self.kind(), TypeKind::Function(..))
  }

  /// Returns the bit width of an integer type, or `None` otherwise.
  pub fn bits(&self) -> Option<u32> {
    match self.kind() {
      TypeKind::Int(bits) => Some(*bits),
      _ => None,
    }
  }

  /// Returns the base type of a pointer type, or `None` otherwise.
  pub fn pointee(&self) -> Option<&Type> {
    match self.kind() {
      TypeKind::Pointer(base) => Some(base),
      _ => None,
    }
  }

  /// Returns the element type of an array type, or `None` otherwise.
  pub fn array_elem(&self) -> Option<&Type> {
    match self.kind() {
      TypeKind::Array(base, _) => Some(base),
      _ => None,
    }
  }

  /// Returns the lengths of all nested array dimensions, outermost first.
  ///
  /// Returns an empty vector if the current type is not an array.
  pub fn array_dims(&self) -> Vec<usize> {
    let mut dims = Vec::new();
    let mut ty = self;
    while let TypeKind::Array(base, len) = ty.kind() {
      dims.push(*len);
      ty = base;
    }
    dims
  }

  /// Returns the parameter types of a function type, or `None` otherwise.
  pub fn fn_params(&self) -> Option<&[Type]> {
    match self.kind() {
      TypeKind::Function(params, _) => Some(params),
      _ => None,
    }
  }

  /// Returns the return type of a function type, or `None` otherwise.
  pub fn fn_ret(&self) -> Option<&Type> {
    match self.kind() {
      TypeKind::Function(_, ret) => Some(ret),
      _ => None,
    }
  }
}

impl fmt::Display for Type {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self.kind() {
      TypeKind::Int(bits) => write!(f, "i{}", bits),
      TypeKind::Float => f.write_str("float"),
      TypeKind::Void => f.write_str("void"),
      TypeKind::Label => f.write_str("label"),
      TypeKind::Array(base, len) => write!(f, "[{} x {}]", len, base),
      TypeKind::Pointer(base) => write!(f, "{}*", base),
      TypeKind::Function(params, ret) => {
        write!(f, "{} (", ret)?;
        for (i, param) in params.iter().enumerate() {
          if i != 0 {
            f.write_str(", ")?;
          }
          write!(f, "{}", param)?;
        }
        f.write_str(")")
      }
    }
  }
}

impl fmt::Debug for Type {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    fmt::Display::fmt(self, f)
  }
}

impl fmt::Debug for TypeKind {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", Type::get(self.clone()))
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn print_types() {
    assert_eq!(format!("{}", Type::get_i32()), "i32");
    assert_eq!(format!("{}", Type::get_i1()), "i1");
    assert_eq!(format!("{}", Type::get_void()), "void");
    assert_eq!(format!("{}", Type::get_label()), "label");
    assert_eq!(
      format!("{}", Type::get_array(Type::get_array(Type::get_i32(), 3), 2)),
      "[2 x [3 x i32]]"
    );
    assert_eq!(
      format!("{}", Type::get_pointer(Type::get_pointer(Type::get_float()))),
      "float**"
    );
    assert_eq!(
      format!(
        "{}",
        Type::get_function(vec![Type::get_i32(), Type::get_i1()], Type::get_void())
      ),
      "void (i32, i1)"
    );
  }

  #[test]
  fn structural_equality() {
    assert_eq!(Type::get_i32(), Type::get_int(32));
    assert_ne!(Type::get_i32(), Type::get_i1());
    assert_eq!(
      Type::get_pointer(Type::get_array(Type::get_i32(), 4)),
      Type::get_pointer(Type::get_array(Type::get_i32(), 4))
    );
    assert_ne!(
      Type::get_array(Type::get_i32(), 4),
      Type::get_array(Type::get_i32(), 5)
    );
  }

  #[test]
  fn accessors() {
    let arr = Type::get_array(Type::get_array(Type::get_i32(), 3), 2);
    assert_eq!(arr.array_dims(), vec![2, 3]);
    assert_eq!(arr.array_elem(), Some(&Type::get_array(Type::get_i32(), 3)));
    assert!(Type::get_i32().array_dims().is_empty());
    let ptr = Type::get_pointer(arr.clone());
    assert_eq!(ptr.pointee(), Some(&arr));
    assert_eq!(Type::get_i1().bits(), Some(1));
    assert_eq!(Type::get_float().bits(), None);
    let func = Type::get_function(vec![Type::get_i32()], Type::get_i1());
    assert_eq!(func.fn_params(), Some(&[Type::get_i32()][..]));
    assert_eq!(func.fn_ret(), Some(&Type::get_i1()));
  }

  #[test]
  #[should_panic]
  fn void_param() {
    Type::get_function(vec![Type::get_void()], Type::get_i32());
  }
}
