use std::num::NonZeroU32;

/// Type of `Value` identifier.
///
/// Basic blocks and functions are values too, so all handles of a
/// data flow graph share this id space.
pub(crate) type ValueId = NonZeroU32;

/// The value of `ValueId` should start from 1,
/// because we want `Option<Value>` to be as small as `Value`.
const VALUE_ID_STARTS_FROM: u32 = 1;

/// Allocator of value identifiers.
///
/// Every data flow graph owns its own allocator, there is no process-wide
/// counter. Handles are only meaningful for the graph that created them.
#[derive(Debug)]
pub(crate) struct IdAllocator {
  next: u32,
}

impl IdAllocator {
  /// Creates a new allocator.
  pub(crate) fn new() -> Self {
    Self {
      next: VALUE_ID_STARTS_FROM,
    }
  }

  /// Gets the next value ID.
  ///
  /// # Panics
  ///
  /// Panics if the id space is exhausted.
  pub(crate) fn next_value_id(&mut self) -> ValueId {
    let id = ValueId::new(self.next).expect("value id must not be zero");
    self.next = self.next.checked_add(1).expect("too many values");
    id
  }
}

impl Default for IdAllocator {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn ids_are_sequential() {
    let mut ids = IdAllocator::new();
    assert_eq!(ids.next_value_id().get(), 1);
    assert_eq!(ids.next_value_id().get(), 2);
    let mut other = IdAllocator::default();
    assert_eq!(other.next_value_id().get(), 1);
  }
}
