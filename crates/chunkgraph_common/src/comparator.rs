use std::{
  cmp::Ordering,
  sync::{
    atomic::{self, AtomicU64},
    Arc,
  },
};

static NEXT_COMPARATOR_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a [Comparator]. Clones of a comparator share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComparatorId(u64);

type CompareFn<T, C> = dyn Fn(&C, &T, &T) -> Ordering + Send + Sync;

/// A sort function with a stable identity.
///
/// [crate::SortableSet] remembers the identity of the last comparator it was sorted with, so
/// sorting twice with the same comparator (or a clone of it) is free. A freshly constructed
/// comparator never matches a previous one, even if the closures are identical.
///
/// `C` is a context passed in at sort time, for orders that are defined by data living outside of
/// the sorted elements (e.g. module ids stored in an arena).
pub struct Comparator<T, C = ()> {
  id: ComparatorId,
  compare: Arc<CompareFn<T, C>>,
}

impl<T: 'static> Comparator<T> {
  pub fn new(compare: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
    Self::with_context(move |_: &(), a: &T, b: &T| compare(a, b))
  }
}

impl<T: 'static, C: 'static> Comparator<T, C> {
  pub fn with_context(compare: impl Fn(&C, &T, &T) -> Ordering + Send + Sync + 'static) -> Self {
    Self {
      id: ComparatorId(NEXT_COMPARATOR_ID.fetch_add(1, atomic::Ordering::Relaxed)),
      compare: Arc::new(compare),
    }
  }
}

impl<T, C> Comparator<T, C> {
  pub fn id(&self) -> ComparatorId {
    self.id
  }

  pub fn compare(&self, ctx: &C, a: &T, b: &T) -> Ordering {
    (self.compare)(ctx, a, b)
  }
}

impl<T, C> Clone for Comparator<T, C> {
  fn clone(&self) -> Self {
    Self {
      id: self.id,
      compare: Arc::clone(&self.compare),
    }
  }
}

impl<T, C> std::fmt::Debug for Comparator<T, C> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("Comparator").field(&self.id.0).finish()
  }
}
