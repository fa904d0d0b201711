use std::hash::Hash;

use hashlink::LinkedHashSet;

use crate::{Comparator, ComparatorId};

/// An insertion-ordered set which remembers the last comparator it was sorted with.
///
/// Invariants of the cache:
/// - Adding a value always forgets the remembered comparator, the new value's sorted position is
///   unknown.
/// - Removing a value keeps it. Removal never changes the relative order of the remaining values.
///
/// The cache assumes the comparator's answer for two members never changes between calls. When
/// members are ordered by data that can be mutated in place (ids assigned after insertion), build
/// the set with [SortableSet::with_no_cache].
#[derive(Debug, Clone)]
pub struct SortableSet<T: Hash + Eq> {
  items: LinkedHashSet<T>,
  default_comparator: Option<Comparator<T>>,
  last_sorted_by: Option<ComparatorId>,
  no_cache: bool,
}

impl<T: Hash + Eq> Default for SortableSet<T> {
  fn default() -> Self {
    Self {
      items: LinkedHashSet::new(),
      default_comparator: None,
      last_sorted_by: None,
      no_cache: false,
    }
  }
}

impl<T: Hash + Eq> SortableSet<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// `comparator` becomes the one used by [SortableSet::sort].
  pub fn with_comparator(comparator: Comparator<T>) -> Self {
    Self {
      default_comparator: Some(comparator),
      ..Self::default()
    }
  }

  pub fn with_no_cache(mut self) -> Self {
    self.no_cache = true;
    self
  }

  pub fn is_no_cache(&self) -> bool {
    self.no_cache
  }

  /// Returns `false` if the value was already present. The remembered comparator is forgotten
  /// either way.
  pub fn add(&mut self, value: T) -> bool {
    self.last_sorted_by = None;
    if self.items.contains(&value) {
      return false;
    }
    self.items.insert(value)
  }

  pub fn remove(&mut self, value: &T) -> bool {
    self.items.remove(value)
  }

  pub fn clear(&mut self) {
    self.last_sorted_by = None;
    self.items.clear();
  }

  pub fn contains(&self, value: &T) -> bool {
    self.items.contains(value)
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
    self.items.iter()
  }

  pub fn first(&self) -> Option<&T> {
    self.items.front()
  }

  /// Whether the current order is known to be the one produced by `comparator`.
  pub fn is_sorted_by(&self, comparator: ComparatorId) -> bool {
    self.last_sorted_by == Some(comparator)
  }

  pub fn sort_with(&mut self, comparator: &Comparator<T>) {
    self.sort_with_context(comparator, &())
  }

  pub fn sort_with_context<C>(&mut self, comparator: &Comparator<T, C>, ctx: &C) {
    if !self.no_cache && (self.items.is_empty() || self.is_sorted_by(comparator.id())) {
      return;
    }
    let mut sorted = std::mem::take(&mut self.items)
      .into_iter()
      .collect::<Vec<_>>();
    // `sort_by` is stable, equal elements keep their insertion order.
    sorted.sort_by(|a, b| comparator.compare(ctx, a, b));
    self.items = sorted.into_iter().collect();
    self.last_sorted_by = Some(comparator.id());
  }
}

impl<T: Hash + Eq + Clone> SortableSet<T> {
  pub fn to_vec(&self) -> Vec<T> {
    self.items.iter().cloned().collect()
  }
}

impl<T: Hash + Eq + Ord + 'static> SortableSet<T> {
  /// Sorts with the construction comparator, or by `Ord` when there is none.
  pub fn sort(&mut self) {
    let comparator = self
      .default_comparator
      .get_or_insert_with(|| Comparator::new(T::cmp))
      .clone();
    self.sort_with(&comparator);
  }
}

impl<T: Hash + Eq> FromIterator<T> for SortableSet<T> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    let mut set = Self::new();
    iter.into_iter().for_each(|value| {
      set.add(value);
    });
    set
  }
}

impl<T: Hash + Eq> Extend<T> for SortableSet<T> {
  fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
    iter.into_iter().for_each(|value| {
      self.add(value);
    });
  }
}

impl<'a, T: Hash + Eq> IntoIterator for &'a SortableSet<T> {
  type Item = &'a T;
  type IntoIter = hashlink::linked_hash_set::Iter<'a, T>;

  fn into_iter(self) -> Self::IntoIter {
    self.items.iter()
  }
}
