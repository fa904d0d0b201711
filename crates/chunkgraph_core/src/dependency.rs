use std::fmt::Debug;

use chunkgraph_common::HashSink;

/// A reference from a module to something it needs. Resolution semantics belong to the
/// implementor.
pub trait Dependency: Debug + Send + Sync {
  fn update_hash(&self, hash: &mut dyn HashSink);

  /// Drops resolution state. Must be safe to call more than once.
  fn disconnect(&mut self);

  fn request(&self) -> Option<&str> {
    None
  }

  fn is_weak(&self) -> bool {
    false
  }
}

pub type DependencyFilter<'a> = &'a dyn Fn(&dyn Dependency) -> bool;
