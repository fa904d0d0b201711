use std::borrow::Cow;
use std::fmt::Display;

use serde::Deserialize;

mod sortable_set;
pub use sortable_set::*;
mod comparator;
pub use comparator::*;
mod hash;
pub use hash::*;
mod location;
pub use location::*;
mod path;
pub use path::*;

oxc_index::define_index_type! {
  pub struct ChunkIdx = u32;
}

oxc_index::define_index_type! {
  pub struct ModuleIdx = u32;
}

oxc_index::define_index_type! {
  pub struct BlockIdx = u32;
}

oxc_index::define_index_type! {
  pub struct EntrypointIdx = u32;
}

/// An id handed out by an external id-assignment pass.
///
/// Numeric ids sort before named ones, numerically among themselves.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Deserialize)]
#[serde(untagged)]
pub enum AssignedId {
  Number(u32),
  Name(StaticStr),
}

pub type ChunkId = AssignedId;
pub type ModuleId = AssignedId;

impl Display for AssignedId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      AssignedId::Number(n) => write!(f, "{n}"),
      AssignedId::Name(name) => write!(f, "{name}"),
    }
  }
}

impl From<u32> for AssignedId {
  fn from(value: u32) -> Self {
    Self::Number(value)
  }
}

impl From<&'static str> for AssignedId {
  fn from(value: &'static str) -> Self {
    Self::Name(Cow::Borrowed(value))
  }
}

impl From<String> for AssignedId {
  fn from(value: String) -> Self {
    Self::Name(Cow::Owned(value))
  }
}

pub type StaticStr = Cow<'static, str>;
