use std::cmp::Ordering;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Position {
  pub line: u32,
  pub column: u32,
}

/// Where in its module a dependency or code-split point was found.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DependencyLocation {
  Real {
    start: Position,
    #[serde(default)]
    end: Option<Position>,
    #[serde(default)]
    index: Option<u32>,
  },
  /// A location that doesn't point into source text, e.g. `"main"` for an entry.
  Synthetic(String),
}

impl DependencyLocation {
  pub fn at(line: u32, column: u32) -> Self {
    Self::Real {
      start: Position { line, column },
      end: None,
      index: None,
    }
  }
}

/// Real locations sort before synthetic ones. Real locations compare by start position, then by
/// `index` when both have one. Missing locations compare equal to anything.
pub fn compare_locations(a: Option<&DependencyLocation>, b: Option<&DependencyLocation>) -> Ordering {
  match (a, b) {
    (Some(DependencyLocation::Synthetic(a)), Some(DependencyLocation::Synthetic(b))) => a.cmp(b),
    (Some(DependencyLocation::Synthetic(_)), Some(DependencyLocation::Real { .. })) => {
      Ordering::Greater
    }
    (Some(DependencyLocation::Real { .. }), Some(DependencyLocation::Synthetic(_))) => Ordering::Less,
    (
      Some(DependencyLocation::Real {
        start: a_start,
        index: a_index,
        ..
      }),
      Some(DependencyLocation::Real {
        start: b_start,
        index: b_index,
        ..
      }),
    ) => a_start
      .line
      .cmp(&b_start.line)
      .then(a_start.column.cmp(&b_start.column))
      .then_with(|| match (a_index, b_index) {
        (Some(a), Some(b)) => a.cmp(b),
        _ => Ordering::Equal,
      }),
    _ => Ordering::Equal,
  }
}
