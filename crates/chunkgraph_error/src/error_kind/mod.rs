use std::fmt::Display;

use chunkgraph_common::StaticStr;

use crate::utils::format_quoted_strings;

pub mod error_code;

/// A broken parent/child invariant found by a constraint audit. Chunks are named by debug id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintViolation {
  DuplicateChild { chunk: u32, child: u32 },
  DuplicateParent { chunk: u32, parent: u32 },
  ChildMissingParent { chunk: u32, child: u32 },
  ParentMissingChild { chunk: u32, parent: u32 },
  SelfEdge { chunk: u32 },
}

impl Display for ConstraintViolation {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ConstraintViolation::DuplicateChild { chunk, child } => write!(f, "checkConstraints: duplicate child in chunk {chunk} {child}"),
      ConstraintViolation::DuplicateParent { chunk, parent } => write!(f, "checkConstraints: duplicate parent in chunk {chunk} {parent}"),
      ConstraintViolation::ChildMissingParent { chunk, child } => write!(f, "checkConstraints: child missing parent {chunk} -> {child}"),
      ConstraintViolation::ParentMissingChild { chunk, parent } => write!(f, "checkConstraints: parent missing child {parent} <- {chunk}"),
      ConstraintViolation::SelfEdge { chunk } => write!(f, "checkConstraints: chunk {chunk} is its own parent"),
    }
  }
}

#[derive(Debug)]
pub enum ErrorKind {
  // --- Structural faults
  ConstraintViolation(ConstraintViolation),

  // --- Configuration
  InvalidOptionValue {
    option: StaticStr,
    value: String,
    expected: StaticStr,
  },
  UnknownReference {
    kind: &'static str,
    name: String,
    known: Vec<String>,
  },
}

impl Display for ErrorKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      // Structural faults
      ErrorKind::ConstraintViolation(violation) => violation.fmt(f),
      // Configuration
      ErrorKind::InvalidOptionValue { option, value, expected } => write!(f, r#""{option}" must be {expected}, received "{value}"."#),
      ErrorKind::UnknownReference { kind, name, known } => {
        if known.is_empty() {
          write!(f, r#"Unknown {kind} "{name}"."#)
        } else {
          let mut known = known.iter().collect::<Vec<_>>();
          known.sort();
          write!(f, r#"Unknown {kind} "{name}", expected one of {}."#, format_quoted_strings(&known))
        }
      }
    }
  }
}

impl ErrorKind {
  pub fn code(&self) -> &'static str {
    match self {
      // Structural faults
      ErrorKind::ConstraintViolation(_) => error_code::CONSTRAINT_VIOLATION,
      // Configuration
      ErrorKind::InvalidOptionValue { .. } => error_code::INVALID_OPTION,
      ErrorKind::UnknownReference { .. } => error_code::UNKNOWN_REFERENCE,
    }
  }
}
