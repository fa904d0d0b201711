use std::fmt::Display;

use chunkgraph_common::StaticStr;

use crate::{ConstraintViolation, ErrorKind};

#[derive(Debug)]
pub struct Error {
  contexts: Vec<String>,
  pub kind: ErrorKind,
}

impl PartialEq for Error {
  fn eq(&self, other: &Self) -> bool {
    self.kind.to_string().eq(&other.kind.to_string())
  }
}

impl Eq for Error {}

impl PartialOrd for Error {
  fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Error {
  fn cmp(&self, other: &Self) -> std::cmp::Ordering {
    self.kind.to_string().cmp(&other.kind.to_string())
  }
}

impl Error {
  fn with_kind(kind: ErrorKind) -> Self {
    Self {
      contexts: vec![],
      kind,
    }
  }

  pub fn context(mut self, context: String) -> Self {
    self.contexts.push(context);
    self
  }

  pub fn code(&self) -> &'static str {
    self.kind.code()
  }

  // --- Structural faults

  pub fn constraint_violation(violation: ConstraintViolation) -> Self {
    Self::with_kind(ErrorKind::ConstraintViolation(violation))
  }

  // --- Configuration

  pub fn invalid_option_value(
    option: impl Into<StaticStr>,
    value: impl ToString,
    expected: impl Into<StaticStr>,
  ) -> Self {
    Self::with_kind(ErrorKind::InvalidOptionValue {
      option: option.into(),
      value: value.to_string(),
      expected: expected.into(),
    })
  }

  pub fn unknown_reference(kind: &'static str, name: impl Into<String>, known: Vec<String>) -> Self {
    Self::with_kind(ErrorKind::UnknownReference {
      kind,
      name: name.into(),
      known,
    })
  }
}

impl std::error::Error for Error {}

impl Display for Error {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for ctx in self.contexts.iter().rev() {
      writeln!(f, "{}: {}", ansi_term::Color::Yellow.paint("context"), ctx)?;
    }

    self.kind.fmt(f)
  }
}

#[cfg(test)]
mod tests {
  use crate::{error_code, ConstraintViolation, Error};

  #[test]
  fn constraint_violation_message() {
    let err = Error::constraint_violation(ConstraintViolation::ChildMissingParent {
      chunk: 1000,
      child: 1001,
    });
    assert_eq!(err.code(), error_code::CONSTRAINT_VIOLATION);
    assert_eq!(
      err.to_string(),
      "checkConstraints: child missing parent 1000 -> 1001"
    );
  }

  #[test]
  fn contexts_are_printed_before_the_message() {
    let err = Error::invalid_option_value("maxChunks", 0, "at least 1")
      .context("while applying LimitChunkCount".to_string());
    let message = err.to_string();
    assert!(message.contains("while applying LimitChunkCount"));
    assert!(message.ends_with(r#""maxChunks" must be at least 1, received "0"."#));
  }

  #[test]
  fn unknown_reference_lists_known_names_sorted() {
    let err = Error::unknown_reference("chunk", "c", vec!["b".to_string(), "a".to_string()]);
    assert_eq!(
      err.to_string(),
      r#"Unknown chunk "c", expected one of "a" and "b"."#
    );
  }
}
