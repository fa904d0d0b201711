use chunkgraph_common::HashSink;

use crate::{Dependency, DependencyFilter};

/// A named value injected at the top of a block, e.g. a free variable provided by the bundler.
#[derive(Debug)]
pub struct DependenciesBlockVariable {
  pub name: String,
  pub expression: String,
  dependencies: Vec<Box<dyn Dependency>>,
}

impl DependenciesBlockVariable {
  pub fn new(
    name: impl Into<String>,
    expression: impl Into<String>,
    dependencies: Vec<Box<dyn Dependency>>,
  ) -> Self {
    Self {
      name: name.into(),
      expression: expression.into(),
      dependencies,
    }
  }

  pub fn dependencies(&self) -> &[Box<dyn Dependency>] {
    &self.dependencies
  }

  pub fn update_hash(&self, hash: &mut dyn HashSink) {
    hash.update_str(&self.name);
    hash.update_str(&self.expression);
    self
      .dependencies
      .iter()
      .for_each(|dependency| dependency.update_hash(hash));
  }

  pub fn disconnect(&mut self) {
    self
      .dependencies
      .iter_mut()
      .for_each(|dependency| dependency.disconnect());
  }

  pub fn has_dependencies(&self, filter: Option<DependencyFilter>) -> bool {
    match filter {
      Some(filter) => self.dependencies.iter().any(|d| filter(d.as_ref())),
      None => !self.dependencies.is_empty(),
    }
  }
}
