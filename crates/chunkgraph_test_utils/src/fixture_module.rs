use chunkgraph_common::{HashSink, ModuleId};
use chunkgraph_core::{Dependency, Module, ModuleChunks};

/// A module that is nothing but an identifier and a size.
#[derive(Debug)]
pub struct FixtureModule {
  identifier: String,
  size: f64,
  id: Option<ModuleId>,
  module_chunks: ModuleChunks,
}

impl FixtureModule {
  pub fn new(identifier: impl Into<String>, size: f64) -> Self {
    Self {
      identifier: identifier.into(),
      size,
      id: None,
      module_chunks: Default::default(),
    }
  }

  pub fn with_id(mut self, id: Option<ModuleId>) -> Self {
    self.id = id;
    self
  }

  pub fn boxed(self) -> Box<dyn Module> {
    Box::new(self)
  }
}

impl Module for FixtureModule {
  fn identifier(&self) -> &str {
    &self.identifier
  }

  fn size(&self) -> f64 {
    self.size
  }

  fn id(&self) -> Option<&ModuleId> {
    self.id.as_ref()
  }

  fn set_id(&mut self, id: Option<ModuleId>) {
    self.id = id;
  }

  fn update_hash(&self, hash: &mut dyn HashSink) {
    hash.update_str(&self.identifier);
  }

  fn module_chunks(&self) -> &ModuleChunks {
    &self.module_chunks
  }

  fn module_chunks_mut(&mut self) -> &mut ModuleChunks {
    &mut self.module_chunks
  }
}

#[derive(Debug)]
pub struct FixtureDependency {
  request: String,
  connected: bool,
}

impl FixtureDependency {
  pub fn new(request: impl Into<String>) -> Self {
    Self {
      request: request.into(),
      connected: true,
    }
  }

  pub fn is_connected(&self) -> bool {
    self.connected
  }
}

impl Dependency for FixtureDependency {
  fn update_hash(&self, hash: &mut dyn HashSink) {
    hash.update_str(&self.request);
  }

  fn disconnect(&mut self) {
    self.connected = false;
  }

  fn request(&self) -> Option<&str> {
    Some(&self.request)
  }
}
