use chunkgraph_common::{HashSink, ModuleId};

use crate::{Module, ModuleChunks};

#[derive(Debug)]
pub(crate) struct TestModule {
  identifier: String,
  size: f64,
  id: Option<ModuleId>,
  module_chunks: ModuleChunks,
}

impl TestModule {
  pub(crate) fn boxed(identifier: &str, size: f64) -> Box<dyn Module> {
    Box::new(Self {
      identifier: identifier.to_string(),
      size,
      id: None,
      module_chunks: Default::default(),
    })
  }

  pub(crate) fn with_id(identifier: &str, size: f64, id: u32) -> Box<dyn Module> {
    let mut module = Self::boxed(identifier, size);
    module.set_id(Some(ModuleId::from(id)));
    module
  }
}

impl Module for TestModule {
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
