use chunkgraph_common::{
  BlockIdx, ChunkId, ChunkIdx, DependencyLocation, EntrypointIdx, ModuleIdx, SortableSet,
};
use oxc_index::IndexVec;

pub type ChunkTable = IndexVec<ChunkIdx, Chunk>;

/// Why a chunk exists: the module and location that asked for it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkOrigin {
  pub module: Option<ModuleIdx>,
  pub loc: Option<DependencyLocation>,
  pub name: Option<String>,
  /// Most recent first until the graph is sealed; `sort_items` sorts them alphabetically. Grows
  /// when the chunk absorbs another one.
  pub reasons: Vec<String>,
}

/// A node of the chunk graph.
///
/// Everything that touches more than one chunk (edges, module membership, merging) goes through
/// [crate::ChunkGraph], which keeps both sides of every relation in sync. `Chunk` only exposes
/// reads plus its own metadata.
#[derive(Debug)]
pub struct Chunk {
  pub(crate) id: Option<ChunkId>,
  pub(crate) ids: Option<Vec<ChunkId>>,
  pub name: Option<String>,
  debug_id: u32,
  pub(crate) modules: SortableSet<ModuleIdx>,
  pub(crate) children: SortableSet<ChunkIdx>,
  pub(crate) parents: SortableSet<ChunkIdx>,
  pub(crate) blocks: Vec<BlockIdx>,
  pub(crate) origins: Vec<ChunkOrigin>,
  pub(crate) entrypoints: Vec<EntrypointIdx>,
  pub files: Vec<String>,
  pub rendered: bool,
  pub hash: Option<String>,
  pub rendered_hash: Option<String>,
  pub chunk_reason: Option<String>,
}

impl Chunk {
  pub(crate) fn new(name: Option<String>, debug_id: u32) -> Self {
    Self {
      id: None,
      ids: None,
      name,
      debug_id,
      // Module order is keyed by module ids, which are assigned after insertion.
      modules: SortableSet::new().with_no_cache(),
      children: Default::default(),
      parents: Default::default(),
      blocks: vec![],
      origins: vec![],
      entrypoints: vec![],
      files: vec![],
      rendered: false,
      hash: None,
      rendered_hash: None,
      chunk_reason: None,
    }
  }

  pub fn debug_id(&self) -> u32 {
    self.debug_id
  }

  /// Set through [crate::ChunkGraph::set_chunk_id], which keeps the parent/child order fresh.
  pub fn id(&self) -> Option<&ChunkId> {
    self.id.as_ref()
  }

  pub fn ids(&self) -> Option<&[ChunkId]> {
    self.ids.as_deref()
  }

  pub fn modules(&self) -> impl Iterator<Item = ModuleIdx> + '_ {
    self.modules.iter().copied()
  }

  pub fn number_of_modules(&self) -> usize {
    self.modules.len()
  }

  pub fn contains_module(&self, module: ModuleIdx) -> bool {
    self.modules.contains(&module)
  }

  pub fn is_empty(&self) -> bool {
    self.modules.is_empty()
  }

  pub fn children(&self) -> impl Iterator<Item = ChunkIdx> + '_ {
    self.children.iter().copied()
  }

  pub fn number_of_children(&self) -> usize {
    self.children.len()
  }

  pub fn has_child(&self, chunk: ChunkIdx) -> bool {
    self.children.contains(&chunk)
  }

  pub fn parents(&self) -> impl Iterator<Item = ChunkIdx> + '_ {
    self.parents.iter().copied()
  }

  pub fn number_of_parents(&self) -> usize {
    self.parents.len()
  }

  pub fn has_parent(&self, chunk: ChunkIdx) -> bool {
    self.parents.contains(&chunk)
  }

  pub fn blocks(&self) -> &[BlockIdx] {
    &self.blocks
  }

  pub fn origins(&self) -> &[ChunkOrigin] {
    &self.origins
  }

  pub fn add_origin(
    &mut self,
    module: Option<ModuleIdx>,
    loc: Option<DependencyLocation>,
    name: Option<String>,
  ) {
    self.origins.push(ChunkOrigin {
      module,
      loc,
      name,
      reasons: vec![],
    });
  }

  pub fn entrypoints(&self) -> &[EntrypointIdx] {
    &self.entrypoints
  }

  /// Part of at least one entrypoint.
  pub fn is_initial(&self) -> bool {
    !self.entrypoints.is_empty()
  }
}
