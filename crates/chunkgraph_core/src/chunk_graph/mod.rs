use std::cmp::Ordering;

use chunkgraph_common::{AssignedId, BlockIdx, ChunkId, ChunkIdx, Comparator, EntrypointIdx, ModuleIdx};
use derivative::Derivative;
use hashlink::LinkedHashSet;
use oxc_index::IndexVec;

use crate::{
  Chunk, ChunkTable, DependenciesBlock, DependenciesBlocks, Entrypoint, Module, ModuleTable,
};

mod cost;
mod edges;
mod seal;
mod structure;
mod traversal;
pub use traversal::ChunkMaps;

/// Debug ids handed out by a fresh graph start here.
pub const FIRST_DEBUG_ID: u32 = 1000;

fn compare_assigned_ids(a: Option<&AssignedId>, b: Option<&AssignedId>) -> Ordering {
  match (a, b) {
    (Some(a), Some(b)) => a.cmp(b),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

fn chunk_order() -> Comparator<ChunkIdx, ChunkTable> {
  Comparator::with_context(|chunks: &ChunkTable, a: &ChunkIdx, b: &ChunkIdx| {
    let (a, b) = (&chunks[*a], &chunks[*b]);
    compare_assigned_ids(a.id.as_ref(), b.id.as_ref()).then_with(|| a.debug_id().cmp(&b.debug_id()))
  })
}

fn module_order() -> Comparator<ModuleIdx, ModuleTable> {
  Comparator::with_context(|modules: &ModuleTable, a: &ModuleIdx, b: &ModuleIdx| {
    let (a, b) = (&modules[*a], &modules[*b]);
    compare_assigned_ids(a.id(), b.id()).then_with(|| a.identifier().cmp(b.identifier()))
  })
}

/// Owns every chunk, module, block and entrypoint of one build.
///
/// Relations between them are stored as indices on both ends, and every method that changes a
/// relation updates both ends before returning. Mutation needs `&mut self`; read-only queries can
/// run from many threads at once.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ChunkGraph {
  chunks: ChunkTable,
  live_chunks: LinkedHashSet<ChunkIdx>,
  modules: ModuleTable,
  module_blocks: IndexVec<ModuleIdx, BlockIdx>,
  blocks: DependenciesBlocks,
  entrypoints: IndexVec<EntrypointIdx, Entrypoint>,
  next_debug_id: u32,
  #[derivative(Debug = "ignore")]
  chunk_order: Comparator<ChunkIdx, ChunkTable>,
  #[derivative(Debug = "ignore")]
  module_order: Comparator<ModuleIdx, ModuleTable>,
}

impl Default for ChunkGraph {
  fn default() -> Self {
    Self::new()
  }
}

impl ChunkGraph {
  pub fn new() -> Self {
    chunkgraph_tracing::enable_tracing_on_demand();
    Self {
      chunks: Default::default(),
      live_chunks: Default::default(),
      modules: Default::default(),
      module_blocks: Default::default(),
      blocks: Default::default(),
      entrypoints: Default::default(),
      next_debug_id: FIRST_DEBUG_ID,
      chunk_order: chunk_order(),
      module_order: module_order(),
    }
  }

  // --- Chunks

  pub fn create_chunk(&mut self, name: Option<String>) -> ChunkIdx {
    let debug_id = self.next_debug_id;
    self.next_debug_id += 1;
    let chunk = self.chunks.push(Chunk::new(name, debug_id));
    self.live_chunks.insert(chunk);
    tracing::trace!("create chunk {}", debug_id);
    chunk
  }

  pub fn chunk(&self, chunk: ChunkIdx) -> &Chunk {
    &self.chunks[chunk]
  }

  pub fn chunk_mut(&mut self, chunk: ChunkIdx) -> &mut Chunk {
    &mut self.chunks[chunk]
  }

  /// Chunks that were neither removed nor absorbed, in creation order.
  pub fn chunks(&self) -> impl Iterator<Item = ChunkIdx> + '_ {
    self.live_chunks.iter().copied()
  }

  pub fn chunk_count(&self) -> usize {
    self.live_chunks.len()
  }

  pub fn is_live(&self, chunk: ChunkIdx) -> bool {
    self.live_chunks.contains(&chunk)
  }

  pub fn chunk_by_name(&self, name: &str) -> Option<ChunkIdx> {
    self
      .chunks()
      .find(|chunk| self.chunks[*chunk].name.as_deref() == Some(name))
  }

  /// Ids take part in the order of parents and children, so setting one forgets every cached sort
  /// of those sets.
  pub fn set_chunk_id(&mut self, chunk: ChunkIdx, id: Option<ChunkId>) {
    self.chunks[chunk].id = id;
    self.chunk_order = chunk_order();
  }

  pub fn set_chunk_ids(&mut self, chunk: ChunkIdx, ids: Option<Vec<ChunkId>>) {
    self.chunks[chunk].ids = ids;
  }

  // --- Modules

  /// Takes ownership of `module` and creates the root of its block tree.
  pub fn register_module(&mut self, module: Box<dyn Module>) -> ModuleIdx {
    let block = self
      .blocks
      .create(DependenciesBlock::for_module(module.identifier()));
    let idx = self.modules.push(module);
    self.module_blocks.push(block);
    idx
  }

  pub fn module(&self, module: ModuleIdx) -> &dyn Module {
    self.modules[module].as_ref()
  }

  pub fn module_mut(&mut self, module: ModuleIdx) -> &mut dyn Module {
    self.modules[module].as_mut()
  }

  pub fn modules(&self) -> impl Iterator<Item = ModuleIdx> + '_ {
    self.modules.indices()
  }

  pub fn module_block(&self, module: ModuleIdx) -> BlockIdx {
    self.module_blocks[module]
  }

  // --- Blocks

  pub fn blocks(&self) -> &DependenciesBlocks {
    &self.blocks
  }

  pub fn blocks_mut(&mut self) -> &mut DependenciesBlocks {
    &mut self.blocks
  }

  /// Creates `block` as the last child of `parent`.
  pub fn create_block(&mut self, parent: BlockIdx, block: DependenciesBlock) -> BlockIdx {
    let idx = self.blocks.create(block);
    self.blocks.add_block(parent, idx);
    idx
  }

  /// Replaces the chunks produced by `block`, keeping the chunks' block lists in sync.
  pub fn set_block_chunks(&mut self, block: BlockIdx, chunks: impl IntoIterator<Item = ChunkIdx>) {
    let previous = self.blocks[block].chunks().as_slice().to_vec();
    previous.into_iter().for_each(|chunk| {
      self.chunks[chunk].blocks.retain(|b| *b != block);
    });
    self.blocks[block].set_chunks(chunks);
    let current = self.blocks[block].chunks().as_slice().to_vec();
    current.into_iter().for_each(|chunk| {
      let blocks = &mut self.chunks[chunk].blocks;
      if !blocks.contains(&block) {
        blocks.push(block);
      }
    });
  }

  pub fn add_block_to_chunk(&mut self, block: BlockIdx, chunk: ChunkIdx) -> bool {
    if self.blocks[block].chunks().contains(chunk) {
      return false;
    }
    self.blocks[block].push_chunk(chunk);
    let blocks = &mut self.chunks[chunk].blocks;
    if !blocks.contains(&block) {
      blocks.push(block);
    }
    true
  }

  /// Drops resolution state in the subtree of `block`, unlinking it from its chunks on both ends.
  pub fn disconnect_block(&mut self, block: BlockIdx) {
    self.unlink_block_chunks(block);
    self.blocks.disconnect(block);
  }

  /// Forgets the chunks attached to the subtree of `block` on both ends.
  pub fn unseal_block(&mut self, block: BlockIdx) {
    self.unlink_block_chunks(block);
    self.blocks.unseal(block);
  }

  fn unlink_block_chunks(&mut self, block: BlockIdx) {
    let mut stack = vec![block];
    while let Some(idx) = stack.pop() {
      let current = &self.blocks[idx];
      current.chunks().as_slice().iter().for_each(|chunk| {
        self.chunks[*chunk].blocks.retain(|b| *b != idx);
      });
      stack.extend(current.blocks().iter().copied());
    }
  }

  // --- Entrypoints

  pub fn add_entrypoint(&mut self, name: impl Into<String>) -> EntrypointIdx {
    self.entrypoints.push(Entrypoint::new(name))
  }

  pub fn entrypoint(&self, entrypoint: EntrypointIdx) -> &Entrypoint {
    &self.entrypoints[entrypoint]
  }

  pub fn entrypoints(&self) -> impl Iterator<Item = (EntrypointIdx, &Entrypoint)> + '_ {
    self.entrypoints.iter_enumerated()
  }

  pub fn push_entrypoint_chunk(&mut self, entrypoint: EntrypointIdx, chunk: ChunkIdx) -> bool {
    if !self.entrypoints[entrypoint].push_chunk(chunk) {
      return false;
    }
    self.link_entrypoint(entrypoint, chunk);
    true
  }

  /// Makes `chunk` the runtime chunk of `entrypoint`.
  pub fn unshift_entrypoint_chunk(&mut self, entrypoint: EntrypointIdx, chunk: ChunkIdx) {
    self.entrypoints[entrypoint].unshift_chunk(chunk);
    self.link_entrypoint(entrypoint, chunk);
  }

  fn link_entrypoint(&mut self, entrypoint: EntrypointIdx, chunk: ChunkIdx) {
    let entrypoints = &mut self.chunks[chunk].entrypoints;
    if !entrypoints.contains(&entrypoint) {
      entrypoints.push(entrypoint);
    }
  }

  pub fn is_initial(&self, chunk: ChunkIdx) -> bool {
    self.chunks[chunk].is_initial()
  }

  /// Whether `chunk` is the first chunk of its first entrypoint.
  pub fn has_runtime(&self, chunk: ChunkIdx) -> bool {
    self.chunks[chunk]
      .entrypoints
      .first()
      .and_then(|entrypoint| self.entrypoints[*entrypoint].runtime_chunk())
      == Some(chunk)
  }
}
