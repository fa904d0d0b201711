use std::{
  ops::{Index, IndexMut},
  path::Path,
};

use chunkgraph_common::{
  make_paths_relative, BlockIdx, ChunkIdx, DependencyLocation, HashSink,
};
use oxc_index::IndexVec;

use crate::{Dependency, DependencyFilter};

mod variable;
pub use variable::*;

/// The chunks a block causes to be emitted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BlockChunks {
  /// No chunk has been attached yet, or the block was unsealed.
  #[default]
  Unassigned,
  /// Never empty.
  Chunks(Vec<ChunkIdx>),
  /// Every chunk this block produced was removed.
  Removed { reason: String },
}

impl BlockChunks {
  pub fn as_slice(&self) -> &[ChunkIdx] {
    match self {
      BlockChunks::Chunks(chunks) => chunks,
      _ => &[],
    }
  }

  pub fn is_removed(&self) -> bool {
    matches!(self, BlockChunks::Removed { .. })
  }

  pub fn contains(&self, chunk: ChunkIdx) -> bool {
    self.as_slice().contains(&chunk)
  }
}

/// A node of the code-split tree of a module: the module itself at the root, nested split points
/// (e.g. `import()` expressions) below it.
#[derive(Debug, Default)]
pub struct DependenciesBlock {
  dependencies: Vec<Box<dyn Dependency>>,
  blocks: Vec<BlockIdx>,
  variables: Vec<DependenciesBlockVariable>,
  parent: Option<BlockIdx>,
  chunks: BlockChunks,
  chunk_reason: Option<String>,
  /// The identifying origin, set on module roots to the module identifier.
  pub identifier: Option<String>,
  pub chunk_name: Option<String>,
  pub loc: Option<DependencyLocation>,
}

impl DependenciesBlock {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn for_module(identifier: impl Into<String>) -> Self {
    Self {
      identifier: Some(identifier.into()),
      ..Self::default()
    }
  }

  pub fn with_chunk_name(mut self, chunk_name: impl Into<String>) -> Self {
    self.chunk_name = Some(chunk_name.into());
    self
  }

  pub fn with_loc(mut self, loc: DependencyLocation) -> Self {
    self.loc = Some(loc);
    self
  }

  pub fn dependencies(&self) -> &[Box<dyn Dependency>] {
    &self.dependencies
  }

  pub fn blocks(&self) -> &[BlockIdx] {
    &self.blocks
  }

  pub fn variables(&self) -> &[DependenciesBlockVariable] {
    &self.variables
  }

  pub fn parent(&self) -> Option<BlockIdx> {
    self.parent
  }

  pub fn chunks(&self) -> &BlockChunks {
    &self.chunks
  }

  /// Why the chunk list last changed because of a merge or removal.
  pub fn chunk_reason(&self) -> Option<&str> {
    self.chunk_reason.as_deref()
  }

  pub(crate) fn set_chunks(&mut self, chunks: impl IntoIterator<Item = ChunkIdx>) {
    let mut deduped = Vec::new();
    chunks.into_iter().for_each(|chunk| {
      if !deduped.contains(&chunk) {
        deduped.push(chunk);
      }
    });
    self.chunks = if deduped.is_empty() {
      BlockChunks::Unassigned
    } else {
      BlockChunks::Chunks(deduped)
    };
  }

  pub(crate) fn push_chunk(&mut self, chunk: ChunkIdx) {
    match &mut self.chunks {
      BlockChunks::Chunks(chunks) => {
        if !chunks.contains(&chunk) {
          chunks.push(chunk);
        }
      }
      _ => self.chunks = BlockChunks::Chunks(vec![chunk]),
    }
  }

  pub(crate) fn replace_chunk(&mut self, old_chunk: ChunkIdx, new_chunk: ChunkIdx, reason: &str) {
    let replaced = match std::mem::take(&mut self.chunks) {
      BlockChunks::Chunks(chunks) => chunks
        .into_iter()
        .map(|chunk| if chunk == old_chunk { new_chunk } else { chunk })
        .collect::<Vec<_>>(),
      _ => vec![new_chunk],
    };
    self.set_chunks(replaced);
    self.chunk_reason = Some(reason.to_string());
  }

  /// Returns whether `chunk` was listed. Removing the last chunk leaves the removed marker.
  pub(crate) fn remove_chunk(&mut self, chunk: ChunkIdx, reason: &str) -> bool {
    let BlockChunks::Chunks(chunks) = &mut self.chunks else {
      return false;
    };
    let Some(position) = chunks.iter().position(|c| *c == chunk) else {
      return false;
    };
    chunks.remove(position);
    if chunks.is_empty() {
      self.chunks = BlockChunks::Removed {
        reason: reason.to_string(),
      };
      self.chunk_reason = Some(reason.to_string());
    }
    true
  }

  fn reset_chunks(&mut self) {
    self.chunks = BlockChunks::Unassigned;
    self.chunk_reason = None;
  }
}

/// Owns every [DependenciesBlock]. Parent/child links are indices into this table.
#[derive(Debug, Default)]
pub struct DependenciesBlocks {
  blocks: IndexVec<BlockIdx, DependenciesBlock>,
}

impl Index<BlockIdx> for DependenciesBlocks {
  type Output = DependenciesBlock;

  fn index(&self, index: BlockIdx) -> &Self::Output {
    &self.blocks[index]
  }
}

impl IndexMut<BlockIdx> for DependenciesBlocks {
  fn index_mut(&mut self, index: BlockIdx) -> &mut Self::Output {
    &mut self.blocks[index]
  }
}

impl DependenciesBlocks {
  pub fn create(&mut self, block: DependenciesBlock) -> BlockIdx {
    self.blocks.push(block)
  }

  pub fn len(&self) -> usize {
    self.blocks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.blocks.is_empty()
  }

  /// Walks parent links up to the root of the tree containing `block`.
  pub fn root_of(&self, block: BlockIdx) -> BlockIdx {
    let mut current = block;
    while let Some(parent) = self.blocks[current].parent {
      current = parent;
    }
    current
  }

  /// Appends `child` below `parent`, detaching it from its previous parent. Refuses to create a
  /// cycle.
  pub fn add_block(&mut self, parent: BlockIdx, child: BlockIdx) -> bool {
    if self.root_of(parent) == child || self.is_ancestor(child, parent) {
      return false;
    }
    if let Some(previous_parent) = self.blocks[child].parent {
      if previous_parent == parent {
        return false;
      }
      self.blocks[previous_parent]
        .blocks
        .retain(|block| *block != child);
    }
    self.blocks[parent].blocks.push(child);
    self.blocks[child].parent = Some(parent);
    true
  }

  fn is_ancestor(&self, ancestor: BlockIdx, block: BlockIdx) -> bool {
    let mut current = Some(block);
    while let Some(idx) = current {
      if idx == ancestor {
        return true;
      }
      current = self.blocks[idx].parent;
    }
    false
  }

  pub fn add_dependency(&mut self, block: BlockIdx, dependency: Box<dyn Dependency>) {
    self.blocks[block].dependencies.push(dependency);
  }

  /// Returns `false` when a variable with the same name and expression already exists.
  pub fn add_variable(
    &mut self,
    block: BlockIdx,
    name: impl Into<String>,
    expression: impl Into<String>,
    dependencies: Vec<Box<dyn Dependency>>,
  ) -> bool {
    let name = name.into();
    let expression = expression.into();
    let variables = &mut self.blocks[block].variables;
    if variables
      .iter()
      .any(|variable| variable.name == name && variable.expression == expression)
    {
      return false;
    }
    variables.push(DependenciesBlockVariable::new(name, expression, dependencies));
    true
  }

  pub fn update_hash(&self, block: BlockIdx, hash: &mut dyn HashSink) {
    let block = &self.blocks[block];
    block
      .dependencies
      .iter()
      .for_each(|dependency| dependency.update_hash(hash));
    block
      .variables
      .iter()
      .for_each(|variable| variable.update_hash(hash));
    block
      .blocks
      .iter()
      .for_each(|child| self.update_hash(*child, hash));
  }

  /// Drops resolution state in the whole subtree. Calling it again is a no-op. Chunks keep listing
  /// the blocks; [crate::ChunkGraph::disconnect_block] unlinks both ends.
  pub(crate) fn disconnect(&mut self, block: BlockIdx) {
    let mut stack = vec![block];
    while let Some(idx) = stack.pop() {
      let block = &mut self.blocks[idx];
      block
        .dependencies
        .iter_mut()
        .for_each(|dependency| dependency.disconnect());
      block
        .variables
        .iter_mut()
        .for_each(|variable| variable.disconnect());
      block.reset_chunks();
      stack.extend(block.blocks.iter().rev().copied());
    }
  }

  /// Forgets the chunks attached by a previous compilation in the whole subtree. Chunks keep
  /// listing the blocks; [crate::ChunkGraph::unseal_block] unlinks both ends.
  pub(crate) fn unseal(&mut self, block: BlockIdx) {
    let mut stack = vec![block];
    while let Some(idx) = stack.pop() {
      let block = &mut self.blocks[idx];
      block.reset_chunks();
      stack.extend(block.blocks.iter().rev().copied());
    }
  }

  /// Whether the subtree holds a dependency matching `filter` (any dependency when `None`).
  pub fn has_dependencies(&self, block: BlockIdx, filter: Option<DependencyFilter>) -> bool {
    let block = &self.blocks[block];
    let has_own = match filter {
      Some(filter) => block
        .dependencies
        .iter()
        .any(|dependency| filter(dependency.as_ref())),
      None => !block.dependencies.is_empty(),
    };
    has_own
      || block
        .blocks
        .iter()
        .any(|child| self.has_dependencies(*child, filter))
      || block
        .variables
        .iter()
        .any(|variable| variable.has_dependencies(filter))
  }

  /// A key telling apart the chunk variants one split point produces.
  ///
  /// Format: `<relative root identifier>[:<index of chunk>]:<idx>/<last idx>...`. The chunk index
  /// only appears when the block produces more than one chunk. The `<idx>/<last idx>` segments are
  /// the block's position among its siblings, then its parent's, innermost first, up to the root.
  /// A block producing two chunks, second of two children under the root's only child, gives
  /// `src/index.js:1:1/1:0/0` for its second chunk.
  pub fn ident_for_chunk(&self, block: BlockIdx, chunk: ChunkIdx, context: &Path) -> Option<String> {
    let mut ident = vec![];
    let chunks = self.blocks[block].chunks.as_slice();
    if chunks.len() > 1 {
      let position = chunks.iter().position(|c| *c == chunk);
      ident.push(position.map_or_else(|| "-1".to_string(), |p| p.to_string()));
    }
    let mut current = block;
    while let Some(parent) = self.blocks[current].parent {
      let siblings = &self.blocks[parent].blocks;
      let idx = siblings.iter().position(|b| *b == current)?;
      ident.push(format!("{idx}/{}", siblings.len() - 1));
      current = parent;
    }
    let identifier = self.blocks[current].identifier.as_deref()?;
    ident.insert(0, make_paths_relative(context, identifier));
    Some(ident.join(":"))
  }
}

#[cfg(test)]
mod tests {
  use std::{
    path::Path,
    sync::{
      atomic::{AtomicUsize, Ordering},
      Arc,
    },
  };

  use chunkgraph_common::{ChunkIdx, HashSink};

  use super::{BlockChunks, DependenciesBlock, DependenciesBlocks};
  use crate::Dependency;

  #[derive(Debug, Default)]
  struct CountingDependency {
    request: String,
    weak: bool,
    disconnects: Arc<AtomicUsize>,
  }

  impl CountingDependency {
    fn boxed(request: &str) -> Box<dyn Dependency> {
      Box::new(Self {
        request: request.to_string(),
        ..Default::default()
      })
    }
  }

  impl Dependency for CountingDependency {
    fn update_hash(&self, hash: &mut dyn HashSink) {
      hash.update_str(&self.request);
    }

    fn disconnect(&mut self) {
      self.disconnects.fetch_add(1, Ordering::SeqCst);
    }

    fn request(&self) -> Option<&str> {
      Some(&self.request)
    }

    fn is_weak(&self) -> bool {
      self.weak
    }
  }

  fn chunk(idx: usize) -> ChunkIdx {
    ChunkIdx::from_usize(idx)
  }

  #[test]
  fn variables_are_deduplicated_by_name_and_expression() {
    let mut blocks = DependenciesBlocks::default();
    let root = blocks.create(DependenciesBlock::for_module("/app/a.js"));
    assert!(blocks.add_variable(root, "x", "e1", vec![]));
    assert!(!blocks.add_variable(root, "x", "e1", vec![]));
    assert_eq!(blocks[root].variables().len(), 1);
    assert!(blocks.add_variable(root, "x", "e2", vec![]));
    assert_eq!(
      blocks[root]
        .variables()
        .iter()
        .map(|v| v.expression.as_str())
        .collect::<Vec<_>>(),
      vec!["e1", "e2"]
    );
  }

  #[test]
  fn add_block_sets_the_parent_and_refuses_cycles() {
    let mut blocks = DependenciesBlocks::default();
    let root = blocks.create(DependenciesBlock::for_module("/app/a.js"));
    let child = blocks.create(DependenciesBlock::new());
    let grandchild = blocks.create(DependenciesBlock::new());
    assert!(blocks.add_block(root, child));
    assert!(blocks.add_block(child, grandchild));
    assert_eq!(blocks[grandchild].parent(), Some(child));
    assert_eq!(blocks.root_of(grandchild), root);
    assert!(!blocks.add_block(grandchild, root));
    assert!(!blocks.add_block(grandchild, child));

    // Re-parenting moves the block.
    assert!(blocks.add_block(root, grandchild));
    assert!(blocks[child].blocks().is_empty());
    assert_eq!(blocks[root].blocks(), &[child, grandchild]);
  }

  #[test]
  fn has_dependencies_searches_the_whole_subtree() {
    let mut blocks = DependenciesBlocks::default();
    let root = blocks.create(DependenciesBlock::for_module("/app/a.js"));
    let child = blocks.create(DependenciesBlock::new());
    blocks.add_block(root, child);
    assert!(!blocks.has_dependencies(root, None));

    blocks.add_variable(root, "process", "require('process')", vec![
      CountingDependency::boxed("process"),
    ]);
    assert!(blocks.has_dependencies(root, None));
    assert!(!blocks.has_dependencies(child, None));

    blocks.add_dependency(child, CountingDependency::boxed("./lazy"));
    let is_lazy = |d: &dyn Dependency| d.request() == Some("./lazy");
    assert!(blocks.has_dependencies(root, Some(&is_lazy)));
    let is_weak = |d: &dyn Dependency| d.is_weak();
    assert!(!blocks.has_dependencies(root, Some(&is_weak)));
  }

  #[test]
  fn disconnect_reaches_every_dependency_and_is_repeatable() {
    let disconnects = Arc::new(AtomicUsize::new(0));
    let dependency = |request: &str| -> Box<dyn Dependency> {
      Box::new(CountingDependency {
        request: request.to_string(),
        weak: false,
        disconnects: disconnects.clone(),
      })
    };
    let mut blocks = DependenciesBlocks::default();
    let root = blocks.create(DependenciesBlock::for_module("/app/a.js"));
    let child = blocks.create(DependenciesBlock::new());
    blocks.add_block(root, child);
    blocks.add_dependency(root, dependency("./b"));
    blocks.add_dependency(child, dependency("./c"));
    blocks.add_variable(child, "x", "y", vec![dependency("./d")]);
    blocks[child].set_chunks([chunk(0)]);

    blocks.disconnect(root);
    assert_eq!(disconnects.load(Ordering::SeqCst), 3);
    assert_eq!(blocks[child].chunks(), &BlockChunks::Unassigned);

    blocks.disconnect(root);
    assert_eq!(disconnects.load(Ordering::SeqCst), 6);
  }

  #[test]
  fn update_hash_visits_dependencies_variables_then_blocks() {
    let mut blocks = DependenciesBlocks::default();
    let root = blocks.create(DependenciesBlock::for_module("/app/a.js"));
    let child = blocks.create(DependenciesBlock::new());
    blocks.add_block(root, child);
    blocks.add_dependency(child, CountingDependency::boxed("[c]"));
    blocks.add_dependency(root, CountingDependency::boxed("[a]"));
    blocks.add_variable(root, "[v]", "[e]", vec![CountingDependency::boxed("[b]")]);

    let mut recorded = Vec::<u8>::new();
    blocks.update_hash(root, &mut recorded);
    assert_eq!(String::from_utf8(recorded).unwrap(), "[a][v][e][b][c]");
  }

  #[test]
  fn unseal_resets_chunks_below() {
    let mut blocks = DependenciesBlocks::default();
    let root = blocks.create(DependenciesBlock::for_module("/app/a.js"));
    let child = blocks.create(DependenciesBlock::new());
    blocks.add_block(root, child);
    blocks[child].set_chunks([chunk(1), chunk(2)]);
    blocks.unseal(root);
    assert_eq!(blocks[child].chunks(), &BlockChunks::Unassigned);
  }

  #[test]
  fn chunk_list_is_never_left_empty() {
    let mut block = DependenciesBlock::new();
    block.set_chunks([chunk(0), chunk(1), chunk(0)]);
    assert_eq!(block.chunks().as_slice(), &[chunk(0), chunk(1)]);
    assert!(block.remove_chunk(chunk(0), "split"));
    assert!(!block.remove_chunk(chunk(0), "split"));
    assert!(block.remove_chunk(chunk(1), "empty"));
    assert_eq!(
      block.chunks(),
      &BlockChunks::Removed {
        reason: "empty".to_string()
      }
    );
    assert_eq!(block.chunk_reason(), Some("empty"));

    block.replace_chunk(chunk(1), chunk(3), "merged");
    assert_eq!(block.chunks().as_slice(), &[chunk(3)]);
    assert_eq!(block.chunk_reason(), Some("merged"));
  }

  #[test]
  fn ident_for_chunk_tells_variants_apart() {
    let context = Path::new("/app");
    let mut blocks = DependenciesBlocks::default();
    let root = blocks.create(DependenciesBlock::for_module("/app/src/index.js"));
    let first = blocks.create(DependenciesBlock::new());
    let second = blocks.create(DependenciesBlock::new());
    let nested = blocks.create(DependenciesBlock::new());
    blocks.add_block(root, first);
    blocks.add_block(root, second);
    blocks.add_block(second, nested);

    blocks[first].set_chunks([chunk(0)]);
    assert_eq!(
      blocks.ident_for_chunk(first, chunk(0), context).as_deref(),
      Some("src/index.js:0/1")
    );

    blocks[nested].set_chunks([chunk(1), chunk(2)]);
    assert_eq!(
      blocks.ident_for_chunk(nested, chunk(2), context).as_deref(),
      Some("src/index.js:1:0/0:1/1")
    );
  }

  #[test]
  fn ident_for_chunk_needs_an_identifying_origin() {
    let mut blocks = DependenciesBlocks::default();
    let orphan_root = blocks.create(DependenciesBlock::new());
    let child = blocks.create(DependenciesBlock::new());
    blocks.add_block(orphan_root, child);
    assert_eq!(
      blocks.ident_for_chunk(child, chunk(0), Path::new("/app")),
      None
    );
  }
}
