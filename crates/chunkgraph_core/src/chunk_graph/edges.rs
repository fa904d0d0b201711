use chunkgraph_common::{ChunkIdx, ModuleIdx};

use super::ChunkGraph;

impl ChunkGraph {
  // --- Module membership

  pub fn add_module(&mut self, chunk: ChunkIdx, module: ModuleIdx) -> bool {
    if self.chunks[chunk].contains_module(module) {
      return false;
    }
    self.chunks[chunk].modules.add(module);
    self.modules[module].add_chunk(chunk);
    true
  }

  /// Also drops the module's back-reference to `chunk`.
  pub fn remove_module(&mut self, chunk: ChunkIdx, module: ModuleIdx) -> bool {
    if !self.chunks[chunk].modules.remove(&module) {
      return false;
    }
    self.modules[module].remove_chunk(chunk);
    true
  }

  /// Moves `module` from `chunk` to `target`, pointing the module's reasons at `target`.
  pub fn move_module(&mut self, chunk: ChunkIdx, module: ModuleIdx, target: ChunkIdx) -> bool {
    if chunk == target || !self.remove_module(chunk, module) {
      return false;
    }
    self.modules[module].rewrite_chunk_in_reasons(chunk, &[target]);
    self.add_module(target, module);
    true
  }

  // --- Parent/child edges

  /// Adds the edge `chunk -> child`. Self-edges and edges to or from retired chunks are refused.
  pub fn add_chunk(&mut self, chunk: ChunkIdx, child: ChunkIdx) -> bool {
    if chunk == child
      || !self.is_live(chunk)
      || !self.is_live(child)
      || self.chunks[chunk].has_child(child)
    {
      return false;
    }
    self.chunks[chunk].children.add(child);
    self.chunks[child].parents.add(chunk);
    true
  }

  pub fn add_parent(&mut self, chunk: ChunkIdx, parent: ChunkIdx) -> bool {
    self.add_chunk(parent, chunk)
  }

  /// Removes the edge `chunk -> child` from both ends.
  pub fn remove_chunk(&mut self, chunk: ChunkIdx, child: ChunkIdx) -> bool {
    let removed = self.chunks[chunk].children.remove(&child);
    let removed_inverse = self.chunks[child].parents.remove(&chunk);
    removed || removed_inverse
  }

  pub fn remove_parent(&mut self, chunk: ChunkIdx, parent: ChunkIdx) -> bool {
    self.remove_chunk(parent, chunk)
  }

  /// Turns `chunk -> old_child` into `chunk -> new_child`. When `new_child` is `chunk` itself the
  /// edge is only dropped.
  pub fn replace_chunk(&mut self, chunk: ChunkIdx, old_child: ChunkIdx, new_child: ChunkIdx) -> bool {
    if !self.remove_chunk(chunk, old_child) {
      return false;
    }
    self.add_chunk(chunk, new_child);
    true
  }

  /// Turns `old_parent -> chunk` into `new_parent -> chunk`. When `new_parent` is `chunk` itself the
  /// edge is only dropped.
  pub fn replace_parent_chunk(
    &mut self,
    chunk: ChunkIdx,
    old_parent: ChunkIdx,
    new_parent: ChunkIdx,
  ) -> bool {
    if !self.remove_parent(chunk, old_parent) {
      return false;
    }
    self.add_parent(chunk, new_parent);
    true
  }
}
