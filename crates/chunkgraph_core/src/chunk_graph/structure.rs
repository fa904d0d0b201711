use chunkgraph_common::ChunkIdx;

use super::ChunkGraph;

impl ChunkGraph {
  /// Both chunks must be live. An initial chunk can never be merged away. An initial `chunk` only
  /// absorbs chunks it is the sole parent of.
  pub fn can_be_integrated(&self, chunk: ChunkIdx, other: ChunkIdx) -> bool {
    if chunk == other || !self.is_live(chunk) || !self.is_live(other) {
      return false;
    }
    let other_chunk = &self.chunks[other];
    if other_chunk.is_initial() {
      return false;
    }
    if self.chunks[chunk].is_initial()
      && (other_chunk.number_of_parents() != 1 || !other_chunk.has_parent(chunk))
    {
      return false;
    }
    true
  }

  /// Merges `other` into `chunk`. `other` is left empty and disconnected but stays in the live
  /// list, see [ChunkGraph::integrate_and_drop].
  pub fn integrate(&mut self, chunk: ChunkIdx, other: ChunkIdx, reason: &str) -> bool {
    if !self.can_be_integrated(chunk, other) {
      return false;
    }

    let modules = self.chunks[other].modules.to_vec();
    modules.into_iter().for_each(|module| {
      self.move_module(other, module, chunk);
    });

    let parents = self.chunks[other].parents.to_vec();
    parents.into_iter().for_each(|parent| {
      self.replace_chunk(parent, other, chunk);
    });

    let children = self.chunks[other].children.to_vec();
    children.into_iter().for_each(|child| {
      self.replace_parent_chunk(child, other, chunk);
    });

    let blocks = std::mem::take(&mut self.chunks[other].blocks);
    blocks.into_iter().for_each(|block| {
      self.blocks[block].replace_chunk(other, chunk, reason);
      let chunk_blocks = &mut self.chunks[chunk].blocks;
      if !chunk_blocks.contains(&block) {
        chunk_blocks.push(block);
      }
    });

    let other_origins = std::mem::take(&mut self.chunks[other].origins);
    let origins = &mut self.chunks[chunk].origins;
    origins.iter_mut().for_each(|origin| {
      if origin.reasons.first().map(String::as_str) != Some(reason) {
        origin.reasons.insert(0, reason.to_string());
      }
    });
    origins.extend(other_origins);

    // Whatever still ties the two chunks together is stale now.
    self.remove_chunk(chunk, other);
    self.remove_chunk(other, chunk);

    tracing::trace!(
      "integrate chunk {} into {} ({})",
      self.chunks[other].debug_id(),
      self.chunks[chunk].debug_id(),
      reason
    );
    true
  }

  /// [ChunkGraph::integrate], then retires `other` from the live list.
  pub fn integrate_and_drop(&mut self, chunk: ChunkIdx, other: ChunkIdx, reason: &str) -> bool {
    if !self.integrate(chunk, other, reason) {
      return false;
    }
    self.live_chunks.remove(&other);
    true
  }

  /// Gives the empty `new_chunk` the graph position of `chunk`: same producing blocks, same
  /// parents and children, right after `chunk` in each of its entrypoints. Modules are left to the
  /// caller. Refused unless both chunks are live.
  pub fn split(&mut self, chunk: ChunkIdx, new_chunk: ChunkIdx) -> bool {
    if chunk == new_chunk || !self.is_live(chunk) || !self.is_live(new_chunk) {
      return false;
    }

    let blocks = self.chunks[chunk].blocks.clone();
    blocks.into_iter().for_each(|block| {
      self.blocks[block].push_chunk(new_chunk);
      let new_chunk_blocks = &mut self.chunks[new_chunk].blocks;
      if !new_chunk_blocks.contains(&block) {
        new_chunk_blocks.push(block);
      }
    });

    let children = self.chunks[chunk].children.to_vec();
    children.into_iter().for_each(|child| {
      self.add_chunk(new_chunk, child);
    });

    let parents = self.chunks[chunk].parents.to_vec();
    parents.into_iter().for_each(|parent| {
      self.add_chunk(parent, new_chunk);
    });

    let entrypoints = self.chunks[chunk].entrypoints.clone();
    entrypoints.into_iter().for_each(|entrypoint| {
      self.entrypoints[entrypoint].insert_chunk(new_chunk, chunk);
      self.link_entrypoint(entrypoint, new_chunk);
    });

    tracing::trace!(
      "split chunk {} from {}",
      self.chunks[new_chunk].debug_id(),
      self.chunks[chunk].debug_id()
    );
    true
  }

  /// Takes `chunk` out of the graph. Every parent gets a direct edge to every child, so whatever
  /// was reachable through `chunk` stays reachable. Blocks left without chunks remember `reason`.
  pub fn remove(&mut self, chunk: ChunkIdx, reason: &str) -> bool {
    let was_live = self.live_chunks.remove(&chunk);

    let modules = self.chunks[chunk].modules.to_vec();
    modules.into_iter().for_each(|module| {
      self.remove_module(chunk, module);
    });

    let parents = self.chunks[chunk].parents.to_vec();
    let children = self.chunks[chunk].children.to_vec();
    parents.iter().for_each(|parent| {
      children.iter().for_each(|child| {
        self.add_chunk(*parent, *child);
      });
    });
    parents.iter().for_each(|parent| {
      self.remove_chunk(*parent, chunk);
    });
    children.iter().for_each(|child| {
      self.remove_chunk(chunk, *child);
    });

    let blocks = std::mem::take(&mut self.chunks[chunk].blocks);
    blocks.into_iter().for_each(|block| {
      self.blocks[block].remove_chunk(chunk, reason);
    });

    let entrypoints = std::mem::take(&mut self.chunks[chunk].entrypoints);
    entrypoints.into_iter().for_each(|entrypoint| {
      self.entrypoints[entrypoint].remove_chunk(chunk);
    });

    tracing::trace!("remove chunk {} ({})", self.chunks[chunk].debug_id(), reason);
    was_live
  }
}
