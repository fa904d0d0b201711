use chunkgraph_common::ChunkIdx;

use super::ChunkGraph;
use crate::ChunkSizeOptions;

impl ChunkGraph {
  pub fn modules_size(&self, chunk: ChunkIdx) -> f64 {
    self.chunks[chunk]
      .modules()
      .map(|module| self.modules[module].size())
      .sum()
  }

  /// `size * multiplicator + overhead`. Only initial chunks get the entry multiplicator.
  pub fn add_multiplier_and_overhead(
    &self,
    chunk: ChunkIdx,
    size: f64,
    options: &ChunkSizeOptions,
  ) -> f64 {
    let multiplicator = if self.chunks[chunk].is_initial() {
      options.entry_chunk_multiplicator()
    } else {
      1.0
    };
    size * multiplicator + options.chunk_overhead()
  }

  pub fn size(&self, chunk: ChunkIdx, options: &ChunkSizeOptions) -> f64 {
    self.add_multiplier_and_overhead(chunk, self.modules_size(chunk), options)
  }

  /// The weighted size `chunk` would have after absorbing `other`, or `None` when the merge is not
  /// allowed.
  pub fn integrated_size(
    &self,
    chunk: ChunkIdx,
    other: ChunkIdx,
    options: &ChunkSizeOptions,
  ) -> Option<f64> {
    if !self.can_be_integrated(chunk, other) {
      return None;
    }
    let target = &self.chunks[chunk];
    let added_size = self.chunks[other]
      .modules()
      .filter(|module| !target.contains_module(*module))
      .map(|module| self.modules[module].size())
      .sum::<f64>();
    Some(self.add_multiplier_and_overhead(chunk, self.modules_size(chunk) + added_size, options))
  }
}
