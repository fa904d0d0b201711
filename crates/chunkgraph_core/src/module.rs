use std::fmt::Debug;

use chunkgraph_common::{ChunkIdx, HashSink, ModuleId, ModuleIdx, SortableSet};
use oxc_index::IndexVec;

pub type ModuleTable = IndexVec<ModuleIdx, Box<dyn Module>>;

/// Why a module is part of the graph: who pulled it in and, when known, in which chunks that
/// happened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleReason {
  pub issuer: Option<ModuleIdx>,
  pub explanation: Option<String>,
  /// `None` means "the same chunks as the issuer".
  pub chunks: Option<Vec<ChunkIdx>>,
}

impl ModuleReason {
  pub fn rewrite_chunks(&mut self, old_chunk: ChunkIdx, new_chunks: &[ChunkIdx]) {
    let Some(chunks) = self.chunks.as_mut() else {
      return;
    };
    let Some(position) = chunks.iter().position(|chunk| *chunk == old_chunk) else {
      return;
    };
    chunks.remove(position);
    new_chunks.iter().for_each(|chunk| {
      if !chunks.contains(chunk) {
        chunks.push(*chunk);
      }
    });
  }
}

/// The chunk-facing half of a module: the chunks it currently lives in and its provenance.
#[derive(Debug, Clone, Default)]
pub struct ModuleChunks {
  chunks: SortableSet<ChunkIdx>,
  reasons: Vec<ModuleReason>,
}

impl ModuleChunks {
  pub fn chunks(&self) -> impl Iterator<Item = ChunkIdx> + '_ {
    self.chunks.iter().copied()
  }

  pub fn is_in_chunk(&self, chunk: ChunkIdx) -> bool {
    self.chunks.contains(&chunk)
  }

  pub fn number_of_chunks(&self) -> usize {
    self.chunks.len()
  }

  pub fn add_chunk(&mut self, chunk: ChunkIdx) -> bool {
    self.chunks.add(chunk)
  }

  pub fn remove_chunk(&mut self, chunk: ChunkIdx) -> bool {
    self.chunks.remove(&chunk)
  }

  pub fn reasons(&self) -> &[ModuleReason] {
    &self.reasons
  }

  pub fn add_reason(&mut self, reason: ModuleReason) {
    self.reasons.push(reason);
  }

  pub fn rewrite_chunk_in_reasons(&mut self, old_chunk: ChunkIdx, new_chunks: &[ChunkIdx]) {
    self
      .reasons
      .iter_mut()
      .for_each(|reason| reason.rewrite_chunks(old_chunk, new_chunks));
  }
}

/// A unit of source content. Parsing, sizing and hashing are up to the implementor; the chunk
/// graph only needs the capabilities below.
pub trait Module: Debug + Send + Sync {
  fn identifier(&self) -> &str;

  fn size(&self) -> f64;

  /// Assigned by an external id pass, `None` until then.
  fn id(&self) -> Option<&ModuleId>;

  fn set_id(&mut self, id: Option<ModuleId>);

  fn update_hash(&self, hash: &mut dyn HashSink);

  fn module_chunks(&self) -> &ModuleChunks;

  fn module_chunks_mut(&mut self) -> &mut ModuleChunks;

  fn add_chunk(&mut self, chunk: ChunkIdx) -> bool {
    self.module_chunks_mut().add_chunk(chunk)
  }

  fn remove_chunk(&mut self, chunk: ChunkIdx) -> bool {
    self.module_chunks_mut().remove_chunk(chunk)
  }

  fn rewrite_chunk_in_reasons(&mut self, old_chunk: ChunkIdx, new_chunks: &[ChunkIdx]) {
    self
      .module_chunks_mut()
      .rewrite_chunk_in_reasons(old_chunk, new_chunks)
  }
}
