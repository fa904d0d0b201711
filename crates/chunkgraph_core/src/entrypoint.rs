use chunkgraph_common::ChunkIdx;

/// One application entry: the chunks to load, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entrypoint {
  pub name: String,
  chunks: Vec<ChunkIdx>,
}

impl Entrypoint {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      chunks: vec![],
    }
  }

  pub fn chunks(&self) -> &[ChunkIdx] {
    &self.chunks
  }

  pub fn contains(&self, chunk: ChunkIdx) -> bool {
    self.chunks.contains(&chunk)
  }

  /// The chunk carrying the bootstrap code.
  pub fn runtime_chunk(&self) -> Option<ChunkIdx> {
    self.chunks.first().copied()
  }

  pub(crate) fn push_chunk(&mut self, chunk: ChunkIdx) -> bool {
    if self.contains(chunk) {
      return false;
    }
    self.chunks.push(chunk);
    true
  }

  pub(crate) fn unshift_chunk(&mut self, chunk: ChunkIdx) {
    self.chunks.retain(|c| *c != chunk);
    self.chunks.insert(0, chunk);
  }

  /// Places `chunk` right after `after`, moving it if it is already listed. Appends when `after` is
  /// not part of this entrypoint.
  pub(crate) fn insert_chunk(&mut self, chunk: ChunkIdx, after: ChunkIdx) {
    if chunk == after {
      return;
    }
    self.chunks.retain(|c| *c != chunk);
    match self.chunks.iter().position(|c| *c == after) {
      Some(position) => self.chunks.insert(position + 1, chunk),
      None => self.chunks.push(chunk),
    }
  }

  pub(crate) fn remove_chunk(&mut self, chunk: ChunkIdx) -> bool {
    let len = self.chunks.len();
    self.chunks.retain(|c| *c != chunk);
    len != self.chunks.len()
  }
}
