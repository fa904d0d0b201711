mod chunk;
pub use chunk::*;
mod chunk_graph;
pub use chunk_graph::*;
mod dependencies_block;
pub use dependencies_block::*;
mod dependency;
pub use dependency::*;
mod entrypoint;
pub use entrypoint::*;
mod module;
pub use module::*;
mod options;
pub use options::*;
mod optimize;
pub use optimize::*;

#[cfg(test)]
mod test_helpers;

pub use chunkgraph_common::{
  AssignedId, BlockIdx, ChunkId, ChunkIdx, DependencyLocation, EntrypointIdx, HashSink, ModuleId,
  ModuleIdx,
};

// public exports

pub type BuildResult<T> = chunkgraph_error::Result<T>;
pub type BuildError = chunkgraph_error::Error;
