use crate::{BuildResult, ChunkGraph, OptimizeChunks};

/// Removes chunks that hold no module and are not loaded by an entrypoint.
#[derive(Debug, Default)]
pub struct RemoveEmptyChunks;

impl OptimizeChunks for RemoveEmptyChunks {
  fn name(&self) -> &'static str {
    "RemoveEmptyChunks"
  }

  #[tracing::instrument(skip_all)]
  fn optimize(&self, graph: &mut ChunkGraph) -> BuildResult<bool> {
    let empty_chunks = graph
      .chunks()
      .filter(|chunk| {
        graph.chunk(*chunk).is_empty() && !graph.is_initial(*chunk) && !graph.has_runtime(*chunk)
      })
      .collect::<Vec<_>>();
    empty_chunks.iter().for_each(|chunk| {
      graph.remove(*chunk, "empty");
    });
    tracing::debug!("removed {} empty chunks", empty_chunks.len());
    Ok(!empty_chunks.is_empty())
  }
}
