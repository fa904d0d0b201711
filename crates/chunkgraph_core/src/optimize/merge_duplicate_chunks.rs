use rustc_hash::FxHashMap;

use crate::{BuildResult, ChunkGraph, OptimizeChunks};

/// Folds non-initial chunks holding exactly the same modules into the first of them.
#[derive(Debug, Default)]
pub struct MergeDuplicateChunks;

impl OptimizeChunks for MergeDuplicateChunks {
  fn name(&self) -> &'static str {
    "MergeDuplicateChunks"
  }

  #[tracing::instrument(skip_all)]
  fn optimize(&self, graph: &mut ChunkGraph) -> BuildResult<bool> {
    let mut chunk_by_modules_ident = FxHashMap::default();
    let mut changed = false;
    let chunks = graph.chunks().collect::<Vec<_>>();
    for chunk in chunks {
      if graph.is_initial(chunk) || graph.has_runtime(chunk) {
        continue;
      }
      let ident = graph.modules_ident(chunk);
      match chunk_by_modules_ident.get(&ident) {
        Some(&first) => {
          if graph.integrate_and_drop(first, chunk, "duplicate") {
            tracing::trace!("merged duplicate chunks: {}", ident);
            changed = true;
          }
        }
        None => {
          chunk_by_modules_ident.insert(ident, chunk);
        }
      }
    }
    Ok(changed)
  }
}
