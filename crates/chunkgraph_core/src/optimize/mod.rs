use std::fmt::Debug;

use crate::{BuildResult, ChunkGraph};

mod limit_chunk_count;
pub use limit_chunk_count::*;
mod merge_duplicate_chunks;
pub use merge_duplicate_chunks::*;
mod remove_empty_chunks;
pub use remove_empty_chunks::*;

/// A pass over the chunk graph built only on its public mutation primitives.
pub trait OptimizeChunks: Debug + Send + Sync {
  fn name(&self) -> &'static str;

  /// Returns whether the graph changed.
  fn optimize(&self, graph: &mut ChunkGraph) -> BuildResult<bool>;
}

impl ChunkGraph {
  /// Runs `passes` in order, and runs them all again as long as one of them changed the graph.
  #[tracing::instrument(skip_all)]
  pub fn optimize_chunks(&mut self, passes: &[&dyn OptimizeChunks]) -> BuildResult<()> {
    loop {
      let mut changed = false;
      for pass in passes {
        let pass_changed = pass
          .optimize(self)
          .map_err(|err| err.context(format!("while running {}", pass.name())))?;
        if pass_changed {
          tracing::debug!("{} changed the chunk graph", pass.name());
          changed = true;
        }
      }
      if !changed {
        return Ok(());
      }
    }
  }
}
