use chunkgraph_common::ChunkIdx;
use rayon::prelude::{IntoParallelIterator, ParallelIterator};
use serde::Deserialize;

use crate::{BuildError, BuildResult, ChunkGraph, ChunkSizeOptions, OptimizeChunks};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LimitChunkCountOptions {
  pub max_chunks: usize,
  #[serde(default)]
  pub chunk_overhead: Option<f64>,
  #[serde(default)]
  pub entry_chunk_multiplicator: Option<f64>,
}

impl Default for LimitChunkCountOptions {
  fn default() -> Self {
    Self {
      max_chunks: 1,
      chunk_overhead: None,
      entry_chunk_multiplicator: None,
    }
  }
}

impl LimitChunkCountOptions {
  pub fn size_options(&self) -> ChunkSizeOptions {
    ChunkSizeOptions {
      chunk_overhead: self.chunk_overhead,
      entry_chunk_multiplicator: self.entry_chunk_multiplicator,
    }
  }
}

/// Merges chunks until at most `max_chunks` are left, always picking the merge that saves the most
/// weighted size.
#[derive(Debug)]
pub struct LimitChunkCount {
  options: LimitChunkCountOptions,
}

#[derive(Debug, Clone, Copy)]
struct MergeCandidate {
  target: ChunkIdx,
  absorbed: ChunkIdx,
  saving: f64,
  integrated_size: f64,
}

impl MergeCandidate {
  fn is_better_than(&self, other: &MergeCandidate) -> bool {
    self.saving > other.saving
      || (self.saving == other.saving && self.integrated_size < other.integrated_size)
  }
}

impl LimitChunkCount {
  pub fn new(options: LimitChunkCountOptions) -> BuildResult<Self> {
    if options.max_chunks == 0 {
      return Err(BuildError::invalid_option_value(
        "maxChunks",
        options.max_chunks,
        "a positive integer",
      ));
    }
    Ok(Self { options })
  }

  pub fn options(&self) -> &LimitChunkCountOptions {
    &self.options
  }

  /// Evaluates every ordered pair of live chunks in parallel. Earlier pairs win ties.
  fn best_candidate(graph: &ChunkGraph, options: &ChunkSizeOptions) -> Option<MergeCandidate> {
    let mut chunks = graph.chunks().collect::<Vec<_>>();
    chunks.sort_by(|a, b| graph.compare_to(*a, *b));
    let chunks = &chunks;
    let pairs = (0..chunks.len())
      .flat_map(|idx| {
        (0..idx).flat_map(move |i| [(chunks[i], chunks[idx]), (chunks[idx], chunks[i])])
      })
      .collect::<Vec<_>>();

    let candidates = pairs
      .into_par_iter()
      .filter_map(|(target, absorbed)| {
        let integrated_size = graph.integrated_size(target, absorbed, options)?;
        let saving = graph.size(target, options) + graph.size(absorbed, options) - integrated_size;
        Some(MergeCandidate {
          target,
          absorbed,
          saving,
          integrated_size,
        })
      })
      .collect::<Vec<_>>();

    candidates.into_iter().reduce(|best, candidate| {
      if candidate.is_better_than(&best) {
        candidate
      } else {
        best
      }
    })
  }
}

impl OptimizeChunks for LimitChunkCount {
  fn name(&self) -> &'static str {
    "LimitChunkCount"
  }

  #[tracing::instrument(skip_all)]
  fn optimize(&self, graph: &mut ChunkGraph) -> BuildResult<bool> {
    let size_options = self.options.size_options();
    let mut changed = false;
    while graph.chunk_count() > self.options.max_chunks {
      let Some(candidate) = Self::best_candidate(graph, &size_options) else {
        tracing::debug!(
          "no mergeable pair left with {} chunks, limit is {}",
          graph.chunk_count(),
          self.options.max_chunks
        );
        break;
      };
      tracing::trace!("limit: {:?}", candidate);
      if !graph.integrate_and_drop(candidate.target, candidate.absorbed, "limit") {
        break;
      }
      changed = true;
    }
    Ok(changed)
  }
}
