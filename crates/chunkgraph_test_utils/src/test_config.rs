use std::path::Path;

use chunkgraph_common::{ChunkId, DependencyLocation, ModuleId};
use chunkgraph_core::LimitChunkCountOptions;
use rustc_hash::FxHashMap;
use serde::Deserialize;

fn true_by_default() -> bool {
  true
}

/// One `test.config.json`: a chunk graph to build, operations to run on it, and the state
/// expected afterwards. Chunks are referred to by name, modules by identifier.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TestConfig {
  #[serde(default)]
  pub modules: Vec<ModuleConfig>,
  #[serde(default)]
  pub chunks: Vec<ChunkConfig>,
  #[serde(default)]
  pub entrypoints: Vec<EntrypointConfig>,
  #[serde(default)]
  pub blocks: Vec<BlockConfig>,
  #[serde(default)]
  pub operations: Vec<Operation>,
  #[serde(default)]
  pub expected: Expected,
}

impl TestConfig {
  pub fn from_config_path(filepath: &Path) -> Self {
    let content = std::fs::read_to_string(filepath)
      .unwrap_or_else(|err| panic!("failed to read {}: {err}", filepath.display()));
    serde_json::from_str(&content)
      .unwrap_or_else(|err| panic!("invalid test config {}: {err}", filepath.display()))
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleConfig {
  pub identifier: String,
  #[serde(default)]
  pub size: f64,
  #[serde(default)]
  pub id: Option<ModuleId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChunkConfig {
  pub name: String,
  #[serde(default)]
  pub modules: Vec<String>,
  #[serde(default)]
  pub children: Vec<String>,
  #[serde(default)]
  pub id: Option<ChunkId>,
  #[serde(default)]
  pub hash: Option<String>,
  #[serde(default)]
  pub rendered_hash: Option<String>,
  #[serde(default)]
  pub origins: Vec<OriginConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OriginConfig {
  #[serde(default)]
  pub module: Option<String>,
  #[serde(default)]
  pub loc: Option<DependencyLocation>,
  #[serde(default)]
  pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntrypointConfig {
  pub name: String,
  pub chunks: Vec<String>,
}

/// A split point. Without `parent` it hangs below the root block of `module`, otherwise below the
/// block at index `parent` of the fixture's block list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BlockConfig {
  pub module: String,
  #[serde(default)]
  pub parent: Option<usize>,
  #[serde(default)]
  pub chunks: Vec<String>,
  #[serde(default)]
  pub chunk_name: Option<String>,
  #[serde(default)]
  pub dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Operation {
  #[serde(rename_all = "camelCase")]
  Integrate {
    chunk: String,
    other: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default = "true_by_default")]
    expect: bool,
  },
  #[serde(rename_all = "camelCase")]
  Remove {
    chunk: String,
    #[serde(default)]
    reason: Option<String>,
  },
  #[serde(rename_all = "camelCase")]
  Split { chunk: String, new_chunk: String },
  #[serde(rename_all = "camelCase")]
  AddChunk { chunk: String, child: String },
  #[serde(rename_all = "camelCase")]
  RemoveChunk { chunk: String, child: String },
  #[serde(rename_all = "camelCase")]
  MoveModule {
    chunk: String,
    module: String,
    target: String,
  },
  RemoveEmptyChunks,
  MergeDuplicateChunks,
  LimitChunkCount(LimitChunkCountOptions),
  #[serde(rename_all = "camelCase")]
  CreateHashes {
    #[serde(default)]
    hash_digest_length: Option<usize>,
  },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Expected {
  /// Names of the chunks left in the graph, in creation order.
  #[serde(default)]
  pub live_chunks: Option<Vec<String>>,
  #[serde(default)]
  pub chunks: FxHashMap<String, ExpectedChunk>,
  #[serde(default)]
  pub entrypoints: FxHashMap<String, Vec<String>>,
  #[serde(default)]
  pub blocks: Vec<ExpectedBlock>,
  #[serde(default)]
  pub chunk_maps: Vec<ExpectedChunkMaps>,
  /// Message of the error that stops the run. Operations after the failing one are skipped.
  #[serde(default)]
  pub error: Option<String>,
}

/// Listed fields are compared as sets, omitted fields are not checked.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExpectedChunk {
  #[serde(default)]
  pub modules: Option<Vec<String>>,
  #[serde(default)]
  pub children: Option<Vec<String>>,
  #[serde(default)]
  pub parents: Option<Vec<String>>,
  #[serde(default)]
  pub origin_reasons: Option<Vec<Vec<String>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExpectedBlock {
  /// Index into the fixture's block list.
  pub index: usize,
  #[serde(default)]
  pub chunks: Option<Vec<String>>,
  #[serde(default)]
  pub removed: Option<String>,
  /// `[chunk name, expected ident]`, resolved against the `/` context.
  #[serde(default)]
  pub ident: Option<(String, String)>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExpectedChunkMaps {
  pub chunk: String,
  #[serde(default)]
  pub include_entries: bool,
  #[serde(default = "true_by_default")]
  pub real_hash: bool,
  #[serde(default)]
  pub hash: FxHashMap<String, String>,
  #[serde(default)]
  pub name: FxHashMap<String, String>,
}
