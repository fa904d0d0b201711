use std::path::Path;

use chunkgraph_common::{BlockIdx, ChunkId, ChunkIdx, ModuleIdx};
use chunkgraph_core::{
  BuildError, BuildResult, ChunkGraph, DependenciesBlock, HashOptions, LimitChunkCount,
  MergeDuplicateChunks, RemoveEmptyChunks,
};
use rustc_hash::FxHashMap;

use crate::{
  test_config::{Operation, TestConfig},
  FixtureDependency, FixtureModule,
};

const DEFAULT_REASON: &str = "test";

fn keyed_by_id<'a>(
  entries: impl Iterator<Item = (&'a ChunkId, &'a String)>,
) -> FxHashMap<String, String> {
  entries
    .map(|(id, value)| (id.to_string(), value.clone()))
    .collect()
}

/// A [ChunkGraph] built from a [TestConfig], plus the name tables to talk about it.
#[derive(Debug)]
pub struct FixtureGraph {
  pub graph: ChunkGraph,
  modules: FxHashMap<String, ModuleIdx>,
  chunks: FxHashMap<String, ChunkIdx>,
  chunk_names: FxHashMap<ChunkIdx, String>,
  blocks: Vec<BlockIdx>,
}

impl FixtureGraph {
  pub fn build(config: &TestConfig) -> BuildResult<Self> {
    let mut fixture = Self {
      graph: ChunkGraph::new(),
      modules: Default::default(),
      chunks: Default::default(),
      chunk_names: Default::default(),
      blocks: Default::default(),
    };

    config.modules.iter().for_each(|module| {
      let idx = fixture.graph.register_module(
        FixtureModule::new(&module.identifier, module.size)
          .with_id(module.id.clone())
          .boxed(),
      );
      fixture.modules.insert(module.identifier.clone(), idx);
    });

    config.chunks.iter().for_each(|chunk| {
      fixture.create_chunk(&chunk.name);
    });

    for chunk in &config.chunks {
      let idx = fixture.chunk(&chunk.name)?;
      fixture.graph.set_chunk_id(idx, chunk.id.clone());
      for module in &chunk.modules {
        let module = fixture.module(module)?;
        fixture.graph.add_module(idx, module);
      }
      for child in &chunk.children {
        let child = fixture.chunk(child)?;
        fixture.graph.add_chunk(idx, child);
      }
      for origin in &chunk.origins {
        let module = origin
          .module
          .as_deref()
          .map(|module| fixture.module(module))
          .transpose()?;
        fixture
          .graph
          .chunk_mut(idx)
          .add_origin(module, origin.loc.clone(), origin.name.clone());
      }
      let current = fixture.graph.chunk_mut(idx);
      current.hash = chunk.hash.clone();
      current.rendered_hash = chunk.rendered_hash.clone();
    }

    for entrypoint in &config.entrypoints {
      let idx = fixture.graph.add_entrypoint(&entrypoint.name);
      for chunk in &entrypoint.chunks {
        let chunk = fixture.chunk(chunk)?;
        fixture.graph.push_entrypoint_chunk(idx, chunk);
      }
    }

    for (index, block) in config.blocks.iter().enumerate() {
      let parent = match block.parent {
        Some(parent) => *fixture.blocks.get(parent).ok_or_else(|| {
          BuildError::unknown_reference(
            "block",
            parent.to_string(),
            (0..index).map(|idx| idx.to_string()).collect(),
          )
        })?,
        None => fixture.graph.module_block(fixture.module(&block.module)?),
      };
      let mut created = DependenciesBlock::new();
      if let Some(chunk_name) = &block.chunk_name {
        created = created.with_chunk_name(chunk_name);
      }
      let idx = fixture.graph.create_block(parent, created);
      block.dependencies.iter().for_each(|request| {
        fixture
          .graph
          .blocks_mut()
          .add_dependency(idx, Box::new(FixtureDependency::new(request)));
      });
      let chunks = block
        .chunks
        .iter()
        .map(|chunk| fixture.chunk(chunk))
        .collect::<BuildResult<Vec<_>>>()?;
      fixture.graph.set_block_chunks(idx, chunks);
      fixture.blocks.push(idx);
    }

    Ok(fixture)
  }

  fn create_chunk(&mut self, name: &str) -> ChunkIdx {
    let idx = self.graph.create_chunk(Some(name.to_string()));
    self.chunks.insert(name.to_string(), idx);
    self.chunk_names.insert(idx, name.to_string());
    idx
  }

  /// Looks up chunks by fixture name, including chunks that already left the graph.
  pub fn chunk(&self, name: &str) -> BuildResult<ChunkIdx> {
    self.chunks.get(name).copied().ok_or_else(|| {
      BuildError::unknown_reference("chunk", name, self.chunks.keys().cloned().collect())
    })
  }

  pub fn chunk_name(&self, chunk: ChunkIdx) -> &str {
    self
      .chunk_names
      .get(&chunk)
      .map_or("<unnamed>", String::as_str)
  }

  pub fn module(&self, identifier: &str) -> BuildResult<ModuleIdx> {
    self.modules.get(identifier).copied().ok_or_else(|| {
      BuildError::unknown_reference("module", identifier, self.modules.keys().cloned().collect())
    })
  }

  pub fn block(&self, index: usize) -> BlockIdx {
    self.blocks[index]
  }

  pub fn names_of(&self, chunks: impl IntoIterator<Item = ChunkIdx>) -> Vec<String> {
    chunks
      .into_iter()
      .map(|chunk| self.chunk_name(chunk).to_string())
      .collect()
  }

  pub fn apply(&mut self, operation: &Operation) -> BuildResult<()> {
    match operation {
      Operation::Integrate {
        chunk,
        other,
        reason,
        expect,
      } => {
        let (chunk, other) = (self.chunk(chunk)?, self.chunk(other)?);
        let integrated = self.graph.integrate_and_drop(
          chunk,
          other,
          reason.as_deref().unwrap_or(DEFAULT_REASON),
        );
        assert_eq!(
          integrated,
          *expect,
          "integrate {} <- {}",
          self.chunk_name(chunk),
          self.chunk_name(other)
        );
      }
      Operation::Remove { chunk, reason } => {
        let chunk = self.chunk(chunk)?;
        self
          .graph
          .remove(chunk, reason.as_deref().unwrap_or(DEFAULT_REASON));
      }
      Operation::Split { chunk, new_chunk } => {
        let chunk = self.chunk(chunk)?;
        let new_chunk = self.create_chunk(new_chunk);
        self.graph.split(chunk, new_chunk);
      }
      Operation::AddChunk { chunk, child } => {
        let (chunk, child) = (self.chunk(chunk)?, self.chunk(child)?);
        self.graph.add_chunk(chunk, child);
      }
      Operation::RemoveChunk { chunk, child } => {
        let (chunk, child) = (self.chunk(chunk)?, self.chunk(child)?);
        self.graph.remove_chunk(chunk, child);
      }
      Operation::MoveModule {
        chunk,
        module,
        target,
      } => {
        let (chunk, target) = (self.chunk(chunk)?, self.chunk(target)?);
        let module = self.module(module)?;
        self.graph.move_module(chunk, module, target);
      }
      Operation::RemoveEmptyChunks => self.graph.optimize_chunks(&[&RemoveEmptyChunks])?,
      Operation::MergeDuplicateChunks => self.graph.optimize_chunks(&[&MergeDuplicateChunks])?,
      Operation::LimitChunkCount(options) => {
        let pass = LimitChunkCount::new(*options)?;
        self.graph.optimize_chunks(&[&pass])?;
      }
      Operation::CreateHashes { hash_digest_length } => {
        let mut options = HashOptions::default();
        if let Some(hash_digest_length) = hash_digest_length {
          options.hash_digest_length = *hash_digest_length;
        }
        self.graph.create_hashes(&options)?;
      }
    }
    Ok(())
  }
}

pub struct Tester {
  pub config: TestConfig,
}

impl Tester {
  pub fn from_config_path(filepath: &Path) -> Self {
    Self {
      config: TestConfig::from_config_path(filepath),
    }
  }

  /// Builds the graph, applies every operation and compares the result with `expected`. The graph
  /// invariants are checked after every step.
  pub fn run(&self) {
    let mut fixture = match FixtureGraph::build(&self.config) {
      Ok(fixture) => fixture,
      Err(err) => return self.assert_error(&err),
    };
    fixture.graph.check_constraints();

    for operation in &self.config.operations {
      if let Err(err) = fixture.apply(operation) {
        return self.assert_error(&err);
      }
      fixture.graph.check_constraints();
    }
    if let Some(expected) = &self.config.expected.error {
      panic!("expected error {expected:?}, but every operation succeeded");
    }

    self.assert_graph(&fixture);
  }

  fn assert_error(&self, err: &BuildError) {
    match &self.config.expected.error {
      Some(expected) => assert_eq!(&err.to_string(), expected),
      None => panic!("unexpected error: {err}"),
    }
  }

  fn assert_graph(&self, fixture: &FixtureGraph) {
    let expected = &self.config.expected;
    let graph = &fixture.graph;
    let sorted = |mut names: Vec<String>| {
      names.sort();
      names
    };

    if let Some(live_chunks) = &expected.live_chunks {
      assert_eq!(&fixture.names_of(graph.chunks()), live_chunks, "live chunks");
    }

    let mut chunks = expected.chunks.iter().collect::<Vec<_>>();
    chunks.sort_by(|a, b| a.0.cmp(b.0));
    for (name, expected_chunk) in chunks {
      let chunk = fixture
        .chunk(name)
        .unwrap_or_else(|err| panic!("{err}"));
      let current = graph.chunk(chunk);
      if let Some(modules) = &expected_chunk.modules {
        let actual = graph
          .sorted_module_identifiers(chunk)
          .into_iter()
          .map(ToString::to_string)
          .collect::<Vec<_>>();
        assert_eq!(actual, sorted(modules.clone()), "modules of {name}");
      }
      if let Some(children) = &expected_chunk.children {
        assert_eq!(
          sorted(fixture.names_of(current.children())),
          sorted(children.clone()),
          "children of {name}"
        );
      }
      if let Some(parents) = &expected_chunk.parents {
        assert_eq!(
          sorted(fixture.names_of(current.parents())),
          sorted(parents.clone()),
          "parents of {name}"
        );
      }
      if let Some(origin_reasons) = &expected_chunk.origin_reasons {
        let actual = current
          .origins()
          .iter()
          .map(|origin| origin.reasons.clone())
          .collect::<Vec<_>>();
        assert_eq!(&actual, origin_reasons, "origin reasons of {name}");
      }
    }

    for (name, expected_chunks) in &expected.entrypoints {
      let (_, entrypoint) = graph
        .entrypoints()
        .find(|(_, entrypoint)| &entrypoint.name == name)
        .unwrap_or_else(|| panic!("unknown entrypoint {name:?}"));
      assert_eq!(
        &fixture.names_of(entrypoint.chunks().iter().copied()),
        expected_chunks,
        "chunks of entrypoint {name}"
      );
    }

    for expected_block in &expected.blocks {
      let block = fixture.block(expected_block.index);
      let current = &graph.blocks()[block];
      if let Some(chunks) = &expected_block.chunks {
        assert_eq!(
          &fixture.names_of(current.chunks().as_slice().iter().copied()),
          chunks,
          "chunks of block {}",
          expected_block.index
        );
      }
      if let Some(reason) = &expected_block.removed {
        assert!(
          current.chunks().is_removed(),
          "block {} should be removed",
          expected_block.index
        );
        assert_eq!(current.chunk_reason(), Some(reason.as_str()));
      }
      if let Some((chunk, ident)) = &expected_block.ident {
        let chunk = fixture.chunk(chunk).unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(
          graph.blocks().ident_for_chunk(block, chunk, Path::new("/")).as_ref(),
          Some(ident),
          "ident of block {}",
          expected_block.index
        );
      }
    }

    for expected_maps in &expected.chunk_maps {
      let chunk = fixture
        .chunk(&expected_maps.chunk)
        .unwrap_or_else(|err| panic!("{err}"));
      let maps = graph.get_chunk_maps(chunk, expected_maps.include_entries, expected_maps.real_hash);
      assert_eq!(
        keyed_by_id(maps.hash.iter()),
        expected_maps.hash,
        "hash map of {}",
        expected_maps.chunk
      );
      assert_eq!(
        keyed_by_id(maps.name.iter()),
        expected_maps.name,
        "name map of {}",
        expected_maps.chunk
      );
    }
  }
}
