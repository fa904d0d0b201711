use chunkgraph_common::{compare_locations, ChunkIdx, HashSink};
use chunkgraph_error::ConstraintViolation;
use itertools::Itertools;
use rayon::prelude::{IntoParallelIterator, ParallelIterator};
use rustc_hash::FxHashSet;
use xxhash_rust::xxh3::Xxh3;

use super::ChunkGraph;
use crate::{BuildError, BuildResult, ChunkOrigin, HashOptions};

impl ChunkGraph {
  /// Puts modules, origins, parents and children of `chunk` in their canonical order.
  pub fn sort_chunk_items(&mut self, chunk: ChunkIdx) {
    self.chunks[chunk]
      .modules
      .sort_with_context(&self.module_order, &self.modules);

    let modules = &self.modules;
    let module_identifier =
      |origin: &ChunkOrigin| origin.module.map(|module| modules[module].identifier());
    let origins = &mut self.chunks[chunk].origins;
    origins
      .iter_mut()
      .for_each(|origin| origin.reasons.sort());
    origins.sort_by(|a, b| {
      module_identifier(a)
        .cmp(&module_identifier(b))
        .then_with(|| compare_locations(a.loc.as_ref(), b.loc.as_ref()))
        .then_with(|| a.reasons.cmp(&b.reasons))
    });

    let mut parents = std::mem::take(&mut self.chunks[chunk].parents);
    parents.sort_with_context(&self.chunk_order, &self.chunks);
    self.chunks[chunk].parents = parents;

    let mut children = std::mem::take(&mut self.chunks[chunk].children);
    children.sort_with_context(&self.chunk_order, &self.chunks);
    self.chunks[chunk].children = children;
  }

  /// Must run before anything order-sensitive, like hashing, reads the graph.
  pub fn sort_items(&mut self) {
    let chunks = self.chunks().collect::<Vec<_>>();
    chunks
      .into_iter()
      .for_each(|chunk| self.sort_chunk_items(chunk));
  }

  pub fn update_hash(&self, chunk: ChunkIdx, hash: &mut dyn HashSink) {
    let current = &self.chunks[chunk];
    let id = current
      .id
      .as_ref()
      .map_or_else(|| "null".to_string(), |id| id.to_string());
    hash.update_str(&format!("{id} "));
    hash.update_str(
      &current
        .ids
        .as_ref()
        .map(|ids| ids.iter().join(","))
        .unwrap_or_default(),
    );
    hash.update_str(&format!("{} ", current.name.as_deref().unwrap_or_default()));
    current
      .modules()
      .for_each(|module| self.modules[module].update_hash(hash));
  }

  /// Sorts the graph, then fills `hash` and `rendered_hash` of every live chunk.
  #[tracing::instrument(skip_all)]
  pub fn create_hashes(&mut self, options: &HashOptions) -> BuildResult<()> {
    options.validate()?;
    self.sort_items();
    let graph = &*self;
    let chunks = graph.chunks().collect::<Vec<_>>();
    let digests = chunks
      .into_par_iter()
      .map(|chunk| {
        let mut hasher = Xxh3::new();
        graph.update_hash(chunk, &mut hasher);
        (chunk, format!("{:032x}", hasher.digest128()))
      })
      .collect::<Vec<_>>();
    digests.into_iter().for_each(|(chunk, digest)| {
      let current = &mut self.chunks[chunk];
      current.rendered_hash = Some(digest[..options.hash_digest_length].to_string());
      current.hash = Some(digest);
    });
    Ok(())
  }

  /// Audits parent/child symmetry of every live chunk.
  pub fn validate_constraints(&self) -> BuildResult<()> {
    self
      .chunks()
      .try_for_each(|chunk| self.validate_chunk_constraints(chunk))
  }

  pub fn validate_chunk_constraints(&self, chunk: ChunkIdx) -> BuildResult<()> {
    let current = &self.chunks[chunk];
    let debug_id = |chunk: ChunkIdx| self.chunks[chunk].debug_id();
    let violation = |violation| Err(BuildError::constraint_violation(violation));

    let mut seen = FxHashSet::default();
    for child in current.children() {
      if child == chunk {
        return violation(ConstraintViolation::SelfEdge {
          chunk: debug_id(chunk),
        });
      }
      if !seen.insert(child) {
        return violation(ConstraintViolation::DuplicateChild {
          chunk: debug_id(chunk),
          child: debug_id(child),
        });
      }
      if !self.chunks[child].has_parent(chunk) {
        return violation(ConstraintViolation::ChildMissingParent {
          chunk: debug_id(chunk),
          child: debug_id(child),
        });
      }
    }

    seen.clear();
    for parent in current.parents() {
      if parent == chunk {
        return violation(ConstraintViolation::SelfEdge {
          chunk: debug_id(chunk),
        });
      }
      if !seen.insert(parent) {
        return violation(ConstraintViolation::DuplicateParent {
          chunk: debug_id(chunk),
          parent: debug_id(parent),
        });
      }
      if !self.chunks[parent].has_child(chunk) {
        return violation(ConstraintViolation::ParentMissingChild {
          chunk: debug_id(chunk),
          parent: debug_id(parent),
        });
      }
    }
    Ok(())
  }

  /// # Panics
  ///
  /// On any broken invariant. Meant for tests and debug builds.
  pub fn check_constraints(&self) {
    if let Err(err) = self.validate_constraints() {
      panic!("{err}");
    }
  }
}

#[cfg(test)]
mod tests {
  use chunkgraph_common::{ChunkId, DependencyLocation, ModuleId};

  use crate::{test_helpers::TestModule, ChunkGraph, HashOptions};

  #[test]
  fn sort_items_orders_by_assigned_ids() {
    let mut graph = ChunkGraph::new();
    let late = graph.register_module(TestModule::with_id("/app/late.js", 1.0, 2));
    let early = graph.register_module(TestModule::with_id("/app/early.js", 1.0, 1));
    let anonymous = graph.register_module(TestModule::boxed("/app/anonymous.js", 1.0));
    let chunk = graph.create_chunk(None);
    let first = graph.create_chunk(None);
    let second = graph.create_chunk(None);
    graph.add_module(chunk, anonymous);
    graph.add_module(chunk, late);
    graph.add_module(chunk, early);
    graph.add_chunk(chunk, first);
    graph.add_chunk(chunk, second);

    graph.sort_items();
    assert_eq!(
      graph.chunk(chunk).modules().collect::<Vec<_>>(),
      vec![early, late, anonymous]
    );
    assert_eq!(
      graph.chunk(chunk).children().collect::<Vec<_>>(),
      vec![first, second]
    );

    // Ids assigned after the first sort still take effect.
    graph.set_chunk_id(second, Some(ChunkId::from(0)));
    graph.set_chunk_id(first, Some(ChunkId::from(1)));
    graph.sort_items();
    assert_eq!(
      graph.chunk(chunk).children().collect::<Vec<_>>(),
      vec![second, first]
    );
  }

  #[test]
  fn parents_follow_ids_assigned_after_sealing() {
    let mut graph = ChunkGraph::new();
    let b = graph.create_chunk(None);
    let c = graph.create_chunk(None);
    let child = graph.create_chunk(None);
    graph.add_chunk(b, child);
    graph.add_chunk(c, child);
    graph.sort_items();
    assert_eq!(graph.chunk(child).parents().collect::<Vec<_>>(), vec![b, c]);

    graph.set_chunk_id(c, Some(ChunkId::from(0)));
    graph.set_chunk_id(b, Some(ChunkId::from(1)));
    graph.sort_items();
    assert_eq!(graph.chunk(c).id(), Some(&ChunkId::from(0)));
    assert_eq!(graph.chunk(child).parents().collect::<Vec<_>>(), vec![c, b]);
  }

  #[test]
  fn module_sort_sees_ids_assigned_later() {
    let mut graph = ChunkGraph::new();
    let a = graph.register_module(TestModule::boxed("/app/a.js", 1.0));
    let b = graph.register_module(TestModule::boxed("/app/b.js", 1.0));
    let chunk = graph.create_chunk(None);
    graph.add_module(chunk, a);
    graph.add_module(chunk, b);
    graph.sort_items();
    assert_eq!(graph.chunk(chunk).modules().collect::<Vec<_>>(), vec![a, b]);

    graph.module_mut(b).set_id(Some(ModuleId::from(0)));
    graph.sort_items();
    assert_eq!(graph.chunk(chunk).modules().collect::<Vec<_>>(), vec![b, a]);
  }

  #[test]
  fn origins_sort_by_module_then_location() {
    let mut graph = ChunkGraph::new();
    let a = graph.register_module(TestModule::boxed("/app/a.js", 1.0));
    let b = graph.register_module(TestModule::boxed("/app/b.js", 1.0));
    let chunk = graph.create_chunk(None);
    let current = graph.chunk_mut(chunk);
    current.add_origin(Some(b), Some(DependencyLocation::at(1, 0)), None);
    current.add_origin(Some(a), Some(DependencyLocation::at(9, 0)), None);
    current.add_origin(Some(a), Some(DependencyLocation::at(3, 2)), None);
    graph.sort_items();

    let origins = graph
      .chunk(chunk)
      .origins()
      .iter()
      .map(|origin| (origin.module, origin.loc.clone()))
      .collect::<Vec<_>>();
    assert_eq!(
      origins,
      vec![
        (Some(a), Some(DependencyLocation::at(3, 2))),
        (Some(a), Some(DependencyLocation::at(9, 0))),
        (Some(b), Some(DependencyLocation::at(1, 0))),
      ]
    );
  }

  #[test]
  fn origin_reasons_are_sorted_once_sealed() {
    let mut graph = ChunkGraph::new();
    let a = graph.create_chunk(None);
    let b = graph.create_chunk(None);
    let c = graph.create_chunk(None);
    graph.chunk_mut(a).add_origin(None, None, Some("a".to_string()));
    assert!(graph.integrate(a, b, "duplicate"));
    assert!(graph.integrate(a, c, "limit"));
    assert_eq!(
      graph.chunk(a).origins()[0].reasons,
      vec!["limit".to_string(), "duplicate".to_string()]
    );

    graph.sort_items();
    assert_eq!(
      graph.chunk(a).origins()[0].reasons,
      vec!["duplicate".to_string(), "limit".to_string()]
    );
  }

  #[test]
  fn hashes_do_not_depend_on_insertion_order() {
    let build = |reverse: bool| {
      let mut graph = ChunkGraph::new();
      let mut modules = vec![
        graph.register_module(TestModule::with_id("/app/a.js", 1.0, 1)),
        graph.register_module(TestModule::with_id("/app/b.js", 1.0, 2)),
      ];
      if reverse {
        modules.reverse();
      }
      let chunk = graph.create_chunk(Some("main".to_string()));
      graph.set_chunk_id(chunk, Some(ChunkId::from("main")));
      modules.into_iter().for_each(|module| {
        graph.add_module(chunk, module);
      });
      graph.create_hashes(&HashOptions::default()).unwrap();
      graph.chunk(chunk).hash.clone().unwrap()
    };
    let hash = build(false);
    assert_eq!(hash, build(true));
    assert_eq!(hash.len(), 32);
  }

  #[test]
  fn rendered_hash_is_a_prefix() {
    let mut graph = ChunkGraph::new();
    let chunk = graph.create_chunk(None);
    graph
      .create_hashes(&HashOptions {
        hash_digest_length: 8,
      })
      .unwrap();
    let chunk = graph.chunk(chunk);
    let hash = chunk.hash.as_deref().unwrap();
    assert_eq!(chunk.rendered_hash.as_deref(), Some(&hash[..8]));
    assert!(graph
      .create_hashes(&HashOptions {
        hash_digest_length: 0
      })
      .is_err());
  }

  #[test]
  fn hash_input_layout() {
    let mut graph = ChunkGraph::new();
    let module = graph.register_module(TestModule::boxed("[module]", 1.0));
    let chunk = graph.create_chunk(Some("main".to_string()));
    graph.add_module(chunk, module);
    let mut recorded = Vec::<u8>::new();
    graph.update_hash(chunk, &mut recorded);
    assert_eq!(String::from_utf8(recorded).unwrap(), "null main [module]");

    graph.set_chunk_id(chunk, Some(ChunkId::from(3)));
    graph.set_chunk_ids(chunk, Some(vec![ChunkId::from(3), ChunkId::from(4)]));
    let mut recorded = Vec::<u8>::new();
    graph.update_hash(chunk, &mut recorded);
    assert_eq!(String::from_utf8(recorded).unwrap(), "3 3,4main [module]");
  }

  #[test]
  fn broken_symmetry_is_reported() {
    let mut graph = ChunkGraph::new();
    let a = graph.create_chunk(None);
    let b = graph.create_chunk(None);
    graph.chunks[a].children.add(b);
    let err = graph.validate_constraints().unwrap_err();
    assert_eq!(
      err.to_string(),
      "checkConstraints: child missing parent 1000 -> 1001"
    );

    graph.chunks[b].parents.add(a);
    assert!(graph.validate_constraints().is_ok());

    graph.chunks[a].parents.add(a);
    let err = graph.validate_constraints().unwrap_err();
    assert_eq!(err.to_string(), "checkConstraints: chunk 1000 is its own parent");
  }

  #[test]
  #[should_panic(expected = "checkConstraints: parent missing child")]
  fn check_constraints_panics() {
    let mut graph = ChunkGraph::new();
    let a = graph.create_chunk(None);
    let b = graph.create_chunk(None);
    graph.chunks[b].parents.add(a);
    graph.check_constraints();
  }
}
