use std::cmp::Ordering;

use chunkgraph_common::{ChunkId, ChunkIdx};
use hashlink::LinkedHashMap;
use itertools::Itertools;
use rustc_hash::FxHashSet;

use super::ChunkGraph;

/// Id-keyed data about a chunk and everything it may load, as needed by a runtime manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMaps {
  pub hash: LinkedHashMap<ChunkId, String>,
  pub name: LinkedHashMap<ChunkId, String>,
}

impl ChunkGraph {
  /// `chunk` followed by every chunk reachable through child edges, depth-first, each once.
  pub fn reachable_chunks(&self, chunk: ChunkIdx) -> Vec<ChunkIdx> {
    let mut visited = FxHashSet::default();
    let mut order = vec![];
    let mut stack = vec![chunk];
    while let Some(current) = stack.pop() {
      if !visited.insert(current) {
        continue;
      }
      order.push(current);
      let children = self.chunks[current].children().collect::<Vec<_>>();
      stack.extend(children.into_iter().rev());
    }
    order
  }

  /// Chunks without an id are walked through but not recorded. Runtime chunks are only recorded
  /// with `include_entries`. `real_hash` picks `hash` over `rendered_hash`.
  pub fn get_chunk_maps(&self, chunk: ChunkIdx, include_entries: bool, real_hash: bool) -> ChunkMaps {
    let mut maps = ChunkMaps::default();
    self
      .reachable_chunks(chunk)
      .into_iter()
      .filter(|chunk| include_entries || !self.has_runtime(*chunk))
      .for_each(|chunk| {
        let chunk = &self.chunks[chunk];
        let Some(id) = &chunk.id else {
          return;
        };
        let hash = if real_hash {
          &chunk.hash
        } else {
          &chunk.rendered_hash
        };
        if let Some(hash) = hash {
          maps.hash.insert(id.clone(), hash.clone());
        }
        if let Some(name) = &chunk.name {
          maps.name.insert(id.clone(), name.clone());
        }
      });
    maps
  }

  pub fn sorted_module_identifiers(&self, chunk: ChunkIdx) -> Vec<&str> {
    self.chunks[chunk]
      .modules()
      .map(|module| self.modules[module].identifier())
      .sorted_unstable()
      .collect()
  }

  /// The sorted module identifiers joined by spaces. Equal for chunks with the same modules.
  pub fn modules_ident(&self, chunk: ChunkIdx) -> String {
    self.sorted_module_identifiers(chunk).join(" ")
  }

  /// Chunks with more modules come first, ties are broken by module identifiers.
  pub fn compare_to(&self, chunk: ChunkIdx, other: ChunkIdx) -> Ordering {
    let a = &self.chunks[chunk];
    let b = &self.chunks[other];
    b.number_of_modules()
      .cmp(&a.number_of_modules())
      .then_with(|| {
        self
          .sorted_module_identifiers(chunk)
          .cmp(&self.sorted_module_identifiers(other))
      })
  }
}

#[cfg(test)]
mod tests {
  use std::cmp::Ordering;

  use chunkgraph_common::ChunkId;

  use crate::{test_helpers::TestModule, ChunkGraph};

  fn assign_ids(graph: &mut ChunkGraph) {
    graph
      .chunks()
      .collect::<Vec<_>>()
      .into_iter()
      .enumerate()
      .for_each(|(idx, chunk)| {
        graph.set_chunk_id(chunk, Some(ChunkId::from(idx as u32)));
        let current = graph.chunk_mut(chunk);
        current.hash = Some(format!("hash{idx}"));
        current.rendered_hash = Some(format!("h{idx}"));
      });
  }

  #[test]
  fn visits_shared_descendants_once() {
    let mut graph = ChunkGraph::new();
    let a = graph.create_chunk(Some("a".to_string()));
    let b = graph.create_chunk(Some("b".to_string()));
    let c = graph.create_chunk(Some("c".to_string()));
    let d = graph.create_chunk(Some("d".to_string()));
    graph.add_chunk(a, b);
    graph.add_chunk(a, c);
    graph.add_chunk(c, d);
    graph.add_chunk(b, d);
    // A cycle back to the start must not loop.
    graph.add_chunk(d, a);

    assert_eq!(graph.reachable_chunks(a), vec![a, b, d, c]);

    assign_ids(&mut graph);
    let maps = graph.get_chunk_maps(a, false, true);
    assert_eq!(maps.hash.len(), 4);
    assert_eq!(maps.hash.get(&ChunkId::from(3)).map(String::as_str), Some("hash3"));
    assert_eq!(maps.name.get(&ChunkId::from(2)).map(String::as_str), Some("c"));

    let rendered = graph.get_chunk_maps(a, false, false);
    assert_eq!(rendered.hash.get(&ChunkId::from(0)).map(String::as_str), Some("h0"));
  }

  #[test]
  fn runtime_chunks_need_include_entries() {
    let mut graph = ChunkGraph::new();
    let main = graph.create_chunk(Some("main".to_string()));
    let lazy = graph.create_chunk(None);
    let entry = graph.add_entrypoint("main");
    graph.push_entrypoint_chunk(entry, main);
    graph.add_chunk(main, lazy);
    assign_ids(&mut graph);

    let maps = graph.get_chunk_maps(main, false, true);
    assert_eq!(maps.hash.keys().cloned().collect::<Vec<_>>(), vec![ChunkId::from(1)]);
    assert!(maps.name.is_empty());

    let maps = graph.get_chunk_maps(main, true, true);
    assert_eq!(maps.hash.len(), 2);
    assert_eq!(maps.name.get(&ChunkId::from(0)).map(String::as_str), Some("main"));
  }

  #[test]
  fn chunks_without_ids_are_skipped() {
    let mut graph = ChunkGraph::new();
    let a = graph.create_chunk(None);
    let b = graph.create_chunk(None);
    let c = graph.create_chunk(Some("c".to_string()));
    graph.add_chunk(a, b);
    graph.add_chunk(b, c);
    graph.set_chunk_id(c, Some(ChunkId::from("c")));
    graph.chunk_mut(c).hash = Some("abc".to_string());

    let maps = graph.get_chunk_maps(a, false, true);
    assert_eq!(maps.hash.len(), 1);
    assert_eq!(maps.name.get(&ChunkId::from("c")).map(String::as_str), Some("c"));
  }

  #[test]
  fn bigger_chunks_compare_first() {
    let mut graph = ChunkGraph::new();
    let x = graph.register_module(TestModule::boxed("/app/x.js", 1.0));
    let y = graph.register_module(TestModule::boxed("/app/y.js", 1.0));
    let z = graph.register_module(TestModule::boxed("/app/z.js", 1.0));
    let big = graph.create_chunk(None);
    let xz = graph.create_chunk(None);
    let yz = graph.create_chunk(None);
    [x, y, z].into_iter().for_each(|m| {
      graph.add_module(big, m);
    });
    graph.add_module(xz, z);
    graph.add_module(xz, x);
    graph.add_module(yz, y);
    graph.add_module(yz, z);

    assert_eq!(graph.compare_to(big, xz), Ordering::Less);
    assert_eq!(graph.compare_to(xz, big), Ordering::Greater);
    assert_eq!(graph.compare_to(xz, yz), Ordering::Less);
    assert_eq!(graph.compare_to(yz, yz), Ordering::Equal);
    assert_eq!(graph.modules_ident(xz), "/app/x.js /app/z.js");
  }
}
