//! The conversion-graph substrate shared by all managers.
//!
//! Nodes are version-normalized URI bases; edges carry whatever the owning
//! manager stores (a conversion script). Path search is plain BFS, so the
//! first route found is a shortest one; neighbor order is insertion order,
//! which keeps tie-breaking deterministic.

use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

/// A directed graph of conversion edges keyed by URI base.
#[derive(Clone, Debug)]
pub struct ConversionGraph<E> {
    edges: FxHashMap<String, IndexMap<String, E>>,
}

impl<E> Default for ConversionGraph<E> {
    fn default() -> Self {
        Self {
            edges: FxHashMap::default(),
        }
    }
}

impl<E> ConversionGraph<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts (or replaces) the edge `source → target`.
    pub fn insert(&mut self, source: impl Into<String>, target: impl Into<String>, edge: E) {
        self.edges
            .entry(source.into())
            .or_default()
            .insert(target.into(), edge);
    }

    /// Direct edge lookup.
    pub fn edge(&self, source: &str, target: &str) -> Option<&E> {
        self.edges.get(source)?.get(target)
    }

    /// Number of nodes with outgoing edges.
    pub fn node_count(&self) -> usize {
        self.edges.len()
    }

    /// Finds a shortest path of edges from `source` to `target`.
    ///
    /// Returns an empty path when the two are equal, `None` when no route
    /// exists.
    pub fn shortest_path(&self, source: &str, target: &str) -> Option<Vec<&E>> {
        if source == target {
            return Some(Vec::new());
        }

        let mut visited = FxHashSet::default();
        let mut queue = VecDeque::new();
        let mut previous: FxHashMap<&str, &str> = FxHashMap::default();

        visited.insert(source);
        queue.push_back(source);

        'search: while let Some(node) = queue.pop_front() {
            let Some(neighbors) = self.edges.get(node) else {
                continue;
            };
            for next in neighbors.keys() {
                let next = next.as_str();
                if !visited.insert(next) {
                    continue;
                }
                previous.insert(next, node);
                if next == target {
                    break 'search;
                }
                queue.push_back(next);
            }
        }

        if !previous.contains_key(target) {
            return None;
        }

        // Walk predecessors back to the source, then emit edges forward.
        let mut hops = vec![target];
        let mut cursor = target;
        while let Some(&prev) = previous.get(cursor) {
            hops.push(prev);
            cursor = prev;
        }
        hops.reverse();

        let path = hops
            .windows(2)
            .map(|pair| {
                self.edge(pair[0], pair[1])
                    .expect("edge exists along BFS path")
            })
            .collect();
        Some(path)
    }
}
