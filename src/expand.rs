//! Recursive provenance expansion
//!
//! Replaces provenance references with full copies of the referenced
//! entities, recursively, while breaking cycles with bare `{"@id"}` stubs.
//!
//! Expansion recurses once per provenance level, so chains are cut off at
//! a depth limit ([`DEFAULT_DEPTH_LIMIT`] unless configured) and the
//! references below it are emitted as stubs too.

use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, trace};

use crate::collect::{field_present, EntityIndex};
use crate::depth::DepthTable;
use crate::id::{reference_ids, stub};
use crate::vocab::PROVENANCE_FIELDS;

/// Reference lists this deep or deeper are not expanded
pub const DEFAULT_DEPTH_LIMIT: usize = 256;

/// Expands reference lists against one graph, recording depths as it goes
pub struct Expander<'a> {
    graph: &'a [Value],
    index: &'a EntityIndex,
    depths: &'a mut DepthTable,
    depth_limit: usize,
    stubs: usize,
    truncated: usize,
}

impl<'a> Expander<'a> {
    pub fn new(graph: &'a [Value], index: &'a EntityIndex, depths: &'a mut DepthTable) -> Self {
        Self {
            graph,
            index,
            depths,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            stubs: 0,
            truncated: 0,
        }
    }

    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Number of stub references emitted so far, including truncated ones
    pub fn stubs(&self) -> usize {
        self.stubs
    }

    /// Number of references left unexpanded because of the depth limit
    pub fn truncated(&self) -> usize {
        self.truncated
    }

    /// Expand a provenance field value from the top of a fresh path
    pub fn expand_field(&mut self, value: &Value) -> Vec<Value> {
        let ids = reference_ids(value);
        self.expand(&ids, &mut HashSet::new(), 0)
    }

    /// Expand `ids` at `depth`
    ///
    /// `visited` holds the ids on the path above this list plus the
    /// siblings already handled in it. Each child list gets its own copy,
    /// so nothing a subtree visits leaks into another subtree.
    pub fn expand(
        &mut self,
        ids: &[String],
        visited: &mut HashSet<String>,
        depth: usize,
    ) -> Vec<Value> {
        ids.iter()
            .map(|id| self.expand_one(id, visited, depth))
            .collect()
    }

    fn expand_one(&mut self, id: &str, visited: &mut HashSet<String>, depth: usize) -> Value {
        if depth >= self.depth_limit {
            debug!(id, depth, "depth limit reached, emitting stub");
            self.stubs += 1;
            self.truncated += 1;
            return stub(id);
        }

        if !visited.insert(id.to_string()) {
            trace!(id, depth, "cycle, emitting stub");
            self.stubs += 1;
            return stub(id);
        }

        let graph = self.graph;
        let Some(entity) = self.index.get(graph, id) else {
            trace!(id, depth, "unresolved reference, emitting stub");
            self.stubs += 1;
            return stub(id);
        };

        let mut expanded: Map<String, Value> = match entity {
            Value::Object(obj) => obj.clone(),
            _ => return stub(id),
        };

        let mut max_child_depth = depth;
        for field in PROVENANCE_FIELDS {
            let Some(value) = field_present(entity, field) else {
                continue;
            };
            let child_ids = reference_ids(value);
            let mut child_visited = visited.clone();
            let children = self.expand(&child_ids, &mut child_visited, depth + 1);
            expanded.insert(field.to_string(), Value::Array(children));
            max_child_depth = max_child_depth.max(depth + 1);
        }

        self.depths.record(id, max_child_depth);
        Value::Object(expanded)
    }
}
