//! Expansion depth bookkeeping
//!
//! Records, per entity id, how deep the provenance expansion went below
//! it. The table remembers the order in which ids were first recorded;
//! the deepest-root scan depends on that order to break ties.

use std::collections::HashMap;

/// How a new depth for an already recorded id is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthPolicy {
    /// The most recent traversal overwrites the stored depth, even when
    /// it is smaller. Matches the depth annotation produced by existing
    /// EVI tooling.
    #[default]
    LastWrite,
    /// Keep the largest depth seen for the id
    Max,
}

impl std::str::FromStr for DepthPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last-write" => Ok(DepthPolicy::LastWrite),
            "max" => Ok(DepthPolicy::Max),
            other => Err(format!(
                "unknown depth policy '{}': expected 'last-write' or 'max'",
                other
            )),
        }
    }
}

/// Insertion-ordered map from entity id to recorded depth
#[derive(Debug, Default)]
pub struct DepthTable {
    policy: DepthPolicy,
    entries: Vec<(String, usize)>,
    slots: HashMap<String, usize>,
}

impl DepthTable {
    pub fn new(policy: DepthPolicy) -> Self {
        Self {
            policy,
            entries: Vec::new(),
            slots: HashMap::new(),
        }
    }

    /// Record a depth for `id` according to the table's policy
    ///
    /// An id keeps the position of its first recording.
    pub fn record(&mut self, id: &str, depth: usize) {
        match self.slots.get(id) {
            Some(&slot) => {
                let stored = &mut self.entries[slot].1;
                *stored = match self.policy {
                    DepthPolicy::LastWrite => depth,
                    DepthPolicy::Max => (*stored).max(depth),
                };
            }
            None => {
                self.slots.insert(id.to_string(), self.entries.len());
                self.entries.push((id.to_string(), depth));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<usize> {
        self.slots.get(id).map(|&slot| self.entries[slot].1)
    }

    /// The id with the strictly greatest depth; the earliest recorded id
    /// wins ties
    pub fn deepest(&self) -> Option<(&str, usize)> {
        let mut best: Option<(&str, usize)> = None;
        for (id, depth) in &self.entries {
            match best {
                Some((_, best_depth)) if *depth <= best_depth => {}
                _ => best = Some((id.as_str(), *depth)),
            }
        }
        best
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(id, depth)| (id.as_str(), *depth))
    }
}
