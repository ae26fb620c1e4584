use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::error;

use crate::NodeId;

/// Sparse node id -> dense index, assigned in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct Indexing {
    index_map: HashMap<NodeId, usize>,
}

impl Indexing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, estimated_size: usize) {
        self.index_map.reserve(estimated_size);
    }

    pub fn clear(&mut self) {
        self.index_map.clear();
    }

    /// Appends `node` with the next unused index. A node already present
    /// keeps the index it was first given.
    pub fn add(&mut self, node: NodeId) -> usize {
        let next = self.index_map.len();
        *self.index_map.entry(node).or_insert(next)
    }

    /// Inserts an externally assigned index; an existing entry wins. Returns
    /// whether `node` was new.
    pub fn emplace(&mut self, node: NodeId, index: usize) -> bool {
        match self.index_map.entry(node) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(index);
                true
            }
        }
    }

    /// Looks up `node`, logging when it is absent.
    pub fn get(&self, node: NodeId) -> Option<usize> {
        let index = self.index_map.get(&node).copied();
        if index.is_none() {
            error!("Couldn't find node: {} in the index table.", node);
        }
        index
    }

    /// Same as [`Indexing::get`] without the log line, for paths where
    /// absence is expected.
    pub fn try_get(&self, node: NodeId) -> Option<usize> {
        self.index_map.get(&node).copied()
    }

    pub fn find(&self, node: NodeId) -> bool {
        self.index_map.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.index_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index_map.is_empty()
    }
}
