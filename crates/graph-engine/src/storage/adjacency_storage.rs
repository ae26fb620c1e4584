use tracing::error;

use super::adjacency::{new_adjacency, Adjacency, AdjacencyKind};
use super::Storage;
use crate::error::Result;
use crate::value::AdjValue;
use crate::{NodeId, WeightedNode};

/// Context graph: one weighted neighbor row per node.
pub struct ContextStorage {
    adj: Box<dyn Adjacency>,
}

impl ContextStorage {
    pub fn new(kind: AdjacencyKind) -> Self {
        Self {
            adj: new_adjacency(kind),
        }
    }
}

impl Storage for ContextStorage {
    fn clear(&mut self) {
        self.adj.clear();
    }

    fn reserve(&mut self, estimated_size: usize) {
        self.adj.reserve(estimated_size);
    }

    fn insert_context(&mut self, value: AdjValue) -> Result<()> {
        self.adj.add_context(value)
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    fn keys(&self) -> &[NodeId] {
        self.adj.keys()
    }

    fn find_neighbor(&self, node: NodeId) -> Option<&[WeightedNode]> {
        self.adj.find_neighbor(node)
    }

    fn describe(&self, node: NodeId) -> String {
        self.adj.describe(node)
    }

    fn in_degree(&self, dst_node: NodeId) -> usize {
        self.adj.in_degree(dst_node)
    }

    fn out_degree(&self, src_node: NodeId) -> usize {
        self.adj.out_degree(src_node)
    }
}

/// Node features: `feature_id:value` pairs per node, kept in file order.
pub struct FeatureStorage {
    adj: Box<dyn Adjacency>,
}

impl FeatureStorage {
    pub fn new(kind: AdjacencyKind) -> Self {
        Self {
            adj: new_adjacency(kind),
        }
    }
}

impl Storage for FeatureStorage {
    fn clear(&mut self) {
        self.adj.clear();
    }

    fn reserve(&mut self, estimated_size: usize) {
        self.adj.reserve(estimated_size);
    }

    fn insert_feature(&mut self, value: AdjValue) -> Result<()> {
        self.adj.add_feature(value)
    }

    fn len(&self) -> usize {
        self.adj.len()
    }

    fn keys(&self) -> &[NodeId] {
        self.adj.keys()
    }

    fn find_neighbor(&self, node: NodeId) -> Option<&[WeightedNode]> {
        self.adj.find_neighbor(node)
    }

    fn describe(&self, node: NodeId) -> String {
        self.adj.describe(node)
    }

    fn in_degree(&self, _dst_node: NodeId) -> usize {
        error!("in_degree is not tracked by the feature storage.");
        0
    }

    fn out_degree(&self, _src_node: NodeId) -> usize {
        error!("out_degree is not tracked by the feature storage.");
        0
    }
}
