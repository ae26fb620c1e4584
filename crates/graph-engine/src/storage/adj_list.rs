use std::collections::HashMap;

use tracing::error;

use super::adjacency::{sort_by_node, Adjacency};
use crate::error::{GraphError, Result};
use crate::value::AdjValue;
use crate::{NodeId, WeightedNode};

/// Hash-map adjacency.
///
/// In-degree counts how many stored rows name a node as a neighbor, so it is
/// only the full in-degree when every referenced node also has its own row.
#[derive(Debug, Default)]
pub struct AdjList {
    keys: Vec<NodeId>,
    adj_list: HashMap<NodeId, Vec<WeightedNode>>,
    in_degree: HashMap<NodeId, usize>,
}

impl AdjList {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_row(&mut self, value: AdjValue, kind: &'static str) -> Result<&[WeightedNode]> {
        if self.adj_list.contains_key(&value.node) {
            error!(
                "Need unique node in the {} file, got duplicate node: {}",
                kind, value.node
            );
            return Err(GraphError::DuplicateNode {
                kind,
                node: value.node,
            });
        }
        self.keys.push(value.node);
        Ok(self.adj_list.entry(value.node).or_insert(value.pairs))
    }
}

impl Adjacency for AdjList {
    fn clear(&mut self) {
        self.keys.clear();
        self.adj_list.clear();
        self.in_degree.clear();
    }

    fn reserve(&mut self, estimated_size: usize) {
        self.keys.reserve(estimated_size);
        self.adj_list.reserve(estimated_size);
        self.in_degree.reserve(estimated_size);
    }

    fn add_context(&mut self, mut value: AdjValue) -> Result<()> {
        sort_by_node(&mut value.pairs);
        let neighbors: Vec<NodeId> = self
            .insert_row(value, "graph")?
            .iter()
            .map(|&(id, _)| id)
            .collect();
        for id in neighbors {
            *self.in_degree.entry(id).or_insert(0) += 1;
        }
        Ok(())
    }

    fn add_feature(&mut self, value: AdjValue) -> Result<()> {
        self.insert_row(value, "feature").map(|_| ())
    }

    fn len(&self) -> usize {
        self.adj_list.len()
    }

    fn keys(&self) -> &[NodeId] {
        &self.keys
    }

    fn find_neighbor(&self, node: NodeId) -> Option<&[WeightedNode]> {
        self.adj_list.get(&node).map(Vec::as_slice)
    }

    fn in_degree(&self, dst_node: NodeId) -> usize {
        self.in_degree.get(&dst_node).copied().unwrap_or(0)
    }

    fn out_degree(&self, src_node: NodeId) -> usize {
        self.adj_list.get(&src_node).map_or(0, Vec::len)
    }
}
