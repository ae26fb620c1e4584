use tracing::error;

use super::adjacency::{sort_by_node, Adjacency};
use super::statics::GraphStatics;
use crate::error::{GraphError, Result};
use crate::indexing::Indexing;
use crate::value::AdjValue;
use crate::{NodeId, WeightedNode};

/// Dense-row adjacency: row `i` belongs to the node with index `i`.
/// Degrees are exact and come from [`GraphStatics`].
#[derive(Debug, Default)]
pub struct AdjMatrix {
    rows: Indexing,
    keys: Vec<NodeId>,
    adj_matrix: Vec<Vec<WeightedNode>>,
    statics: GraphStatics,
}

impl AdjMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_row(&mut self, node: NodeId, pairs: Vec<WeightedNode>, kind: &'static str) -> Result<()> {
        if self.rows.find(node) {
            error!(
                "Need unique node in the {} file, got duplicate node: {}",
                kind, node
            );
            return Err(GraphError::DuplicateNode { kind, node });
        }
        self.rows.add(node);
        self.keys.push(node);
        self.adj_matrix.push(pairs);
        Ok(())
    }

    pub fn statics(&self) -> &GraphStatics {
        &self.statics
    }
}

impl Adjacency for AdjMatrix {
    fn clear(&mut self) {
        self.rows.clear();
        self.keys.clear();
        self.adj_matrix.clear();
        self.statics.clear();
    }

    fn reserve(&mut self, estimated_size: usize) {
        self.rows.reserve(estimated_size);
        self.keys.reserve(estimated_size);
        self.adj_matrix.reserve(estimated_size);
        self.statics.reserve(estimated_size);
    }

    fn add_context(&mut self, mut value: AdjValue) -> Result<()> {
        sort_by_node(&mut value.pairs);
        let node = value.node;
        let dst_nodes: Vec<NodeId> = value.pairs.iter().map(|&(id, _)| id).collect();
        self.push_row(node, value.pairs, "graph")?;

        self.statics.src_indexing_mut().add(node);
        for dst in dst_nodes {
            self.statics.dst_indexing_mut().add(dst);
            self.statics.add(node, dst)?;
        }
        Ok(())
    }

    fn add_feature(&mut self, value: AdjValue) -> Result<()> {
        self.push_row(value.node, value.pairs, "feature")
    }

    fn len(&self) -> usize {
        self.adj_matrix.len()
    }

    fn keys(&self) -> &[NodeId] {
        &self.keys
    }

    fn find_neighbor(&self, node: NodeId) -> Option<&[WeightedNode]> {
        let index = self.rows.get(node)?;
        match self.adj_matrix.get(index) {
            Some(row) => Some(row.as_slice()),
            None => {
                error!(
                    "Need 0 <= src_index < adj_matrix.len(), got src_index: {} vs adj_matrix.len(): {}",
                    index,
                    self.adj_matrix.len()
                );
                None
            }
        }
    }

    fn in_degree(&self, dst_node: NodeId) -> usize {
        self.statics.in_degree(dst_node)
    }

    fn out_degree(&self, src_node: NodeId) -> usize {
        self.statics.out_degree(src_node)
    }
}
