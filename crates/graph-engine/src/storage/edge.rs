use tracing::error;

use super::statics::GraphStatics;
use super::Storage;
use crate::error::{GraphError, Result};
use crate::value::EdgeValue;
use crate::{NodeId, WeightedNode};

/// Flat edge list plus a per-source index over it. The edge id is the
/// position of the edge in file order.
#[derive(Debug, Default)]
pub struct EdgeVector {
    src_node_list: Vec<NodeId>,
    dst_node_list: Vec<NodeId>,
    weight_list: Vec<f32>,

    adj_node_list: Vec<Vec<WeightedNode>>,
    adj_edge_list: Vec<Vec<usize>>,

    statics: GraphStatics,
}

impl EdgeVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.src_node_list.clear();
        self.dst_node_list.clear();
        self.weight_list.clear();
        self.adj_node_list.clear();
        self.adj_edge_list.clear();
        self.statics.clear();
    }

    pub fn reserve(&mut self, estimated_size: usize) {
        self.src_node_list.reserve(estimated_size);
        self.dst_node_list.reserve(estimated_size);
        self.weight_list.reserve(estimated_size);
        self.adj_node_list.reserve(estimated_size);
        self.adj_edge_list.reserve(estimated_size);
        self.statics.reserve(estimated_size);
    }

    /// Appends one edge and returns its id.
    pub fn add(&mut self, value: &EdgeValue) -> Result<usize> {
        let src_index = self.statics.src_indexing_mut().add(value.src_node);
        self.statics.dst_indexing_mut().add(value.dst_node);
        self.statics.add(value.src_node, value.dst_node)?;

        let edge_id = self.src_node_list.len();
        self.src_node_list.push(value.src_node);
        self.dst_node_list.push(value.dst_node);
        self.weight_list.push(value.weight);

        match src_index.cmp(&self.adj_edge_list.len()) {
            std::cmp::Ordering::Less => {
                self.adj_node_list[src_index].push((value.dst_node, value.weight));
                self.adj_edge_list[src_index].push(edge_id);
            }
            std::cmp::Ordering::Equal => {
                self.adj_node_list.push(vec![(value.dst_node, value.weight)]);
                self.adj_edge_list.push(vec![edge_id]);
            }
            std::cmp::Ordering::Greater => {
                return Err(GraphError::IndexInconsistency(format!(
                    "need src_index <= adj_edge_list.len(), got src_index: {} vs {}",
                    src_index,
                    self.adj_edge_list.len()
                )));
            }
        }
        Ok(edge_id)
    }

    /// `(src, dst, weight)` of an edge.
    pub fn edge(&self, edge_id: usize) -> Option<(NodeId, NodeId, f32)> {
        if edge_id >= self.src_node_list.len() {
            error!(
                "Need edge_id < src_node_list.len(), got edge_id: {} vs src_node_list.len(): {}",
                edge_id,
                self.src_node_list.len()
            );
            return None;
        }
        Some((
            self.src_node_list[edge_id],
            self.dst_node_list[edge_id],
            self.weight_list[edge_id],
        ))
    }

    pub fn find_neighbor_node(&self, node: NodeId) -> Option<&[WeightedNode]> {
        let index = self.statics.src_indexing().get(node)?;
        self.adj_node_list.get(index).map(Vec::as_slice)
    }

    pub fn find_neighbor_edge(&self, node: NodeId) -> Option<&[usize]> {
        let index = self.statics.src_indexing().get(node)?;
        self.adj_edge_list.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.src_node_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.src_node_list.is_empty()
    }

    /// Distinct source nodes, first-seen order.
    pub fn sources(&self) -> &[NodeId] {
        self.statics.src_node_list()
    }

    pub fn describe(&self, edge_id: usize) -> String {
        match self.edge(edge_id) {
            Some((src, dst, weight)) => {
                format!("src_node:{} dst_node:{} weight:{}", src, dst, weight)
            }
            None => format!("edge:{} is nullptr.", edge_id),
        }
    }

    pub fn in_degree(&self, node: NodeId) -> usize {
        self.statics.in_degree(node)
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.statics.out_degree(node)
    }
}

/// Raw edge dataset.
#[derive(Debug, Default)]
pub struct EdgeStorage {
    edge_vector: EdgeVector,
}

impl EdgeStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge_vector(&self) -> &EdgeVector {
        &self.edge_vector
    }
}

impl Storage for EdgeStorage {
    fn clear(&mut self) {
        self.edge_vector.clear();
    }

    fn reserve(&mut self, estimated_size: usize) {
        self.edge_vector.reserve(estimated_size);
    }

    fn insert_edge(&mut self, value: EdgeValue) -> Result<()> {
        self.edge_vector.add(&value).map(|_| ())
    }

    fn len(&self) -> usize {
        self.edge_vector.len()
    }

    fn keys(&self) -> &[NodeId] {
        self.edge_vector.sources()
    }

    fn find_neighbor(&self, node: NodeId) -> Option<&[WeightedNode]> {
        self.edge_vector.find_neighbor_node(node)
    }

    /// `node` is read as an edge id here.
    fn describe(&self, node: NodeId) -> String {
        match usize::try_from(node) {
            Ok(edge_id) => self.edge_vector.describe(edge_id),
            Err(_) => format!("edge:{} is nullptr.", node),
        }
    }

    fn in_degree(&self, dst_node: NodeId) -> usize {
        self.edge_vector.in_degree(dst_node)
    }

    fn out_degree(&self, src_node: NodeId) -> usize {
        self.edge_vector.out_degree(src_node)
    }
}
