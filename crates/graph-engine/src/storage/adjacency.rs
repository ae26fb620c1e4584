//! Node -> neighbor list storage with two interchangeable layouts.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::namespace::namespace_of;
use crate::value::AdjValue;
use crate::{NodeId, WeightedNode};

pub use super::adj_list::AdjList;
pub use super::adj_matrix::AdjMatrix;

/// Physical layout of an [`Adjacency`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyKind {
    /// Hash map keyed by node id.
    #[default]
    List,
    /// Dense rows addressed through an [`Indexing`](crate::Indexing).
    Matrix,
}

impl TryFrom<u8> for AdjacencyKind {
    type Error = GraphError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(AdjacencyKind::List),
            1 => Ok(AdjacencyKind::Matrix),
            other => Err(GraphError::InvalidConfig(format!(
                "need adjacency type: ADJ_LIST(0) || ADJ_MATRIX(1), got type: {}",
                other
            ))),
        }
    }
}

impl FromStr for AdjacencyKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" | "adj_list" => Ok(AdjacencyKind::List),
            "matrix" | "adj_matrix" => Ok(AdjacencyKind::Matrix),
            other => match other.parse::<u8>() {
                Ok(code) => Self::try_from(code),
                Err(_) => Err(GraphError::InvalidConfig(format!(
                    "unknown adjacency type: {}",
                    s
                ))),
            },
        }
    }
}

pub trait Adjacency: Send + Sync {
    fn clear(&mut self);
    fn reserve(&mut self, estimated_size: usize);

    /// Stores a context row. The neighbor list is sorted by namespace and id
    /// before it is kept. A node already present is rejected untouched.
    fn add_context(&mut self, value: AdjValue) -> Result<()>;

    /// Stores a feature row as given. A node already present is rejected.
    fn add_feature(&mut self, value: AdjValue) -> Result<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source nodes in insertion order.
    fn keys(&self) -> &[NodeId];

    fn find_neighbor(&self, node: NodeId) -> Option<&[WeightedNode]>;

    fn in_degree(&self, dst_node: NodeId) -> usize;
    fn out_degree(&self, src_node: NodeId) -> usize;

    /// Debug rendering of one row: `Key:<id> value: a:w b:w`.
    fn describe(&self, node: NodeId) -> String {
        describe_row(node, self.find_neighbor(node))
    }
}

pub fn new_adjacency(kind: AdjacencyKind) -> Box<dyn Adjacency> {
    match kind {
        AdjacencyKind::List => Box::new(AdjList::new()),
        AdjacencyKind::Matrix => Box::new(AdjMatrix::new()),
    }
}

/// Stable sort by `(namespace, id)`.
pub(crate) fn sort_by_node(pairs: &mut [WeightedNode]) {
    pairs.sort_by_key(|&(id, _)| (namespace_of(id), id));
}

pub(crate) fn describe_row(node: NodeId, row: Option<&[WeightedNode]>) -> String {
    let mut out = format!("Key:{} value:", node);
    match row {
        Some(pairs) => {
            for (id, weight) in pairs {
                let _ = write!(out, " {}:{}", id, weight);
            }
        }
        None => out.push_str(" is nullptr."),
    }
    out
}
