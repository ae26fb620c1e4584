//! In-memory graph datasets.
//!
//! A storage is filled once by a [`Loader`](crate::loader::Loader) and read
//! from any number of threads afterwards. Inserts take `&mut self`; the loader
//! serialises concurrent workers behind a mutex for the duration of a load.

pub mod adj_list;
pub mod adj_matrix;
pub mod adjacency;
pub mod adjacency_storage;
pub mod edge;
pub mod statics;

pub use adjacency::{new_adjacency, Adjacency, AdjacencyKind};
pub use adjacency_storage::{ContextStorage, FeatureStorage};
pub use edge::{EdgeStorage, EdgeVector};
pub use statics::GraphStatics;

use crate::error::{GraphError, Result};
use crate::value::{AdjValue, EdgeValue};
use crate::{NodeId, WeightedNode};

pub trait Storage: Send + Sync {
    fn clear(&mut self);
    fn reserve(&mut self, estimated_size: usize);

    fn insert_context(&mut self, _value: AdjValue) -> Result<()> {
        Err(GraphError::Unsupported("context insert on this storage"))
    }

    fn insert_feature(&mut self, _value: AdjValue) -> Result<()> {
        Err(GraphError::Unsupported("feature insert on this storage"))
    }

    fn insert_edge(&mut self, _value: EdgeValue) -> Result<()> {
        Err(GraphError::Unsupported("edge insert on this storage"))
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn keys(&self) -> &[NodeId];

    fn find_neighbor(&self, node: NodeId) -> Option<&[WeightedNode]>;

    fn describe(&self, node: NodeId) -> String;

    fn in_degree(&self, dst_node: NodeId) -> usize;
    fn out_degree(&self, src_node: NodeId) -> usize;
}

pub fn new_context_storage(kind: AdjacencyKind) -> Box<dyn Storage> {
    Box::new(ContextStorage::new(kind))
}

pub fn new_feature_storage(kind: AdjacencyKind) -> Box<dyn Storage> {
    Box::new(FeatureStorage::new(kind))
}

pub fn new_edge_storage() -> Box<dyn Storage> {
    Box::new(EdgeStorage::new())
}
