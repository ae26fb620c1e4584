//! In-memory graph storage and sampling for GNN training.
//!
//! Datasets are loaded in parallel into a [`storage::Storage`], frozen, and
//! then read by samplers and random walkers from any number of threads.

pub mod config;
pub mod error;
pub mod indexing;
pub mod indexing_wrapper;
pub mod line_parser;
pub mod loader;
pub mod namespace;
pub mod random;
pub mod sampler;
pub mod sampling;
pub mod storage;
pub mod value;
pub mod walker;

/// Node id; the high 16 bits carry the namespace tag.
pub type NodeId = u64;

/// `(neighbor, weight)` entry of a neighbor list.
pub type WeightedNode = (NodeId, f32);

pub use config::EngineConfig;
pub use error::{GraphError, Result};
pub use indexing::Indexing;
pub use indexing_wrapper::IndexingWrapper;
pub use loader::{Loader, LoaderKind, ShardSpec};
pub use namespace::{make_node_id, namespace_of, NamespaceConfig};
pub use sampler::{new_sampler_builder, NeighborSampler, SamplerBuilder, SamplerBuilderKind};
pub use sampling::{new_sampling, Sampling, SamplingKind};
pub use storage::{AdjacencyKind, Storage};
pub use walker::{new_random_walker, RandomWalker, WalkerConfig, WalkerInfo, WalkerKind};
