use std::collections::HashMap;
use std::path::Path;

use tracing::{error, info};

use crate::error::{GraphError, Result};
use crate::loader::{Loader, ShardSpec};
use crate::namespace::NamespaceConfig;
use crate::storage::{AdjacencyKind, Storage};
use crate::{NodeId, WeightedNode};

/// Read side consumed by the sampler builders.
pub trait SamplerSource: Send + Sync {
    fn ns_size(&self) -> usize;
    fn id_name_map(&self) -> &HashMap<u16, String>;

    /// Distinct nodes per namespace, first-seen order.
    fn nodes_list(&self) -> &[Vec<NodeId>];

    /// Occurrence counts parallel to [`SamplerSource::nodes_list`].
    fn freqs_list(&self) -> &[Vec<f32>];

    /// Nodes that own a context row.
    fn node_keys(&self) -> &[NodeId];

    fn find_context(&self, node: NodeId) -> Option<&[WeightedNode]>;
}

/// Sampler source over a loaded context graph. Every occurrence of a node,
/// as a key or inside a neighbor list, adds one to its frequency.
pub struct GraphSamplerSource {
    storage: Box<dyn Storage>,
    config: NamespaceConfig,
    nodes_list: Vec<Vec<NodeId>>,
    freqs_list: Vec<Vec<f32>>,
}

impl GraphSamplerSource {
    pub fn new(storage: Box<dyn Storage>, config: NamespaceConfig) -> Result<Self> {
        let ns_size = config.ns_size();
        let mut nodes_list: Vec<Vec<NodeId>> = vec![Vec::new(); ns_size];
        let mut freqs_list: Vec<Vec<f32>> = vec![Vec::new(); ns_size];
        let mut positions: HashMap<NodeId, usize> = HashMap::with_capacity(storage.len());

        let mut count = |node: NodeId| -> Result<()> {
            let ns_id = config.check(node).map_err(|e| {
                error!("{}", e);
                e
            })? as usize;
            let (Some(nodes), Some(freqs)) = (nodes_list.get_mut(ns_id), freqs_list.get_mut(ns_id))
            else {
                return Err(GraphError::UnknownNamespace {
                    node,
                    ns_id: ns_id as u16,
                });
            };
            match positions.get(&node) {
                Some(&pos) => freqs[pos] += 1.0,
                None => {
                    positions.insert(node, nodes.len());
                    nodes.push(node);
                    freqs.push(1.0);
                }
            }
            Ok(())
        };

        for &node in storage.keys() {
            count(node)?;
            let context = storage.find_neighbor(node).ok_or_else(|| {
                GraphError::IndexInconsistency(format!("key {} has no context row", node))
            })?;
            for &(neighbor, _) in context {
                count(neighbor)?;
            }
        }

        for (ns_id, name) in config.id_name_map() {
            info!(
                "Namespace {} ({}) holds {} unique nodes.",
                ns_id,
                name,
                nodes_list.get(*ns_id as usize).map_or(0, Vec::len)
            );
        }

        Ok(Self {
            storage,
            config,
            nodes_list,
            freqs_list,
        })
    }

    /// Loads a context graph from `node_graph` and wraps it.
    pub fn load(
        node_graph: &Path,
        config: NamespaceConfig,
        thread_num: usize,
        shard: ShardSpec,
        store_kind: AdjacencyKind,
    ) -> Result<Self> {
        let mut loader = Loader::context(shard, store_kind);
        loader.load(node_graph, thread_num)?;
        Self::new(loader.into_storage(), config)
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn config(&self) -> &NamespaceConfig {
        &self.config
    }
}

impl SamplerSource for GraphSamplerSource {
    fn ns_size(&self) -> usize {
        self.config.ns_size()
    }

    fn id_name_map(&self) -> &HashMap<u16, String> {
        self.config.id_name_map()
    }

    fn nodes_list(&self) -> &[Vec<NodeId>] {
        &self.nodes_list
    }

    fn freqs_list(&self) -> &[Vec<f32>] {
        &self.freqs_list
    }

    fn node_keys(&self) -> &[NodeId] {
        self.storage.keys()
    }

    fn find_context(&self, node: NodeId) -> Option<&[WeightedNode]> {
        self.storage.find_neighbor(node)
    }
}
