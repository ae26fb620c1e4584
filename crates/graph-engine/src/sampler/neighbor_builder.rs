use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, error, info};

use super::{SamplerBuilder, SamplerSource};
use crate::error::{GraphError, Result};
use crate::loader::parallel_process;
use crate::random::random_index;
use crate::sampling::{new_sampling, Sampling, SamplingKind};
use crate::NodeId;

/// Draws a neighbor of the current node in proportion to the edge weight.
///
/// Uniform draws read the context row directly. Other strategies keep one
/// sampler per node in a concurrent cache, filled either up front by
/// [`NeighborSamplerBuilder::prebuild`] or the first time a node is visited.
pub struct NeighborSamplerBuilder {
    source: Arc<dyn SamplerSource>,
    kind: SamplingKind,
    sampling_map: DashMap<NodeId, Arc<dyn Sampling>>,
}

impl NeighborSamplerBuilder {
    /// Builder with an empty cache.
    pub fn new(source: Arc<dyn SamplerSource>, kind: SamplingKind) -> Self {
        Self {
            source,
            kind,
            sampling_map: DashMap::new(),
        }
    }

    /// Builder with every node's sampler prebuilt on `thread_num` threads.
    pub fn create(
        source: Arc<dyn SamplerSource>,
        kind: SamplingKind,
        thread_num: usize,
    ) -> Result<Self> {
        let builder = Self::new(source, kind);
        if kind != SamplingKind::Uniform {
            builder.prebuild(thread_num)?;
        }
        Ok(builder)
    }

    pub fn prebuild(&self, thread_num: usize) -> Result<()> {
        let nodes = self.source.node_keys();
        if nodes.is_empty() {
            return Ok(());
        }
        info!(
            "Building transition probability for {} nodes with {:?} sampling.",
            nodes.len(),
            self.kind
        );

        parallel_process(nodes, thread_num.clamp(1, nodes.len()), |nodes, thread_id| {
            debug!("Thread: {} is processing {} nodes.", thread_id, nodes.len());
            for &node in nodes {
                let sampling = self.build(node)?;
                self.sampling_map.insert(node, sampling);
            }
            Ok(())
        })
        .map_err(GraphError::into_root_cause)?;

        info!("Done.");
        Ok(())
    }

    /// Number of cached samplers.
    pub fn cached(&self) -> usize {
        self.sampling_map.len()
    }

    fn build(&self, node: NodeId) -> Result<Arc<dyn Sampling>> {
        let context = self.source.find_context(node).ok_or_else(|| {
            GraphError::IndexInconsistency(format!("couldn't find node: {} context", node))
        })?;

        let mut weights = Vec::with_capacity(context.len());
        for &(neighbor, weight) in context {
            if weight <= 0.0 {
                error!(
                    "Weight {} of node: {} and neighbor: {} must be greater than 0.",
                    weight, node, neighbor
                );
                return Err(GraphError::InvalidWeights(format!(
                    "weight {} of edge {} -> {} must be greater than 0",
                    weight, node, neighbor
                )));
            }
            weights.push(weight);
        }

        Ok(Arc::from(new_sampling(&weights, self.kind)?))
    }

    /// Cached sampler of `node`, building it on first use.
    pub fn sampling(&self, node: NodeId) -> Option<Arc<dyn Sampling>> {
        let cached = self.sampling_map.get(&node).map(|s| Arc::clone(s.value()));
        if cached.is_some() {
            return cached;
        }

        match self.build(node) {
            Ok(sampling) => Some(Arc::clone(
                self.sampling_map.entry(node).or_insert(sampling).value(),
            )),
            Err(e) => {
                error!("Failed to build sampler of node: {}: {}", node, e);
                None
            }
        }
    }
}

impl SamplerBuilder for NeighborSamplerBuilder {
    fn source(&self) -> &dyn SamplerSource {
        self.source.as_ref()
    }

    fn sampling_kind(&self) -> SamplingKind {
        self.kind
    }

    fn next(&self, cur_node: NodeId) -> Option<NodeId> {
        let context = self.source.find_context(cur_node)?;
        if context.is_empty() {
            return None;
        }
        let k = match self.kind {
            SamplingKind::Uniform => random_index(context.len()),
            _ => self.sampling(cur_node)?.next(),
        };
        context.get(k).map(|&(node, _)| node)
    }

    fn next_in(&self, cur_node: NodeId, begin: usize, end: usize) -> Option<NodeId> {
        let context = self.source.find_context(cur_node)?;
        if begin >= end || end > context.len() {
            return None;
        }
        let k = match self.kind {
            SamplingKind::Uniform => begin + random_index(end - begin),
            _ => self.sampling(cur_node)?.next_in(begin, end)?,
        };
        context.get(k).map(|&(node, _)| node)
    }
}
