use std::collections::HashSet;
use std::sync::Arc;

use super::SamplerBuilder;
use crate::NodeId;

/// Fixed-fanout neighbor sampling for minibatch construction.
pub struct NeighborSampler {
    builder: Arc<dyn SamplerBuilder>,
}

impl NeighborSampler {
    pub fn new(builder: Arc<dyn SamplerBuilder>) -> Self {
        Self { builder }
    }

    /// Samples `count` neighbors for each of `nodes`.
    ///
    /// A negative `count`, or one equal to the degree, returns every neighbor.
    /// A smaller `count` draws without replacement, a larger one with
    /// replacement. Returns `None` when none of `nodes` has a neighbor.
    pub fn sample(&self, count: isize, nodes: &[NodeId]) -> Option<Vec<Vec<NodeId>>> {
        let neighbors_list: Vec<Vec<NodeId>> =
            nodes.iter().map(|&node| self.do_sampling(node, count)).collect();

        if neighbors_list.iter().all(Vec::is_empty) {
            return None;
        }
        Some(neighbors_list)
    }

    fn do_sampling(&self, node: NodeId, count: isize) -> Vec<NodeId> {
        let Some(context) = self.builder.source().find_context(node) else {
            return Vec::new();
        };
        let neighbor_size = context.len();

        match usize::try_from(count) {
            Err(_) => full_sampling(context.iter().map(|&(n, _)| n)),
            Ok(count) if count == neighbor_size => full_sampling(context.iter().map(|&(n, _)| n)),
            Ok(count) if count < neighbor_size => {
                let distinct: HashSet<NodeId> = context.iter().map(|&(n, _)| n).collect();
                if count >= distinct.len() {
                    // Rejection would never finish with this many repeats.
                    let mut seen = HashSet::with_capacity(distinct.len());
                    context
                        .iter()
                        .map(|&(n, _)| n)
                        .filter(|n| seen.insert(*n))
                        .collect()
                } else {
                    self.no_replacement_sampling(node, count)
                }
            }
            Ok(count) => self.with_replacement_sampling(node, count),
        }
    }

    fn no_replacement_sampling(&self, node: NodeId, count: usize) -> Vec<NodeId> {
        let mut picked = Vec::with_capacity(count);
        let mut seen = HashSet::with_capacity(count);
        while picked.len() < count {
            let Some(next) = self.builder.next(node) else {
                break;
            };
            if seen.insert(next) {
                picked.push(next);
            }
        }
        picked
    }

    fn with_replacement_sampling(&self, node: NodeId, count: usize) -> Vec<NodeId> {
        (0..count).map_while(|_| self.builder.next(node)).collect()
    }
}

fn full_sampling(neighbors: impl Iterator<Item = NodeId>) -> Vec<NodeId> {
    neighbors.collect()
}
