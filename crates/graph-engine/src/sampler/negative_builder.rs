use std::sync::Arc;

use tracing::{info, warn};

use super::{SamplerBuilder, SamplerSource};
use crate::error::Result;
use crate::namespace::namespace_of;
use crate::random::random_index;
use crate::sampling::{new_sampling, Sampling, SamplingKind};
use crate::NodeId;

const FREQUENCY_POWER: f64 = 0.75;

/// Draws a node from the same namespace as the current node, weighted by
/// smoothed occurrence frequency.
pub struct NegativeSamplerBuilder {
    source: Arc<dyn SamplerSource>,
    kind: SamplingKind,
    samplings: Vec<Option<Box<dyn Sampling>>>,
}

impl NegativeSamplerBuilder {
    pub fn create(source: Arc<dyn SamplerSource>, kind: SamplingKind) -> Result<Self> {
        let mut samplings: Vec<Option<Box<dyn Sampling>>> =
            (0..source.ns_size()).map(|_| None).collect();

        if kind != SamplingKind::Uniform {
            info!("Initing frequency negative sampler, with sampler_type: {:?}.", kind);
            for &ns_id in source.id_name_map().keys() {
                let Some(freqs) = source.freqs_list().get(ns_id as usize) else {
                    continue;
                };
                if freqs.is_empty() {
                    warn!("Namespace {} has no nodes, skipping its sampler.", ns_id);
                    continue;
                }
                let weights = smoothed(freqs, kind);
                if let Some(slot) = samplings.get_mut(ns_id as usize) {
                    *slot = Some(new_sampling(&weights, kind)?);
                }
            }
        }

        Ok(Self {
            source,
            kind,
            samplings,
        })
    }

    fn candidates(&self, cur_node: NodeId) -> Option<&[NodeId]> {
        self.source
            .nodes_list()
            .get(namespace_of(cur_node) as usize)
            .map(Vec::as_slice)
            .filter(|nodes| !nodes.is_empty())
    }

    fn sampling(&self, cur_node: NodeId) -> Option<&dyn Sampling> {
        self.samplings
            .get(namespace_of(cur_node) as usize)
            .and_then(|s| s.as_deref())
    }
}

/// `freq^0.75`, normalised. Word2vec tables smooth on their own and take the
/// raw counts.
fn smoothed(freqs: &[f32], kind: SamplingKind) -> Vec<f32> {
    if kind == SamplingKind::Word2vec {
        return freqs.to_vec();
    }
    let powered: Vec<f64> = freqs
        .iter()
        .map(|&f| (f.max(0.0) as f64).powf(FREQUENCY_POWER))
        .collect();
    let sum: f64 = powered.iter().sum();
    powered.into_iter().map(|p| (p / sum) as f32).collect()
}

impl SamplerBuilder for NegativeSamplerBuilder {
    fn source(&self) -> &dyn SamplerSource {
        self.source.as_ref()
    }

    fn sampling_kind(&self) -> SamplingKind {
        self.kind
    }

    fn next(&self, cur_node: NodeId) -> Option<NodeId> {
        let nodes = self.candidates(cur_node)?;
        let k = match self.kind {
            SamplingKind::Uniform => random_index(nodes.len()),
            _ => self.sampling(cur_node)?.next(),
        };
        nodes.get(k).copied()
    }

    fn next_in(&self, cur_node: NodeId, begin: usize, end: usize) -> Option<NodeId> {
        let nodes = self.candidates(cur_node)?;
        if begin >= end || end > nodes.len() {
            return None;
        }
        let k = match self.kind {
            SamplingKind::Uniform => begin + random_index(end - begin),
            _ => self.sampling(cur_node)?.next_in(begin, end)?,
        };
        nodes.get(k).copied()
    }
}
