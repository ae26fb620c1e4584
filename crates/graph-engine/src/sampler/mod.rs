//! Node-level samplers built on top of a loaded graph.
//!
//! A [`SamplerBuilder`] turns per-node or per-namespace weights into
//! [`Sampling`](crate::sampling::Sampling) tables and answers "next node"
//! draws. Builders are immutable once created, apart from the lazily filled
//! neighbor cache, and are shared across threads behind an `Arc`.

mod negative_builder;
mod neighbor_builder;
mod neighbor_sampler;
pub mod source;

pub use negative_builder::NegativeSamplerBuilder;
pub use neighbor_builder::NeighborSamplerBuilder;
pub use neighbor_sampler::NeighborSampler;
pub use source::{GraphSamplerSource, SamplerSource};

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sampling::SamplingKind;
use crate::NodeId;

pub trait SamplerBuilder: Send + Sync {
    fn source(&self) -> &dyn SamplerSource;

    fn sampling_kind(&self) -> SamplingKind;

    /// Draws the next node for `cur_node`; `None` if `cur_node` has no
    /// candidates.
    fn next(&self, cur_node: NodeId) -> Option<NodeId>;

    /// Same as [`SamplerBuilder::next`], restricted to candidate positions
    /// `begin..end`. `None` when the range is empty or the sampling strategy
    /// cannot restrict.
    fn next_in(&self, cur_node: NodeId, begin: usize, end: usize) -> Option<NodeId>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerBuilderKind {
    Neighbor,
    Negative,
}

pub fn new_sampler_builder(
    source: Arc<dyn SamplerSource>,
    kind: SamplerBuilderKind,
    sampling_kind: SamplingKind,
    thread_num: usize,
) -> Result<Arc<dyn SamplerBuilder>> {
    Ok(match kind {
        SamplerBuilderKind::Neighbor => Arc::new(NeighborSamplerBuilder::create(
            source,
            sampling_kind,
            thread_num,
        )?),
        SamplerBuilderKind::Negative => {
            Arc::new(NegativeSamplerBuilder::create(source, sampling_kind)?)
        }
    })
}
