//! Discrete samplers over a fixed weight vector.

mod alias;
mod partial_sum;
mod uniform;
mod word2vec;

pub use alias::AliasSampling;
pub use partial_sum::PartialSumSampling;
pub use uniform::UniformSampling;
pub use word2vec::Word2vecSampling;

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::{GraphError, Result};

/// Draws an index in `0..n` with probability `weight[i] / sum(weight)`.
pub trait Sampling: Send + Sync {
    fn next(&self) -> usize;

    /// Draw restricted to `begin..end`, renormalised over that range.
    /// `None` when the strategy cannot restrict or the range is empty.
    fn next_in(&self, begin: usize, end: usize) -> Option<usize>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingKind {
    Uniform,
    #[default]
    Alias,
    Word2vec,
    PartialSum,
}

impl TryFrom<u8> for SamplingKind {
    type Error = GraphError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(SamplingKind::Uniform),
            1 => Ok(SamplingKind::Alias),
            2 => Ok(SamplingKind::Word2vec),
            3 => Ok(SamplingKind::PartialSum),
            other => Err(GraphError::InvalidConfig(format!(
                "need type: UNIFORM(0) || ALIAS(1) || WORD2VEC(2) || PARTIAL_SUM(3), got type: {}",
                other
            ))),
        }
    }
}

impl FromStr for SamplingKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(SamplingKind::Uniform),
            "alias" => Ok(SamplingKind::Alias),
            "word2vec" => Ok(SamplingKind::Word2vec),
            "partial_sum" => Ok(SamplingKind::PartialSum),
            other => other
                .parse::<u8>()
                .map_err(|_| GraphError::InvalidConfig(format!("unknown sampling type: {}", s)))
                .and_then(Self::try_from),
        }
    }
}

/// Builds a sampler of `kind` over `weights`.
pub fn new_sampling(weights: &[f32], kind: SamplingKind) -> Result<Box<dyn Sampling>> {
    validate_weights(weights).map_err(|e| {
        error!("Failed to init {:?} sampling: {}", kind, e);
        e
    })?;

    Ok(match kind {
        SamplingKind::Uniform => Box::new(UniformSampling::new(weights.len())),
        SamplingKind::Alias => Box::new(AliasSampling::new(weights)),
        SamplingKind::Word2vec => Box::new(Word2vecSampling::new(weights)?),
        SamplingKind::PartialSum => Box::new(PartialSumSampling::new(weights)),
    })
}

fn validate_weights(weights: &[f32]) -> Result<()> {
    if weights.is_empty() {
        return Err(GraphError::InvalidWeights("empty weight vector".into()));
    }
    if let Some((i, w)) = weights
        .iter()
        .enumerate()
        .find(|(_, w)| !w.is_finite() || **w < 0.0)
    {
        return Err(GraphError::InvalidWeights(format!(
            "weight[{}] = {} must be finite and non-negative",
            i, w
        )));
    }
    if weights.iter().all(|&w| w == 0.0) {
        return Err(GraphError::InvalidWeights("all weights are zero".into()));
    }
    Ok(())
}
