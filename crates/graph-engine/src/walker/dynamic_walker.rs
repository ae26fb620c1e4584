use std::sync::Arc;

use super::static_walker::{is_eligible, StaticRandomWalker};
use super::util::{contains_node, pick_weighted};
use super::{walk_all, RandomWalker, WalkerConfig, WalkerInfo};
use crate::error::Result;
use crate::random::random_unit;
use crate::sampler::SamplerBuilder;
use crate::sampling::SamplingKind;
use crate::{NodeId, WeightedNode};

const MAX_PROPOSALS: usize = 64;

/// Second-order (node2vec) walk.
///
/// Proposals come from the static per-node samplers and are accepted by
/// rejection against the `p`/`q` bias, so no per-edge tables are built. When
/// every proposal is rejected the step is drawn exactly from the row weighted
/// by `w * bias`.
pub struct DynamicRandomWalker {
    inner: StaticRandomWalker,
    config: WalkerConfig,
    max_bias: f64,
}

impl DynamicRandomWalker {
    pub fn new(builder: Arc<dyn SamplerBuilder>, config: WalkerConfig) -> Result<Self> {
        config.validate()?;
        let max_bias = (1.0 / config.p).max(1.0).max(1.0 / config.q);
        Ok(Self {
            inner: StaticRandomWalker::new(builder),
            config,
            max_bias,
        })
    }

    fn bias(&self, prev: NodeId, candidate: NodeId) -> f64 {
        if candidate == prev {
            return 1.0 / self.config.p;
        }
        let prev_context = self.inner.builder().source().find_context(prev);
        if prev_context.is_some_and(|context| contains_node(context, candidate)) {
            1.0
        } else {
            1.0 / self.config.q
        }
    }

    fn step(
        &self,
        cur: NodeId,
        prev: Option<NodeId>,
        banned: Option<NodeId>,
        target_ns: Option<u16>,
    ) -> Option<NodeId> {
        let Some(prev) = prev else {
            return self.inner.step(cur, banned, target_ns);
        };

        for _ in 0..MAX_PROPOSALS {
            let candidate = self.inner.step(cur, banned, target_ns)?;
            if random_unit() < self.bias(prev, candidate) / self.max_bias {
                return Some(candidate);
            }
        }
        self.exact_step(cur, prev, banned, target_ns)
    }

    fn exact_step(
        &self,
        cur: NodeId,
        prev: NodeId,
        banned: Option<NodeId>,
        target_ns: Option<u16>,
    ) -> Option<NodeId> {
        let (context, begin, end) = self.inner.candidates(cur, banned, target_ns)?;
        let weighted = self.inner.builder().sampling_kind() != SamplingKind::Uniform;
        let biased: Vec<WeightedNode> = context[begin..end]
            .iter()
            .filter(|&&(node, _)| is_eligible(node, banned, target_ns))
            .map(|&(node, weight)| {
                let weight = if weighted { weight.max(0.0) as f64 } else { 1.0 };
                (node, (weight * self.bias(prev, node)) as f32)
            })
            .collect();
        pick_weighted(&biased, true, |_| true)
    }
}

impl RandomWalker for DynamicRandomWalker {
    fn traverse(
        &self,
        start_nodes: &[NodeId],
        walk_lens: &[usize],
        info: &WalkerInfo,
    ) -> Result<Vec<Vec<NodeId>>> {
        walk_all(start_nodes, walk_lens, info, |cur, prev, target_ns| {
            let banned = if info.no_backtrack { prev } else { None };
            self.step(cur, prev, banned, target_ns)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use crate::random::reseed;
    use crate::sampler::source::tests::source_from_rows;
    use crate::sampler::NeighborSamplerBuilder;
    use crate::sampling::SamplingKind;

    // Triangle 1-2-3 with a tail 2-4: from 2 (coming from 1), node 1 is a
    // return, node 3 is a common neighbor and node 4 is outward.
    fn walker(p: f64, q: f64) -> DynamicRandomWalker {
        let source = source_from_rows(&[
            (1, &[(2, 1.0), (3, 1.0)]),
            (2, &[(1, 1.0), (3, 1.0), (4, 1.0)]),
            (3, &[(1, 1.0), (2, 1.0)]),
            (4, &[(2, 1.0)]),
        ]);
        let builder =
            NeighborSamplerBuilder::create(Arc::new(source), SamplingKind::Alias, 1).unwrap();
        DynamicRandomWalker::new(Arc::new(builder), WalkerConfig { p, q }).unwrap()
    }

    fn second_step_shares(walker: &DynamicRandomWalker) -> [f64; 3] {
        let mut counts = [0usize; 3];
        let draws = 60_000;
        for _ in 0..draws {
            match walker.step(2, Some(1), None, None) {
                Some(1) => counts[0] += 1,
                Some(3) => counts[1] += 1,
                Some(4) => counts[2] += 1,
                other => panic!("unexpected step {:?}", other),
            }
        }
        counts.map(|c| c as f64 / draws as f64)
    }

    #[test]
    fn test_unbiased_when_p_q_are_one() {
        reseed(5);
        let shares = second_step_shares(&walker(1.0, 1.0));
        for share in shares {
            assert!((share - 1.0 / 3.0).abs() < 0.01, "{:?}", shares);
        }
    }

    #[test]
    fn test_bias_follows_p_and_q() {
        reseed(6);
        // Unnormalised biases: return 1/p = 0.25, common 1, outward 1/q = 2.
        let shares = second_step_shares(&walker(4.0, 0.5));
        let expected = [0.25 / 3.25, 1.0 / 3.25, 2.0 / 3.25];
        for (share, want) in shares.iter().zip(expected) {
            assert!((share - want).abs() < 0.01, "{:?}", shares);
        }
    }

    #[test]
    fn test_low_acceptance_keeps_node2vec_shares() {
        // From 2 (coming from 1): node 3 is a common neighbor with weight 1,
        // node 4 is outward with weight 99 and bias 1/q. Most proposals are 4
        // and almost all of them are rejected.
        let source = source_from_rows(&[(1, &[(2, 1.0), (3, 1.0)]), (2, &[(3, 1.0), (4, 99.0)])]);
        let builder =
            NeighborSamplerBuilder::create(Arc::new(source), SamplingKind::Alias, 1).unwrap();
        let walker = DynamicRandomWalker::new(
            Arc::new(builder),
            WalkerConfig {
                p: 1000.0,
                q: 1000.0,
            },
        )
        .unwrap();

        reseed(8);
        let draws = 40_000;
        let mut common = 0usize;
        for _ in 0..draws {
            match walker.step(2, Some(1), None, None) {
                Some(3) => common += 1,
                Some(4) => {}
                other => panic!("unexpected step {:?}", other),
            }
        }
        let expected = 1.0 / (1.0 + 99.0 / 1000.0);
        let share = common as f64 / draws as f64;
        assert!((share - expected).abs() < 0.01, "share {}", share);
    }

    #[test]
    fn test_exact_step_respects_filters() {
        let walker = walker(1000.0, 1000.0);
        for _ in 0..200 {
            let node = walker.exact_step(2, 1, Some(1), None).unwrap();
            assert!(node == 3 || node == 4);
        }
        assert_eq!(walker.exact_step(4, 2, Some(2), None), None);
    }

    #[test]
    fn test_traverse_and_validation() {
        let walker = walker(2.0, 0.5);
        let info = WalkerInfo {
            meta_path: vec![],
            no_backtrack: true,
        };
        let seqs = walker.traverse(&[4], &[1], &info).unwrap();
        assert_eq!(seqs, vec![vec![4, 2]]);
        let seqs = walker.traverse(&[4, 1], &[8, 8], &info).unwrap();
        for seq in &seqs {
            assert!(seq.len() >= 2);
            assert!(seq.windows(3).all(|w| w[0] != w[2]));
        }

        let source = source_from_rows(&[(1, &[(2, 1.0)])]);
        let builder = NeighborSamplerBuilder::new(Arc::new(source), SamplingKind::Uniform);
        assert!(matches!(
            DynamicRandomWalker::new(Arc::new(builder), WalkerConfig { p: -1.0, q: 1.0 }),
            Err(GraphError::InvalidConfig(_))
        ));
    }
}
