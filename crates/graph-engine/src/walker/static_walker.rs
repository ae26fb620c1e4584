use std::sync::Arc;

use super::util::{find_range, pick_weighted};
use super::{walk_all, RandomWalker, WalkerInfo};
use crate::error::Result;
use crate::namespace::namespace_of;
use crate::sampler::SamplerBuilder;
use crate::sampling::SamplingKind;
use crate::{NodeId, WeightedNode};

/// Draws before falling back to an exact linear pass over the row.
const MAX_TRIES: usize = 32;

/// Walks with the builder's per-node samplers, built once and reused by every
/// later visit of the same node.
pub struct StaticRandomWalker {
    builder: Arc<dyn SamplerBuilder>,
}

impl StaticRandomWalker {
    pub fn new(builder: Arc<dyn SamplerBuilder>) -> Self {
        Self { builder }
    }

    pub(crate) fn builder(&self) -> &dyn SamplerBuilder {
        self.builder.as_ref()
    }

    /// Row of `cur` and the `begin..end` span of it a step may land in.
    pub(crate) fn candidates(
        &self,
        cur: NodeId,
        banned: Option<NodeId>,
        target_ns: Option<u16>,
    ) -> Option<(&[WeightedNode], usize, usize)> {
        let context = self.builder.source().find_context(cur)?;
        let (begin, end) = match target_ns {
            Some(ns_id) => find_range(context, ns_id)?,
            None => (0, context.len()),
        };
        if begin >= end {
            return None;
        }
        if let Some(banned) = banned {
            if context[begin..end].iter().all(|&(n, _)| n == banned) {
                return None;
            }
        }
        Some((context, begin, end))
    }

    /// Next node from `cur`, inside namespace `target_ns` when given, never
    /// `banned`.
    pub(crate) fn step(
        &self,
        cur: NodeId,
        banned: Option<NodeId>,
        target_ns: Option<u16>,
    ) -> Option<NodeId> {
        let (context, begin, end) = self.candidates(cur, banned, target_ns)?;
        let eligible = |node: NodeId| is_eligible(node, banned, target_ns);
        let whole_row = begin == 0 && end == context.len();

        for _ in 0..MAX_TRIES {
            let drawn = if whole_row {
                self.builder.next(cur)
            } else {
                // Alias and word2vec tables cannot restrict to a range; their
                // full-row draws are filtered instead.
                self.builder
                    .next_in(cur, begin, end)
                    .or_else(|| self.builder.next(cur))
            };
            match drawn {
                Some(node) if eligible(node) => return Some(node),
                Some(_) => continue,
                None => break,
            }
        }

        let weighted = self.builder.sampling_kind() != SamplingKind::Uniform;
        pick_weighted(&context[begin..end], weighted, eligible)
    }
}

pub(crate) fn is_eligible(node: NodeId, banned: Option<NodeId>, target_ns: Option<u16>) -> bool {
    Some(node) != banned && target_ns.map_or(true, |ns_id| namespace_of(node) == ns_id)
}

impl RandomWalker for StaticRandomWalker {
    fn traverse(
        &self,
        start_nodes: &[NodeId],
        walk_lens: &[usize],
        info: &WalkerInfo,
    ) -> Result<Vec<Vec<NodeId>>> {
        walk_all(start_nodes, walk_lens, info, |cur, prev, target_ns| {
            let banned = if info.no_backtrack { prev } else { None };
            self.step(cur, banned, target_ns)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::{make_node_id, NamespaceConfig};
    use crate::random::reseed;
    use crate::sampler::source::tests::{source_from_rows, source_with_config};
    use crate::sampler::{GraphSamplerSource, NeighborSamplerBuilder};
    use std::collections::HashMap;
    use std::io::Write;

    fn walker(source: GraphSamplerSource, kind: SamplingKind) -> StaticRandomWalker {
        let builder = NeighborSamplerBuilder::create(Arc::new(source), kind, 2).unwrap();
        StaticRandomWalker::new(Arc::new(builder))
    }

    fn path_graph() -> GraphSamplerSource {
        source_from_rows(&[
            (0, &[(1, 1.0)]),
            (1, &[(0, 1.0), (2, 1.0)]),
            (2, &[(1, 1.0), (3, 1.0)]),
            (3, &[(2, 1.0)]),
        ])
    }

    fn user_item_config() -> NamespaceConfig {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "user 0\nitem 1").unwrap();
        NamespaceConfig::from_file(file.path()).unwrap()
    }

    fn user(k: u64) -> NodeId {
        make_node_id(0, k)
    }

    fn item(k: u64) -> NodeId {
        make_node_id(1, k)
    }

    #[test]
    fn test_path_graph_without_backtracking() {
        let info = WalkerInfo {
            meta_path: vec![],
            no_backtrack: true,
        };
        for kind in [
            SamplingKind::Uniform,
            SamplingKind::Alias,
            SamplingKind::PartialSum,
            SamplingKind::Word2vec,
        ] {
            let walker = walker(path_graph(), kind);
            for _ in 0..100 {
                let seqs = walker.traverse(&[0], &[3], &info).unwrap();
                assert_eq!(seqs, vec![vec![0, 1, 2, 3]], "{:?}", kind);
            }
            // Stops at the dead end instead of turning back.
            let seqs = walker.traverse(&[0], &[10], &info).unwrap();
            assert_eq!(seqs, vec![vec![0, 1, 2, 3]], "{:?}", kind);
        }
    }

    #[test]
    fn test_walk_stops_at_sink_and_unknown_start() {
        let walker = walker(
            source_from_rows(&[(1, &[(2, 1.0)]), (2, &[(3, 1.0)])]),
            SamplingKind::Alias,
        );
        let seqs = walker
            .traverse(&[1, 42], &[5, 5], &WalkerInfo::default())
            .unwrap();
        assert_eq!(seqs, vec![vec![1, 2, 3], vec![42]]);
    }

    #[test]
    fn test_meta_path_restricts_namespaces() {
        let rows: &[(NodeId, &[(NodeId, f32)])] = &[
            (user(1), &[(user(2), 5.0), (item(1), 1.0), (item(2), 1.0)]),
            (user(2), &[(user(1), 5.0), (item(2), 1.0)]),
            (item(1), &[(user(1), 1.0), (item(2), 9.0)]),
            (item(2), &[(user(1), 1.0), (user(2), 1.0), (item(1), 9.0)]),
        ];
        let info = WalkerInfo {
            meta_path: vec![1, 0],
            no_backtrack: false,
        };

        reseed(13);
        for kind in [SamplingKind::Alias, SamplingKind::PartialSum] {
            let walker = walker(source_with_config(rows, user_item_config()), kind);
            for _ in 0..200 {
                let seq = &walker.traverse(&[user(1)], &[6], &info).unwrap()[0];
                assert_eq!(seq.len(), 7);
                for (j, &node) in seq.iter().enumerate().skip(1) {
                    let expected = if j % 2 == 1 { 1 } else { 0 };
                    assert_eq!(namespace_of(node), expected, "{:?}: {:?}", kind, seq);
                }
            }
        }
    }

    #[test]
    fn test_meta_path_draws_follow_weights() {
        let source = source_with_config(
            &[(user(1), &[(user(2), 50.0), (item(1), 1.0), (item(2), 3.0)])],
            user_item_config(),
        );
        let walker = walker(source, SamplingKind::Alias);
        let info = WalkerInfo {
            meta_path: vec![1],
            no_backtrack: false,
        };

        reseed(21);
        let mut counts: HashMap<NodeId, usize> = HashMap::new();
        for _ in 0..40_000 {
            let seq = &walker.traverse(&[user(1)], &[1], &info).unwrap()[0];
            *counts.entry(seq[1]).or_default() += 1;
        }
        let share = counts[&item(2)] as f64 / 40_000.0;
        assert!((share - 0.75).abs() < 0.02, "share {}", share);
    }
}
