//! Random walks over a loaded context graph.
//!
//! Walkers draw every step from a [`SamplerBuilder`], so the per-node
//! samplers it caches are shared by all walks and all threads.

mod dynamic_walker;
mod static_walker;
pub mod util;

pub use dynamic_walker::DynamicRandomWalker;
pub use static_walker::StaticRandomWalker;

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::sampler::SamplerBuilder;
use crate::NodeId;

/// Per-call walk options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkerInfo {
    /// Namespace each step must land in, cycled. Empty means unrestricted.
    #[serde(default)]
    pub meta_path: Vec<u16>,
    #[serde(default)]
    pub no_backtrack: bool,
}

impl WalkerInfo {
    fn target_namespace(&self, step: usize) -> Option<u16> {
        if self.meta_path.is_empty() {
            None
        } else {
            Some(self.meta_path[step % self.meta_path.len()])
        }
    }
}

/// node2vec return (`p`) and in-out (`q`) parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkerConfig {
    pub p: f64,
    pub q: f64,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self { p: 1.0, q: 1.0 }
    }
}

impl WalkerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.p.is_finite() && self.p > 0.0 && self.q.is_finite() && self.q > 0.0) {
            return Err(GraphError::InvalidConfig(format!(
                "walker p and q must be positive, got p: {}, q: {}",
                self.p, self.q
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkerKind {
    #[default]
    Static,
    Dynamic,
}

impl TryFrom<u8> for WalkerKind {
    type Error = GraphError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(WalkerKind::Static),
            1 => Ok(WalkerKind::Dynamic),
            other => Err(GraphError::InvalidConfig(format!(
                "need type: STATIC(0) || DYNAMIC(1), got type: {}",
                other
            ))),
        }
    }
}

impl FromStr for WalkerKind {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(WalkerKind::Static),
            "dynamic" => Ok(WalkerKind::Dynamic),
            other => other
                .parse::<u8>()
                .map_err(|_| GraphError::InvalidConfig(format!("unknown walker type: {}", s)))
                .and_then(Self::try_from),
        }
    }
}

pub trait RandomWalker: Send + Sync {
    /// One walk per start node. Each sequence starts with its start node and
    /// holds at most `walk_lens[i]` further nodes; a walk ends early at a
    /// node with no eligible neighbor.
    fn traverse(
        &self,
        start_nodes: &[NodeId],
        walk_lens: &[usize],
        info: &WalkerInfo,
    ) -> Result<Vec<Vec<NodeId>>>;
}

pub fn new_random_walker(
    builder: Arc<dyn SamplerBuilder>,
    kind: WalkerKind,
    config: WalkerConfig,
) -> Result<Box<dyn RandomWalker>> {
    Ok(match kind {
        WalkerKind::Static => Box::new(StaticRandomWalker::new(builder)),
        WalkerKind::Dynamic => Box::new(DynamicRandomWalker::new(builder, config)?),
    })
}

fn check_lengths(start_nodes: &[NodeId], walk_lens: &[usize]) -> Result<()> {
    if start_nodes.len() != walk_lens.len() {
        return Err(GraphError::InvalidConfig(format!(
            "got {} start nodes but {} walk lengths",
            start_nodes.len(),
            walk_lens.len()
        )));
    }
    Ok(())
}

/// Shared driver: `step(cur, prev, target_ns)` picks the next node.
fn walk_all(
    start_nodes: &[NodeId],
    walk_lens: &[usize],
    info: &WalkerInfo,
    step: impl Fn(NodeId, Option<NodeId>, Option<u16>) -> Option<NodeId>,
) -> Result<Vec<Vec<NodeId>>> {
    check_lengths(start_nodes, walk_lens)?;

    Ok(start_nodes
        .iter()
        .zip(walk_lens)
        .map(|(&start, &walk_len)| {
            let mut seq = Vec::with_capacity(walk_len + 1);
            seq.push(start);
            let mut prev = None;
            let mut cur = start;
            for j in 0..walk_len {
                match step(cur, prev, info.target_namespace(j)) {
                    Some(next) => {
                        seq.push(next);
                        prev = Some(cur);
                        cur = next;
                    }
                    None => break,
                }
            }
            seq
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walker_kind_parsing() {
        assert_eq!("0".parse::<WalkerKind>().unwrap(), WalkerKind::Static);
        assert_eq!("Dynamic".parse::<WalkerKind>().unwrap(), WalkerKind::Dynamic);
        assert!("2".parse::<WalkerKind>().is_err());
        assert!("zigzag".parse::<WalkerKind>().is_err());
    }

    #[test]
    fn test_meta_path_cycles() {
        let info = WalkerInfo {
            meta_path: vec![1, 2],
            no_backtrack: false,
        };
        let steps: Vec<_> = (0..5).map(|j| info.target_namespace(j)).collect();
        assert_eq!(steps, vec![Some(1), Some(2), Some(1), Some(2), Some(1)]);
        assert_eq!(WalkerInfo::default().target_namespace(3), None);
    }

    #[test]
    fn test_walker_config_validation() {
        assert!(WalkerConfig::default().validate().is_ok());
        assert!(WalkerConfig { p: 0.0, q: 1.0 }.validate().is_err());
        assert!(WalkerConfig { p: 1.0, q: f64::NAN }.validate().is_err());
    }

    #[test]
    fn test_mismatched_lengths() {
        let err = walk_all(&[1, 2], &[3], &WalkerInfo::default(), |_, _, _| None).unwrap_err();
        assert!(matches!(err, GraphError::InvalidConfig(_)));
    }
}
