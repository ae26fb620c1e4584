//! Record types produced by the line grammar, one per dataset kind.

use std::fmt;
use std::str::SplitWhitespace;

use crate::error::{GraphError, Result};
use crate::{NodeId, WeightedNode};

pub const MAX_WEIGHT: f32 = 10.0;
pub const MIN_WEIGHT: f32 = -10.0;

/// A record that can be read from one line of a dataset file.
pub trait ParseLine: Sized + Send {
    fn parse_line(line: &str) -> Result<Self>;
}

fn check_weight(weight: f32) -> Result<f32> {
    if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
        return Err(GraphError::WeightOutOfRange(weight));
    }
    Ok(weight)
}

fn next_node(tokens: &mut SplitWhitespace<'_>, line: &str, what: &str) -> Result<NodeId> {
    let token = tokens
        .next()
        .ok_or_else(|| GraphError::malformed(line, format!("missing {}", what)))?;
    token
        .parse::<NodeId>()
        .map_err(|_| GraphError::malformed(line, format!("{} {:?} is not an integer", what, token)))
}

/// Parses the remaining tokens as a trailing weight, only when exactly one
/// token is left and it is a float.
fn trailing_weight(tokens: SplitWhitespace<'_>) -> Option<f32> {
    let rest: Vec<&str> = tokens.collect();
    match rest.as_slice() {
        [w] => w.parse::<f32>().ok(),
        _ => None,
    }
}

/// Leading run of integer labels; parsing stops at the first non-integer.
fn labels(tokens: SplitWhitespace<'_>) -> Vec<i32> {
    tokens.map_while(|t| t.parse::<i32>().ok()).collect()
}

/// `<node_id> [weight]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeValue {
    pub node: NodeId,
    pub weight: f32,
}

impl ParseLine for NodeValue {
    fn parse_line(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let node = next_node(&mut tokens, line, "node")?;
        let weight = trailing_weight(tokens).unwrap_or(1.0);
        Ok(Self { node, weight })
    }
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.node, self.weight)
    }
}

/// `<src_id> <dst_id> [weight]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeValue {
    pub src_node: NodeId,
    pub dst_node: NodeId,
    pub weight: f32,
}

impl ParseLine for EdgeValue {
    fn parse_line(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let src_node = next_node(&mut tokens, line, "src node")?;
        let dst_node = next_node(&mut tokens, line, "dst node")?;
        let weight = match trailing_weight(tokens) {
            Some(w) => check_weight(w)?,
            None => 1.0,
        };
        Ok(Self {
            src_node,
            dst_node,
            weight,
        })
    }
}

impl fmt::Display for EdgeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.src_node, self.dst_node, self.weight)
    }
}

/// `<id_1> <id_2> ... <id_k>`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SeqValue {
    pub nodes: Vec<NodeId>,
}

impl ParseLine for SeqValue {
    fn parse_line(line: &str) -> Result<Self> {
        let nodes: Vec<NodeId> = line
            .split_whitespace()
            .map_while(|t| t.parse::<NodeId>().ok())
            .collect();
        if nodes.is_empty() {
            return Err(GraphError::malformed(line, "empty sequence"));
        }
        Ok(Self { nodes })
    }
}

impl fmt::Display for SeqValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for node in &self.nodes {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}", node)?;
            first = false;
        }
        Ok(())
    }
}

/// `<node_id> <id_1>:<w_1> <id_2>:<w_2> ...`
///
/// Used for both context rows (neighbor ids) and feature rows (feature ids).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdjValue {
    pub node: NodeId,
    pub pairs: Vec<WeightedNode>,
}

impl ParseLine for AdjValue {
    fn parse_line(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let node = next_node(&mut tokens, line, "node")?;

        let mut pairs = Vec::new();
        for pair in tokens {
            let (id, weight) = pair.split_once(':').ok_or_else(|| {
                GraphError::malformed(line, format!("pair {:?} must be id:value", pair))
            })?;
            let id = id
                .parse::<NodeId>()
                .map_err(|_| GraphError::malformed(line, format!("bad id in pair {:?}", pair)))?;
            let weight = weight.parse::<f32>().map_err(|_| {
                GraphError::malformed(line, format!("bad weight in pair {:?}", pair))
            })?;
            pairs.push((id, check_weight(weight)?));
        }

        if pairs.is_empty() {
            return Err(GraphError::malformed(line, "need at least one id:value pair"));
        }
        Ok(Self { node, pairs })
    }
}

impl fmt::Display for AdjValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node)?;
        for (id, weight) in &self.pairs {
            write!(f, " {}:{}", id, weight)?;
        }
        Ok(())
    }
}

/// `<node_id> <label_1> <label_2> ...`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeAndLabelValue {
    pub node: NodeId,
    pub labels: Vec<i32>,
}

impl ParseLine for NodeAndLabelValue {
    fn parse_line(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let node = next_node(&mut tokens, line, "node")?;
        let labels = labels(tokens);
        if labels.is_empty() {
            return Err(GraphError::malformed(line, "need at least one label"));
        }
        Ok(Self { node, labels })
    }
}

impl fmt::Display for NodeAndLabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.node)?;
        for label in &self.labels {
            write!(f, " {}", label)?;
        }
        Ok(())
    }
}

/// `<src_id> <dst_id> <node_id> <label_1> ...`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EdgeAndLabelValue {
    pub src_node: NodeId,
    pub dst_node: NodeId,
    pub node: NodeId,
    pub labels: Vec<i32>,
}

impl ParseLine for EdgeAndLabelValue {
    fn parse_line(line: &str) -> Result<Self> {
        let mut tokens = line.split_whitespace();
        let src_node = next_node(&mut tokens, line, "src node")?;
        let dst_node = next_node(&mut tokens, line, "dst node")?;
        let node = next_node(&mut tokens, line, "node")?;
        let labels = labels(tokens);
        if labels.is_empty() {
            return Err(GraphError::malformed(line, "need at least one label"));
        }
        Ok(Self {
            src_node,
            dst_node,
            node,
            labels,
        })
    }
}

impl fmt::Display for EdgeAndLabelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.src_node, self.dst_node, self.node)?;
        for label in &self.labels {
            write!(f, " {}", label)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_value() {
        assert_eq!(
            NodeValue::parse_line("12").unwrap(),
            NodeValue {
                node: 12,
                weight: 1.0
            }
        );
        assert_eq!(NodeValue::parse_line("12 0.5").unwrap().weight, 0.5);
        // Weight is only taken when it is the last token.
        assert_eq!(NodeValue::parse_line("12 0.5 7").unwrap().weight, 1.0);
        assert!(NodeValue::parse_line("abc").is_err());
    }

    #[test]
    fn test_edge_value_weight_range() {
        let edge = EdgeValue::parse_line("1 2 -3.5").unwrap();
        assert_eq!((edge.src_node, edge.dst_node, edge.weight), (1, 2, -3.5));
        assert_eq!(EdgeValue::parse_line("1 2").unwrap().weight, 1.0);
        assert!(matches!(
            EdgeValue::parse_line("1 2 10.5"),
            Err(GraphError::WeightOutOfRange(_))
        ));
        assert!(EdgeValue::parse_line("1").is_err());
    }

    #[test]
    fn test_seq_value() {
        let seq = SeqValue::parse_line("4 5 6").unwrap();
        assert_eq!(seq.nodes, vec![4, 5, 6]);
        assert_eq!(seq.to_string(), "4 5 6");
        assert!(SeqValue::parse_line("x 5").is_err());
    }

    #[test]
    fn test_adj_value() {
        let adj = AdjValue::parse_line("0 1:1.1 2:1.2 3:1.3").unwrap();
        assert_eq!(adj.node, 0);
        assert_eq!(adj.pairs, vec![(1, 1.1), (2, 1.2), (3, 1.3)]);
        assert_eq!(adj.to_string(), "0 1:1.1 2:1.2 3:1.3");

        assert!(AdjValue::parse_line("0").is_err());
        assert!(AdjValue::parse_line("0 1-1.0").is_err());
        assert!(matches!(
            AdjValue::parse_line("0 1:11"),
            Err(GraphError::WeightOutOfRange(_))
        ));
    }

    #[test]
    fn test_label_values() {
        let value = NodeAndLabelValue::parse_line("9 1 0 1").unwrap();
        assert_eq!(value.labels, vec![1, 0, 1]);
        assert!(NodeAndLabelValue::parse_line("9").is_err());

        let value = EdgeAndLabelValue::parse_line("1 2 3 7").unwrap();
        assert_eq!((value.src_node, value.dst_node, value.node), (1, 2, 3));
        assert_eq!(value.to_string(), "1 2 3 7");
        assert!(EdgeAndLabelValue::parse_line("1 2 3").is_err());
    }
}
