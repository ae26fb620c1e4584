use crate::error::{GraphError, Result};
use crate::indexing::Indexing;
use crate::NodeId;

/// In/out degree counters addressed through a src and a dst [`Indexing`].
///
/// Callers register a node in the matching indexing before calling
/// [`GraphStatics::add`]; the counter arrays grow by exactly one slot per new
/// index, so any index that skips ahead is rejected.
#[derive(Debug, Clone, Default)]
pub struct GraphStatics {
    src_indexing: Indexing,
    dst_indexing: Indexing,
    src_node_list: Vec<NodeId>,
    dst_node_list: Vec<NodeId>,
    in_degree_list: Vec<usize>,
    out_degree_list: Vec<usize>,
}

impl GraphStatics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.src_indexing.clear();
        self.dst_indexing.clear();
        self.src_node_list.clear();
        self.dst_node_list.clear();
        self.in_degree_list.clear();
        self.out_degree_list.clear();
    }

    pub fn reserve(&mut self, estimated_size: usize) {
        self.src_indexing.reserve(estimated_size);
        self.dst_indexing.reserve(estimated_size);
        self.src_node_list.reserve(estimated_size);
        self.dst_node_list.reserve(estimated_size);
        self.in_degree_list.reserve(estimated_size);
        self.out_degree_list.reserve(estimated_size);
    }

    /// Counts the edge `src -> dst`.
    pub fn add(&mut self, src_node: NodeId, dst_node: NodeId) -> Result<()> {
        let src_index = self.src_indexing.get(src_node).ok_or_else(|| {
            GraphError::IndexInconsistency(format!("src node {} is not indexed", src_node))
        })?;
        let dst_index = self.dst_indexing.get(dst_node).ok_or_else(|| {
            GraphError::IndexInconsistency(format!("dst node {} is not indexed", dst_node))
        })?;

        // Validate both sides before touching either counter.
        if src_index > self.src_node_list.len() {
            return Err(GraphError::IndexInconsistency(format!(
                "need src_index <= src_node_list.len(), got src_index: {} vs {}",
                src_index,
                self.src_node_list.len()
            )));
        }
        if dst_index > self.dst_node_list.len() {
            return Err(GraphError::IndexInconsistency(format!(
                "need dst_index <= dst_node_list.len(), got dst_index: {} vs {}",
                dst_index,
                self.dst_node_list.len()
            )));
        }

        bump(
            &mut self.src_node_list,
            &mut self.out_degree_list,
            src_index,
            src_node,
        );
        bump(
            &mut self.dst_node_list,
            &mut self.in_degree_list,
            dst_index,
            dst_node,
        );
        Ok(())
    }

    pub fn in_degree(&self, dst_node: NodeId) -> usize {
        self.dst_indexing
            .try_get(dst_node)
            .and_then(|i| self.in_degree_list.get(i).copied())
            .unwrap_or(0)
    }

    pub fn out_degree(&self, src_node: NodeId) -> usize {
        self.src_indexing
            .try_get(src_node)
            .and_then(|i| self.out_degree_list.get(i).copied())
            .unwrap_or(0)
    }

    pub fn src_indexing(&self) -> &Indexing {
        &self.src_indexing
    }

    pub fn src_indexing_mut(&mut self) -> &mut Indexing {
        &mut self.src_indexing
    }

    pub fn dst_indexing(&self) -> &Indexing {
        &self.dst_indexing
    }

    pub fn dst_indexing_mut(&mut self) -> &mut Indexing {
        &mut self.dst_indexing
    }

    /// Source nodes in the order their first edge was counted.
    pub fn src_node_list(&self) -> &[NodeId] {
        &self.src_node_list
    }

    pub fn dst_node_list(&self) -> &[NodeId] {
        &self.dst_node_list
    }

    pub fn in_degree_list(&self) -> &[usize] {
        &self.in_degree_list
    }

    pub fn out_degree_list(&self) -> &[usize] {
        &self.out_degree_list
    }
}

fn bump(nodes: &mut Vec<NodeId>, degrees: &mut Vec<usize>, index: usize, node: NodeId) {
    if index < nodes.len() {
        degrees[index] += 1;
    } else {
        nodes.push(node);
        degrees.push(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn count(statics: &mut GraphStatics, src: NodeId, dst: NodeId) -> Result<()> {
        statics.src_indexing_mut().add(src);
        statics.dst_indexing_mut().add(dst);
        statics.add(src, dst)
    }

    #[test]
    fn test_degrees_match_naive_recount() {
        let edges = [
            (1u64, 2u64),
            (1, 3),
            (2, 3),
            (3, 1),
            (1, 2),
            (4, 1),
            (2, 4),
            (3, 3),
        ];

        let mut statics = GraphStatics::new();
        for (src, dst) in edges {
            count(&mut statics, src, dst).unwrap();
        }

        let mut out_degree: HashMap<NodeId, usize> = HashMap::new();
        let mut in_degree: HashMap<NodeId, usize> = HashMap::new();
        for (src, dst) in edges {
            *out_degree.entry(src).or_default() += 1;
            *in_degree.entry(dst).or_default() += 1;
        }

        for node in 0..6u64 {
            assert_eq!(
                statics.out_degree(node),
                out_degree.get(&node).copied().unwrap_or(0),
                "out degree of {}",
                node
            );
            assert_eq!(
                statics.in_degree(node),
                in_degree.get(&node).copied().unwrap_or(0),
                "in degree of {}",
                node
            );
        }
        assert_eq!(statics.src_node_list(), &[1, 2, 3, 4]);
        assert_eq!(statics.dst_node_list(), &[2, 3, 1, 4]);
    }

    #[test]
    fn test_rejects_skipped_index() {
        let mut statics = GraphStatics::new();
        statics.src_indexing_mut().add(10);
        statics.src_indexing_mut().add(11);
        statics.dst_indexing_mut().add(20);

        // 11 owns index 1 while no counter exists for index 0 yet.
        let err = statics.add(11, 20).unwrap_err();
        assert!(matches!(err, GraphError::IndexInconsistency(_)));
        assert_eq!(statics.in_degree(20), 0);

        statics.add(10, 20).unwrap();
        statics.add(11, 20).unwrap();
        assert_eq!(statics.out_degree(11), 1);
        assert_eq!(statics.in_degree(20), 2);
    }

    #[test]
    fn test_unindexed_node() {
        let mut statics = GraphStatics::new();
        assert!(statics.add(1, 2).is_err());
        assert_eq!(statics.out_degree(1), 0);
    }
}
